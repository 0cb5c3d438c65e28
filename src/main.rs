mod app;
mod config;
mod models;
mod providers;
mod services;
mod ui;

use gtk::prelude::*;
use relm4::prelude::*;
use tracing_subscriber::EnvFilter;

use app::App;
use config::APP_ID;
use services::SettingsService;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orientai=info")),
        )
        .init();

    let settings = SettingsService::from_env()?;
    tracing::info!("Starting {} {} with {:?}", config::APP_NAME, config::VERSION, settings);

    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_startup(|_| {
        gtk::Window::set_default_icon_name(APP_ID);

        let Some(display) = gtk::gdk::Display::default() else {
            tracing::warn!("No default display; skipping stylesheet");
            return;
        };
        let provider = gtk::CssProvider::new();
        provider.load_from_string(include_str!("../data/style.css"));
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    });

    RelmApp::from_app(app).run_async::<App>(settings);
    Ok(())
}
