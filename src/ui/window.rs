use adw::prelude::*;

use crate::config;
use crate::models::Locale;
use crate::services::translations::translations;

pub fn create_about_dialog(parent: &adw::ApplicationWindow, locale: Locale) {
    let strings = translations(locale);
    let about = adw::AboutWindow::builder()
        .application_name(config::APP_NAME)
        .version(config::VERSION)
        .developer_name("IPAM Porto")
        .license_type(gtk::License::Gpl30)
        .comments(strings.description)
        .application_icon(config::APP_ID)
        .title(strings.about)
        .build();
    about.set_transient_for(Some(parent));
    about.present();
}
