use std::sync::Arc;

use adw::prelude::*;
use relm4::prelude::*;

use crate::config;
use crate::models::Locale;
use crate::providers::gemini::GeminiProvider;
use crate::services::controller::OutgoingMessage;
use crate::services::speech::{SpeechEngine, SpeechEvent, SpeechStream, SpeechUpdate};
use crate::services::translations::translations;
use crate::services::{
    AppSettings, AssistantConfig, AssistantService, ChatController, CommandSpeechEngine,
    SpeechCapture,
};
use crate::ui::chat_view::{ChatView, ChatViewInit, ChatViewMsg, ChatViewOutput};
use crate::ui::sidebar::{SessionEntry, Sidebar, SidebarMsg, SidebarOutput};

pub struct App {
    controller: ChatController,
    assistant: AssistantService,
    sidebar: Controller<Sidebar>,
    chat_view: Controller<ChatView>,
    toast_overlay: adw::ToastOverlay,
    badge_label: gtk::Label,
    locale_buttons: Vec<(Locale, gtk::ToggleButton)>,
}

#[derive(Debug)]
pub enum AppMsg {
    NewChat,
    SessionSelected(String),
    ClearChat,
    SendMessage(String),
    InputChanged(String),
    ToggleListening,
    SetLocale(Locale),
    ShowAbout,
}

#[derive(Debug)]
pub enum AppCmd {
    ReplyReady { session_id: String, text: String },
    Speech { generation: u64, event: SpeechEvent },
}

#[relm4::component(pub, async)]
impl AsyncComponent for App {
    type Init = AppSettings;
    type Input = AppMsg;
    type Output = ();
    type CommandOutput = AppCmd;

    view! {
        adw::ApplicationWindow {
            set_title: Some(config::APP_NAME),
            set_default_width: 1100,
            set_default_height: 760,
            set_width_request: 360,
            set_height_request: 480,

            #[local_ref]
            toast_overlay -> adw::ToastOverlay {},
        }
    }

    async fn init(
        settings: Self::Init,
        root: Self::Root,
        sender: AsyncComponentSender<Self>,
    ) -> AsyncComponentParts<Self> {
        let locale = settings.locale;

        let engine = settings.speech_command.clone().map(|command| {
            tracing::info!("Voice input via {:?}", command);
            Arc::new(CommandSpeechEngine::new(command)) as Arc<dyn SpeechEngine>
        });
        let controller = ChatController::new(SpeechCapture::new(engine, locale));

        let assistant = AssistantService::new(
            Arc::new(GeminiProvider::new()),
            AssistantConfig::from(&settings),
        );

        let sidebar = Sidebar::builder()
            .launch(locale)
            .forward(sender.input_sender(), |output| match output {
                SidebarOutput::NewChat => AppMsg::NewChat,
                SidebarOutput::ClearChat => AppMsg::ClearChat,
                SidebarOutput::SessionSelected(id) => AppMsg::SessionSelected(id),
            });

        let chat_view = ChatView::builder()
            .launch(ChatViewInit {
                locale,
                speech_available: controller.speech_available(),
            })
            .forward(sender.input_sender(), |output| match output {
                ChatViewOutput::SendMessage(text) => AppMsg::SendMessage(text),
                ChatViewOutput::InputChanged(text) => AppMsg::InputChanged(text),
                ChatViewOutput::ToggleListening => AppMsg::ToggleListening,
            });

        let toast_overlay = adw::ToastOverlay::new();
        toast_overlay.set_hexpand(true);
        toast_overlay.set_vexpand(true);

        // Header: product name, guide badge, language toggle, about
        let content_header = adw::HeaderBar::new();
        content_header.set_show_start_title_buttons(false);

        let title_box = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        let title_label = gtk::Label::new(Some(config::APP_NAME));
        title_label.add_css_class("heading");
        title_box.append(&title_label);
        let badge_label = gtk::Label::new(Some(translations(locale).badge));
        badge_label.add_css_class("guide-badge");
        badge_label.add_css_class("caption");
        title_box.append(&badge_label);
        content_header.set_title_widget(Some(&title_box));

        let about_btn = gtk::Button::builder()
            .icon_name("help-about-symbolic")
            .tooltip_text(translations(locale).about)
            .build();
        about_btn.set_action_name(Some("app.about"));
        content_header.pack_end(&about_btn);

        let locale_box = gtk::Box::new(gtk::Orientation::Horizontal, 0);
        locale_box.add_css_class("linked");
        let mut locale_buttons: Vec<(Locale, gtk::ToggleButton)> = Vec::new();
        for option in Locale::ALL {
            let button = gtk::ToggleButton::with_label(option.short_label());
            button.set_active(option == locale);
            if let Some((_, first)) = locale_buttons.first() {
                button.set_group(Some(first));
            }
            let sender_locale = sender.input_sender().clone();
            button.connect_toggled(move |button| {
                if button.is_active() {
                    sender_locale.emit(AppMsg::SetLocale(option));
                }
            });
            locale_box.append(&button);
            locale_buttons.push((option, button));
        }
        content_header.pack_end(&locale_box);

        let content_toolbar = adw::ToolbarView::new();
        content_toolbar.add_top_bar(&content_header);
        content_toolbar.set_content(Some(chat_view.widget()));

        let content_page = adw::NavigationPage::builder()
            .title(config::APP_NAME)
            .tag("content")
            .child(&content_toolbar)
            .build();

        let sidebar_page = adw::NavigationPage::builder()
            .title(translations(locale).recent_chats)
            .tag("sidebar")
            .child(sidebar.widget())
            .build();

        let split_view = adw::NavigationSplitView::new();
        split_view.set_hexpand(true);
        split_view.set_vexpand(true);
        split_view.set_min_sidebar_width(220.0);
        split_view.set_max_sidebar_width(300.0);
        split_view.set_sidebar(Some(&sidebar_page));
        split_view.set_content(Some(&content_page));

        match adw::BreakpointCondition::parse("max-width: 720px") {
            Ok(condition) => {
                let breakpoint = adw::Breakpoint::new(condition);
                breakpoint.add_setter(&split_view, "collapsed", Some(&true.to_value()));
                breakpoint.add_setter(
                    &content_header,
                    "show-start-title-buttons",
                    Some(&true.to_value()),
                );
                root.add_breakpoint(breakpoint);
            }
            Err(e) => tracing::warn!("Invalid breakpoint condition: {}", e),
        }

        toast_overlay.set_child(Some(&split_view));

        let model = App {
            controller,
            assistant,
            sidebar,
            chat_view,
            toast_overlay: toast_overlay.clone(),
            badge_label,
            locale_buttons,
        };

        let widgets = view_output!();

        let app = relm4::main_adw_application();
        let sender_about = sender.input_sender().clone();
        let about_action = gio::SimpleAction::new("about", None);
        about_action.connect_activate(move |_, _| {
            sender_about.emit(AppMsg::ShowAbout);
        });
        app.add_action(&about_action);

        let sender_new = sender.input_sender().clone();
        let new_chat_action = gio::SimpleAction::new("new-chat", None);
        new_chat_action.connect_activate(move |_, _| {
            sender_new.emit(AppMsg::NewChat);
        });
        app.add_action(&new_chat_action);
        app.set_accels_for_action("app.new-chat", &["<Control>n"]);

        model.refresh_sidebar();
        model.reload_messages();

        if settings.api_key.is_empty() {
            tracing::warn!(
                "{} is not set; replies will fall back to the error message",
                config::ENV_API_KEY
            );
            model.show_toast(&format!("{} is not set", config::ENV_API_KEY));
        }

        AsyncComponentParts { model, widgets }
    }

    async fn update(
        &mut self,
        msg: Self::Input,
        sender: AsyncComponentSender<Self>,
        root: &Self::Root,
    ) {
        match msg {
            AppMsg::NewChat => {
                self.controller.new_chat();
                self.reload_messages();
                self.refresh_sidebar();
            }
            AppMsg::SessionSelected(id) => {
                if id != self.controller.active_id() {
                    self.controller.select_session(&id);
                    self.reload_messages();
                    self.refresh_sidebar();
                }
            }
            AppMsg::ClearChat => {
                self.controller.clear_active();
                self.reload_messages();
                self.refresh_sidebar();
            }
            AppMsg::SendMessage(text) => {
                self.handle_send_message(&text, &sender);
            }
            AppMsg::InputChanged(text) => {
                self.controller.set_input(text);
            }
            AppMsg::ToggleListening => {
                if let Some(stream) = self.controller.toggle_listening() {
                    Self::pump_speech(stream, &sender);
                }
                self.chat_view
                    .emit(ChatViewMsg::SetListening(self.controller.is_listening()));
            }
            AppMsg::SetLocale(locale) => {
                if locale == self.controller.locale() {
                    return;
                }
                self.controller.set_locale(locale);
                self.apply_locale(locale);
            }
            AppMsg::ShowAbout => {
                crate::ui::window::create_about_dialog(root, self.controller.locale());
            }
        }
    }

    async fn update_cmd(
        &mut self,
        msg: Self::CommandOutput,
        _sender: AsyncComponentSender<Self>,
        _root: &Self::Root,
    ) {
        match msg {
            AppCmd::ReplyReady { session_id, text } => {
                let showing = self.controller.active_id() == session_id;
                if let Some(reply) = self.controller.complete_send(&session_id, text) {
                    if showing {
                        self.chat_view.emit(ChatViewMsg::AddMessage(reply));
                    }
                }
                self.chat_view.emit(ChatViewMsg::SetLoading(false));
                self.refresh_sidebar();
            }
            AppCmd::Speech { generation, event } => {
                match self.controller.handle_speech_event(generation, event) {
                    SpeechUpdate::Transcript(text) => {
                        self.chat_view.emit(ChatViewMsg::SetInputText(text));
                    }
                    SpeechUpdate::Ended => {
                        self.chat_view.emit(ChatViewMsg::SetListening(false));
                    }
                    SpeechUpdate::Ignored => {}
                }
            }
        }
    }
}

impl App {
    fn handle_send_message(&mut self, text: &str, sender: &AsyncComponentSender<Self>) {
        let had_active = self.controller.active_session().is_some();
        let Some(outgoing) = self.controller.begin_send(text) else {
            return;
        };

        self.chat_view.emit(ChatViewMsg::SetListening(false));
        self.chat_view.emit(ChatViewMsg::SetInputText(String::new()));
        if had_active {
            self.chat_view
                .emit(ChatViewMsg::AddMessage(outgoing.user_message.clone()));
        } else {
            self.reload_messages();
        }
        self.chat_view.emit(ChatViewMsg::SetLoading(true));
        self.refresh_sidebar();

        self.dispatch_ai_request(outgoing, sender);
    }

    fn dispatch_ai_request(&self, outgoing: OutgoingMessage, sender: &AsyncComponentSender<Self>) {
        let assistant = self.assistant.clone();
        sender.command(move |out, _| {
            Box::pin(async move {
                let text = assistant
                    .generate_response(
                        &outgoing.user_message.content,
                        &outgoing.history,
                        outgoing.locale,
                    )
                    .await;
                let _ = out.send(AppCmd::ReplyReady {
                    session_id: outgoing.session_id,
                    text,
                });
            })
        });
    }

    fn pump_speech(stream: SpeechStream, sender: &AsyncComponentSender<Self>) {
        let generation = stream.generation();
        sender.command(move |out, _| {
            Box::pin(async move {
                stream
                    .run(|event| {
                        let _ = out.send(AppCmd::Speech { generation, event });
                    })
                    .await;
            })
        });
    }

    fn apply_locale(&self, locale: Locale) {
        let strings = translations(locale);
        self.badge_label.set_label(strings.badge);
        for (option, button) in &self.locale_buttons {
            if *option == locale && !button.is_active() {
                button.set_active(true);
            }
        }
        self.sidebar.emit(SidebarMsg::SetLocale(locale));
        self.chat_view.emit(ChatViewMsg::SetLocale(locale));
    }

    fn refresh_sidebar(&self) {
        let sessions = self
            .controller
            .sessions()
            .iter()
            .map(SessionEntry::from)
            .collect();
        self.sidebar.emit(SidebarMsg::SetSessions {
            sessions,
            active_id: self.controller.active_id().to_string(),
        });
    }

    fn reload_messages(&self) {
        let messages = self
            .controller
            .active_session()
            .map(|s| s.messages.clone())
            .unwrap_or_default();
        self.chat_view.emit(ChatViewMsg::LoadMessages(messages));
        self.chat_view
            .emit(ChatViewMsg::SetInputText(self.controller.input().to_string()));
    }

    fn show_toast(&self, message: &str) {
        let toast = adw::Toast::new(message);
        toast.set_timeout(5);
        self.toast_overlay.add_toast(toast);
    }
}
