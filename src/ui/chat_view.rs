use gtk::prelude::*;
use relm4::factory::FactoryVecDeque;
use relm4::prelude::*;

use crate::models::{Locale, Message};
use crate::services::translations::translations;
use crate::ui::input_area::{InputArea, InputAreaInit, InputAreaMsg, InputAreaOutput};
use crate::ui::message_widget::MessageWidget;

pub struct ChatViewInit {
    pub locale: Locale,
    pub speech_available: bool,
}

pub struct ChatView {
    messages: FactoryVecDeque<MessageWidget>,
    input_area: Controller<InputArea>,
    loading: bool,
    locale: Locale,
    scrolled_window: gtk::ScrolledWindow,
    suggestion_buttons: Vec<gtk::Button>,
}

#[derive(Debug)]
pub enum ChatViewMsg {
    LoadMessages(Vec<Message>),
    AddMessage(Message),
    SetLoading(bool),
    SetLocale(Locale),
    SetInputText(String),
    SetListening(bool),
    ScrollToBottom,
    SuggestionClicked(usize),
    // Forwarded from InputArea
    UserSendMessage(String),
    InputChanged(String),
    ToggleListening,
}

#[derive(Debug)]
pub enum ChatViewOutput {
    SendMessage(String),
    InputChanged(String),
    ToggleListening,
}

#[relm4::component(pub)]
impl Component for ChatView {
    type Init = ChatViewInit;
    type Input = ChatViewMsg;
    type Output = ChatViewOutput;
    type CommandOutput = ();

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_vexpand: true,

            #[local_ref]
            scrolled_window -> gtk::ScrolledWindow {
                set_vexpand: true,
                set_hscrollbar_policy: gtk::PolicyType::Never,

                gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,

                    // Welcome page for an empty session
                    #[local_ref]
                    welcome_box -> gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 12,
                        set_valign: gtk::Align::Center,
                        set_vexpand: true,
                        set_margin_top: 48,
                        set_margin_start: 24,
                        set_margin_end: 24,
                        add_css_class: "welcome",
                        #[watch]
                        set_visible: model.messages.is_empty() && !model.loading,

                        gtk::Label {
                            add_css_class: "title-1",
                            add_css_class: "welcome-title",
                            set_wrap: true,
                            set_justify: gtk::Justification::Center,
                            #[watch]
                            set_label: translations(model.locale).welcome,
                        },

                        gtk::Label {
                            add_css_class: "dim-label",
                            set_wrap: true,
                            set_max_width_chars: 60,
                            set_justify: gtk::Justification::Center,
                            #[watch]
                            set_label: translations(model.locale).description,
                        },
                    },

                    #[local_ref]
                    message_list -> gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 0,
                        set_margin_top: 8,
                        set_margin_bottom: 8,
                        set_margin_start: 16,
                        set_margin_end: 16,
                    },

                    // Loading indicator
                    gtk::Box {
                        set_orientation: gtk::Orientation::Horizontal,
                        set_halign: gtk::Align::Start,
                        set_spacing: 12,
                        set_margin_start: 28,
                        set_margin_bottom: 12,
                        add_css_class: "loading-row",
                        #[watch]
                        set_visible: model.loading,

                        adw::Avatar::new(32, Some("OA"), true) {
                            add_css_class: "avatar-assistant",
                        },

                        gtk::Spinner {
                            #[watch]
                            set_spinning: model.loading,
                        },

                        gtk::Label {
                            add_css_class: "dim-label",
                            #[watch]
                            set_label: translations(model.locale).thinking,
                        },
                    },
                },
            },

            gtk::Separator {
                set_orientation: gtk::Orientation::Horizontal,
            },

            model.input_area.widget().clone(),
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let messages = FactoryVecDeque::builder()
            .launch(gtk::Box::default())
            .detach();

        let input_area = InputArea::builder()
            .launch(InputAreaInit {
                locale: init.locale,
                speech_available: init.speech_available,
            })
            .forward(sender.input_sender(), |output| match output {
                InputAreaOutput::SendMessage(text) => ChatViewMsg::UserSendMessage(text),
                InputAreaOutput::TextChanged(text) => ChatViewMsg::InputChanged(text),
                InputAreaOutput::ToggleListening => ChatViewMsg::ToggleListening,
            });

        let scrolled_window = gtk::ScrolledWindow::new();
        let welcome = gtk::Box::new(gtk::Orientation::Vertical, 12);

        let suggestions_box = gtk::FlowBox::builder()
            .selection_mode(gtk::SelectionMode::None)
            .homogeneous(true)
            .min_children_per_line(1)
            .max_children_per_line(2)
            .column_spacing(8)
            .row_spacing(8)
            .margin_top(24)
            .halign(gtk::Align::Center)
            .build();

        let strings = translations(init.locale);
        let mut suggestion_buttons = Vec::with_capacity(strings.suggestions.len());
        for (index, text) in strings.suggestions.iter().enumerate() {
            let button = gtk::Button::builder().label(*text).build();
            button.add_css_class("suggestion-button");
            if let Some(label) = button.child().and_downcast::<gtk::Label>() {
                label.set_wrap(true);
                label.set_xalign(0.0);
            }
            let sender_suggestion = sender.input_sender().clone();
            button.connect_clicked(move |_| {
                sender_suggestion.emit(ChatViewMsg::SuggestionClicked(index));
            });
            suggestions_box.append(&button);
            suggestion_buttons.push(button);
        }

        let model = Self {
            messages,
            input_area,
            loading: false,
            locale: init.locale,
            scrolled_window: scrolled_window.clone(),
            suggestion_buttons,
        };

        let welcome_box = welcome.clone();
        let message_list = model.messages.widget();
        let widgets = view_output!();

        // Below the greeting labels
        welcome.append(&suggestions_box);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>, _root: &Self::Root) {
        match msg {
            ChatViewMsg::LoadMessages(messages) => {
                let mut guard = self.messages.guard();
                guard.clear();
                for message in messages {
                    guard.push_back(message);
                }
                drop(guard);
                sender.input(ChatViewMsg::ScrollToBottom);
            }
            ChatViewMsg::AddMessage(message) => {
                self.messages.guard().push_back(message);
                sender.input(ChatViewMsg::ScrollToBottom);
            }
            ChatViewMsg::SetLoading(loading) => {
                self.loading = loading;
                self.input_area.emit(InputAreaMsg::SetSending(loading));
                if loading {
                    sender.input(ChatViewMsg::ScrollToBottom);
                }
            }
            ChatViewMsg::SetLocale(locale) => {
                self.locale = locale;
                let strings = translations(locale);
                for (button, text) in self.suggestion_buttons.iter().zip(strings.suggestions) {
                    button.set_label(text);
                }
                self.input_area.emit(InputAreaMsg::SetLocale(locale));
            }
            ChatViewMsg::SetInputText(text) => {
                self.input_area.emit(InputAreaMsg::SetText(text));
            }
            ChatViewMsg::SetListening(listening) => {
                self.input_area.emit(InputAreaMsg::SetListening(listening));
            }
            ChatViewMsg::ScrollToBottom => {
                let adj = self.scrolled_window.vadjustment();
                glib::idle_add_local_once(move || {
                    adj.set_value(adj.upper());
                });
            }
            ChatViewMsg::SuggestionClicked(index) => {
                if let Some(text) = translations(self.locale).suggestions.get(index) {
                    let _ = sender.output(ChatViewOutput::SendMessage(text.to_string()));
                }
            }
            ChatViewMsg::UserSendMessage(text) => {
                let _ = sender.output(ChatViewOutput::SendMessage(text));
            }
            ChatViewMsg::InputChanged(text) => {
                let _ = sender.output(ChatViewOutput::InputChanged(text));
            }
            ChatViewMsg::ToggleListening => {
                let _ = sender.output(ChatViewOutput::ToggleListening);
            }
        }
    }
}
