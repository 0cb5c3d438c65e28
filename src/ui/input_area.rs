use gtk::prelude::*;
use relm4::prelude::*;

use crate::models::Locale;
use crate::services::translations::translations;

pub struct InputAreaInit {
    pub locale: Locale,
    pub speech_available: bool,
}

pub struct InputArea {
    buffer: gtk::TextBuffer,
    sending: bool,
    listening: bool,
    speech_available: bool,
    locale: Locale,
    char_count: i32,
}

#[derive(Debug)]
pub enum InputAreaMsg {
    SendClicked,
    MicClicked,
    SetSending(bool),
    SetListening(bool),
    SetLocale(Locale),
    /// Replace the whole text, e.g. with a dictated transcript.
    SetText(String),
    // Internal
    TextChanged,
}

#[derive(Debug)]
pub enum InputAreaOutput {
    SendMessage(String),
    TextChanged(String),
    ToggleListening,
}

#[relm4::component(pub)]
impl Component for InputArea {
    type Init = InputAreaInit;
    type Input = InputAreaMsg;
    type Output = InputAreaOutput;
    type CommandOutput = ();

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_spacing: 0,

            gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,
                set_spacing: 4,
                set_margin_top: 8,
                set_margin_bottom: 4,
                set_margin_start: 12,
                set_margin_end: 12,
                add_css_class: "input-card",

                gtk::Overlay {
                    set_hexpand: true,

                    gtk::ScrolledWindow {
                        set_hexpand: true,
                        set_max_content_height: 128,
                        set_propagate_natural_height: true,
                        set_min_content_height: 40,

                        #[name = "text_view"]
                        gtk::TextView {
                            set_wrap_mode: gtk::WrapMode::WordChar,
                            set_accepts_tab: false,
                            set_top_margin: 8,
                            set_bottom_margin: 8,
                            set_left_margin: 12,
                            set_right_margin: 8,
                            add_css_class: "input-text-view",

                            set_buffer: Some(&model.buffer),
                        },
                    },

                    add_overlay = &gtk::Label {
                        set_halign: gtk::Align::Start,
                        set_valign: gtk::Align::Start,
                        set_margin_start: 14,
                        set_margin_top: 8,
                        set_can_target: false,
                        set_ellipsize: gtk::pango::EllipsizeMode::End,
                        add_css_class: "input-placeholder",
                        #[watch]
                        set_label: if model.listening {
                            translations(model.locale).listening
                        } else {
                            translations(model.locale).placeholder
                        },
                        #[watch]
                        set_visible: model.char_count == 0,
                    },
                },

                gtk::Button {
                    set_icon_name: "audio-input-microphone-symbolic",
                    set_valign: gtk::Align::End,
                    #[watch]
                    set_visible: model.speech_available,
                    #[watch]
                    set_tooltip_text: Some(translations(model.locale).speak_tooltip),
                    #[watch]
                    set_css_classes: if model.listening {
                        &["circular", "mic-button", "listening", "destructive-action"][..]
                    } else {
                        &["circular", "mic-button", "flat"][..]
                    },
                    connect_clicked => InputAreaMsg::MicClicked,
                },

                gtk::Button {
                    set_icon_name: "go-up-symbolic",
                    set_valign: gtk::Align::End,
                    add_css_class: "suggested-action",
                    add_css_class: "circular",
                    #[watch]
                    set_tooltip_text: Some(translations(model.locale).send_tooltip),
                    #[watch]
                    set_sensitive: !model.sending && !model.text().trim().is_empty(),
                    connect_clicked => InputAreaMsg::SendClicked,
                },
            },

            gtk::Label {
                set_halign: gtk::Align::Center,
                set_justify: gtk::Justification::Center,
                set_wrap: true,
                set_margin_start: 24,
                set_margin_end: 24,
                set_margin_bottom: 8,
                add_css_class: "dim-label",
                add_css_class: "caption",
                #[watch]
                set_label: translations(model.locale).disclaimer,
            },
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let buffer = gtk::TextBuffer::new(None::<&gtk::TextTagTable>);

        let model = Self {
            buffer: buffer.clone(),
            sending: false,
            listening: false,
            speech_available: init.speech_available,
            locale: init.locale,
            char_count: 0,
        };

        let widgets = view_output!();

        // Enter sends, Shift+Enter inserts a newline
        let sender_key = sender.clone();
        let key_controller = gtk::EventControllerKey::new();
        key_controller.connect_key_pressed(move |_, key, _code, modifier| {
            let is_enter = key == gtk::gdk::Key::Return || key == gtk::gdk::Key::KP_Enter;
            if is_enter && !modifier.contains(gtk::gdk::ModifierType::SHIFT_MASK) {
                sender_key.input(InputAreaMsg::SendClicked);
                gtk::glib::Propagation::Stop
            } else {
                gtk::glib::Propagation::Proceed
            }
        });
        widgets.text_view.add_controller(key_controller);

        let sender_buf = sender.clone();
        buffer.connect_changed(move |_| {
            sender_buf.input(InputAreaMsg::TextChanged);
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>, _root: &Self::Root) {
        match msg {
            InputAreaMsg::SendClicked => {
                let trimmed = self.text().trim().to_string();
                if !trimmed.is_empty() && !self.sending {
                    let _ = sender.output(InputAreaOutput::SendMessage(trimmed));
                    self.buffer.set_text("");
                }
            }
            InputAreaMsg::MicClicked => {
                let _ = sender.output(InputAreaOutput::ToggleListening);
            }
            InputAreaMsg::SetSending(sending) => {
                self.sending = sending;
            }
            InputAreaMsg::SetListening(listening) => {
                self.listening = listening;
            }
            InputAreaMsg::SetLocale(locale) => {
                self.locale = locale;
            }
            InputAreaMsg::SetText(text) => {
                if self.text() != text {
                    self.buffer.set_text(&text);
                }
            }
            InputAreaMsg::TextChanged => {
                self.char_count = self.buffer.char_count();
                let _ = sender.output(InputAreaOutput::TextChanged(self.text()));
            }
        }
    }
}

impl InputArea {
    fn text(&self) -> String {
        let start = self.buffer.start_iter();
        let end = self.buffer.end_iter();
        self.buffer.text(&start, &end, false).to_string()
    }
}
