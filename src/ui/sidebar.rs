use adw::prelude::*;
use relm4::factory::FactoryVecDeque;
use relm4::prelude::*;

use crate::config;
use crate::models::{ChatSession, Locale};
use crate::services::translations::translations;

/// What the sidebar needs to know about one session.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub id: String,
    pub title: String,
}

impl From<&ChatSession> for SessionEntry {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
        }
    }
}

// --- SessionRow factory component ---

pub struct SessionRowInit {
    pub entry: SessionEntry,
    pub active: bool,
    pub untitled: &'static str,
}

#[derive(Debug)]
pub struct SessionRow {
    entry: SessionEntry,
    label: String,
    active: bool,
}

#[relm4::factory(pub)]
impl FactoryComponent for SessionRow {
    type Init = SessionRowInit;
    type Input = ();
    type Output = ();
    type CommandOutput = ();
    type ParentWidget = gtk::ListBox;

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Horizontal,
            set_spacing: 8,
            set_margin_all: 6,
            set_css_classes: if self.active { &["session-row", "session-active"][..] } else { &["session-row"][..] },

            gtk::Image {
                set_icon_name: Some("chat-message-new-symbolic"),
                add_css_class: "dim-label",
            },

            gtk::Label {
                set_label: &self.label,
                set_halign: gtk::Align::Start,
                set_hexpand: true,
                set_ellipsize: gtk::pango::EllipsizeMode::End,
                set_max_width_chars: 28,
                set_tooltip_text: Some(&self.label),
            },
        }
    }

    fn init_model(init: Self::Init, _index: &DynamicIndex, _sender: FactorySender<Self>) -> Self {
        let label = if init.entry.title.is_empty() {
            init.untitled.to_string()
        } else {
            init.entry.title.clone()
        };
        Self {
            entry: init.entry,
            label,
            active: init.active,
        }
    }
}

// --- Sidebar component ---

pub struct Sidebar {
    rows: FactoryVecDeque<SessionRow>,
    sessions: Vec<SessionEntry>,
    active_id: String,
    locale: Locale,
}

#[derive(Debug)]
pub enum SidebarMsg {
    SetSessions {
        sessions: Vec<SessionEntry>,
        active_id: String,
    },
    SetLocale(Locale),
    NewChat,
    ClearChat,
    RowActivated(usize),
}

#[derive(Debug)]
pub enum SidebarOutput {
    NewChat,
    ClearChat,
    SessionSelected(String),
}

#[relm4::component(pub)]
impl Component for Sidebar {
    type Init = Locale;
    type Input = SidebarMsg;
    type Output = SidebarOutput;
    type CommandOutput = ();

    view! {
        adw::ToolbarView {
            add_top_bar = &adw::HeaderBar {
                set_show_end_title_buttons: false,

                #[wrap(Some)]
                set_title_widget = &adw::WindowTitle {
                    set_title: config::APP_NAME,
                },
            },

            #[wrap(Some)]
            set_content = &gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 4,
                set_margin_start: 8,
                set_margin_end: 8,

                gtk::Button {
                    add_css_class: "pill",
                    add_css_class: "new-chat-button",
                    set_margin_top: 8,
                    connect_clicked => SidebarMsg::NewChat,

                    #[wrap(Some)]
                    set_child = &adw::ButtonContent {
                        set_icon_name: "list-add-symbolic",
                        #[watch]
                        set_label: translations(model.locale).new_chat,
                    },
                },

                gtk::Button {
                    add_css_class: "flat",
                    add_css_class: "clear-chat-button",
                    set_margin_bottom: 8,
                    connect_clicked => SidebarMsg::ClearChat,

                    #[wrap(Some)]
                    set_child = &adw::ButtonContent {
                        set_icon_name: "user-trash-symbolic",
                        #[watch]
                        set_label: translations(model.locale).clear_chat,
                    },
                },

                gtk::Label {
                    set_halign: gtk::Align::Start,
                    set_margin_start: 6,
                    add_css_class: "dim-label",
                    add_css_class: "caption-heading",
                    #[watch]
                    set_label: &translations(model.locale).recent_chats.to_uppercase(),
                },

                gtk::ScrolledWindow {
                    set_hscrollbar_policy: gtk::PolicyType::Never,
                    set_vexpand: true,

                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,

                        #[local_ref]
                        session_list -> gtk::ListBox {
                            set_selection_mode: gtk::SelectionMode::Single,
                            add_css_class: "navigation-sidebar",
                        },

                        gtk::Label {
                            set_halign: gtk::Align::Start,
                            set_margin_start: 12,
                            add_css_class: "dim-label",
                            add_css_class: "caption",
                            add_css_class: "italic",
                            #[watch]
                            set_visible: model.sessions.is_empty(),
                            #[watch]
                            set_label: translations(model.locale).no_recent,
                        },
                    },
                },

                gtk::Separator {},

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 8,
                    set_margin_top: 8,
                    set_margin_bottom: 8,

                    adw::Avatar::new(32, Some("IPAM Porto"), true) {
                        add_css_class: "student-avatar",
                    },

                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_hexpand: true,

                        gtk::Label {
                            set_halign: gtk::Align::Start,
                            set_ellipsize: gtk::pango::EllipsizeMode::End,
                            add_css_class: "heading",
                            #[watch]
                            set_label: translations(model.locale).role,
                        },

                        gtk::Label {
                            set_halign: gtk::Align::Start,
                            set_ellipsize: gtk::pango::EllipsizeMode::End,
                            add_css_class: "dim-label",
                            add_css_class: "caption",
                            #[watch]
                            set_label: translations(model.locale).course,
                        },
                    },
                },
            },
        }
    }

    fn init(
        locale: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let rows = FactoryVecDeque::builder()
            .launch(gtk::ListBox::default())
            .detach();

        let model = Self {
            rows,
            sessions: Vec::new(),
            active_id: String::new(),
            locale,
        };

        let session_list = model.rows.widget();
        let widgets = view_output!();

        let sender_row = sender.clone();
        model.rows.widget().connect_row_activated(move |_, row| {
            sender_row.input(SidebarMsg::RowActivated(row.index() as usize));
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>, _root: &Self::Root) {
        match msg {
            SidebarMsg::SetSessions {
                sessions,
                active_id,
            } => {
                self.sessions = sessions;
                self.active_id = active_id;
                self.rebuild_rows();
            }
            SidebarMsg::SetLocale(locale) => {
                self.locale = locale;
                self.rebuild_rows();
            }
            SidebarMsg::NewChat => {
                let _ = sender.output(SidebarOutput::NewChat);
            }
            SidebarMsg::ClearChat => {
                let _ = sender.output(SidebarOutput::ClearChat);
            }
            SidebarMsg::RowActivated(index) => {
                if let Some(row) = self.rows.get(index) {
                    let _ = sender.output(SidebarOutput::SessionSelected(row.entry.id.clone()));
                }
            }
        }
    }
}

impl Sidebar {
    fn rebuild_rows(&mut self) {
        let untitled = translations(self.locale).untitled;
        let mut active_index = None;

        let mut guard = self.rows.guard();
        guard.clear();
        for (i, entry) in self.sessions.iter().enumerate() {
            let active = entry.id == self.active_id;
            if active {
                active_index = Some(i);
            }
            guard.push_back(SessionRowInit {
                entry: entry.clone(),
                active,
                untitled,
            });
        }
        drop(guard);

        let list = self.rows.widget();
        match active_index.and_then(|i| list.row_at_index(i as i32)) {
            Some(row) => list.select_row(Some(&row)),
            None => list.unselect_all(),
        }
    }
}
