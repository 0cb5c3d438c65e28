use chrono::Local;
use gtk::prelude::*;
use relm4::prelude::*;

use crate::models::{Message, Role};
use crate::services::markdown::to_pango_markup;

const ASSISTANT_INITIALS: &str = "OA";

pub struct MessageWidget {
    pub message: Message,
}

#[relm4::factory(pub)]
impl FactoryComponent for MessageWidget {
    type Init = Message;
    type Input = ();
    type Output = ();
    type CommandOutput = ();
    type ParentWidget = gtk::Box;

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Horizontal,
            set_spacing: 12,
            set_margin_top: 8,
            set_margin_bottom: 8,
            set_margin_start: 12,
            set_margin_end: 12,
        }
    }

    fn init_model(message: Self::Init, _index: &DynamicIndex, _sender: FactorySender<Self>) -> Self {
        Self { message }
    }

    fn init_widgets(
        &mut self,
        _index: &DynamicIndex,
        root: Self::Root,
        _returned_widget: &<Self::ParentWidget as relm4::factory::FactoryView>::ReturnedWidget,
        _sender: FactorySender<Self>,
    ) -> Self::Widgets {
        let is_user = self.message.role == Role::User;

        root.set_halign(if is_user {
            gtk::Align::End
        } else {
            gtk::Align::Start
        });

        let avatar = if is_user {
            let avatar = adw::Avatar::new(32, None, false);
            avatar.set_icon_name(Some("avatar-default-symbolic"));
            avatar.add_css_class("avatar-user");
            avatar
        } else {
            let avatar = adw::Avatar::new(32, Some(ASSISTANT_INITIALS), true);
            avatar.add_css_class("avatar-assistant");
            avatar
        };
        avatar.set_valign(gtk::Align::Start);

        let bubble = gtk::Box::builder()
            .orientation(gtk::Orientation::Vertical)
            .spacing(4)
            .build();
        bubble.add_css_class("message-bubble");
        if is_user {
            bubble.add_css_class("message-bubble-user");
        } else {
            bubble.add_css_class("message-bubble-assistant");
            bubble.add_css_class("card");
        }

        let content = gtk::Label::builder()
            .halign(gtk::Align::Start)
            .xalign(0.0)
            .wrap(true)
            .wrap_mode(gtk::pango::WrapMode::WordChar)
            .max_width_chars(72)
            .selectable(true)
            .build();
        content.add_css_class("message-content");
        if is_user {
            content.set_label(&self.message.content);
        } else {
            content.set_markup(&to_pango_markup(&self.message.content));
        }
        bubble.append(&content);

        let time_label = gtk::Label::builder()
            .label(
                self.message
                    .created_at
                    .with_timezone(&Local)
                    .format("%H:%M")
                    .to_string(),
            )
            .halign(if is_user {
                gtk::Align::End
            } else {
                gtk::Align::Start
            })
            .build();
        time_label.add_css_class("caption");
        time_label.add_css_class("dim-label");
        time_label.add_css_class("message-timestamp");
        bubble.append(&time_label);

        if is_user {
            root.append(&bubble);
            root.append(&avatar);
        } else {
            root.append(&avatar);
            root.append(&bubble);
        }

        let widgets = view_output!();
        widgets
    }
}
