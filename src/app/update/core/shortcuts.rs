use super::super::super::messages::Message;
use super::super::super::state::{App, SessionKind};
use iced::keyboard::key::Named;
use iced::keyboard::{Key, Modifiers};

impl App {
    /// Keyboard shortcuts: space toggles play/pause on whichever surface is
    /// in front, escape closes the definition modal.
    pub(in crate::app::update) fn shortcut_message_for_key(
        &self,
        key: Key,
        modifiers: Modifiers,
    ) -> Option<Message> {
        if modifiers.control() || modifiers.alt() || modifiers.logo() {
            return None;
        }
        match key.as_ref() {
            Key::Named(Named::Space) => {
                let kind = if self.definition.open {
                    SessionKind::Modal
                } else {
                    SessionKind::Main
                };
                if !self.document.loaded && kind == SessionKind::Main {
                    return None;
                }
                if self.session(kind).is_speaking() {
                    Some(Message::Pause(kind))
                } else {
                    Some(Message::Play(kind))
                }
            }
            Key::Named(Named::Escape) if self.definition.open => Some(Message::ModalClosed),
            _ => None,
        }
    }
}
