use chrono::Utc;
use thiserror::Error;

use crate::models::{ChatSession, Message, Role};

const TITLE_MAX_CHARS: usize = 40;
const TITLE_ELLIPSIS: &str = "...";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
}

/// In-memory chat sessions, newest first, with one optionally active.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    active_id: String,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session at the front of the list and make it active.
    pub fn create_session(&mut self) -> &ChatSession {
        let session = ChatSession::new();
        self.active_id = session.id.clone();
        self.sessions.insert(0, session);
        &self.sessions[0]
    }

    /// Mark `id` as active. The id is not validated; an unknown id simply
    /// leaves the store without an active session.
    pub fn select_session(&mut self, id: &str) {
        self.active_id = id.to_string();
    }

    pub fn append_message(&mut self, session_id: &str, message: Message) -> Result<(), SessionError> {
        let session = self
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        if session.title.is_empty() && message.role == Role::User {
            session.title = derive_title(&message.content);
        }
        session.messages.push(message);
        session.updated_at = Utc::now();
        Ok(())
    }

    pub fn clear_session(&mut self, session_id: &str) -> Result<(), SessionError> {
        let session = self
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        session.messages.clear();
        session.title.clear();
        session.updated_at = Utc::now();
        Ok(())
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        self.get(&self.active_id)
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }
}

/// Session title from the first user message: at most 40 characters, with an
/// ellipsis appended when the text was cut.
pub fn derive_title(text: &str) -> String {
    match text.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TITLE_ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_session_is_first_and_active() {
        let mut store = SessionStore::new();
        let mut ids = Vec::new();
        for _ in 0..4 {
            let id = store.create_session().id.clone();
            assert_eq!(store.active_id(), id);
            assert_eq!(store.sessions()[0].id, id);
            ids.push(id);
        }
        assert_eq!(store.sessions().len(), 4);
        let listed: Vec<_> = store.sessions().iter().map(|s| s.id.clone()).collect();
        ids.reverse();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = SessionStore::new();
        let a = store.create_session().id.clone();
        let b = store.create_session().id.clone();
        assert_ne!(a, b);
    }

    #[test]
    fn test_select_unknown_session_yields_no_active() {
        let mut store = SessionStore::new();
        let id = store.create_session().id.clone();
        store.select_session("missing");
        assert_eq!(store.active_id(), "missing");
        assert!(store.active_session().is_none());

        store.select_session(&id);
        assert_eq!(store.active_session().map(|s| s.id.as_str()), Some(id.as_str()));
    }

    #[test]
    fn test_append_preserves_order_and_content() {
        let mut store = SessionStore::new();
        let id = store.create_session().id.clone();
        let texts = ["one", "two", "", "four  ", "cinco"];

        for (i, text) in texts.iter().enumerate() {
            let msg = if i % 2 == 0 {
                Message::user(*text)
            } else {
                Message::assistant(*text)
            };
            store.append_message(&id, msg).unwrap();
        }

        let session = store.get(&id).unwrap();
        let contents: Vec<_> = session.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, texts);
    }

    #[test]
    fn test_append_refreshes_timestamp() {
        let mut store = SessionStore::new();
        let id = store.create_session().id.clone();
        let before = store.get(&id).unwrap().updated_at;
        store.append_message(&id, Message::user("hi")).unwrap();
        assert!(store.get(&id).unwrap().updated_at >= before);
    }

    #[test]
    fn test_append_to_unknown_session_is_dropped() {
        let mut store = SessionStore::new();
        let id = store.create_session().id.clone();
        let err = store.append_message("ghost", Message::user("lost")).unwrap_err();
        assert_eq!(err, SessionError::NotFound("ghost".to_string()));
        assert!(store.get(&id).unwrap().messages.is_empty());
    }

    #[test]
    fn test_title_from_first_user_message_only() {
        let mut store = SessionStore::new();
        let id = store.create_session().id.clone();

        store.append_message(&id, Message::assistant("greeting")).unwrap();
        assert_eq!(store.get(&id).unwrap().title, "");

        store.append_message(&id, Message::user("Prazos de entrega")).unwrap();
        store.append_message(&id, Message::user("Outra pergunta")).unwrap();
        assert_eq!(store.get(&id).unwrap().title, "Prazos de entrega");
    }

    #[test]
    fn test_derive_title_boundaries() {
        let exact = "a".repeat(40);
        assert_eq!(derive_title(&exact), exact);

        let long = "b".repeat(41);
        assert_eq!(derive_title(&long), format!("{}...", "b".repeat(40)));

        assert_eq!(derive_title("short"), "short");
    }

    #[test]
    fn test_derive_title_counts_characters() {
        let accented = "é".repeat(45);
        let title = derive_title(&accented);
        assert_eq!(title, format!("{}...", "é".repeat(40)));
    }

    #[test]
    fn test_clear_only_touches_target_session() {
        let mut store = SessionStore::new();
        let first = store.create_session().id.clone();
        store.append_message(&first, Message::user("keep me")).unwrap();

        let second = store.create_session().id.clone();
        store.append_message(&second, Message::user("drop me")).unwrap();
        store.append_message(&second, Message::assistant("reply")).unwrap();

        store.clear_session(&second).unwrap();

        let cleared = store.get(&second).unwrap();
        assert!(cleared.messages.is_empty());
        assert_eq!(cleared.title, "");
        assert_eq!(store.sessions().len(), 2);

        let kept = store.get(&first).unwrap();
        assert_eq!(kept.messages.len(), 1);
        assert_eq!(kept.title, "keep me");
    }

    #[test]
    fn test_title_rederived_after_clear() {
        let mut store = SessionStore::new();
        let id = store.create_session().id.clone();
        store.append_message(&id, Message::user("first")).unwrap();
        store.clear_session(&id).unwrap();
        store.append_message(&id, Message::user("second")).unwrap();
        assert_eq!(store.get(&id).unwrap().title, "second");
    }
}
