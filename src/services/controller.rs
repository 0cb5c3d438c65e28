use crate::models::{ChatSession, Locale, Message};
use crate::services::sessions::SessionStore;
use crate::services::speech::{SpeechCapture, SpeechEvent, SpeechStream, SpeechUpdate};

/// Everything the shell needs to dispatch one request to the assistant.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub session_id: String,
    pub user_message: Message,
    /// Messages of the session before `user_message` was appended.
    pub history: Vec<Message>,
    pub locale: Locale,
}

/// Application state: sessions, locale, composer text and the busy flags.
pub struct ChatController {
    store: SessionStore,
    locale: Locale,
    input: String,
    in_flight: bool,
    speech: SpeechCapture,
}

impl ChatController {
    pub fn new(speech: SpeechCapture) -> Self {
        let mut store = SessionStore::new();
        store.create_session();

        Self {
            store,
            locale: speech.locale(),
            input: String::new(),
            in_flight: false,
            speech,
        }
    }

    /// Record the user's message and enter the in-flight state. Returns
    /// `None` when the text is blank or a request is already running.
    pub fn begin_send(&mut self, text: &str) -> Option<OutgoingMessage> {
        if text.trim().is_empty() || self.in_flight {
            return None;
        }

        if self.speech.is_listening() {
            self.speech.stop();
        }

        if self.store.active_session().is_none() {
            self.store.create_session();
        }
        let session_id = self.store.active_id().to_string();
        let history = self
            .store
            .active_session()
            .map(|s| s.messages.clone())
            .unwrap_or_default();

        let user_message = Message::user(text);
        if let Err(e) = self.store.append_message(&session_id, user_message.clone()) {
            tracing::warn!("Dropping user message: {}", e);
            return None;
        }

        self.input.clear();
        self.in_flight = true;

        Some(OutgoingMessage {
            session_id,
            user_message,
            history,
            locale: self.locale,
        })
    }

    /// Store the assistant's reply in the session the request came from and
    /// leave the in-flight state.
    pub fn complete_send(&mut self, session_id: &str, text: String) -> Option<Message> {
        self.in_flight = false;

        let reply = Message::assistant(text);
        match self.store.append_message(session_id, reply.clone()) {
            Ok(()) => Some(reply),
            Err(e) => {
                tracing::warn!("Dropping assistant reply: {}", e);
                None
            }
        }
    }

    pub fn new_chat(&mut self) -> &ChatSession {
        self.store.create_session()
    }

    pub fn select_session(&mut self, id: &str) {
        self.store.select_session(id);
    }

    /// Empty the active session. No-op without one.
    pub fn clear_active(&mut self) {
        let id = self.store.active_id().to_string();
        if self.store.active_session().is_some() {
            if let Err(e) = self.store.clear_session(&id) {
                tracing::warn!("Failed to clear session: {}", e);
            }
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        self.speech.set_locale(locale);
    }

    /// Start listening when idle, stop when listening. A new stream is
    /// returned only when capture actually started.
    pub fn toggle_listening(&mut self) -> Option<SpeechStream> {
        if self.speech.is_listening() {
            self.speech.stop();
            None
        } else {
            self.speech.start()
        }
    }

    pub fn handle_speech_event(&mut self, generation: u64, event: SpeechEvent) -> SpeechUpdate {
        let update = self.speech.handle_event(generation, event);
        if let SpeechUpdate::Transcript(text) = &update {
            self.input = text.clone();
        }
        update
    }

    pub fn sessions(&self) -> &[ChatSession] {
        self.store.sessions()
    }

    pub fn active_id(&self) -> &str {
        self.store.active_id()
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        self.store.active_session()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_listening(&self) -> bool {
        self.speech.is_listening()
    }

    pub fn speech_available(&self) -> bool {
        self.speech.is_available()
    }
}
