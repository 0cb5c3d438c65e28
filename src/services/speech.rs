use std::fmt;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config;
use crate::models::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Listening,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub continuous: bool,
    pub interim_results: bool,
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn new(transcript: impl Into<String>, is_final: bool) -> Self {
        Self {
            transcript: transcript.into(),
            is_final,
        }
    }
}

/// Symbolic error codes reported by recognition engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechErrorCode {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    LanguageNotSupported,
    Other(String),
}

impl SpeechErrorCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" | "service-not-allowed" => Self::NotAllowed,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::Network => "network",
            Self::NotAllowed => "not-allowed",
            Self::LanguageNotSupported => "language-not-supported",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for SpeechErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Results of the session so far; entries from `result_index` on changed.
    Results {
        result_index: usize,
        results: Vec<RecognitionResult>,
    },
    End,
    Error(SpeechErrorCode),
}

impl SpeechEvent {
    fn ends_stream(&self) -> bool {
        matches!(self, SpeechEvent::End | SpeechEvent::Error(_))
    }
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Failed to start speech engine: {0}")]
    Spawn(String),

    #[error("Speech engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpeechError {
    fn code(&self) -> SpeechErrorCode {
        match self {
            SpeechError::Spawn(_) => SpeechErrorCode::NotAllowed,
            SpeechError::Io(_) => SpeechErrorCode::AudioCapture,
        }
    }
}

/// What a speech event means for the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechUpdate {
    /// Replace the pending input with this text.
    Transcript(String),
    /// Listening stopped on the engine's side.
    Ended,
    Ignored,
}

/// A platform speech-to-text capability.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Recognize until the engine finishes on its own or `cancel` fires,
    /// sending events on `tx`.
    async fn listen(
        &self,
        options: RecognitionOptions,
        tx: mpsc::Sender<SpeechEvent>,
        cancel: CancellationToken,
    ) -> Result<(), SpeechError>;
}

/// Idle/listening state machine over an optional engine.
pub struct SpeechCapture {
    engine: Option<Arc<dyn SpeechEngine>>,
    state: SpeechState,
    locale: Locale,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl SpeechCapture {
    pub fn new(engine: Option<Arc<dyn SpeechEngine>>, locale: Locale) -> Self {
        Self {
            engine,
            state: SpeechState::Idle,
            locale,
            generation: 0,
            cancel: None,
        }
    }

    pub fn unavailable() -> Self {
        Self::new(None, Locale::default())
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == SpeechState::Listening
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn options(&self) -> RecognitionOptions {
        RecognitionOptions {
            continuous: true,
            interim_results: true,
            lang: self.locale.recognition_code().to_string(),
        }
    }

    /// Begin listening. Returns the event stream to drive, or `None` when no
    /// engine exists or a capture is already running.
    pub fn start(&mut self) -> Option<SpeechStream> {
        let engine = self.engine.clone()?;
        if self.is_listening() {
            return None;
        }

        let cancel = CancellationToken::new();
        self.generation += 1;
        self.cancel = Some(cancel.clone());
        self.state = SpeechState::Listening;
        tracing::debug!(
            "Speech capture #{} started ({})",
            self.generation,
            self.locale.recognition_code()
        );

        Some(SpeechStream {
            generation: self.generation,
            engine,
            options: self.options(),
            cancel,
        })
    }

    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        self.state = SpeechState::Idle;
    }

    pub fn handle_event(&mut self, generation: u64, event: SpeechEvent) -> SpeechUpdate {
        if generation != self.generation || !self.is_listening() {
            return SpeechUpdate::Ignored;
        }

        match event {
            SpeechEvent::Results {
                result_index,
                results,
            } => match latest_transcript(result_index, &results) {
                Some(text) => SpeechUpdate::Transcript(text),
                None => SpeechUpdate::Ignored,
            },
            SpeechEvent::End => {
                self.stop();
                SpeechUpdate::Ended
            }
            SpeechEvent::Error(code) => {
                if code != SpeechErrorCode::NoSpeech {
                    tracing::error!("Speech recognition error: {}", code);
                }
                self.stop();
                SpeechUpdate::Ended
            }
        }
    }
}

/// Final transcripts from `result_index` on, or the interim ones when no
/// final text exists yet.
fn latest_transcript(result_index: usize, results: &[RecognitionResult]) -> Option<String> {
    let mut final_text = String::new();
    let mut interim_text = String::new();

    for result in results.iter().skip(result_index) {
        if result.is_final {
            final_text.push_str(&result.transcript);
        } else {
            interim_text.push_str(&result.transcript);
        }
    }

    if !final_text.is_empty() {
        Some(final_text)
    } else if !interim_text.is_empty() {
        Some(interim_text)
    } else {
        None
    }
}

/// One listening run, handed out by [`SpeechCapture::start`].
pub struct SpeechStream {
    generation: u64,
    engine: Arc<dyn SpeechEngine>,
    options: RecognitionOptions,
    cancel: CancellationToken,
}

impl SpeechStream {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drive the engine, passing each event to `emit` until the engine ends,
    /// fails, or the capture is stopped.
    pub async fn run<F>(self, mut emit: F)
    where
        F: FnMut(SpeechEvent) + Send,
    {
        let (tx, mut rx) = mpsc::channel::<SpeechEvent>(32);

        let engine = self.engine.clone();
        let options = self.options.clone();
        let cancel = self.cancel.clone();
        let engine_handle = tokio::spawn(async move {
            if let Err(e) = engine.listen(options, tx.clone(), cancel).await {
                tracing::warn!("{}", e);
                let _ = tx.send(SpeechEvent::Error(e.code())).await;
            }
        });

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                event = rx.recv() => match event {
                    Some(event) => {
                        let done = event.ends_stream();
                        emit(event);
                        if done {
                            break;
                        }
                    }
                    None => {
                        emit(SpeechEvent::End);
                        break;
                    }
                }
            }
        }

        self.cancel.cancel();
        let _ = engine_handle.await;
    }
}

#[derive(Debug, Deserialize)]
struct EngineLine {
    transcript: Option<String>,
    #[serde(default, rename = "final")]
    is_final: bool,
    error: Option<String>,
}

/// Accumulates the results of one dictation run the way browser engines
/// report them: an interim result is revised in place until it turns final.
#[derive(Debug, Default)]
struct ResultBuffer {
    results: Vec<RecognitionResult>,
}

impl ResultBuffer {
    fn apply(&mut self, line: &str) -> Option<SpeechEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let parsed: EngineLine = match serde_json::from_str(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping malformed dictation output {:?}: {}", line, e);
                return None;
            }
        };

        if let Some(code) = parsed.error {
            return Some(SpeechEvent::Error(SpeechErrorCode::from_code(&code)));
        }

        let transcript = parsed.transcript?;
        let result = RecognitionResult::new(transcript, parsed.is_final);
        let result_index = match self.results.last_mut() {
            Some(last) if !last.is_final => {
                *last = result;
                self.results.len() - 1
            }
            _ => {
                self.results.push(result);
                self.results.len() - 1
            }
        };

        Some(SpeechEvent::Results {
            result_index,
            results: self.results.clone(),
        })
    }
}

/// Speech engine backed by an external dictation program that prints one
/// JSON object per line on stdout:
/// `{"transcript": "...", "final": false}` or `{"error": "no-speech"}`.
pub struct CommandSpeechEngine {
    command: Vec<String>,
}

impl CommandSpeechEngine {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl SpeechEngine for CommandSpeechEngine {
    async fn listen(
        &self,
        options: RecognitionOptions,
        tx: mpsc::Sender<SpeechEvent>,
        cancel: CancellationToken,
    ) -> Result<(), SpeechError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| SpeechError::Spawn("empty command".to_string()))?;

        let mut child = Command::new(program)
            .args(args)
            .env(config::ENV_SPEECH_LANG, &options.lang)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::Spawn(format!("{}: {}", program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpeechError::Spawn("stdout not captured".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();
        let mut buffer = ResultBuffer::default();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = child.kill().await;
                    return Ok(());
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let Some(event) = buffer.apply(&line) else { continue };

                    let interim = matches!(
                        &event,
                        SpeechEvent::Results { result_index, results }
                            if !results[*result_index].is_final
                    );
                    if interim && !options.interim_results {
                        continue;
                    }
                    let single_done = !options.continuous && !interim;

                    if tx.send(event).await.is_err() || single_done {
                        let _ = child.kill().await;
                        return Ok(());
                    }
                }
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            tracing::warn!("Dictation command exited with {}", status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Sends a fixed list of events, then either returns or waits for cancel.
    struct ScriptedEngine {
        events: Vec<SpeechEvent>,
        hold_open: bool,
        seen_options: std::sync::Mutex<Option<RecognitionOptions>>,
    }

    impl ScriptedEngine {
        fn new(events: Vec<SpeechEvent>, hold_open: bool) -> Arc<Self> {
            Arc::new(Self {
                events,
                hold_open,
                seen_options: std::sync::Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl SpeechEngine for ScriptedEngine {
        async fn listen(
            &self,
            options: RecognitionOptions,
            tx: mpsc::Sender<SpeechEvent>,
            cancel: CancellationToken,
        ) -> Result<(), SpeechError> {
            *self.seen_options.lock().unwrap() = Some(options);
            for event in &self.events {
                if tx.send(event.clone()).await.is_err() {
                    return Ok(());
                }
            }
            if self.hold_open {
                cancel.cancelled().await;
            }
            Ok(())
        }
    }

    fn results(items: &[(&str, bool)]) -> SpeechEvent {
        SpeechEvent::Results {
            result_index: 0,
            results: items
                .iter()
                .map(|(t, f)| RecognitionResult::new(*t, *f))
                .collect(),
        }
    }

    fn capture() -> SpeechCapture {
        SpeechCapture::new(Some(ScriptedEngine::new(Vec::new(), true)), Locale::PtPt)
    }

    #[test]
    fn test_start_and_stop_transitions() {
        let mut speech = capture();
        assert_eq!(speech.state(), SpeechState::Idle);

        let stream = speech.start().unwrap();
        assert_eq!(stream.generation(), 1);
        assert!(speech.is_listening());
        assert!(speech.start().is_none());

        speech.stop();
        assert_eq!(speech.state(), SpeechState::Idle);
        assert!(stream.cancel.is_cancelled());
    }

    #[test]
    fn test_final_transcript_replaces_input() {
        let mut speech = capture();
        let generation = speech.start().unwrap().generation();

        let update = speech.handle_event(generation, results(&[("hello", true)]));
        assert_eq!(update, SpeechUpdate::Transcript("hello".to_string()));

        let update = speech.handle_event(generation, results(&[("hello wor", false)]));
        assert_eq!(update, SpeechUpdate::Transcript("hello wor".to_string()));
    }

    #[test]
    fn test_final_text_preferred_over_interim() {
        let mut speech = capture();
        let generation = speech.start().unwrap().generation();
        let event = SpeechEvent::Results {
            result_index: 1,
            results: vec![
                RecognitionResult::new("old ", true),
                RecognitionResult::new("prazos ", true),
                RecognitionResult::new("de entr", false),
            ],
        };
        assert_eq!(
            speech.handle_event(generation, event),
            SpeechUpdate::Transcript("prazos ".to_string())
        );
    }

    #[test]
    fn test_empty_results_are_ignored() {
        let mut speech = capture();
        let generation = speech.start().unwrap().generation();
        assert_eq!(
            speech.handle_event(generation, results(&[("", false)])),
            SpeechUpdate::Ignored
        );
        assert!(speech.is_listening());
    }

    #[test]
    fn test_events_after_stop_are_ignored() {
        let mut speech = capture();
        let generation = speech.start().unwrap().generation();
        speech.stop();
        assert_eq!(
            speech.handle_event(generation, results(&[("late", true)])),
            SpeechUpdate::Ignored
        );
    }

    #[test]
    fn test_engine_end_forces_idle() {
        let mut speech = capture();
        let generation = speech.start().unwrap().generation();
        assert_eq!(
            speech.handle_event(generation, SpeechEvent::End),
            SpeechUpdate::Ended
        );
        assert_eq!(speech.state(), SpeechState::Idle);
        assert_eq!(
            speech.handle_event(generation, results(&[("after", true)])),
            SpeechUpdate::Ignored
        );
    }

    #[test]
    fn test_errors_end_listening() {
        let mut speech = capture();
        for code in ["no-speech", "audio-capture", "something-new"] {
            let generation = speech.start().unwrap().generation();
            let event = SpeechEvent::Error(SpeechErrorCode::from_code(code));
            assert_eq!(speech.handle_event(generation, event), SpeechUpdate::Ended);
            assert!(!speech.is_listening());
        }
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut speech = capture();
        let old = speech.start().unwrap().generation();
        speech.stop();
        let current = speech.start().unwrap().generation();
        assert_ne!(old, current);

        assert_eq!(
            speech.handle_event(old, SpeechEvent::End),
            SpeechUpdate::Ignored
        );
        assert!(speech.is_listening());
    }

    #[test]
    fn test_absent_engine_is_permanently_idle() {
        let mut speech = SpeechCapture::unavailable();
        assert!(!speech.is_available());
        assert!(speech.start().is_none());
        assert_eq!(speech.state(), SpeechState::Idle);
        speech.stop();
        assert_eq!(speech.state(), SpeechState::Idle);
    }

    #[test]
    fn test_locale_drives_recognition_options() {
        let mut speech = capture();
        assert_eq!(speech.options().lang, "pt-PT");
        speech.set_locale(Locale::En);
        let options = speech.options();
        assert_eq!(options.lang, "en-US");
        assert!(options.continuous);
        assert!(options.interim_results);
    }

    #[tokio::test]
    async fn test_stream_forwards_events_and_ends() {
        let engine = ScriptedEngine::new(
            vec![results(&[("ola", false)]), results(&[("olá", true)])],
            false,
        );
        let mut speech = SpeechCapture::new(Some(engine.clone()), Locale::En);
        let stream = speech.start().unwrap();

        let mut events = Vec::new();
        stream.run(|event| events.push(event)).await;

        assert_eq!(
            events,
            vec![
                results(&[("ola", false)]),
                results(&[("olá", true)]),
                SpeechEvent::End,
            ]
        );
        assert_eq!(
            engine.seen_options.lock().unwrap().as_ref().map(|o| o.lang.clone()),
            Some("en-US".to_string())
        );
    }

    #[tokio::test]
    async fn test_stream_stops_on_cancel() {
        let engine = ScriptedEngine::new(vec![results(&[("hi", false)])], true);
        let mut speech = SpeechCapture::new(Some(engine), Locale::PtPt);
        let stream = speech.start().unwrap();
        let cancel = stream.cancel.clone();

        let handle = tokio::spawn(async move {
            let mut events = Vec::new();
            stream.run(|event| events.push(event)).await;
            events
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        let events = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(!events.contains(&SpeechEvent::End));
    }

    #[test]
    fn test_result_buffer_revises_interim_in_place() {
        let mut buffer = ResultBuffer::default();

        let first = buffer.apply(r#"{"transcript":"hel","final":false}"#).unwrap();
        assert_eq!(first, results(&[("hel", false)]));

        let second = buffer.apply(r#"{"transcript":"hello","final":true}"#).unwrap();
        assert_eq!(second, results(&[("hello", true)]));

        let third = buffer.apply(r#"{"transcript":" there","final":false}"#).unwrap();
        assert_eq!(
            third,
            SpeechEvent::Results {
                result_index: 1,
                results: vec![
                    RecognitionResult::new("hello", true),
                    RecognitionResult::new(" there", false),
                ],
            }
        );
    }

    #[test]
    fn test_result_buffer_errors_and_noise() {
        let mut buffer = ResultBuffer::default();
        assert_eq!(
            buffer.apply(r#"{"error":"no-speech"}"#),
            Some(SpeechEvent::Error(SpeechErrorCode::NoSpeech))
        );
        assert_eq!(buffer.apply(""), None);
        assert_eq!(buffer.apply("not json"), None);
        assert_eq!(buffer.apply(r#"{"final":true}"#), None);
    }

    fn sh(script: &str) -> CommandSpeechEngine {
        CommandSpeechEngine::new(vec!["sh".to_string(), "-c".to_string(), script.to_string()])
    }

    async fn collect(engine: CommandSpeechEngine, options: RecognitionOptions) -> Vec<SpeechEvent> {
        let (tx, mut rx) = mpsc::channel(32);
        engine
            .listen(options, tx, CancellationToken::new())
            .await
            .unwrap();
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn options(lang: &str) -> RecognitionOptions {
        RecognitionOptions {
            continuous: true,
            interim_results: true,
            lang: lang.to_string(),
        }
    }

    #[tokio::test]
    async fn test_command_engine_reads_json_lines() {
        let engine = sh(r#"echo '{"transcript":"pra","final":false}'; echo '{"transcript":"prazos","final":true}'"#);
        let events = collect(engine, options("pt-PT")).await;
        assert_eq!(
            events,
            vec![results(&[("pra", false)]), results(&[("prazos", true)])]
        );
    }

    #[tokio::test]
    async fn test_command_engine_receives_language() {
        let engine = sh(r#"printf '{"transcript":"%s","final":true}\n' "$ORIENTAI_SPEECH_LANG""#);
        let events = collect(engine, options("en-US")).await;
        assert_eq!(events, vec![results(&[("en-US", true)])]);
    }

    #[tokio::test]
    async fn test_command_engine_skips_interim_when_disabled() {
        let engine = sh(r#"echo '{"transcript":"a","final":false}'; echo '{"transcript":"ab","final":true}'"#);
        let mut opts = options("pt-PT");
        opts.interim_results = false;
        let events = collect(engine, opts).await;
        assert_eq!(events, vec![results(&[("ab", true)])]);
    }

    #[tokio::test]
    async fn test_command_engine_killed_on_cancel() {
        let engine = sh("sleep 30");
        let (tx, _rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            engine.listen(options("pt-PT"), tx, cancel),
        )
        .await
        .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_command_engine_missing_program() {
        let engine = CommandSpeechEngine::new(vec!["/nonexistent/dictate".to_string()]);
        let (tx, _rx) = mpsc::channel(4);
        let err = engine
            .listen(options("pt-PT"), tx, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Spawn(_)));
    }
}
