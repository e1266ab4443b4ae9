//! Context-menu handling and the read-selection flow.
//!
//! A click on "Read selection" normalizes the selected text, checks that an
//! API key and a voice are configured, synthesizes the text and plays it.
//! Every failure is caught once in [`Background::on_read_selection`] and
//! reported through the [`UserNotifier`]; none of them stop the handler
//! from serving the next click.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::ReadError;
use crate::options::{self, OptionsStore};
use crate::playback::{AudioSink, EncodedAudio};
use crate::tts::TtsClient;

/// Id of the read-selection menu entry.
pub const READ_SELECTION_ID: &str = "read-selection";

/// Message shown when the API rejects the request as a whole.
pub const KEY_REJECTED_MESSAGE: &str = "Request failed, it seems the API key isn't accepted.";

/// A context-menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub id: &'static str,
    pub title: &'static str,
    /// Contexts the entry is shown in.
    pub contexts: &'static [&'static str],
}

/// Every registered context-menu entry.
pub const MENU_ITEMS: &[MenuItem] = &[MenuItem {
    id: READ_SELECTION_ID,
    title: "Read selection",
    contexts: &["selection"],
}];

/// Details of a context-menu click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickInfo {
    pub menu_item_id: String,
    pub selection_text: Option<String>,
}

impl ClickInfo {
    /// A click on "Read selection" with `text` selected.
    pub fn read_selection(text: impl Into<String>) -> Self {
        Self {
            menu_item_id: READ_SELECTION_ID.to_string(),
            selection_text: Some(text.into()),
        }
    }
}

/// Shows non-blocking messages to the user.
pub trait UserNotifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Where the handler is in the read-selection flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Idle,
    Reading,
}

/// How a handled click ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The audio was played.
    Played,
    /// Something failed; carries the message shown to the user.
    Failed(String),
}

/// Prepares selected text for synthesis.
///
/// Runs of line breaks become a single space, surrounding whitespace is
/// trimmed, and one trailing `.` or `。` is dropped.
///
/// ## Examples
///
/// ```
/// use read_aloud::background::normalize_selection;
///
/// assert_eq!(normalize_selection("Hello world.\n"), "Hello world");
/// assert_eq!(normalize_selection("line one\r\nline two"), "line one line two");
/// ```
pub fn normalize_selection(text: &str) -> String {
    let mut joined = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                joined.push(' ');
            }
            in_break = true;
        } else {
            joined.push(c);
            in_break = false;
        }
    }

    let trimmed = joined.trim();
    trimmed
        .strip_suffix(['.', '。'])
        .unwrap_or(trimmed)
        .to_string()
}

/// The message shown to the user for a failed read.
///
/// 400 and 403 responses get a fixed "key not accepted" message; anything
/// else shows its own text.
pub fn user_message(err: &ReadError) -> String {
    let detail = match err.status_code() {
        Some(400 | 403) => KEY_REJECTED_MESSAGE.to_string(),
        _ => err.to_string(),
    };
    format!("TTS failed: {detail}")
}

/// Handles context-menu clicks.
#[derive(Debug)]
pub struct Background<S, A, N> {
    store: S,
    tts: TtsClient,
    audio: A,
    notifier: N,
    reading: AtomicBool,
}

impl<S, A, N> Background<S, A, N>
where
    S: OptionsStore,
    A: AudioSink,
    N: UserNotifier,
{
    pub fn new(store: S, tts: TtsClient, audio: A, notifier: N) -> Self {
        Self {
            store,
            tts,
            audio,
            notifier,
            reading: AtomicBool::new(false),
        }
    }

    /// The menu entries this handler serves.
    pub fn menu_items(&self) -> &'static [MenuItem] {
        MENU_ITEMS
    }

    pub fn state(&self) -> HandlerState {
        if self.reading.load(Ordering::SeqCst) {
            HandlerState::Reading
        } else {
            HandlerState::Idle
        }
    }

    /// Runs the handler registered for the clicked entry.
    ///
    /// Returns `None` when no entry matches the click.
    pub async fn dispatch(&self, info: &ClickInfo) -> Option<ReadOutcome> {
        match info.menu_item_id.as_str() {
            READ_SELECTION_ID => Some(self.on_read_selection(info).await),
            other => {
                tracing::debug!(menu_item_id = other, "Ignoring click on unknown menu item");
                None
            }
        }
    }

    /// Reads the clicked selection aloud, alerting the user on failure.
    pub async fn on_read_selection(&self, info: &ClickInfo) -> ReadOutcome {
        let text = normalize_selection(info.selection_text.as_deref().unwrap_or_default());

        self.reading.store(true, Ordering::SeqCst);
        let result = self.read_selection(&text).await;
        self.reading.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => ReadOutcome::Played,
            Err(err) => {
                let message = user_message(&err);
                tracing::error!(error = ?err, "Reading the selection failed");
                self.notifier.alert(&message);
                ReadOutcome::Failed(message)
            }
        }
    }

    /// Synthesizes already normalized `text` and plays it.
    ///
    /// ## Errors
    ///
    /// Fails before any network call when no API key or voice is saved, and
    /// otherwise with the TTS or playback error.
    pub async fn read_selection(&self, text: &str) -> Result<(), ReadError> {
        let api_key = options::api_key(&self.store).await?;
        if api_key.is_empty() {
            return Err(ReadError::MissingApiKey);
        }

        let voice = options::voice(&self.store).await?;
        if voice.is_empty() {
            return Err(ReadError::MissingVoice);
        }

        tracing::info!(voice = %voice, text_len = text.len(), "Reading selection");
        let content = self.tts.synthesize_text(&api_key, text, &voice).await?;
        self.audio.play(&EncodedAudio::new(content)).await?;
        Ok(())
    }
}
