//! Read Aloud
//!
//! Reads selected text aloud with the Google Cloud Text-to-Speech API.
//!
//! ## Features
//!
//! - **Read selection**: normalizes the selected text, synthesizes it as
//!   OGG/Opus and plays it through a system audio player
//! - **Options**: an API key and a voice, persisted in a JSON options file
//! - **Options form**: rendered from a declarative field list as an element
//!   tree, with the voice list fetched from the API
//! - **Async-first**: built on tokio and reqwest
//!
//! ## Quick Start
//!
//! ```ignore
//! use read_aloud::{Background, ClickInfo, FileStore, SystemAudio, TtsClient};
//!
//! let background = Background::new(FileStore::from_env()?, TtsClient::new()?, SystemAudio, notifier);
//! background.dispatch(&ClickInfo::read_selection("Hello world.")).await;
//! ```
//!
//! ## Module Structure
//!
//! - [`http`] - JSON/text HTTP client
//! - [`tts`] - Cloud Text-to-Speech API client
//! - [`options`] - option descriptors, storage and accessors
//! - [`dom`] - element tree construction
//! - [`background`] - context-menu handling and the read-selection flow
//! - [`options_page`] - options form rendering and submission
//! - [`playback`] - audio decoding and playback
//! - [`errors`] - error types

pub mod background;
pub mod dom;
pub mod errors;
pub mod http;
pub mod options;
pub mod options_page;
pub mod playback;
pub mod tts;

// Re-export main types at crate root for convenience
pub use background::{
    Background, ClickInfo, HandlerState, MENU_ITEMS, MenuItem, ReadOutcome, UserNotifier,
    normalize_selection, user_message,
};
pub use dom::{Child, Element, Node, class_names, el};
pub use errors::{HttpError, OptionsError, PlaybackError, ReadError, StoreError, TtsError};
pub use http::{HttpClient, RequestOptions, ResponseBody};
pub use options::{
    FileStore, MemoryStore, OPTION_DATA, OptionsStore, SavedOptions, api_key, save_options,
    saved_option, saved_options, voice,
};
pub use options_page::{OptionsPage, PageState, collect_form_values};
pub use playback::{AudioSink, EncodedAudio, SystemAudio};
pub use tts::{TtsClient, Voice, language_code};
