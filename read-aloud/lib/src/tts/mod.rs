//! Cloud Text-to-Speech API client.
//!
//! - [`TtsClient::available_voices`] lists the voices for an API key.
//! - [`TtsClient::synthesize_text`] turns text into base64 OGG/Opus audio.

mod client;
mod types;

pub use client::{DEFAULT_BASE_URL, ENDPOINT_ENV_VAR, TtsClient};
pub use types::{
    AudioConfig, AudioEncoding, ListVoicesResponse, SynthesisInput, SynthesisRequest,
    SynthesisResponse, Voice, VoiceSelection, language_code,
};
