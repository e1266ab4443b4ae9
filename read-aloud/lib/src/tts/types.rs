//! Wire types for the Cloud Text-to-Speech REST API.

use serde::{Deserialize, Serialize};

/// Audio encodings the synthesis endpoint can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    /// Opus encoded audio wrapped in an OGG container.
    #[default]
    OggOpus,
}

/// Body of a `text:synthesize` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub input: SynthesisInput,
    pub voice: VoiceSelection,
    pub audio_config: AudioConfig,
}

impl SynthesisRequest {
    /// Builds the request for `text` spoken by `voice_name`.
    ///
    /// The language code is derived from the voice name, see
    /// [`language_code`].
    pub fn new(text: impl Into<String>, voice_name: impl Into<String>) -> Self {
        let name = voice_name.into();
        Self {
            input: SynthesisInput { text: text.into() },
            voice: VoiceSelection {
                language_code: language_code(&name),
                name,
            },
            audio_config: AudioConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisInput {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection {
    pub name: String,
    pub language_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub audio_encoding: AudioEncoding,
}

/// Body of a `text:synthesize` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResponse {
    /// Base64 encoded audio.
    pub audio_content: Option<String>,
}

/// Body of a `voices` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListVoicesResponse {
    #[serde(default)]
    pub voices: Vec<Voice>,
}

/// A voice offered by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    /// Voice identifier, e.g. `en-US-Wavenet-D`.
    pub name: String,
    #[serde(default)]
    pub language_codes: Vec<String>,
    /// `MALE`, `FEMALE`, `NEUTRAL` or `SSML_VOICE_GENDER_UNSPECIFIED`.
    #[serde(default)]
    pub ssml_gender: String,
    #[serde(default)]
    pub natural_sample_rate_hertz: Option<u32>,
}

/// Derives the language code from a voice name.
///
/// The code is the first two `-` separated segments, so `en-US-Wavenet-D`
/// gives `en-US`. Names with fewer segments are not rejected; the missing
/// segment is left empty.
///
/// ## Examples
///
/// ```
/// use read_aloud::tts::language_code;
///
/// assert_eq!(language_code("en-US-Wavenet-D"), "en-US");
/// assert_eq!(language_code("cmn-CN-Standard-A"), "cmn-CN");
/// ```
pub fn language_code(voice_name: &str) -> String {
    let mut parts = voice_name.split('-');
    let language = parts.next().unwrap_or_default();
    let region = parts.next().unwrap_or_default();
    format!("{language}-{region}")
}
