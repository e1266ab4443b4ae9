//! Declarative option descriptors and their option producers.

use super::store::OptionsStore;
use crate::errors::OptionsError;
use crate::tts::TtsClient;

/// Storage key of the API key option.
pub const API_KEY_NAME: &str = "apiKey";

/// Storage key of the voice option.
pub const VOICE_NAME: &str = "voice";

/// Where the voice catalogue with samples lives.
pub const VOICES_DOC_URL: &str = "https://cloud.google.com/text-to-speech/docs/voices";

/// Label of the empty first entry in the voice list.
pub const EMPTY_VOICE_LABEL: &str = "— Select voice —";

/// The form control used to edit an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// A single-line text input.
    Input,
    /// A drop-down fed by an [`OptionsSource`].
    Select,
}

impl ControlKind {
    /// The element tag for this control.
    pub fn tag(self) -> &'static str {
        match self {
            ControlKind::Input => "input",
            ControlKind::Select => "select",
        }
    }
}

/// Names the async producer that supplies a field's choices.
///
/// The renderer calls the matching function; descriptors carry no code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsSource {
    /// [`voice_options`].
    Voices,
}

/// A link rendered under a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Description {
    pub href: &'static str,
    pub target: &'static str,
    pub text: &'static str,
}

/// Static description of one option field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub control: ControlKind,
    /// Extra attributes for the control element.
    pub attrs: &'static [(&'static str, &'static str)],
    pub default_value: Option<&'static str>,
    pub options: Option<OptionsSource>,
    pub description: Option<Description>,
}

impl OptionDescriptor {
    /// Looks up one of this descriptor's extra attributes.
    pub fn attr(&self, name: &str) -> Option<&'static str> {
        self.attrs
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| *value)
    }
}

/// Every recognized option, in form order.
pub const OPTION_DATA: &[OptionDescriptor] = &[
    OptionDescriptor {
        name: API_KEY_NAME,
        label: "API key",
        control: ControlKind::Input,
        attrs: &[("size", "40")],
        default_value: None,
        options: None,
        description: None,
    },
    OptionDescriptor {
        name: VOICE_NAME,
        label: "Voice",
        control: ControlKind::Select,
        attrs: &[],
        default_value: None,
        options: Some(OptionsSource::Voices),
        description: Some(Description {
            href: VOICES_DOC_URL,
            target: "_blank",
            text: "Supported voices and languages with samples",
        }),
    },
];

/// Names of every recognized option.
pub fn option_names() -> Vec<&'static str> {
    OPTION_DATA.iter().map(|o| o.name).collect()
}

/// Finds the descriptor for `name`.
pub fn descriptor(name: &str) -> Option<&'static OptionDescriptor> {
    OPTION_DATA.iter().find(|o| o.name == name)
}

/// One entry of a select control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Produces the choices for the voice field.
///
/// Without a saved API key there is nothing to list and the result is
/// empty. Otherwise the voices are sorted by name and preceded by an empty
/// "select voice" entry.
///
/// ## Errors
///
/// Fails if the store cannot be read or the voice list request fails.
pub async fn voice_options<S: OptionsStore>(
    store: &S,
    tts: &TtsClient,
) -> Result<Vec<SelectOption>, OptionsError> {
    let api_key = super::api_key(store).await?;
    if api_key.is_empty() {
        return Ok(Vec::new());
    }

    let mut voices = tts.available_voices(&api_key).await?;
    voices.sort_by(|a, b| a.name.cmp(&b.name));

    let mut options = Vec::with_capacity(voices.len() + 1);
    options.push(SelectOption::new("", EMPTY_VOICE_LABEL));
    options.extend(
        voices
            .into_iter()
            .map(|voice| {
                let label = format!("{} ({})", voice.name, voice.ssml_gender);
                SelectOption::new(voice.name, label)
            }),
    );
    Ok(options)
}

/// Runs the producer named by `source`.
pub async fn produce_options<S: OptionsStore>(
    source: OptionsSource,
    store: &S,
    tts: &TtsClient,
) -> Result<Vec<SelectOption>, OptionsError> {
    match source {
        OptionsSource::Voices => voice_options(store, tts).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MemoryStore;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_option_names_in_form_order() {
        assert_eq!(option_names(), vec!["apiKey", "voice"]);
    }

    #[test]
    fn test_descriptor_lookup() {
        let api_key = descriptor(API_KEY_NAME).unwrap();
        assert_eq!(api_key.control, ControlKind::Input);
        assert_eq!(api_key.attr("size"), Some("40"));
        assert!(descriptor("nope").is_none());

        let voice = descriptor(VOICE_NAME).unwrap();
        assert_eq!(voice.control.tag(), "select");
        assert_eq!(voice.options, Some(OptionsSource::Voices));
    }

    #[tokio::test]
    async fn test_voice_options_without_key_is_empty() {
        let store = MemoryStore::new();
        let tts = TtsClient::with_base_url("http://127.0.0.1:9").unwrap();
        let options = voice_options(&store, &tts).await.unwrap();
        assert!(options.is_empty());
    }

    #[tokio::test]
    async fn test_voice_options_sorted_with_empty_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/voices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "voices": [
                    {"name": "fr-FR-Standard-A", "ssmlGender": "FEMALE"},
                    {"name": "de-DE-Wavenet-B", "ssmlGender": "MALE"}
                ]
            })))
            .mount(&server)
            .await;

        let store = MemoryStore::with_values([(API_KEY_NAME, "key")]);
        let tts = TtsClient::with_base_url(server.uri()).unwrap();
        let options = produce_options(OptionsSource::Voices, &store, &tts)
            .await
            .unwrap();

        assert_eq!(
            options,
            vec![
                SelectOption::new("", EMPTY_VOICE_LABEL),
                SelectOption::new("de-DE-Wavenet-B", "de-DE-Wavenet-B (MALE)"),
                SelectOption::new("fr-FR-Standard-A", "fr-FR-Standard-A (FEMALE)"),
            ]
        );
    }

    #[tokio::test]
    async fn test_voice_options_reports_bad_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/voices"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let store = MemoryStore::with_values([(API_KEY_NAME, "key")]);
        let tts = TtsClient::with_base_url(server.uri()).unwrap();
        let err = voice_options(&store, &tts).await.unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.to_string(), "400 Bad Request");
    }
}
