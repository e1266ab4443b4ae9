//! Google Cloud Text-to-Speech client.
//!
//! ## Environment Variables
//!
//! - `READ_ALOUD_TTS_ENDPOINT` overrides the API base URL (useful for proxies
//!   and mock servers).

use url::Url;

use super::types::{ListVoicesResponse, SynthesisRequest, SynthesisResponse, Voice};
use crate::errors::TtsError;
use crate::http::{HttpClient, RequestOptions};

/// Default base URL of the Cloud Text-to-Speech API.
pub const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const ENDPOINT_ENV_VAR: &str = "READ_ALOUD_TTS_ENDPOINT";

/// Client for the `voices` and `text:synthesize` endpoints.
///
/// The API key is passed per call because it is read fresh from the
/// options store on every invocation.
#[derive(Debug, Clone)]
pub struct TtsClient {
    http: HttpClient,
    base_url: String,
}

impl TtsClient {
    /// Creates a client for the URL in `READ_ALOUD_TTS_ENDPOINT`, falling back
    /// to [`DEFAULT_BASE_URL`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, TtsError> {
        let base_url = std::env::var(ENDPOINT_ENV_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    /// Creates a client against a custom base URL.
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// let tts = TtsClient::with_base_url("http://localhost:8080")?;
    /// ```
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, TtsError> {
        Ok(Self {
            http: HttpClient::new()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds `{base}/v1/{method}?key={api_key}`.
    fn endpoint(&self, method: &str, api_key: &str) -> Result<String, TtsError> {
        let raw = format!("{}/v1/{}", self.base_url, method);
        let mut url = Url::parse(&raw).map_err(|e| TtsError::InvalidEndpoint {
            url: raw.clone(),
            message: e.to_string(),
        })?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url.into())
    }

    /// Lists the voices available to this API key.
    ///
    /// ## Errors
    ///
    /// Fails with the HTTP status on any non-2xx response (403 for a
    /// rejected key).
    pub async fn available_voices(&self, api_key: &str) -> Result<Vec<Voice>, TtsError> {
        let url = self.endpoint("voices", api_key)?;
        let response: ListVoicesResponse = self
            .http
            .get_json(&url, RequestOptions::new())
            .await?
            .into_json()?;

        tracing::debug!(count = response.voices.len(), "Fetched available voices");
        Ok(response.voices)
    }

    /// Synthesizes `text` with `voice_name` and returns the base64 encoded
    /// OGG/Opus audio.
    ///
    /// ## Errors
    ///
    /// Fails with the HTTP status on any non-2xx response, most commonly
    /// 400 (malformed request or unsupported voice) or 403 (bad key).
    /// Returns `TtsError::MissingField` if the response has no audio.
    pub async fn synthesize_text(
        &self,
        api_key: &str,
        text: &str,
        voice_name: &str,
    ) -> Result<String, TtsError> {
        let request = SynthesisRequest::new(text, voice_name);
        let url = self.endpoint("text:synthesize", api_key)?;

        tracing::debug!(
            voice = %request.voice.name,
            language_code = %request.voice.language_code,
            text_len = text.len(),
            "Sending synthesis request"
        );

        let response: SynthesisResponse = self
            .http
            .post_json(&url, RequestOptions::new().json(&request)?)
            .await?
            .into_json()?;

        let audio = response.audio_content.ok_or(TtsError::MissingField {
            field: "audioContent",
        })?;
        tracing::debug!(audio_len = audio.len(), "Received synthesized audio");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_available_voices_unwraps_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/voices"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "voices": [
                    {"name": "en-US-Wavenet-D", "languageCodes": ["en-US"], "ssmlGender": "MALE"},
                    {"name": "de-DE-Standard-A", "languageCodes": ["de-DE"], "ssmlGender": "FEMALE"}
                ]
            })))
            .mount(&server)
            .await;

        let tts = TtsClient::with_base_url(server.uri()).unwrap();
        let voices = tts.available_voices("test-key").await.unwrap();
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].name, "en-US-Wavenet-D");
    }

    #[tokio::test]
    async fn test_synthesize_sends_derived_language_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text:synthesize"))
            .and(query_param("key", "test-key"))
            .and(body_json(json!({
                "input": {"text": "Hello world"},
                "voice": {"name": "en-US-Wavenet-D", "languageCode": "en-US"},
                "audioConfig": {"audioEncoding": "OGG_OPUS"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "audioContent": "T2dnUw=="
            })))
            .mount(&server)
            .await;

        let tts = TtsClient::with_base_url(server.uri()).unwrap();
        let audio = tts
            .synthesize_text("test-key", "Hello world", "en-US-Wavenet-D")
            .await
            .unwrap();
        assert_eq!(audio, "T2dnUw==");
    }

    #[tokio::test]
    async fn test_synthesize_propagates_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text:synthesize"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "API key not valid"}
            })))
            .mount(&server)
            .await;

        let tts = TtsClient::with_base_url(server.uri()).unwrap();
        let err = tts
            .synthesize_text("bad", "Hello", "en-US-Wavenet-D")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(403));
    }

    #[tokio::test]
    async fn test_synthesize_without_audio_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text:synthesize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let tts = TtsClient::with_base_url(server.uri()).unwrap();
        let err = tts
            .synthesize_text("k", "Hello", "en-US-Wavenet-D")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TtsError::MissingField {
                field: "audioContent"
            }
        ));
    }

    #[test]
    fn test_endpoint_encodes_key() {
        let tts = TtsClient::with_base_url("https://example.com/").unwrap();
        assert_eq!(tts.base_url(), "https://example.com");
        let url = tts.endpoint("voices", "a b&c").unwrap();
        assert_eq!(url, "https://example.com/v1/voices?key=a+b%26c");
    }

    #[test]
    fn test_invalid_base_url() {
        let tts = TtsClient::with_base_url("not a url").unwrap();
        assert!(matches!(
            tts.endpoint("voices", "k"),
            Err(TtsError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    #[serial_test::serial]
    fn test_new_reads_endpoint_from_env() {
        // SAFETY: serialized with the other env-touching tests
        unsafe {
            std::env::set_var(ENDPOINT_ENV_VAR, "http://localhost:9999/");
        }
        let tts = TtsClient::new().unwrap();
        assert_eq!(tts.base_url(), "http://localhost:9999");

        unsafe {
            std::env::remove_var(ENDPOINT_ENV_VAR);
        }
        let tts = TtsClient::new().unwrap();
        assert_eq!(tts.base_url(), DEFAULT_BASE_URL);
    }
}
