//! Error types for read-aloud operations.
//!
//! Each layer has its own error enum so callers can match on the failure
//! they care about. [`ReadError`] aggregates everything the read-selection
//! flow can hit, and [`OptionsError`] everything an option producer can hit.

use thiserror::Error;

/// Errors from the HTTP client layer.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request failed due to a network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-success status code.
    ///
    /// Displays as `"<status> <status_text>"`, e.g. `403 Forbidden`, or
    /// just the code when there is no reason phrase.
    #[error("{}", status_line(.status, .status_text))]
    Status {
        /// The numeric HTTP status code.
        status: u16,
        /// The canonical reason phrase for the status.
        status_text: String,
    },

    /// A header name or value could not be used in a request.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A request body could not be serialized or a response body could
    /// not be parsed as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON body was expected but the server sent something else.
    #[error("expected a JSON response body but received text")]
    UnexpectedBody,
}

impl HttpError {
    /// Returns the HTTP status code if the server answered with one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn status_line(status: &u16, status_text: &str) -> String {
    if status_text.is_empty() {
        status.to_string()
    } else {
        format!("{status} {status_text}")
    }
}

/// Errors from the text-to-speech API client.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TtsError {
    /// The underlying HTTP call failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The configured endpoint is not a usable URL.
    #[error("invalid TTS endpoint `{url}`: {message}")]
    InvalidEndpoint {
        /// The offending URL.
        url: String,
        /// Why it could not be parsed.
        message: String,
    },

    /// The response was missing a field we rely on.
    #[error("TTS response is missing the `{field}` field")]
    MissingField {
        /// The missing field's name.
        field: &'static str,
    },
}

impl TtsError {
    /// Returns the HTTP status code behind this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status_code(),
            _ => None,
        }
    }
}

/// Errors from the persistent options store.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// No config directory could be determined for the current user.
    #[error("could not determine a config directory for the options file")]
    NoConfigDir,

    /// The options file exists but could not be read.
    #[error("failed to read options from {path}")]
    Read {
        /// Path of the options file.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The options file does not hold a JSON object of strings.
    #[error("options file {path} is not valid")]
    Parse {
        /// Path of the options file.
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Writing the options file failed.
    #[error("failed to write options to {path}: {message}")]
    Write {
        /// Path of the options file.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// A value was written under a name that is not a known option.
    #[error("unknown option `{0}`")]
    UnknownOption(String),
}

/// Errors from audio playback.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The audio content was not valid base64.
    #[error("audio content is not valid base64")]
    Decode(#[from] base64::DecodeError),

    /// No audio player capable of OGG/Opus playback was found.
    #[error("no audio player found (tried: {tried})")]
    NoAudioPlayer {
        /// Comma-separated list of the players that were looked for.
        tried: String,
    },

    /// Creating the temporary audio file failed.
    #[error("failed to create temporary audio file")]
    TempFile {
        #[source]
        source: std::io::Error,
    },

    /// Writing the decoded audio failed.
    #[error("failed to write audio: {0}")]
    Io(#[from] std::io::Error),

    /// The player process could not be started.
    #[error("failed to start audio player `{player}`")]
    ProcessSpawnFailed {
        /// The player binary.
        player: String,
        #[source]
        source: std::io::Error,
    },

    /// The player exited with a failure status.
    #[error("audio player `{player}` failed: {stderr}")]
    PlaybackFailed {
        /// The player binary.
        player: String,
        /// What the player wrote to stderr.
        stderr: String,
    },
}

/// Errors from the read-selection flow.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ReadError {
    /// No API key has been saved.
    #[error("You must set an API key in the read-aloud options.")]
    MissingApiKey,

    /// No voice has been selected.
    #[error("You must select a voice in the read-aloud options.")]
    MissingVoice,

    /// Loading the saved options failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The TTS API call failed.
    #[error(transparent)]
    Tts(#[from] TtsError),

    /// The synthesized audio could not be played.
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

impl ReadError {
    /// Returns the HTTP status code behind this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Tts(e) => e.status_code(),
            _ => None,
        }
    }
}

/// Errors from an option producer (e.g. fetching the voice list).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Reading saved options failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The TTS API call failed.
    #[error(transparent)]
    Tts(#[from] TtsError),
}

impl OptionsError {
    /// Returns the HTTP status code behind this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Tts(e) => e.status_code(),
            Self::Store(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_includes_code_and_text() {
        let err = HttpError::Status {
            status: 403,
            status_text: "Forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "403 Forbidden");
        assert_eq!(err.status_code(), Some(403));
    }

    #[test]
    fn test_status_display_without_reason_phrase() {
        let err = HttpError::Status {
            status: 499,
            status_text: String::new(),
        };
        assert_eq!(err.to_string(), "499");
    }

    #[test]
    fn test_status_code_flows_through_layers() {
        let http = HttpError::Status {
            status: 400,
            status_text: "Bad Request".to_string(),
        };
        let read: ReadError = TtsError::from(http).into();
        assert_eq!(read.status_code(), Some(400));
        assert_eq!(read.to_string(), "400 Bad Request");
    }

    #[test]
    fn test_configuration_errors_have_no_status() {
        assert_eq!(ReadError::MissingApiKey.status_code(), None);
        assert_eq!(ReadError::MissingVoice.status_code(), None);
        assert!(ReadError::MissingApiKey.to_string().contains("API key"));
    }

    #[test]
    fn test_unexpected_body_has_no_status() {
        assert_eq!(HttpError::UnexpectedBody.status_code(), None);
    }
}
