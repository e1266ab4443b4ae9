//! Request options and response bodies.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::HttpError;

/// MIME type used to detect and request JSON bodies.
pub const JSON_MIME_TYPE: &str = "application/json";

/// A request body.
///
/// Text bodies are always sent as is. JSON bodies are serialized before
/// sending.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A pre-encoded body.
    Text(String),
    /// A structured body that is serialized to JSON.
    Json(serde_json::Value),
}

impl RequestBody {
    /// Returns the bytes to put on the wire.
    pub(crate) fn encode(self) -> Result<String, HttpError> {
        match self {
            RequestBody::Text(text) => Ok(text),
            RequestBody::Json(value) => Ok(serde_json::to_string(&value)?),
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

/// Per-request options: extra headers and an optional body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Extra headers, applied after (and overriding) any defaults.
    pub headers: Vec<(String, String)>,
    /// The request body, if any.
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body from any serializable value.
    ///
    /// ## Errors
    ///
    /// Returns `HttpError::Json` if the value cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, HttpError> {
        Ok(self.body(serde_json::to_value(value)?))
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The response declared a JSON content type.
    Json(serde_json::Value),
    /// Any other response, decoded as text.
    Text(String),
}

impl ResponseBody {
    /// Returns `true` if the body was decoded as JSON.
    pub fn is_json(&self) -> bool {
        matches!(self, ResponseBody::Json(_))
    }

    /// Returns the text body, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }

    /// Converts a JSON body into a typed value.
    ///
    /// ## Errors
    ///
    /// Returns `HttpError::UnexpectedBody` for text bodies and
    /// `HttpError::Json` if the JSON does not match `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        match self {
            ResponseBody::Json(value) => Ok(serde_json::from_value(value)?),
            ResponseBody::Text(_) => Err(HttpError::UnexpectedBody),
        }
    }
}
