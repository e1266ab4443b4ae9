//! Thin JSON-over-HTTP client.
//!
//! [`HttpClient`] wraps `reqwest` and returns the response body as JSON or
//! text depending on its `Content-Type`. Any non-2xx status is an error
//! carrying the numeric status and its reason phrase.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use read_aloud::http::{HttpClient, RequestOptions};
//!
//! let client = HttpClient::new()?;
//! let body = client
//!     .post_json("https://example.com/api", RequestOptions::new().body(serde_json::json!({"a": 1})))
//!     .await?;
//! ```

mod body;
mod client;

pub use body::{JSON_MIME_TYPE, RequestBody, RequestOptions, ResponseBody};
pub use client::{HttpClient, HttpClientBuilder, redact_url};
