//! Request execution with tracing instrumentation.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::{Span, instrument};
use url::Url;

use super::body::{JSON_MIME_TYPE, RequestOptions, ResponseBody};
use crate::errors::HttpError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Query parameters whose values never reach the logs.
const SECRET_PARAMS: &[&str] = &["key"];

/// Builder for configuring an [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    default_headers: HeaderMap,
}

impl HttpClientBuilder {
    fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
        }
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request.
    ///
    /// ## Errors
    ///
    /// Returns `HttpError::InvalidHeader` if the name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, HttpError> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Builds the [`HttpClient`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the underlying `reqwest` client cannot be built.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers)
            .build()?;

        Ok(HttpClient { client })
    }
}

/// Async HTTP client returning JSON or text bodies.
///
/// ## Examples
///
/// ```rust,ignore
/// use read_aloud::http::{HttpClient, RequestOptions, ResponseBody};
///
/// let client = HttpClient::new()?;
/// match client.get("https://example.com", RequestOptions::new()).await? {
///     ResponseBody::Json(value) => println!("json: {value}"),
///     ResponseBody::Text(text) => println!("text: {text}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Creates a builder for configuring a client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Creates a client with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the underlying `reqwest` client cannot be built.
    pub fn new() -> Result<Self, HttpError> {
        Self::builder().build()
    }

    /// Runs a GET request.
    pub async fn get(&self, url: &str, opts: RequestOptions) -> Result<ResponseBody, HttpError> {
        self.fetch(Method::GET, url, HeaderMap::new(), opts).await
    }

    /// Runs a POST request.
    pub async fn post(&self, url: &str, opts: RequestOptions) -> Result<ResponseBody, HttpError> {
        self.fetch(Method::POST, url, HeaderMap::new(), opts).await
    }

    /// Runs a GET request with JSON `Accept`/`Content-Type` headers.
    pub async fn get_json(
        &self,
        url: &str,
        opts: RequestOptions,
    ) -> Result<ResponseBody, HttpError> {
        self.fetch(Method::GET, url, json_headers(), opts).await
    }

    /// Runs a POST request with JSON `Accept`/`Content-Type` headers.
    ///
    /// A JSON body is serialized before sending; a text body is sent as is.
    pub async fn post_json(
        &self,
        url: &str,
        opts: RequestOptions,
    ) -> Result<ResponseBody, HttpError> {
        self.fetch(Method::POST, url, json_headers(), opts).await
    }

    /// Sends the request, checks the status and decodes the body.
    ///
    /// `base_headers` are applied first so the caller's headers override them.
    #[instrument(
        name = "http_request",
        skip(self, url, base_headers, opts),
        fields(
            http.method = %method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        )
    )]
    async fn fetch(
        &self,
        method: Method,
        url: &str,
        base_headers: HeaderMap,
        opts: RequestOptions,
    ) -> Result<ResponseBody, HttpError> {
        Span::current().record("http.url", redact_url(url).as_str());

        let mut headers = base_headers;
        for (name, value) in &opts.headers {
            let (name, value) = parse_header(name, value)?;
            headers.insert(name, value);
        }

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = opts.body {
            request = request.body(body.encode()?);
        }

        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                url = %redact_url(url),
                "Request returned a non-success status"
            );
            return Err(HttpError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| content_type.contains(JSON_MIME_TYPE));

        if is_json {
            let bytes = response.bytes().await.map_err(request_error)?;
            Ok(ResponseBody::Json(serde_json::from_slice(&bytes)?))
        } else {
            Ok(ResponseBody::Text(response.text().await.map_err(request_error)?))
        }
    }
}

/// Wraps a transport error without its URL, which carries the API key.
fn request_error(err: reqwest::Error) -> HttpError {
    HttpError::Request(err.without_url())
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MIME_TYPE));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MIME_TYPE));
    headers
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HttpError> {
    let name = HeaderName::try_from(name)
        .map_err(|e| HttpError::InvalidHeader(format!("invalid header name `{name}`: {e}")))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| HttpError::InvalidHeader(format!("invalid value for `{name}`: {e}")))?;
    Ok((name, value))
}

/// Masks secret query parameters (the API key) in a URL for logging.
///
/// Unparseable URLs are returned unchanged.
pub fn redact_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let v = if SECRET_PARAMS.contains(&k.as_ref()) {
                "REDACTED".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    if pairs.is_empty() {
        return parsed.to_string();
    }

    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}
