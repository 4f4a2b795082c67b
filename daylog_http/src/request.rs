//! Request metadata captured for log records.

use axum::async_trait;
use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, Request, Uri, Version};
use std::convert::Infallible;

/// Headers whose values never reach a log file
const REDACTED_HEADERS: [&str; 4] = ["authorization", "proxy-authorization", "cookie", "set-cookie"];

/// What gets logged about an inbound request
#[derive(Clone, Debug)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
}

impl RequestInfo {
    /// Capture from request parts, preferring the URI as the client sent it
    /// over the one seen by a nested router.
    pub fn from_parts(parts: &Parts) -> Self {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        Self {
            method: parts.method.clone(),
            uri,
            version: parts.version,
            headers: parts.headers.clone(),
        }
    }

    pub fn from_request<B>(request: &Request<B>) -> Self {
        let uri = request
            .extensions()
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| request.uri().clone());
        Self {
            method: request.method().clone(),
            uri,
            version: request.version(),
            headers: request.headers().clone(),
        }
    }

    /// The requested URL with query escapes decoded
    pub fn url(&self) -> String {
        escape_line_breaks(&query_unescape(&self.uri.to_string()))
    }

    /// One-line description of the request.
    ///
    /// Credentials and cookies are replaced with `[REDACTED]`.
    pub fn describe(&self) -> String {
        let headers: Vec<String> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let value = if REDACTED_HEADERS.contains(&name.as_str()) {
                    "[REDACTED]"
                } else {
                    value.to_str().unwrap_or("<binary>")
                };
                format!("{}: {}", name, value)
            })
            .collect();
        let raw = format!(
            "{} {} {:?} {{{}}}",
            self.method,
            self.uri,
            self.version,
            headers.join(", ")
        );
        escape_line_breaks(&query_unescape(&raw))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// Decode a query-escaped string (`+` is a space, `%XX` a byte).
///
/// Text that does not decode to UTF-8 is returned unchanged.
pub fn query_unescape(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Write carriage returns and line feeds as `\\r` and `\\n`.
///
/// Decoded client text goes through this before it reaches a log line, so
/// it cannot start a record of its own.
pub fn escape_line_breaks(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}
