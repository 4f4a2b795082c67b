//! Logging an HTTP exchange through a [`Logger`].

use crate::request::{escape_line_breaks, query_unescape, RequestInfo};
use crate::response::ApiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Local;
use daylog_core::format::TIMESTAMP_FORMAT;
use daylog_core::{Level, Logger, Result};

/// Application code written on success lines
pub const CODE_SUCCESS: u32 = 0;

/// Request-aware logging.
///
/// Each call writes `[<status>][<code>] <time> [<url>] <message>`, then a
/// `Body:` line if a body is given and a `Request:` line if a request is
/// given. Calls made outside a request pass `None` and log an empty URL.
pub trait RequestLog {
    /// Log a failed exchange at `Error`
    fn log_request_error(
        &self,
        request: Option<&RequestInfo>,
        status: StatusCode,
        error_code: u32,
        msg: &str,
        body: Option<&[u8]>,
    ) -> Result<()>;

    /// Log a failed exchange, then build the JSON error response for it.
    ///
    /// The response is only built when there is a request to answer.
    fn return_request_error(
        &self,
        request: Option<&RequestInfo>,
        status: StatusCode,
        error_code: u32,
        msg: &str,
        body: Option<&[u8]>,
    ) -> Result<Option<Response>>;

    /// Log a successful exchange at `Info`
    fn log_request_success(
        &self,
        request: Option<&RequestInfo>,
        status: StatusCode,
        msg: &str,
        body: Option<&[u8]>,
    ) -> Result<()>;
}

impl RequestLog for Logger {
    fn log_request_error(
        &self,
        request: Option<&RequestInfo>,
        status: StatusCode,
        error_code: u32,
        msg: &str,
        body: Option<&[u8]>,
    ) -> Result<()> {
        log_exchange(self, Level::Error, request, status, error_code, msg, body)
    }

    fn return_request_error(
        &self,
        request: Option<&RequestInfo>,
        status: StatusCode,
        error_code: u32,
        msg: &str,
        body: Option<&[u8]>,
    ) -> Result<Option<Response>> {
        self.log_request_error(request, status, error_code, msg, body)?;
        Ok(request.map(|_| ApiError::new(status, error_code, msg).into_response()))
    }

    fn log_request_success(
        &self,
        request: Option<&RequestInfo>,
        status: StatusCode,
        msg: &str,
        body: Option<&[u8]>,
    ) -> Result<()> {
        log_exchange(self, Level::Info, request, status, CODE_SUCCESS, msg, body)
    }
}

fn log_exchange(
    logger: &Logger,
    level: Level,
    request: Option<&RequestInfo>,
    status: StatusCode,
    code: u32,
    msg: &str,
    body: Option<&[u8]>,
) -> Result<()> {
    let url = request.map(RequestInfo::url).unwrap_or_default();
    let now = Local::now().format(TIMESTAMP_FORMAT);
    logger.logf(
        level,
        "[%d][%d] %s [%s] %s",
        &[&status.as_u16(), &code, &now, &url, &msg],
    )?;

    if let Some(body) = body {
        let body = escape_line_breaks(&query_unescape(&String::from_utf8_lossy(body)));
        logger.logf(level, "Body: %s", &[&body])?;
    }
    if let Some(request) = request {
        logger.logf(level, "Request: %s", &[&request.describe()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ErrorBody;
    use axum::http::{Method, Request};
    use daylog_core::{LogDir, LoggerConfig};
    use regex::Regex;

    fn logger_in(dir: &std::path::Path) -> Logger {
        Logger::open(LogDir::resolve_in(dir).unwrap(), LoggerConfig::default()).unwrap()
    }

    fn request() -> RequestInfo {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/orders?customer=Jane+Doe")
            .body(())
            .unwrap();
        RequestInfo::from_request(&request)
    }

    fn messages(logger: &Logger) -> Vec<(String, String)> {
        std::fs::read_to_string(logger.path())
            .unwrap()
            .lines()
            .map(|line| {
                let (head, message) = line.split_once(" :: ").unwrap();
                (head.to_string(), message.to_string())
            })
            .collect()
    }

    #[test]
    fn test_error_with_request_and_body() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = logger_in(temp_dir.path());

        logger
            .log_request_error(
                Some(&request()),
                StatusCode::NOT_FOUND,
                17,
                "order not found",
                Some(b"item=red%20hat".as_slice()),
            )
            .unwrap();

        let lines = messages(&logger);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|(head, _)| head.starts_with("[   ERROR]")));

        let first = Regex::new(r"^\[404\]\[17\] \d{2}\.\d{2}\.\d{4} \d{2}:\d{2}:\d{2} \[").unwrap();
        assert!(first.is_match(&lines[0].1), "unexpected first line: {}", lines[0].1);
        assert!(lines[0].1.ends_with(" [/orders?customer=Jane Doe] order not found"));
        assert_eq!(lines[1].1, "Body: item=red hat");
        assert!(lines[2].1.starts_with("Request: POST /orders?customer=Jane Doe HTTP/1.1"));
    }

    #[test]
    fn test_error_without_request() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = logger_in(temp_dir.path());

        logger
            .log_request_error(None, StatusCode::INTERNAL_SERVER_ERROR, 3, "worker crashed", None)
            .unwrap();

        let lines = messages(&logger);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].1.starts_with("[500][3] "));
        assert!(lines[0].1.ends_with(" [] worker crashed"));
    }

    #[test]
    fn test_success_uses_sentinel_code() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = logger_in(temp_dir.path());

        logger
            .log_request_success(Some(&request()), StatusCode::OK, "created", None)
            .unwrap();

        let lines = messages(&logger);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|(head, _)| head.starts_with("[    INFO]")));
        assert!(lines[0].1.starts_with(&format!("[200][{}] ", CODE_SUCCESS)));
        assert!(lines[1].1.starts_with("Request: "));
    }

    #[test]
    fn test_return_error_without_request_has_no_response() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = logger_in(temp_dir.path());

        let response = logger
            .return_request_error(None, StatusCode::BAD_REQUEST, 5, "bad input", None)
            .unwrap();
        assert!(response.is_none());
        assert_eq!(messages(&logger).len(), 1);
    }

    #[test]
    fn test_client_text_cannot_forge_records() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = logger_in(temp_dir.path());
        let request = Request::builder()
            .uri("/x?q=a%0A[%20%20%20FATAL]%20[01.01.2000%2000:00:00]%20::%20forged")
            .body(())
            .unwrap();

        logger
            .log_request_success(
                Some(&RequestInfo::from_request(&request)),
                StatusCode::OK,
                "ok",
                Some(b"note=line%0Abreak".as_slice()),
            )
            .unwrap();

        let lines = messages(&logger);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|(head, _)| head.starts_with("[    INFO]")));
        assert!(lines[0].1.contains("[/x?q=a\\n[   FATAL] [01.01.2000 00:00:00] :: forged] ok"));
        assert_eq!(lines[1].1, "Body: note=line\\nbreak");
    }

    #[tokio::test]
    async fn test_return_error_writes_json_body() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = logger_in(temp_dir.path());

        let response = logger
            .return_request_error(Some(&request()), StatusCode::BAD_REQUEST, 5, "bad input", None)
            .unwrap()
            .expect("response for a live request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            ErrorBody {
                code: 5,
                error: "bad input".into()
            }
        );

        let lines = messages(&logger);
        assert!(lines[0].1.ends_with(" bad input"));
    }
}
