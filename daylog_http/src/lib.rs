#![forbid(unsafe_code)]

//! axum glue for daylog.
//!
//! Turns an HTTP exchange into day-log records: a status/code/URL/message
//! line, then the request body and the request itself when available, and
//! optionally a JSON error body for the client.

pub mod adapter;
pub mod request;
pub mod response;

pub use adapter::{RequestLog, CODE_SUCCESS};
pub use request::{escape_line_breaks, query_unescape, RequestInfo};
pub use response::{ApiError, ErrorBody};
