//! FILENAME: core/tabula/src/source.rs
//! PURPOSE: The row-source contract: what a fetch resolves to.
//! CONTEXT: Transport is the host's concern. The engine only sees the response
//! envelope, either a batch of rows or an error with an optional status code.

use serde_json::Value;
use tabula_engine::Record;

/// Outcome of one row fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<R> {
    Rows(Vec<R>),
    Error { message: String, status: Option<u16> },
}

impl<R> Envelope<R> {
    pub fn error(message: impl Into<String>, status: Option<u16>) -> Self {
        Envelope::Error {
            message: message.into(),
            status,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Envelope::Rows(_) => None,
            Envelope::Error { status, .. } => *status,
        }
    }
}

impl Envelope<Record> {
    /// Build an envelope from an HTTP-style status code and JSON body.
    ///
    /// A success body is either an array of row objects or an object whose
    /// `data` field holds that array. A failure body's `message` field (or
    /// the raw body) becomes the error message.
    pub fn from_json(status: u16, body: &str) -> Self {
        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| body.trim().to_string());
            return Envelope::error(message, Some(status));
        }

        let parsed = serde_json::from_str::<Value>(body).and_then(|value| {
            let rows = match value {
                Value::Object(mut map) => map.remove("data").unwrap_or(Value::Array(Vec::new())),
                other => other,
            };
            serde_json::from_value::<Vec<Record>>(rows)
        });
        match parsed {
            Ok(rows) => Envelope::Rows(rows),
            Err(e) => Envelope::error(format!("malformed row data: {e}"), Some(status)),
        }
    }
}

/// Authorization predicate treating 401 and 403 responses as unauthorized.
pub fn status_authorized<R>(envelope: &Envelope<R>) -> bool {
    !matches!(envelope.status(), Some(401) | Some(403))
}
