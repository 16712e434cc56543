//! Records accepted by the ingestion route and the collection they form.

use chrono::{DateTime, Local, TimeZone};
use serde_json::{Map, Value};

use crate::errors::{IngestError, IngestResult};

/// Key the service writes on every ingested record.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Local wall-clock time, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A client JSON object plus the ingestion timestamp. Key order is kept as received.
pub type Record = Map<String, Value>;

/// All records in arrival order.
pub type Collection = Vec<Record>;

/// Parse a request body into a JSON object.
pub fn parse_object(body: &[u8]) -> IngestResult<Record> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| IngestError::bad_request(format!("invalid JSON body: {e}")))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(IngestError::bad_request(format!(
            "payload must be a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

/// Stamp `record` with the current local time.
pub fn stamp(record: Record) -> Record {
    stamp_at(record, &Local::now())
}

/// Stamp `record` with `now`, replacing any client-supplied timestamp in place.
pub fn stamp_at<Tz>(mut record: Record, now: &DateTime<Tz>) -> Record
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    record.insert(
        TIMESTAMP_FIELD.to_string(),
        Value::String(now.format(TIMESTAMP_FORMAT).to_string()),
    );
    record
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
