//! Shared test utilities and fixtures.

use chrono::{DateTime, TimeZone, Utc};

use pushferry_types::{MessageKind, RawMessage};

pub(crate) fn ts(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).single().expect("valid timestamp")
}

pub(crate) fn make_message(
    id: &str,
    kind: MessageKind,
    body: &str,
    url: Option<&str>,
    target_device_id: Option<&str>,
) -> RawMessage {
    RawMessage {
        id: id.to_string(),
        kind,
        title: None,
        body: body.to_string(),
        url: url.map(str::to_string),
        target_device_id: target_device_id.map(str::to_string),
        modified_at: ts(0),
    }
}
