//! Wire-format types for the Pushbullet v2 API and their conversions into
//! the pushferry data model.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use pushferry_types::{Device, MessageKind, RawMessage};

/// A push as returned by `GET /v2/pushes`.
#[derive(Debug, Deserialize)]
pub(crate) struct WirePush {
    pub(crate) iden: String,
    #[serde(rename = "type", default)]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) body: Option<String>,
    #[serde(default)]
    pub(crate) url: Option<String>,
    #[serde(default)]
    pub(crate) target_device_iden: Option<String>,
    /// Unix seconds with a fractional part.
    #[serde(default)]
    pub(crate) modified: f64,
}

/// Response envelope of `GET /v2/pushes`.
#[derive(Debug, Deserialize)]
pub(crate) struct WirePushList {
    pub(crate) pushes: Vec<WirePush>,
}

/// A device as returned by the devices endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct WireDevice {
    pub(crate) iden: String,
    #[serde(default)]
    pub(crate) nickname: Option<String>,
    #[serde(default)]
    pub(crate) active: bool,
}

/// Response envelope of `GET /v2/devices`.
#[derive(Debug, Deserialize)]
pub(crate) struct WireDeviceList {
    pub(crate) devices: Vec<WireDevice>,
}

fn parse_kind(kind: &str) -> Option<MessageKind> {
    match kind {
        "file" => Some(MessageKind::File),
        "link" => Some(MessageKind::Link),
        "note" => Some(MessageKind::Note),
        _ => None,
    }
}

fn parse_modified(seconds: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis((seconds * 1000.0) as i64)
}

impl WirePush {
    /// Convert a wire push into a [`RawMessage`]. Pushes of a kind the
    /// pipeline has no model for (mirrors, dismissals, ...) yield `None`.
    pub(crate) fn into_message(self) -> Option<RawMessage> {
        let kind = parse_kind(self.kind.as_deref()?)?;
        let modified_at = parse_modified(self.modified)?;
        Some(RawMessage {
            id: self.iden,
            kind,
            title: self.title,
            body: self.body.unwrap_or_default(),
            url: self.url,
            target_device_id: self.target_device_iden,
            modified_at,
        })
    }
}

impl WireDevice {
    pub(crate) fn into_device(self) -> Device {
        Device {
            id: self.iden,
            nickname: self.nickname.unwrap_or_default(),
        }
    }
}
