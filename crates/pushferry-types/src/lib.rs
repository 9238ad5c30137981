//! # Pushferry Types
//!
//! This crate defines the common types and capability traits shared by the
//! pushferry pipeline and CLI: the message and torrent data model, the
//! `NotificationSource` and `TorrentSink` traits, and the error taxonomy.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error type for notification-service operations (listing pushes, posting
/// status messages, device management).
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Network-related errors (connection failures, timeouts, etc.)
    #[error("network error: {0}")]
    Network(String),

    /// Authentication errors (invalid or missing access token)
    #[error("authentication required")]
    Unauthorized,

    /// Server returned an error response
    #[error("server error: {0}")]
    ServerError(String),

    /// Other unexpected errors
    #[error("unexpected error: {0}")]
    Other(String),
}

/// Error type for resolving a classified reference into a submittable
/// torrent descriptor.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network-related errors while downloading a torrent file
    #[error("network error: {0}")]
    Network(String),

    /// Torrent-file download returned a non-success HTTP status
    #[error("unexpected status {0}")]
    Status(u16),

    /// Torrent-file download returned an empty body
    #[error("empty response body")]
    EmptyBody,

    /// An irrelevant reference was passed to the resolver. The pipeline
    /// filters these out before resolution, so seeing this is a caller bug.
    #[error("irrelevant reference passed to resolver")]
    Irrelevant,
}

/// Error type for submitting a torrent to the download backend.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Network-related errors (backend unreachable, timeouts, etc.)
    #[error("network error: {0}")]
    Network(String),

    /// Authentication errors
    #[error("authentication required")]
    Unauthorized,

    /// Backend accepted the request but rejected the torrent
    #[error("backend rejected torrent: {0}")]
    Rejected(String),

    /// Other unexpected errors
    #[error("unexpected error: {0}")]
    Other(String),
}

/// The kind of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A file attachment.
    File,
    /// A pushed hyperlink.
    Link,
    /// A free-form text note.
    Note,
}

/// A notification message as returned by the notification service.
///
/// Immutable once fetched; scoped to a single pipeline cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    /// Service-assigned message identifier.
    pub id: String,
    /// The message kind.
    pub kind: MessageKind,
    /// Optional message title.
    pub title: Option<String>,
    /// The message body. Empty when the service omitted it.
    pub body: String,
    /// The pushed URL, for link messages.
    pub url: Option<String>,
    /// The device the message was addressed to, if any.
    pub target_device_id: Option<String>,
    /// Last-modified timestamp reported by the service.
    pub modified_at: DateTime<Utc>,
}

/// The outcome of classifying a raw message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedReference {
    /// The message carries a magnet URI.
    Magnet(String),
    /// The message carries a URL pointing at a `.torrent` file.
    TorrentUrl(String),
    /// The message does not reference a torrent.
    Irrelevant,
}

/// A torrent descriptor ready for submission to the download backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentDescriptor {
    /// Submit by magnet URI.
    Magnet(String),
    /// Submit by base64-encoded torrent metainfo.
    Metainfo(String),
}

/// The backend's acknowledgement of an accepted torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedTorrent {
    /// The name the backend assigned to the torrent.
    pub name: String,
}

/// A notification-service device identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Service-assigned device identifier.
    pub id: String,
    /// Human-readable device nickname.
    pub nickname: String,
}

/// Filter for listing notification messages.
#[derive(Debug, Clone)]
pub struct MessageFilter {
    /// Only return messages modified at or after this time.
    pub modified_since: DateTime<Utc>,
    /// Only return messages of these kinds.
    pub kinds: Vec<MessageKind>,
    /// Exclude dismissed/deleted messages.
    pub active_only: bool,
}

/// Aggregate outcome of one ingestion cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Messages that entered classification after device filtering.
    pub processed: usize,
    /// Messages classified as irrelevant and skipped.
    pub skipped: usize,
    /// Messages whose torrent-file download failed.
    pub resolve_failed: usize,
    /// Messages whose backend submission failed.
    pub submit_failed: usize,
    /// Torrents accepted by the backend.
    pub submitted: usize,
    /// The maximum modification timestamp seen across all fetched messages,
    /// device-filtered or not. The caller advances its watermark to this.
    pub latest_modified: Option<DateTime<Utc>>,
}

/// Capability trait for the push-notification service.
#[allow(async_fn_in_trait)]
pub trait NotificationSource {
    /// List messages matching the filter, newest first.
    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<RawMessage>, NotifyError>;

    /// Post a status message to a device.
    async fn post_message(
        &self,
        device_id: &str,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError>;

    /// List the account's active devices.
    async fn list_devices(&self) -> Result<Vec<Device>, NotifyError>;

    /// Register a new device under the given nickname.
    async fn create_device(&self, nickname: &str) -> Result<Device, NotifyError>;
}

/// Capability trait for the torrent download backend.
#[allow(async_fn_in_trait)]
pub trait TorrentSink {
    /// Submit a torrent. Returns the backend's acknowledgement on success.
    async fn add_torrent(&self, descriptor: &TorrentDescriptor) -> Result<AddedTorrent, SubmitError>;
}
