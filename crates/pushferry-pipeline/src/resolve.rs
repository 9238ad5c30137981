//! Reference resolution.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use pushferry_types::{ClassifiedReference, FetchError, TorrentDescriptor};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolver turning classified references into submittable torrent
/// descriptors. Magnet references resolve without I/O; torrent-file URLs are
/// downloaded and base64-encoded.
#[derive(Debug, Clone)]
pub struct Resolver {
    client: reqwest::Client,
}

impl Resolver {
    /// Create a resolver with bounded connect and request timeouts, so a
    /// stalled download surfaces as a [`FetchError`] instead of hanging the
    /// cycle.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(map_transport_error)?;
        Ok(Self { client })
    }

    /// Create a resolver around an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Resolve a classified reference into a torrent descriptor.
    ///
    /// The pipeline filters irrelevant references out before calling this;
    /// passing one anyway returns [`FetchError::Irrelevant`].
    pub async fn resolve(
        &self,
        reference: &ClassifiedReference,
    ) -> Result<TorrentDescriptor, FetchError> {
        match reference {
            ClassifiedReference::Magnet(uri) => Ok(TorrentDescriptor::Magnet(uri.clone())),
            ClassifiedReference::TorrentUrl(url) => self.fetch_metainfo(url).await,
            ClassifiedReference::Irrelevant => Err(FetchError::Irrelevant),
        }
    }

    async fn fetch_metainfo(&self, url: &str) -> Result<TorrentDescriptor, FetchError> {
        debug!("Downloading torrent file from {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        debug!("Downloaded {} bytes of torrent metainfo", bytes.len());
        Ok(TorrentDescriptor::Metainfo(STANDARD.encode(&bytes)))
    }
}

/// Maps reqwest transport errors (including timeouts) to fetch errors.
fn map_transport_error(err: reqwest::Error) -> FetchError {
    FetchError::Network(err.to_string())
}
