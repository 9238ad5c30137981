//! Transmission RPC client implementation.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use pushferry_types::{AddedTorrent, SubmitError, TorrentDescriptor, TorrentSink};

const DEFAULT_RPC_URL: &str = "http://localhost:9091/transmission/rpc";
const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TransmissionClient is a torrent sink that uses Transmission RPC.
#[allow(missing_debug_implementations)]
pub struct TransmissionClient {
    client: reqwest::Client,
    rpc_url: Url,
    auth: Option<(String, String)>,
    // Transmission rotates a CSRF session id and answers 409 until the
    // current one is echoed back.
    session_id: Mutex<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    result: String,
    #[serde(default)]
    arguments: RpcArguments,
}

#[derive(Debug, Default, Deserialize)]
struct RpcArguments {
    #[serde(rename = "torrent-added")]
    torrent_added: Option<RpcTorrent>,
    #[serde(rename = "torrent-duplicate")]
    torrent_duplicate: Option<RpcTorrent>,
}

#[derive(Debug, Deserialize)]
struct RpcTorrent {
    name: String,
}

impl TransmissionClient {
    /// Create a new TransmissionClient.
    /// If no RPC URL is provided, it defaults to "http://localhost:9091/transmission/rpc".
    /// `auth` is an optional basic-auth user/password pair.
    pub fn new(
        rpc_url: Option<&str>,
        auth: Option<(String, String)>,
    ) -> Result<Self, SubmitError> {
        let rpc_url = Url::parse(rpc_url.unwrap_or(DEFAULT_RPC_URL))
            .map_err(|e| SubmitError::Other(format!("invalid RPC URL: {e}")))?;
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(map_transport_error)?;
        Ok(Self {
            client,
            rpc_url,
            auth,
            session_id: Mutex::new(None),
        })
    }

    fn cached_session_id(&self) -> Option<String> {
        self.session_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_session_id(&self, id: String) {
        *self
            .session_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(id);
    }

    async fn send_once(
        &self,
        body: &serde_json::Value,
        session_id: Option<&str>,
    ) -> Result<reqwest::Response, SubmitError> {
        let mut request = self.client.post(self.rpc_url.clone()).json(body);
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, Some(password));
        }
        if let Some(id) = session_id {
            request = request.header(SESSION_ID_HEADER, id);
        }
        request.send().await.map_err(map_transport_error)
    }

    /// Issue an RPC call, performing the 409 session-id handshake once if the
    /// cached id is missing or stale.
    async fn call(&self, body: &serde_json::Value) -> Result<reqwest::Response, SubmitError> {
        let cached = self.cached_session_id();
        let response = self.send_once(body, cached.as_deref()).await?;
        if response.status() != StatusCode::CONFLICT {
            return Ok(response);
        }

        let id = response
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                SubmitError::Other("409 response without a session id header".to_string())
            })?;
        debug!("Refreshed Transmission session id");
        self.store_session_id(id.clone());
        self.send_once(body, Some(&id)).await
    }
}

impl TorrentSink for TransmissionClient {
    async fn add_torrent(&self, descriptor: &TorrentDescriptor) -> Result<AddedTorrent, SubmitError> {
        let arguments = match descriptor {
            // Transmission accepts magnet URIs through the "filename" field.
            TorrentDescriptor::Magnet(uri) => json!({ "filename": uri }),
            TorrentDescriptor::Metainfo(base64) => json!({ "metainfo": base64 }),
        };
        let body = json!({ "method": "torrent-add", "arguments": arguments });

        debug!("Submitting torrent-add request to {}", self.rpc_url);
        let response = self.call(&body).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SubmitError::Unauthorized);
        }
        if !status.is_success() {
            return Err(SubmitError::Other(format!("unexpected status {status}")));
        }

        let reply: RpcReply = response
            .json()
            .await
            .map_err(|e| SubmitError::Other(format!("malformed RPC response: {e}")))?;
        if reply.result != "success" {
            return Err(SubmitError::Rejected(reply.result));
        }

        let torrent = reply
            .arguments
            .torrent_added
            .or(reply.arguments.torrent_duplicate)
            .ok_or_else(|| SubmitError::Rejected("no torrent returned".to_string()))?;
        debug!("Backend accepted torrent \"{}\"", torrent.name);

        Ok(AddedTorrent { name: torrent.name })
    }
}

/// Maps reqwest transport errors to submit errors.
fn map_transport_error(err: reqwest::Error) -> SubmitError {
    SubmitError::Network(err.to_string())
}
