//! Pushbullet REST client implementation.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use pushferry_types::{Device, MessageFilter, NotificationSource, NotifyError, RawMessage};

use crate::conversions::{WireDevice, WireDeviceList, WirePushList};

const DEFAULT_API_BASE: &str = "https://api.pushbullet.com/v2";
const ACCESS_TOKEN_HEADER: &str = "Access-Token";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// PushbulletClient is a notification source backed by the Pushbullet v2
/// REST API.
#[allow(missing_debug_implementations)]
pub struct PushbulletClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

#[derive(Debug, Serialize)]
struct NotePayload<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    device_iden: &'a str,
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct DevicePayload<'a> {
    nickname: &'a str,
    model: &'a str,
}

impl PushbulletClient {
    /// Create a client against the production Pushbullet API.
    pub fn new(token: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_base_url(token, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base URL. This is primarily
    /// useful for testing against a local mock server.
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, NotifyError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| NotifyError::Other(format!("invalid API base URL: {e}")))?;
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(map_transport_error)?;
        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, NotifyError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NotifyError::Other("API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(path);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, NotifyError> {
        let response = self
            .client
            .get(self.endpoint(path)?)
            .header(ACCESS_TOKEN_HEADER, &self.token)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, NotifyError> {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .header(ACCESS_TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, NotifyError> {
        match response.status() {
            status if status.is_success() => response
                .json::<T>()
                .await
                .map_err(|e| NotifyError::Other(format!("malformed response: {e}"))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(NotifyError::Unauthorized),
            status => Err(NotifyError::ServerError(format!("unexpected status {status}"))),
        }
    }
}

impl NotificationSource for PushbulletClient {
    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<RawMessage>, NotifyError> {
        // Pushbullet only filters by modification time and active state
        // server-side; the kind filter is applied here.
        let modified_after = filter.modified_since.timestamp_millis() as f64 / 1000.0;
        let mut query = vec![("modified_after", modified_after.to_string())];
        if filter.active_only {
            query.push(("active", "true".to_string()));
        }

        debug!("Listing pushes modified after {modified_after}");
        let list: WirePushList = self.get_json("pushes", &query).await?;
        let messages = list
            .pushes
            .into_iter()
            .filter_map(|push| push.into_message())
            .filter(|msg| filter.kinds.contains(&msg.kind))
            .collect::<Vec<_>>();
        debug!("{} pushes matched the kind filter", messages.len());

        Ok(messages)
    }

    async fn post_message(
        &self,
        device_id: &str,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        debug!("Posting note to device {device_id}");
        let payload = NotePayload {
            kind: "note",
            device_iden: device_id,
            title,
            body,
        };
        let _: serde_json::Value = self.post_json("pushes", &payload).await?;
        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<Device>, NotifyError> {
        debug!("Listing devices");
        let list: WireDeviceList = self.get_json("devices", &[]).await?;
        Ok(list
            .devices
            .into_iter()
            .filter(|d| d.active)
            .map(|d| d.into_device())
            .collect())
    }

    async fn create_device(&self, nickname: &str) -> Result<Device, NotifyError> {
        debug!("Registering device \"{nickname}\"");
        let payload = DevicePayload {
            nickname,
            model: "pushferry",
        };
        let device: WireDevice = self.post_json("devices", &payload).await?;
        Ok(device.into_device())
    }
}

/// Maps reqwest transport errors to notification errors.
fn map_transport_error(err: reqwest::Error) -> NotifyError {
    NotifyError::Network(err.to_string())
}
