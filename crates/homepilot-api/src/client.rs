// Gateway HTTP client
//
// Wraps `reqwest::Client` with the gateway's single-endpoint conventions:
// the device listing is a GET with `?devices=1`, commands are form-encoded
// POSTs against the same base URL.

use std::time::Duration;

use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::models::{DeviceList, GatewayDevice, MoveCommand};
use crate::transport::{DEFAULT_POLL_TIMEOUT, TransportConfig};

/// Raw HTTP client for the HomePilot gateway.
///
/// Stateless apart from the configured `reqwest::Client`; every call is a
/// fresh request. Cheap to share behind an `Arc`.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
    poll_timeout: Duration,
}

impl GatewayClient {
    /// Create a new gateway client from a `TransportConfig`.
    ///
    /// `base_url` is the gateway endpoint, e.g. `http://192.168.1.10/deviceajax.do`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            poll_timeout: transport.poll_timeout,
        })
    }

    /// Create a gateway client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Override the per-request timeout of the device listing.
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn devices_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("devices", "1");
        url
    }

    /// Fetch every device the gateway knows about.
    ///
    /// `GET <base>?devices=1`, bounded by the poll timeout.
    pub async fn list_devices(&self) -> Result<Vec<GatewayDevice>, Error> {
        let url = self.devices_url();
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .timeout(self.poll_timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "device listing failed");
            return Err(Error::Gateway {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;
        let list: DeviceList = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        trace!(count = list.devices.len(), "device listing parsed");
        Ok(list.devices)
    }

    /// Drive a device towards `position` (gateway convention).
    ///
    /// `POST <base>` with `cid=9&did=<did>&command=1&goto=<position>`.
    /// Only HTTP 200 counts as success. No retry.
    pub async fn move_to(&self, did: &str, position: u8) -> Result<(), Error> {
        debug!(did, position, "POST {}", self.base_url);

        let resp = self
            .http
            .post(self.base_url.clone())
            .form(&MoveCommand::goto(did, position))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::OK {
            Ok(())
        } else {
            warn!(did, status = status.as_u16(), "move command rejected");
            Err(Error::CommandRejected {
                status: status.as_u16(),
            })
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_ms: u64::try_from(self.poll_timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            Error::Transport(err)
        }
    }
}
