// ── Runtime bridge configuration ──
//
// Describes *how* to reach the gateway. Never touches disk; the
// `homepilot-config` crate builds a `BridgeConfig` and hands it in.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use homepilot_api::transport::{DEFAULT_POLL_TIMEOUT, DEFAULT_TIMEOUT, TlsMode, TransportConfig};
use homepilot_api::GatewayClient;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Default: the gateway is an unauthenticated LAN
    /// appliance, typically plain HTTP or self-signed.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for one gateway.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Gateway endpoint (e.g., `http://192.168.1.10/deviceajax.do`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout of the device listing.
    pub poll_timeout: Duration,
    /// Client-wide timeout; the only bound on move commands.
    pub timeout: Duration,
}

impl BridgeConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a [`TransportConfig`] from this configuration.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: tls_to_transport(&self.tls),
            timeout: self.timeout,
            poll_timeout: self.poll_timeout,
        }
    }

    /// Build the shared gateway client.
    pub fn gateway_client(&self) -> Result<Arc<GatewayClient>, CoreError> {
        let client = GatewayClient::new(self.url.clone(), &self.transport())?;
        Ok(Arc::new(client))
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
