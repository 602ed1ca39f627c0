// ── Core error types ──
//
// What the framework's get/set handlers see. Every variant renders as
// "Request failed: ..." so a UI can show one uniform failure, while
// callers that care can still match on the cause.
// The `From<homepilot_api::Error>` impl collapses transport-layer errors
// into the bridge taxonomy: transport, protocol, rejected command.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Gateway errors ───────────────────────────────────────────────
    /// Network failure, connection refused, or timeout.
    #[error("Request failed: cannot reach gateway: {reason}")]
    Transport { reason: String },

    /// Malformed body or unexpected response shape.
    #[error("Request failed: unexpected gateway response: {message}")]
    Protocol { message: String },

    /// Move command answered with a status other than 200.
    #[error("Request failed: gateway rejected command (HTTP {status})")]
    CommandRejected { status: u16 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Request failed: device {serial} is no longer reported by the gateway")]
    DeviceNotFound { serial: String },

    #[error("Request failed: position {value} is outside 0..=100")]
    InvalidPosition { value: u16 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<homepilot_api::Error> for CoreError {
    fn from(err: homepilot_api::Error) -> Self {
        match err {
            homepilot_api::Error::Transport(ref e) => CoreError::Transport {
                reason: e.to_string(),
            },
            homepilot_api::Error::Timeout { timeout_ms } => CoreError::Transport {
                reason: format!("timed out after {timeout_ms}ms"),
            },
            homepilot_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            homepilot_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            homepilot_api::Error::Gateway { status, message } => CoreError::Protocol {
                message: format!("HTTP {status}: {message}"),
            },
            homepilot_api::Error::CommandRejected { status } => {
                CoreError::CommandRejected { status }
            }
            homepilot_api::Error::Deserialization { message, body: _ } => {
                CoreError::Protocol { message }
            }
        }
    }
}
