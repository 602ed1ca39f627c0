use thiserror::Error;

/// Top-level error type for the `homepilot-api` crate.
///
/// Covers every failure mode of the two gateway calls: transport,
/// malformed device listings, and rejected move commands.
/// `homepilot-core` maps these into the bridge's user-facing taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Gateway ─────────────────────────────────────────────────────
    /// Device listing answered with a non-success HTTP status.
    #[error("Gateway error (HTTP {status}): {message}")]
    Gateway { status: u16, message: String },

    /// Move command answered with anything other than HTTP 200.
    #[error("Gateway rejected command (HTTP {status})")]
    CommandRejected { status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// The body was not JSON or lacked the `devices` array, with the raw
    /// body kept for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` for network-level failures (refused, unreachable, timed out).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the gateway answered but the payload was unusable.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Deserialization { .. } | Self::Gateway { .. })
    }

    /// The HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Gateway { status, .. } | Self::CommandRejected { status } => Some(*status),
            _ => None,
        }
    }
}
