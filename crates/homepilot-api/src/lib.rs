// homepilot-api: Async Rust client for the HomePilot gateway endpoint

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::GatewayClient;
pub use error::Error;
pub use models::{DeviceList, GatewayDevice, MoveCommand};
pub use transport::{TlsMode, TransportConfig};
