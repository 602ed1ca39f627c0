//! Bridge logic between `homepilot-api` and a smart-home accessory framework.
//!
//! - **[`AccessoryRegistry`]**: Owns the mapping from accessory identity to
//!   accessory. The framework [`restore()`](AccessoryRegistry::restore)s its
//!   persisted accessories first, then [`discover()`](AccessoryRegistry::discover)
//!   polls the gateway once and either reconciles each supported device with
//!   its restored accessory or registers a new one.
//!
//! - **[`ShutterAccessory`]**: Wraps one physical shutter. Translates the
//!   framework's get/set calls into gateway polls and `goto` commands, and
//!   keeps the published motion state in step.
//!
//! - **[`Platform`]**: The framework seam. Registration, unregistration,
//!   and identity derivation are injected through this trait; characteristic
//!   values live on [`PlatformAccessory`] as `watch` channels with a
//!   `broadcast` feed of every change.
//!
//! - **Domain model** ([`model`]): [`Position`] keeps the gateway and
//!   accessory percentage conventions apart; [`AccessoryId`] is the
//!   serial-derived join key that survives restarts.

pub mod config;
pub mod error;
pub mod model;
pub mod platform;
pub mod registry;
pub mod shutter;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{BridgeConfig, TlsVerification};
pub use error::CoreError;
pub use model::{AccessoryId, Position, PositionState};
pub use platform::{
    AccessoryContext, Characteristic, CharacteristicChange, CharacteristicValue, Platform,
    PlatformAccessory, WindowCoveringService,
};
pub use registry::{AccessoryRegistry, DiscoveryReport, RegistryEntry};
pub use shutter::ShutterAccessory;
