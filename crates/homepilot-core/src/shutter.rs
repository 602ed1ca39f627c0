// ── Shutter accessory ──
//
// Binds one `PlatformAccessory` to one gateway device. Reads re-poll the
// full device list and pick this serial out of it; writes send a `goto`
// command and publish the outcome. Positions leave the gateway through
// `Position::from_gateway` and enter it through `Position::to_gateway`,
// nowhere else.

use std::sync::Arc;

use homepilot_api::{GatewayClient, GatewayDevice};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{AccessoryId, Position, PositionState};
use crate::platform::{AccessoryContext, PlatformAccessory, WindowCoveringService};

const MANUFACTURER: &str = "Rademacher";

#[derive(Debug, Clone, Copy)]
struct ShutterState {
    /// Last confirmed position.
    last_position: Position,
    /// Most recent commanded or polled target.
    current_target_position: Position,
    current_position_state: PositionState,
}

/// A gateway shutter exposed as a window-covering accessory.
pub struct ShutterAccessory {
    accessory: Arc<PlatformAccessory>,
    service: Arc<WindowCoveringService>,
    serial: String,
    did: String,
    gateway: Arc<GatewayClient>,
    state: Mutex<ShutterState>,
}

impl ShutterAccessory {
    /// Wrap `accessory` around `device`.
    ///
    /// Fills in the accessory information, publishes the gateway-reported
    /// position as both current and target, sets the motion state to
    /// stopped and marks the accessory reachable.
    pub fn new(
        accessory: Arc<PlatformAccessory>,
        device: &GatewayDevice,
        gateway: Arc<GatewayClient>,
    ) -> Result<Self, CoreError> {
        let position = Position::from_gateway(device.position)?;

        accessory.set_context(AccessoryContext {
            manufacturer: MANUFACTURER.into(),
            model: device.product_name.clone(),
            serial: device.serial.clone(),
        });

        let display_name = accessory.display_name().to_owned();
        let service = Arc::clone(accessory.add_window_covering(&display_name));
        service.set_current_position(position);
        service.set_target_position(position);
        service.set_position_state(PositionState::Stopped);

        accessory.update_reachability(true);

        Ok(Self {
            serial: device.serial.clone(),
            did: device.did.clone(),
            gateway,
            state: Mutex::new(ShutterState {
                last_position: position,
                current_target_position: position,
                current_position_state: PositionState::Stopped,
            }),
            accessory,
            service,
        })
    }

    pub fn id(&self) -> AccessoryId {
        self.accessory.id()
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn display_name(&self) -> &str {
        self.accessory.display_name()
    }

    /// The wrapped framework accessory.
    pub fn accessory(&self) -> &Arc<PlatformAccessory> {
        &self.accessory
    }

    // ── Framework handlers ───────────────────────────────────────

    /// Poll the gateway for this shutter's position.
    pub async fn current_position(&self) -> Result<Position, CoreError> {
        debug!(name = self.display_name(), "getting current position");
        self.poll_position().await
    }

    /// Poll the gateway for this shutter's position and remember it as
    /// the current target.
    pub async fn target_position(&self) -> Result<Position, CoreError> {
        debug!(name = self.display_name(), "getting target position");
        let position = self.poll_position().await?;
        self.state.lock().await.current_target_position = position;
        Ok(position)
    }

    /// Command the shutter to `value`.
    ///
    /// The direction is published before the command goes out. On HTTP 200
    /// the target becomes the current position and motion stops. On any
    /// failure the direction stays published as is.
    pub async fn set_target_position(&self, value: Position) -> Result<Position, CoreError> {
        debug!(name = self.display_name(), %value, "setting target position");

        let direction = {
            let mut state = self.state.lock().await;
            state.current_target_position = value;
            state.current_position_state = PositionState::towards(state.last_position, value);
            state.current_position_state
        };
        self.service.set_position_state(direction);

        if let Err(e) = self.gateway.move_to(&self.did, value.to_gateway()).await {
            warn!(serial = %self.serial, error = %e, "move command failed");
            return Err(e.into());
        }

        self.service.set_current_position(value);
        self.service.set_position_state(PositionState::Stopped);
        {
            let mut state = self.state.lock().await;
            state.last_position = value;
            state.current_position_state = PositionState::Stopped;
        }
        Ok(value)
    }

    /// The cached motion state. No gateway call.
    pub async fn position_state(&self) -> PositionState {
        self.state.lock().await.current_position_state
    }

    /// Last position confirmed by a successful command or construction.
    pub async fn last_position(&self) -> Position {
        self.state.lock().await.last_position
    }

    pub async fn current_target_position(&self) -> Position {
        self.state.lock().await.current_target_position
    }

    async fn poll_position(&self) -> Result<Position, CoreError> {
        let devices = self.gateway.list_devices().await?;
        let device = devices
            .iter()
            .find(|d| d.serial == self.serial)
            .ok_or_else(|| CoreError::DeviceNotFound {
                serial: self.serial.clone(),
            })?;
        Position::from_gateway(device.position)
    }
}

impl std::fmt::Debug for ShutterAccessory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutterAccessory")
            .field("accessory", &self.accessory)
            .field("serial", &self.serial)
            .field("did", &self.did)
            .finish_non_exhaustive()
    }
}
