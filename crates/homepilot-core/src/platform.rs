// ── Accessory framework seam ──
//
// The framework is an external collaborator. It hands its capabilities to
// the bridge through `Platform` and owns the lifetime of every
// `PlatformAccessory`. Characteristic values are `watch` channels; each
// change is also pushed on a per-accessory `broadcast` feed so observers
// see publication order, not just the latest value.

use std::sync::{Arc, OnceLock};

use tokio::sync::{broadcast, watch};
use tracing::trace;

use crate::model::{AccessoryId, Position, PositionState};

const CHANGE_CHANNEL_SIZE: usize = 64;

/// Capabilities the accessory framework provides to the bridge.
///
/// Passed into [`AccessoryRegistry`](crate::AccessoryRegistry) at
/// construction instead of living in process-wide globals.
pub trait Platform: Send + Sync {
    /// Make newly discovered accessories visible (and persisted) in the framework.
    fn register_accessories(&self, accessories: &[Arc<PlatformAccessory>]);

    /// Drop accessories from the framework and its persisted cache.
    fn unregister_accessories(&self, accessories: &[Arc<PlatformAccessory>]);

    /// Identity for the accessory backing a device serial.
    fn accessory_id(&self, serial: &str) -> AccessoryId {
        AccessoryId::from_serial(serial)
    }
}

// ── Characteristics ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Characteristic {
    Manufacturer,
    Model,
    SerialNumber,
    CurrentPosition,
    TargetPosition,
    PositionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacteristicValue {
    Text(String),
    Position(Position),
    State(PositionState),
}

/// One published characteristic update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicChange {
    pub accessory: AccessoryId,
    pub characteristic: Characteristic,
    pub value: CharacteristicValue,
}

/// Accessory information kept in the framework-persisted context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessoryContext {
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
}

// ── PlatformAccessory ────────────────────────────────────────────

/// Framework-side representation of one physical device.
///
/// Created either by the framework (restored from its cache) or by the
/// registry (newly discovered). Shared as `Arc<PlatformAccessory>`.
pub struct PlatformAccessory {
    id: AccessoryId,
    display_name: String,
    context: watch::Sender<AccessoryContext>,
    reachable: watch::Sender<bool>,
    window_covering: OnceLock<Arc<WindowCoveringService>>,
    changes: broadcast::Sender<CharacteristicChange>,
}

impl PlatformAccessory {
    pub fn new(display_name: impl Into<String>, id: AccessoryId) -> Self {
        let (context, _) = watch::channel(AccessoryContext::default());
        let (reachable, _) = watch::channel(false);
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_SIZE);

        Self {
            id,
            display_name: display_name.into(),
            context,
            reachable,
            window_covering: OnceLock::new(),
            changes,
        }
    }

    pub fn id(&self) -> AccessoryId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    // ── Accessory information ────────────────────────────────────

    pub fn context(&self) -> AccessoryContext {
        self.context.borrow().clone()
    }

    /// Replace the accessory information and publish each field.
    pub fn set_context(&self, context: AccessoryContext) {
        let fields = [
            (Characteristic::Manufacturer, &context.manufacturer),
            (Characteristic::Model, &context.model),
            (Characteristic::SerialNumber, &context.serial),
        ];
        for (characteristic, value) in fields {
            self.publish(characteristic, CharacteristicValue::Text(value.clone()));
        }
        self.context.send_replace(context);
    }

    // ── Reachability ─────────────────────────────────────────────

    pub fn update_reachability(&self, reachable: bool) {
        self.reachable.send_replace(reachable);
    }

    pub fn is_reachable(&self) -> bool {
        *self.reachable.borrow()
    }

    // ── Services ─────────────────────────────────────────────────

    /// Attach the window-covering service. Returns the existing one if
    /// the accessory already carries it (e.g. restored from cache).
    pub fn add_window_covering(&self, name: &str) -> &Arc<WindowCoveringService> {
        self.window_covering.get_or_init(|| {
            Arc::new(WindowCoveringService::new(
                name,
                self.id,
                self.changes.clone(),
            ))
        })
    }

    pub fn window_covering(&self) -> Option<&Arc<WindowCoveringService>> {
        self.window_covering.get()
    }

    // ── Change feed ──────────────────────────────────────────────

    /// Subscribe to every characteristic change published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CharacteristicChange> {
        self.changes.subscribe()
    }

    fn publish(&self, characteristic: Characteristic, value: CharacteristicValue) {
        publish(&self.changes, self.id, characteristic, value);
    }
}

impl std::fmt::Debug for PlatformAccessory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformAccessory")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("reachable", &self.is_reachable())
            .finish_non_exhaustive()
    }
}

// ── WindowCoveringService ────────────────────────────────────────

/// The shutter service: current position, target position, motion state.
pub struct WindowCoveringService {
    name: String,
    accessory: AccessoryId,
    current_position: watch::Sender<Position>,
    target_position: watch::Sender<Position>,
    position_state: watch::Sender<PositionState>,
    changes: broadcast::Sender<CharacteristicChange>,
}

impl WindowCoveringService {
    fn new(
        name: &str,
        accessory: AccessoryId,
        changes: broadcast::Sender<CharacteristicChange>,
    ) -> Self {
        let (current_position, _) = watch::channel(Position::CLOSED);
        let (target_position, _) = watch::channel(Position::CLOSED);
        let (position_state, _) = watch::channel(PositionState::Stopped);

        Self {
            name: name.to_owned(),
            accessory,
            current_position,
            target_position,
            position_state,
            changes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_position(&self) -> Position {
        *self.current_position.borrow()
    }

    pub fn target_position(&self) -> Position {
        *self.target_position.borrow()
    }

    pub fn position_state(&self) -> PositionState {
        *self.position_state.borrow()
    }

    pub fn set_current_position(&self, position: Position) {
        self.current_position.send_replace(position);
        self.publish(
            Characteristic::CurrentPosition,
            CharacteristicValue::Position(position),
        );
    }

    pub fn set_target_position(&self, position: Position) {
        self.target_position.send_replace(position);
        self.publish(
            Characteristic::TargetPosition,
            CharacteristicValue::Position(position),
        );
    }

    pub fn set_position_state(&self, state: PositionState) {
        self.position_state.send_replace(state);
        self.publish(
            Characteristic::PositionState,
            CharacteristicValue::State(state),
        );
    }

    pub fn watch_current_position(&self) -> watch::Receiver<Position> {
        self.current_position.subscribe()
    }

    pub fn watch_position_state(&self) -> watch::Receiver<PositionState> {
        self.position_state.subscribe()
    }

    fn publish(&self, characteristic: Characteristic, value: CharacteristicValue) {
        publish(&self.changes, self.accessory, characteristic, value);
    }
}

fn publish(
    changes: &broadcast::Sender<CharacteristicChange>,
    accessory: AccessoryId,
    characteristic: Characteristic,
    value: CharacteristicValue,
) {
    trace!(%accessory, %characteristic, ?value, "characteristic updated");
    // No subscribers is fine; the watch channels still hold the value.
    let _ = changes.send(CharacteristicChange {
        accessory,
        characteristic,
        value,
    });
}
