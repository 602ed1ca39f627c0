#![allow(clippy::unwrap_used)]
// ShutterAccessory get/set handlers against a wiremock gateway.

mod common;

use std::sync::Arc;

use homepilot_api::{GatewayClient, GatewayDevice};
use pretty_assertions::assert_eq;
use wiremock::matchers::{any, body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use homepilot_core::{
    AccessoryId, Characteristic, CharacteristicChange, CharacteristicValue, CoreError,
    PlatformAccessory, Position, PositionState, ShutterAccessory,
};

use common::{
    ENDPOINT, SHUTTER_PRODUCT, gateway, mount_devices, mount_move, unreachable_gateway,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn record(serial: &str, gateway_position: u8) -> GatewayDevice {
    GatewayDevice {
        serial: serial.into(),
        did: format!("did-{serial}"),
        name: format!("Shutter {serial}"),
        description: String::new(),
        product_name: SHUTTER_PRODUCT.into(),
        position: gateway_position,
    }
}

fn shutter_on(client: Arc<GatewayClient>, gateway_position: u8) -> ShutterAccessory {
    let accessory = Arc::new(PlatformAccessory::new(
        "Shutter S1",
        AccessoryId::from_serial("S1"),
    ));
    ShutterAccessory::new(accessory, &record("S1", gateway_position), client).unwrap()
}

async fn setup(gateway_position: u8) -> (MockServer, ShutterAccessory) {
    let (server, client) = gateway().await;
    (server, shutter_on(client, gateway_position))
}

fn position(value: u8) -> Position {
    Position::new(value).unwrap()
}

fn drain(
    rx: &mut tokio::sync::broadcast::Receiver<CharacteristicChange>,
) -> Vec<(Characteristic, CharacteristicValue)> {
    let mut changes = Vec::new();
    while let Ok(change) = rx.try_recv() {
        changes.push((change.characteristic, change.value));
    }
    changes
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_current_position_inverts_gateway_value() {
    let (server, shutter) = setup(0).await;
    mount_devices(
        &server,
        vec![common::shutter("OTHER", 90), common::shutter("S1", 40)],
    )
    .await;

    let current = shutter.current_position().await.unwrap();

    assert_eq!(current.value(), 60);
}

#[tokio::test]
async fn test_target_position_records_target() {
    let (server, shutter) = setup(0).await;
    mount_devices(&server, vec![common::shutter("S1", 15)]).await;

    let target = shutter.target_position().await.unwrap();

    assert_eq!(target.value(), 85);
    assert_eq!(shutter.current_target_position().await.value(), 85);
}

#[tokio::test]
async fn test_missing_serial_settles_with_not_found() {
    let (server, shutter) = setup(0).await;
    mount_devices(&server, vec![common::shutter("S2", 40)]).await;

    let result = shutter.current_position().await;

    assert!(
        matches!(result, Err(CoreError::DeviceNotFound { ref serial }) if serial == "S1"),
        "expected DeviceNotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn test_poll_transport_failure_propagates() {
    let shutter = shutter_on(unreachable_gateway(), 0);

    let current = shutter.current_position().await;
    let target = shutter.target_position().await;

    assert!(matches!(current, Err(CoreError::Transport { .. })), "got: {current:?}");
    assert!(matches!(target, Err(CoreError::Transport { .. })), "got: {target:?}");
}

#[tokio::test]
async fn test_position_state_needs_no_gateway() {
    let (server, shutter) = setup(0).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(shutter.position_state().await, PositionState::Stopped);
    server.verify().await;
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_target_increasing_then_stopped() {
    // Accessory position 30 == gateway position 70.
    let (server, shutter) = setup(70).await;
    assert_eq!(shutter.last_position().await.value(), 30);

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string("cid=9&did=did-S1&command=1&goto=30"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut rx = shutter.accessory().subscribe();
    let result = shutter.set_target_position(position(70)).await.unwrap();

    assert_eq!(result.value(), 70);
    assert_eq!(
        drain(&mut rx),
        vec![
            (
                Characteristic::PositionState,
                CharacteristicValue::State(PositionState::Increasing)
            ),
            (
                Characteristic::CurrentPosition,
                CharacteristicValue::Position(position(70))
            ),
            (
                Characteristic::PositionState,
                CharacteristicValue::State(PositionState::Stopped)
            ),
        ]
    );
    assert_eq!(shutter.last_position().await.value(), 70);
    assert_eq!(shutter.position_state().await, PositionState::Stopped);
}

#[tokio::test]
async fn test_set_target_decreasing() {
    let (server, shutter) = setup(30).await;
    assert_eq!(shutter.last_position().await.value(), 70);
    mount_move(&server, 200).await;

    let mut rx = shutter.accessory().subscribe();
    shutter.set_target_position(position(20)).await.unwrap();

    let changes = drain(&mut rx);
    assert_eq!(
        changes.first(),
        Some(&(
            Characteristic::PositionState,
            CharacteristicValue::State(PositionState::Decreasing)
        ))
    );
    assert_eq!(shutter.last_position().await.value(), 20);
}

#[tokio::test]
async fn test_set_target_transport_failure_leaves_motion_state() {
    let shutter = shutter_on(unreachable_gateway(), 70);

    let result = shutter.set_target_position(position(70)).await;

    assert!(matches!(result, Err(CoreError::Transport { .. })), "got: {result:?}");
    assert_eq!(shutter.position_state().await, PositionState::Increasing);
    assert_eq!(
        shutter.accessory().window_covering().unwrap().position_state(),
        PositionState::Increasing
    );
    assert_eq!(shutter.last_position().await.value(), 30);
}

#[tokio::test]
async fn test_set_target_non_200_settles_with_rejection() {
    let (server, shutter) = setup(70).await;
    mount_move(&server, 500).await;

    let result = shutter.set_target_position(position(10)).await;

    assert!(
        matches!(result, Err(CoreError::CommandRejected { status: 500 })),
        "expected CommandRejected, got: {result:?}"
    );
    assert_eq!(shutter.position_state().await, PositionState::Decreasing);
    assert_eq!(shutter.last_position().await.value(), 30);
}

#[tokio::test]
async fn test_commands_publish_on_the_attached_service() {
    let (server, client) = gateway().await;
    mount_move(&server, 200).await;

    let accessory = Arc::new(PlatformAccessory::new(
        "Cached Shutter",
        AccessoryId::from_serial("S1"),
    ));
    let attached = Arc::clone(accessory.add_window_covering("Cached Shutter"));
    let shutter =
        ShutterAccessory::new(Arc::clone(&accessory), &record("S1", 100), client).unwrap();

    shutter.set_target_position(position(40)).await.unwrap();

    assert!(Arc::ptr_eq(accessory.window_covering().unwrap(), &attached));
    assert_eq!(attached.current_position().value(), 40);
    assert_eq!(attached.position_state(), PositionState::Stopped);
}

#[tokio::test]
async fn test_end_to_end_set_then_read() {
    let (server, shutter) = setup(100).await;
    mount_move(&server, 200).await;
    shutter.set_target_position(position(100)).await.unwrap();

    mount_devices(&server, vec![common::shutter("S1", 0)]).await;
    let current = shutter.current_position().await.unwrap();

    assert_eq!(current, Position::OPEN);
    assert_eq!(
        shutter.accessory().window_covering().unwrap().current_position(),
        Position::OPEN
    );
}
