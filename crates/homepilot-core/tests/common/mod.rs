#![allow(clippy::unwrap_used, dead_code)]
// Shared fixtures: a wiremock gateway and a recording framework.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use homepilot_api::GatewayClient;
use homepilot_core::{AccessoryId, Platform, PlatformAccessory};

pub const ENDPOINT: &str = "/deviceajax.do";
pub const SHUTTER_PRODUCT: &str = "RolloTron Schaltaktor 2-Kanal";

// ── Gateway ─────────────────────────────────────────────────────────

pub async fn gateway() -> (MockServer, Arc<GatewayClient>) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}{ENDPOINT}", server.uri())).unwrap();
    let client = GatewayClient::with_client(reqwest::Client::new(), base_url);
    (server, Arc::new(client))
}

/// A client aimed at a local port with nothing listening on it.
pub fn unreachable_gateway() -> Arc<GatewayClient> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base_url = Url::parse(&format!("http://{addr}{ENDPOINT}")).unwrap();
    Arc::new(GatewayClient::with_client(reqwest::Client::new(), base_url))
}

pub fn device(serial: &str, name: &str, description: &str, product: &str, position: u8) -> Value {
    json!({
        "productName": product,
        "serial": serial,
        "did": format!("did-{serial}"),
        "name": name,
        "description": description,
        "position": position
    })
}

pub fn shutter(serial: &str, position: u8) -> Value {
    device(serial, &format!("Shutter {serial}"), "", SHUTTER_PRODUCT, position)
}

pub async fn mount_devices(server: &MockServer, devices: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("devices", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "devices": devices })))
        .mount(server)
        .await;
}

pub async fn mount_move(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

// ── Framework ───────────────────────────────────────────────────────

/// Records every register / unregister call.
#[derive(Default)]
pub struct RecordingPlatform {
    pub registered: Mutex<Vec<Arc<PlatformAccessory>>>,
    pub unregistered: Mutex<Vec<AccessoryId>>,
}

impl RecordingPlatform {
    pub fn registered_ids(&self) -> Vec<AccessoryId> {
        self.registered.lock().unwrap().iter().map(|a| a.id()).collect()
    }

    pub fn unregistered_ids(&self) -> Vec<AccessoryId> {
        self.unregistered.lock().unwrap().clone()
    }
}

impl Platform for RecordingPlatform {
    fn register_accessories(&self, accessories: &[Arc<PlatformAccessory>]) {
        self.registered
            .lock()
            .unwrap()
            .extend(accessories.iter().cloned());
    }

    fn unregister_accessories(&self, accessories: &[Arc<PlatformAccessory>]) {
        self.unregistered
            .lock()
            .unwrap()
            .extend(accessories.iter().map(|a| a.id()));
    }
}
