// ── Accessory registry ──
//
// Maps accessory identity to accessory. Entries start either as
// `Restored` (handed over by the framework from its cache) or are created
// during discovery; discovery turns every supported, reported device into
// a `Reconciled` shutter. Runs once per registry.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use homepilot_api::{GatewayClient, GatewayDevice};
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::error::CoreError;
use crate::model::AccessoryId;
use crate::platform::{Platform, PlatformAccessory};
use crate::shutter::ShutterAccessory;

/// Product-type substring of the supported actuator family.
pub const SUPPORTED_PRODUCT: &str = "Schaltaktor 2-Kanal";

/// A registry slot.
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    /// Restored from the framework cache, not yet matched to a device.
    Restored(Arc<PlatformAccessory>),
    /// Linked to live gateway data.
    Reconciled(Arc<ShutterAccessory>),
}

impl RegistryEntry {
    pub fn accessory(&self) -> &Arc<PlatformAccessory> {
        match self {
            Self::Restored(accessory) => accessory,
            Self::Reconciled(shutter) => shutter.accessory(),
        }
    }

    pub fn is_reconciled(&self) -> bool {
        matches!(self, Self::Reconciled(_))
    }
}

/// What a discovery pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// New accessories registered with the framework.
    pub found: Vec<AccessoryId>,
    /// Restored accessories linked to a reported device.
    pub online: Vec<AccessoryId>,
    /// Serials of devices outside the supported product family.
    pub skipped: Vec<String>,
    /// Restored accessories the gateway did not report. Left registered.
    pub stale: Vec<AccessoryId>,
}

/// Owner of every accessory the bridge exposes.
pub struct AccessoryRegistry {
    platform: Arc<dyn Platform>,
    gateway: Arc<GatewayClient>,
    entries: DashMap<AccessoryId, RegistryEntry>,
    discovered: AtomicBool,
}

impl AccessoryRegistry {
    pub fn new(platform: Arc<dyn Platform>, gateway: Arc<GatewayClient>) -> Self {
        Self {
            platform,
            gateway,
            entries: DashMap::new(),
            discovered: AtomicBool::new(false),
        }
    }

    /// Build a registry with a gateway client derived from `config`.
    pub fn from_config(
        config: &BridgeConfig,
        platform: Arc<dyn Platform>,
    ) -> Result<Self, CoreError> {
        Ok(Self::new(platform, config.gateway_client()?))
    }

    // ── Framework lifecycle ──────────────────────────────────────

    /// Take over an accessory the framework restored from its cache.
    pub fn restore(&self, accessory: Arc<PlatformAccessory>) {
        debug!(id = %accessory.id(), name = accessory.display_name(), "restored accessory");
        self.entries
            .insert(accessory.id(), RegistryEntry::Restored(accessory));
    }

    /// Poll the gateway once and reconcile every supported device.
    ///
    /// Call after the framework has restored its cached accessories.
    /// Later calls are no-ops returning an empty report; a failed poll
    /// leaves the registry undiscovered so the caller may try again.
    pub async fn discover(&self) -> Result<DiscoveryReport, CoreError> {
        if self.discovered.swap(true, Ordering::SeqCst) {
            debug!("discovery already ran");
            return Ok(DiscoveryReport::default());
        }

        let devices = match self.gateway.list_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                self.discovered.store(false, Ordering::SeqCst);
                warn!(error = %e, "device discovery failed");
                return Err(e.into());
            }
        };

        let mut report = DiscoveryReport::default();
        let mut seen = HashSet::new();

        for device in &devices {
            if !is_supported(device) {
                debug!(serial = %device.serial, product = %device.product_name, "unsupported device");
                report.skipped.push(device.serial.clone());
                continue;
            }

            let id = self.platform.accessory_id(&device.serial);
            seen.insert(id);

            let existing = self.entries.get(&id).map(|entry| entry.value().clone());
            let outcome = match existing {
                None => self.add_accessory(device, id).map(|()| report.found.push(id)),
                Some(RegistryEntry::Restored(accessory)) => {
                    info!("Online: {} [{}]", accessory.display_name(), device.serial);
                    self.reconcile(accessory, device)
                        .map(|()| report.online.push(id))
                }
                Some(RegistryEntry::Reconciled(_)) => Ok(()),
            };

            if let Err(e) = outcome {
                warn!(serial = %device.serial, error = %e, "skipping device");
            }
        }

        report.stale = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_reconciled() && !seen.contains(entry.key()))
            .map(|entry| *entry.key())
            .collect();

        for id in &report.stale {
            warn!(%id, "restored accessory not reported by gateway");
        }

        info!(
            found = report.found.len(),
            online = report.online.len(),
            stale = report.stale.len(),
            "discovery complete"
        );
        Ok(report)
    }

    /// Drop an accessory from the registry and unregister it from the framework.
    pub fn remove(&self, accessory: &Arc<PlatformAccessory>) {
        info!("[{}] Removed from bridge.", accessory.display_name());
        self.entries.remove(&accessory.id());
        self.platform
            .unregister_accessories(std::slice::from_ref(accessory));
    }

    // ── Lookups ──────────────────────────────────────────────────

    /// The reconciled shutter for `id`, if discovery linked one.
    pub fn shutter(&self, id: &AccessoryId) -> Option<Arc<ShutterAccessory>> {
        match self.entries.get(id)?.value() {
            RegistryEntry::Reconciled(shutter) => Some(Arc::clone(shutter)),
            RegistryEntry::Restored(_) => None,
        }
    }

    pub fn entry(&self, id: &AccessoryId) -> Option<RegistryEntry> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// Every reconciled shutter.
    pub fn shutters(&self) -> Vec<Arc<ShutterAccessory>> {
        self.entries
            .iter()
            .filter_map(|entry| match entry.value() {
                RegistryEntry::Reconciled(shutter) => Some(Arc::clone(shutter)),
                RegistryEntry::Restored(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_discovered(&self) -> bool {
        self.discovered.load(Ordering::SeqCst)
    }

    // ── Internals ────────────────────────────────────────────────

    fn add_accessory(&self, device: &GatewayDevice, id: AccessoryId) -> Result<(), CoreError> {
        info!(
            "Found: {} - {} [{}]",
            device.name, device.description, device.serial
        );

        let name = accessory_name(device);
        let accessory = Arc::new(PlatformAccessory::new(name, id));
        accessory.add_window_covering(name);

        let shutter =
            ShutterAccessory::new(Arc::clone(&accessory), device, Arc::clone(&self.gateway))?;
        self.entries
            .insert(id, RegistryEntry::Reconciled(Arc::new(shutter)));
        self.platform.register_accessories(&[accessory]);
        Ok(())
    }

    fn reconcile(
        &self,
        accessory: Arc<PlatformAccessory>,
        device: &GatewayDevice,
    ) -> Result<(), CoreError> {
        let id = accessory.id();
        let shutter = ShutterAccessory::new(accessory, device, Arc::clone(&self.gateway))?;
        self.entries
            .insert(id, RegistryEntry::Reconciled(Arc::new(shutter)));
        Ok(())
    }
}

/// Whether the device belongs to the supported actuator family.
pub fn is_supported(device: &GatewayDevice) -> bool {
    device.product_name.contains(SUPPORTED_PRODUCT)
}

/// Display name for a new accessory: the description when it has any
/// non-whitespace content, the device name otherwise.
pub fn accessory_name(device: &GatewayDevice) -> &str {
    if device.description.trim().is_empty() {
        &device.name
    } else {
        &device.description
    }
}
