// ── Accessory identity ──
//
// The join key between gateway device records and framework-persisted
// accessories. Derived deterministically from the device serial so the
// same shutter maps to the same accessory across restarts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Namespace for serial-derived accessory UUIDs.
const SERIAL_NAMESPACE: Uuid = Uuid::from_u128(0x6b1f_3c2e_94a7_4d0b_a3d5_2f8e_c410_9b77);

/// Stable accessory identifier (UUID v5 of the device serial).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessoryId(Uuid);

impl AccessoryId {
    /// Derive the identity of the accessory backing `serial`.
    pub fn from_serial(serial: &str) -> Self {
        Self(Uuid::new_v5(&SERIAL_NAMESPACE, serial.as_bytes()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for AccessoryId {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

impl fmt::Display for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccessoryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn same_serial_same_id() {
        assert_eq!(AccessoryId::from_serial("S1"), AccessoryId::from_serial("S1"));
    }

    #[test]
    fn different_serials_differ() {
        assert_ne!(AccessoryId::from_serial("S1"), AccessoryId::from_serial("S2"));
    }

    #[test]
    fn display_parses_back() {
        let id = AccessoryId::from_serial("0123456789");
        let parsed: AccessoryId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.as_uuid().get_version_num(), 5);
    }
}
