// Gateway wire types
//
// Shapes of the `?devices=1` listing and the form-encoded move command.

use serde::{Deserialize, Deserializer, Serialize};

/// Response body of `GET <base>?devices=1`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceList {
    pub devices: Vec<GatewayDevice>,
}

/// One device as reported by the gateway.
///
/// `position` is in gateway convention (0 = open, 100 = closed).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayDevice {
    pub serial: String,
    /// Command identifier used in `did=` of move commands. Firmware
    /// versions differ on whether this is a string or a number.
    #[serde(deserialize_with = "string_or_number")]
    pub did: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub product_name: String,
    pub position: u8,
}

/// Form body of a `goto` move command: `cid=9&did=<did>&command=1&goto=<pos>`.
#[derive(Debug, Clone, Serialize)]
pub struct MoveCommand<'a> {
    pub cid: u8,
    pub did: &'a str,
    pub command: u8,
    pub goto: u8,
}

impl<'a> MoveCommand<'a> {
    /// A `goto` command towards `position` (gateway convention).
    pub fn goto(did: &'a str, position: u8) -> Self {
        Self {
            cid: 9,
            did,
            command: 1,
            goto: position,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}
