// ── Shutter position types ──
//
// The gateway reports 100 for a fully closed shutter; the accessory
// framework uses 100 for fully open. `Position` always holds the
// accessory convention. Conversion happens exactly once per boundary:
// `from_gateway` on reads, `to_gateway` on commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const MIN: u8 = 0;
const MAX: u8 = 100;

/// A window-covering position in accessory convention (100 = open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Position(u8);

impl Position {
    pub const CLOSED: Self = Self(MIN);
    pub const OPEN: Self = Self(MAX);

    pub fn new(value: u8) -> Result<Self, CoreError> {
        if value > MAX {
            return Err(CoreError::InvalidPosition {
                value: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Convert a raw gateway percentage into accessory convention.
    pub fn from_gateway(raw: u8) -> Result<Self, CoreError> {
        Self::new(raw).map(Self::inverted)
    }

    /// The gateway percentage for a command towards this position.
    pub fn to_gateway(self) -> u8 {
        self.inverted().0
    }

    /// The same physical position read on the opposite scale.
    pub fn inverted(self) -> Self {
        Self((MIN + MAX) - self.0)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Position {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        position.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Commanded direction of travel, encoded as the framework's
/// `PositionState` characteristic.
///
/// Reflects the last command, not verified physical motion.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::FromRepr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PositionState {
    Decreasing = 0,
    Increasing = 1,
    #[default]
    Stopped = 2,
}

impl PositionState {
    /// Direction of a move from `from` to `to`. Equal positions count as increasing.
    pub fn towards(from: Position, to: Position) -> Self {
        if to >= from {
            Self::Increasing
        } else {
            Self::Decreasing
        }
    }

    /// The characteristic's wire value.
    pub fn code(self) -> u8 {
        match self {
            Self::Decreasing => 0,
            Self::Increasing => 1,
            Self::Stopped => 2,
        }
    }

    pub fn is_moving(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}
