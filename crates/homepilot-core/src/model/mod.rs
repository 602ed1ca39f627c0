// ── Domain model ──

mod accessory_id;
mod position;

pub use accessory_id::AccessoryId;
pub use position::{Position, PositionState};
