//! Outbound notifications the table UI subscribes to.
mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{CombatEvent, HazardEvent, TurnEvent};
