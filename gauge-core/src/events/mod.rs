//! Domain event system
//!
//! Events are published by the session state machine, the expiry sweep and
//! the risk aggregator, and consumed by the boundary layer (live stream or
//! replay).

mod bus;
mod memory;
mod types;

pub use bus::{EventBus, EventSeq};
pub use memory::MemoryEventBus;
pub use types::GaugeEvent;
