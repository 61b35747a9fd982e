//! piplane-core: Pure roster and fan-out logic for aircraft snapshot monitoring.
//!
//! No threads, no displays, no network: just the state machines. The
//! `piplane-monitor` binary wires these into poll/consumer threads and
//! real display sinks.

pub mod config;
pub mod country;
pub mod enrich;
pub mod fanout;
pub mod roster;
pub mod snapshot;
pub mod types;

// Re-export commonly used types at crate root
pub use fanout::FanoutQueue;
pub use roster::{Classified, Roster, TrackedAircraft};
pub use snapshot::SnapshotReader;
pub use types::*;
