//! Display sinks: passive presentation targets for the consumer loops.
//!
//! A sink renders whatever it is told to and has no logic of its own.
//! Render failures are returned to the consumer loop, which logs them and
//! keeps going; nothing here may take the monitor down.

use std::time::Duration;

use piplane_core::enrich::AircraftInfo;
use piplane_core::types::{Result, SnapshotRecord};

pub mod console;
pub mod lcd;
pub mod oled;

pub use console::ConsoleSink;
pub use lcd::{LcdDriver, LcdSink, StdoutLcd};
pub use oled::{OledDriver, OledSink, StdoutOled};

/// One presentation target, driven by its own consumer loop.
pub trait DisplaySink: Send {
    fn name(&self) -> &'static str;

    /// Monitoring is up, no data seen yet.
    fn show_idle(&mut self) -> Result<()>;

    /// Data flowing, roster empty.
    fn show_no_aircraft(&mut self) -> Result<()>;

    fn show_error(&mut self, message: &str) -> Result<()>;

    /// Summary view: tracked total plus arrivals still pending on this sink.
    fn show_count(&mut self, total: usize, new_count: usize) -> Result<()>;

    /// Brief attention step shown before each arrival's detail.
    fn show_arrival_banner(&mut self) -> Result<()>;

    fn show_aircraft(&mut self, record: &SnapshotRecord, info: Option<&AircraftInfo>)
        -> Result<()>;

    /// How long the consumer holds the arrival banner on screen.
    fn banner_dwell(&self) -> Duration {
        Duration::from_secs(2)
    }

    /// How long the consumer holds the aircraft detail on screen.
    fn detail_dwell(&self) -> Duration {
        Duration::from_secs(2)
    }

    /// Release any display resources at shutdown.
    fn shutdown(&mut self) {}
}

/// Title line for an arrival: callsign (or uppercased id) plus country tag.
pub fn arrival_title(record: &SnapshotRecord) -> String {
    let name = match record.callsign() {
        Some(cs) => cs.to_string(),
        None => record.hex.to_ascii_uppercase(),
    };
    match piplane_core::country::lookup_country(&record.hex) {
        Some(country) => format!("{name} [{country}]"),
        None => name,
    }
}

/// Compact altitude/speed line, e.g. `35000ft 412kt`.
pub fn altitude_speed_line(record: &SnapshotRecord) -> String {
    match (record.altitude_ft(), record.gs) {
        (Some(alt), Some(gs)) => format!("{alt}ft {gs:.0}kt"),
        (Some(alt), None) => format!("Alt: {alt}ft"),
        (None, Some(gs)) => format!("Speed: {gs:.0}kt"),
        (None, None) => "No alt/speed".to_string(),
    }
}

/// Truncate to a display width, respecting char boundaries.
pub fn fit(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
