//! LCD sink: formats 16x2 character lines for a small character display.
//!
//! The physical display is external: `LcdDriver` is the seam. The sink
//! owns all formatting so a driver only ever receives two pre-cut lines.

use std::io;

use piplane_core::enrich::AircraftInfo;
use piplane_core::types::{PiplaneError, Result, SnapshotRecord};

use super::{altitude_speed_line, fit, DisplaySink};

/// Character columns on the panel.
const LCD_COLS: usize = 16;

/// Hardware seam for a two-line character LCD.
pub trait LcdDriver: Send {
    fn write_lines(&mut self, line1: &str, line2: &str) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
    /// Power down / release the panel. Best effort.
    fn release(&mut self) {}
}

/// Development driver: renders the panel contents to stdout.
pub struct StdoutLcd;

impl LcdDriver for StdoutLcd {
    fn write_lines(&mut self, line1: &str, line2: &str) -> io::Result<()> {
        println!("[lcd] |{line1:<LCD_COLS$}|");
        println!("[lcd] |{line2:<LCD_COLS$}|");
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct LcdSink {
    driver: Box<dyn LcdDriver>,
}

impl LcdSink {
    pub fn new(driver: Box<dyn LcdDriver>) -> Self {
        LcdSink { driver }
    }

    fn write(&mut self, line1: &str, line2: &str) -> Result<()> {
        self.driver
            .write_lines(&fit(line1, LCD_COLS), &fit(line2, LCD_COLS))
            .map_err(|e| PiplaneError::Sink(format!("lcd: {e}")))
    }
}

impl DisplaySink for LcdSink {
    fn name(&self) -> &'static str {
        "lcd"
    }

    fn show_idle(&mut self) -> Result<()> {
        self.write("PiPlane Tracker", "Monitoring...")
    }

    fn show_no_aircraft(&mut self) -> Result<()> {
        self.write("PiPlane Tracker", "No aircraft")
    }

    fn show_error(&mut self, message: &str) -> Result<()> {
        self.write("ERROR", message)
    }

    fn show_count(&mut self, total: usize, new_count: usize) -> Result<()> {
        let line2 = if new_count > 0 {
            format!("{total} trkd {new_count} new")
        } else {
            format!("{total} tracked")
        };
        self.write("Aircraft", &line2)
    }

    fn show_arrival_banner(&mut self) -> Result<()> {
        self.write("New aircraft", "detected!")
    }

    fn show_aircraft(
        &mut self,
        record: &SnapshotRecord,
        info: Option<&AircraftInfo>,
    ) -> Result<()> {
        // 16 columns leave no room for the country tag next to a callsign,
        // so the type/registration goes on line 2 when known.
        let line1 = match record.callsign() {
            Some(cs) => cs.to_string(),
            None => record.hex.to_ascii_uppercase(),
        };
        let line2 = match info.and_then(|i| i.aircraft_type.as_deref()) {
            Some(t) => t.to_string(),
            None => altitude_speed_line(record),
        };
        self.write(&line1, &line2)
    }

    fn shutdown(&mut self) {
        let _ = self.driver.write_lines("PiPlane Tracker", "Shutting down...");
        let _ = self.driver.clear();
        self.driver.release();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
