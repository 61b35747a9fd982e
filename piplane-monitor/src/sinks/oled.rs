//! OLED sink: formats short text pages for a small graphical display.
//!
//! Pixel drawing belongs to the driver (external hardware); the sink just
//! decides what the page says. Page geometry is derived from the
//! configured panel size: ~6 px per character column, ~11 px per text row.

use std::io;
use std::time::Duration;

use piplane_core::config::OledConfig;
use piplane_core::country::lookup_country;
use piplane_core::enrich::AircraftInfo;
use piplane_core::types::{PiplaneError, Result, SnapshotRecord};

use super::{altitude_speed_line, fit, DisplaySink};

/// Hardware seam for a small monochrome OLED panel.
pub trait OledDriver: Send {
    /// Replace the whole panel contents with the given text rows.
    fn draw_page(&mut self, rows: &[String]) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
    fn release(&mut self) {}
}

/// Development driver: renders pages to stdout.
pub struct StdoutOled;

impl OledDriver for StdoutOled {
    fn draw_page(&mut self, rows: &[String]) -> io::Result<()> {
        for row in rows {
            println!("[oled] {row}");
        }
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct OledSink {
    driver: Box<dyn OledDriver>,
    cols: usize,
    rows: usize,
}

impl OledSink {
    pub fn new(driver: Box<dyn OledDriver>, geometry: &OledConfig) -> Self {
        OledSink {
            driver,
            cols: (geometry.width as usize / 6).max(8),
            rows: (geometry.height as usize / 11).max(2),
        }
    }

    fn page(&mut self, rows: &[String]) -> Result<()> {
        let cut: Vec<String> = rows
            .iter()
            .take(self.rows)
            .map(|r| fit(r, self.cols))
            .collect();
        self.driver
            .draw_page(&cut)
            .map_err(|e| PiplaneError::Sink(format!("oled: {e}")))
    }
}

impl DisplaySink for OledSink {
    fn name(&self) -> &'static str {
        "oled"
    }

    fn show_idle(&mut self) -> Result<()> {
        self.page(&["PiPlane Tracker".into(), "Monitoring...".into()])
    }

    fn show_no_aircraft(&mut self) -> Result<()> {
        self.page(&["PiPlane Tracker".into(), "No aircraft".into()])
    }

    fn show_error(&mut self, message: &str) -> Result<()> {
        self.page(&["ERROR".into(), message.to_string()])
    }

    fn show_count(&mut self, total: usize, new_count: usize) -> Result<()> {
        self.page(&[
            "Aircraft".into(),
            format!("{total} tracked"),
            format!("{new_count} new"),
        ])
    }

    fn show_arrival_banner(&mut self) -> Result<()> {
        self.page(&["New aircraft".into(), "detected!".into()])
    }

    fn show_aircraft(
        &mut self,
        record: &SnapshotRecord,
        info: Option<&AircraftInfo>,
    ) -> Result<()> {
        let title = match record.callsign() {
            Some(cs) => cs.to_string(),
            None => record.hex.to_ascii_uppercase(),
        };

        // Third row: registry data when enriched, country otherwise.
        let extra = info
            .and_then(|i| {
                match (i.aircraft_type.as_deref(), i.registration.as_deref()) {
                    (Some(t), Some(r)) => Some(format!("{t} {r}")),
                    (Some(t), None) => Some(t.to_string()),
                    (None, Some(r)) => Some(r.to_string()),
                    (None, None) => None,
                }
            })
            .or_else(|| lookup_country(&record.hex).map(String::from))
            .unwrap_or_default();

        self.page(&[title, altitude_speed_line(record), extra])
    }

    fn detail_dwell(&self) -> Duration {
        // Small panel, give the reader a moment longer.
        Duration::from_secs(5)
    }

    fn shutdown(&mut self) {
        let _ = self.driver.clear();
        self.driver.release();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
