//! Console sink: plain text presentation on stdout.

use piplane_core::enrich::{lookup_operator, AircraftInfo};
use piplane_core::types::{Result, SnapshotRecord};

use super::{altitude_speed_line, arrival_title, DisplaySink};
use crate::clock;

pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        ConsoleSink
    }
}

impl DisplaySink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn show_idle(&mut self) -> Result<()> {
        println!("[{}] Monitoring...", clock());
        Ok(())
    }

    fn show_no_aircraft(&mut self) -> Result<()> {
        println!("[{}] No aircraft in range", clock());
        Ok(())
    }

    fn show_error(&mut self, message: &str) -> Result<()> {
        println!("[{}] ERROR: {message}", clock());
        Ok(())
    }

    fn show_count(&mut self, total: usize, new_count: usize) -> Result<()> {
        if new_count > 0 {
            println!("[{}] Aircraft tracked: {total} ({new_count} new pending)", clock());
        } else {
            println!("[{}] Aircraft tracked: {total}", clock());
        }
        Ok(())
    }

    fn show_arrival_banner(&mut self) -> Result<()> {
        println!("[{}] New aircraft detected!", clock());
        Ok(())
    }

    fn show_aircraft(
        &mut self,
        record: &SnapshotRecord,
        info: Option<&AircraftInfo>,
    ) -> Result<()> {
        let operator = info
            .and_then(|i| i.operator.clone())
            .or_else(|| {
                record
                    .callsign()
                    .and_then(lookup_operator)
                    .map(String::from)
            });

        let mut line = format!("    {} - {}", arrival_title(record), altitude_speed_line(record));
        if let Some(op) = operator {
            line.push_str(&format!(" ({op})"));
        }
        if let Some(reg) = info.and_then(|i| i.registration.as_deref()) {
            line.push_str(&format!(" reg {reg}"));
        }
        println!("{line}");
        Ok(())
    }

    fn banner_dwell(&self) -> std::time::Duration {
        // The console is line-oriented; no need to hold a banner.
        std::time::Duration::ZERO
    }

    fn detail_dwell(&self) -> std::time::Duration {
        std::time::Duration::ZERO
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_renders_never_fail() {
        let mut sink = ConsoleSink::new();
        assert!(sink.show_idle().is_ok());
        assert!(sink.show_no_aircraft().is_ok());
        assert!(sink.show_error("No data").is_ok());
        assert!(sink.show_count(3, 1).is_ok());
        assert!(sink.show_arrival_banner().is_ok());

        let rec = SnapshotRecord {
            hex: "a1b2c3".into(),
            flight: Some("DAL10".into()),
            alt_baro: Some(35000),
            gs: Some(412.0),
            ..Default::default()
        };
        assert!(sink.show_aircraft(&rec, None).is_ok());
    }
}
