//! Interactive terminal view of the live roster.
//!
//! Runs on the foreground thread while the poll and consumer threads work
//! in the background. Input is line-based: a dedicated thread reads stdin
//! and forwards lines over a channel, so the render loop can keep
//! refreshing every couple of seconds without blocking on the keyboard.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Local, TimeZone};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use piplane_core::country::lookup_country;
use piplane_core::roster::TrackedAircraft;
use piplane_core::types::now_epoch;
use piplane_core::Roster;

/// Seconds an aircraft keeps its NEW tag in the list view.
const NEW_TAG_WINDOW: f64 = 30.0;
/// Rows shown in the list view before truncation.
const MAX_LIST_ROWS: usize = 15;
const REFRESH_INTERVAL: Duration = Duration::from_secs(2);

enum View {
    List,
    Detail(String),
}

pub struct RosterBrowser {
    roster: Arc<Mutex<Roster>>,
    stop: Arc<AtomicBool>,
    view: View,
}

impl RosterBrowser {
    pub fn new(roster: Arc<Mutex<Roster>>, stop: Arc<AtomicBool>) -> Self {
        RosterBrowser {
            roster,
            stop,
            view: View::List,
        }
    }

    pub fn run(&mut self) {
        let input = spawn_stdin_reader();
        self.render();
        let mut last_render = Instant::now();

        while !self.stop.load(Ordering::SeqCst) {
            if last_render.elapsed() >= REFRESH_INTERVAL {
                self.render();
                last_render = Instant::now();
            }

            match input.recv_timeout(Duration::from_millis(100)) {
                Ok(line) => {
                    if self.handle_input(line.trim()) {
                        self.stop.store(true, Ordering::SeqCst);
                        break;
                    }
                    self.render();
                    last_render = Instant::now();
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// Returns true when the user asked to quit.
    fn handle_input(&mut self, line: &str) -> bool {
        match line {
            "q" | "Q" => return true,
            "" => {
                self.view = View::List;
            }
            digits if digits.chars().all(|c| c.is_ascii_digit()) => {
                let index: usize = digits.parse().unwrap_or(0);
                let view = self.roster.lock().unwrap().snapshot_view();
                if index >= 1 && index <= view.len() {
                    self.view = View::Detail(view[index - 1].id.clone());
                }
            }
            _ => {}
        }
        false
    }

    fn render(&mut self) {
        let aircraft = self.roster.lock().unwrap().snapshot_view();
        print!("\x1b[2J\x1b[H");
        match &self.view {
            View::List => render_list(&aircraft),
            View::Detail(id) => match aircraft.iter().find(|a| a.id == *id) {
                Some(ac) => render_detail(ac),
                None => {
                    // Aircraft expired while on screen; fall back to the list.
                    self.view = View::List;
                    render_list(&aircraft);
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_list(aircraft: &[TrackedAircraft]) {
    let now = now_epoch();
    println!("PiPlane Tracker - {} aircraft", aircraft.len());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "FLIGHT", "ICAO", "COUNTRY", "LAST SEEN", "FIXES", ""]);

    for (i, ac) in aircraft.iter().take(MAX_LIST_ROWS).enumerate() {
        let tag = if now - ac.first_seen < NEW_TAG_WINDOW {
            "[NEW]"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&ac.flight),
            Cell::new(ac.id.to_ascii_uppercase()),
            Cell::new(lookup_country(&ac.id).unwrap_or("-")),
            Cell::new(format_ago(ac.age(now))),
            Cell::new(ac.positions.len()),
            Cell::new(tag),
        ]);
    }
    println!("{table}");

    if aircraft.len() > MAX_LIST_ROWS {
        println!("... and {} more", aircraft.len() - MAX_LIST_ROWS);
    }
    println!();
    println!("number = detail, Enter = list, q = quit");
}

fn render_detail(ac: &TrackedAircraft) {
    let now = now_epoch();
    println!("{} ({})", ac.flight, ac.id.to_ascii_uppercase());
    println!();
    if let Some(country) = lookup_country(&ac.id) {
        println!("  Country:    {country}");
    }
    println!("  First seen: {}", format_local(ac.first_seen));
    println!("  Last seen:  {}", format_local(ac.last_seen));
    println!("  Tracked:    {}", format_ago(now - ac.first_seen));

    if ac.positions.is_empty() {
        println!("  No position fixes recorded");
    } else {
        println!("  Recent fixes:");
        for fix in ac.positions.iter().rev().take(5) {
            println!(
                "    {}  {:.4}, {:.4}",
                format_local(fix.timestamp),
                fix.lat,
                fix.lon
            );
        }
    }
    println!();
    println!("Enter = back to list, q = quit");
}

fn format_ago(seconds: f64) -> String {
    let seconds = seconds.max(0.0) as u64;
    if seconds < 60 {
        format!("{seconds}s ago")
    } else if seconds < 3600 {
        format!("{}m {}s ago", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m ago", seconds / 3600, (seconds % 3600) / 60)
    }
}

fn format_local(epoch: f64) -> String {
    match Local.timestamp_opt(epoch as i64, 0) {
        chrono::LocalResult::Single(t) => t.format("%H:%M:%S").to_string(),
        _ => "--:--:--".to_string(),
    }
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use piplane_core::roster::DEFAULT_EXPIRY_TIMEOUT;
    use piplane_core::types::SnapshotRecord;

    fn browser_with(records: &[SnapshotRecord]) -> RosterBrowser {
        let mut roster = Roster::new(DEFAULT_EXPIRY_TIMEOUT);
        let classified = roster.classify(records);
        roster.apply(&classified, now_epoch());
        RosterBrowser::new(
            Arc::new(Mutex::new(roster)),
            Arc::new(AtomicBool::new(false)),
        )
    }

    fn record(hex: &str, flight: &str) -> SnapshotRecord {
        SnapshotRecord {
            hex: hex.to_string(),
            flight: Some(flight.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_quit_key_stops() {
        let mut browser = browser_with(&[]);
        assert!(browser.handle_input("q"));
        assert!(browser.handle_input("Q"));
        assert!(!browser.handle_input(""));
    }

    #[test]
    fn test_digit_selects_detail() {
        let mut browser = browser_with(&[record("a1b2c3", "DAL100")]);
        assert!(!browser.handle_input("1"));
        assert!(matches!(&browser.view, View::Detail(id) if id == "a1b2c3"));
    }

    #[test]
    fn test_out_of_range_digit_ignored() {
        let mut browser = browser_with(&[record("a1b2c3", "DAL100")]);
        browser.handle_input("9");
        assert!(matches!(browser.view, View::List));
    }

    #[test]
    fn test_enter_returns_to_list() {
        let mut browser = browser_with(&[record("a1b2c3", "DAL100")]);
        browser.handle_input("1");
        browser.handle_input("");
        assert!(matches!(browser.view, View::List));
    }

    #[test]
    fn test_format_ago() {
        assert_eq!(format_ago(5.0), "5s ago");
        assert_eq!(format_ago(125.0), "2m 5s ago");
        assert_eq!(format_ago(3700.0), "1h 1m ago");
    }
}
