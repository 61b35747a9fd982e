//! Poll loop: reads the aircraft snapshot on a fixed interval, updates the
//! roster, and fans new arrivals out to every display queue.
//!
//! All roster mutation happens here, under a single lock acquisition per
//! cycle; consumers only read it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use piplane_core::types::now_epoch;
use piplane_core::{FanoutQueue, Roster, SnapshotReader};

use crate::alert::SoundAlert;
use crate::clock;

/// Health of the snapshot source, as seen by the last poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceStatus {
    /// No cycle has completed yet.
    Starting,
    Ok,
    Error(String),
}

pub type SharedStatus = Arc<Mutex<SourceStatus>>;

/// What a single cycle did, for narration and tests.
#[derive(Debug, PartialEq)]
pub enum CycleOutcome {
    /// The snapshot could not be read; roster and queues untouched.
    Skipped,
    Completed { new: usize, expired: usize },
}

pub struct PollLoop {
    reader: SnapshotReader,
    roster: Arc<Mutex<Roster>>,
    queues: Vec<Arc<Mutex<FanoutQueue>>>,
    status: SharedStatus,
    alert: Option<SoundAlert>,
    interval: Duration,
    stop: Arc<AtomicBool>,
}

impl PollLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: SnapshotReader,
        roster: Arc<Mutex<Roster>>,
        queues: Vec<Arc<Mutex<FanoutQueue>>>,
        status: SharedStatus,
        alert: Option<SoundAlert>,
        interval: Duration,
        stop: Arc<AtomicBool>,
    ) -> Self {
        PollLoop {
            reader,
            roster,
            queues,
            status,
            alert,
            interval,
            stop,
        }
    }

    pub fn run(&mut self) {
        while !self.stop.load(Ordering::SeqCst) {
            self.cycle(now_epoch());
            self.sleep_interval();
        }
    }

    /// One full poll cycle at time `now`.
    pub fn cycle(&mut self, now: f64) -> CycleOutcome {
        let snapshot = match self.reader.read() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("[{}] snapshot read failed: {e}", clock());
                *self.status.lock().unwrap() = SourceStatus::Error(e.to_string());
                return CycleOutcome::Skipped;
            }
        };
        *self.status.lock().unwrap() = SourceStatus::Ok;

        let (classified, expired) = {
            let mut roster = self.roster.lock().unwrap();
            let classified = roster.classify(&snapshot.aircraft);
            roster.apply(&classified, now);
            let expired = roster.expire(&classified.present_ids(), now);
            (classified, expired)
        };

        if !expired.is_empty() {
            let gone: Vec<&str> = expired.iter().map(String::as_str).collect();
            println!("[{}] expired: {}", clock(), gone.join(", "));
        }

        let expired_set = expired.into_iter().collect();
        for queue in &self.queues {
            let mut queue = queue.lock().unwrap();
            queue.remove_ids(&expired_set);
            for record in &classified.new {
                queue.push(record.clone());
            }
        }

        if !classified.new.is_empty() {
            println!(
                "[{}] ALERT: {} new aircraft detected!",
                clock(),
                classified.new.len()
            );
            if let Some(alert) = self.alert.as_mut() {
                alert.trigger(now);
            }
        }

        CycleOutcome::Completed {
            new: classified.new.len(),
            expired: expired_set.len(),
        }
    }

    // Sleep in short slices so a stop request takes effect quickly.
    fn sleep_interval(&self) {
        let mut remaining = self.interval;
        let slice = Duration::from_millis(100);
        while remaining > Duration::ZERO && !self.stop.load(Ordering::SeqCst) {
            let nap = remaining.min(slice);
            thread::sleep(nap);
            remaining -= nap;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
