//! Consumer loop: drains one display queue onto one sink.
//!
//! Each sink gets its own thread and its own queue, so a slow display (an
//! LCD dwelling on an arrival) never holds back the others. Between
//! arrivals the sink shows a summary of the source state, re-rendered only
//! when it changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use piplane_core::{FanoutQueue, Roster};

use crate::lookup::SharedLookup;
use crate::poll::{SharedStatus, SourceStatus};
use crate::sinks::DisplaySink;

const CONSUMER_TICK: Duration = Duration::from_millis(100);

/// Idle-screen state, derived from source status and roster size.
#[derive(Debug, Clone, PartialEq)]
enum Summary {
    Starting,
    Error(String),
    Empty,
    Count { total: usize, pending: usize },
}

pub struct ConsumerLoop {
    sink: Box<dyn DisplaySink>,
    queue: Arc<Mutex<FanoutQueue>>,
    roster: Arc<Mutex<Roster>>,
    status: SharedStatus,
    lookup: Option<SharedLookup>,
    stop: Arc<AtomicBool>,
}

impl ConsumerLoop {
    pub fn new(
        sink: Box<dyn DisplaySink>,
        queue: Arc<Mutex<FanoutQueue>>,
        roster: Arc<Mutex<Roster>>,
        status: SharedStatus,
        lookup: Option<SharedLookup>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        ConsumerLoop {
            sink,
            queue,
            roster,
            status,
            lookup,
            stop,
        }
    }

    pub fn run(&mut self) {
        let mut shown: Option<Summary> = None;

        while !self.stop.load(Ordering::SeqCst) {
            let record = self.queue.lock().unwrap().pop_or_none();
            match record {
                Some(record) => {
                    // The aircraft may have expired while queued.
                    if !self.roster.lock().unwrap().contains(&record.hex) {
                        continue;
                    }
                    self.show_arrival(&record);
                    // Arrival replaced whatever summary was on screen.
                    shown = None;
                }
                None => {
                    let summary = self.summarize();
                    if shown.as_ref() != Some(&summary) {
                        self.show_summary(&summary);
                        shown = Some(summary);
                    }
                    thread::sleep(CONSUMER_TICK);
                }
            }
        }

        self.sink.shutdown();
    }

    fn show_arrival(&mut self, record: &piplane_core::types::SnapshotRecord) {
        if let Err(e) = self.sink.show_arrival_banner() {
            eprintln!("[{}] render error: {e}", self.sink.name());
        }
        self.sleep_stoppable(self.sink.banner_dwell());

        let info = self
            .lookup
            .as_ref()
            .and_then(|l| l.lock().unwrap().lookup(&record.hex));
        if let Err(e) = self.sink.show_aircraft(record, info.as_ref()) {
            eprintln!("[{}] render error: {e}", self.sink.name());
        }
        self.sleep_stoppable(self.sink.detail_dwell());
    }

    fn summarize(&self) -> Summary {
        match self.status.lock().unwrap().clone() {
            SourceStatus::Starting => Summary::Starting,
            SourceStatus::Error(msg) => Summary::Error(msg),
            SourceStatus::Ok => {
                let total = self.roster.lock().unwrap().len();
                if total == 0 {
                    Summary::Empty
                } else {
                    Summary::Count {
                        total,
                        pending: self.queue.lock().unwrap().len(),
                    }
                }
            }
        }
    }

    fn show_summary(&mut self, summary: &Summary) {
        let result = match summary {
            Summary::Starting => self.sink.show_idle(),
            Summary::Error(msg) => self.sink.show_error(msg),
            Summary::Empty => self.sink.show_no_aircraft(),
            Summary::Count { total, pending } => self.sink.show_count(*total, *pending),
        };
        if let Err(e) = result {
            eprintln!("[{}] render error: {e}", self.sink.name());
        }
    }

    fn sleep_stoppable(&self, duration: Duration) {
        let mut remaining = duration;
        while remaining > Duration::ZERO && !self.stop.load(Ordering::SeqCst) {
            let nap = remaining.min(CONSUMER_TICK);
            thread::sleep(nap);
            remaining -= nap;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
