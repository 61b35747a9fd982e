//! Bounded-lifetime aircraft roster with new-arrival classification.
//!
//! Pure state machine: no I/O, no clocks. The poll loop feeds it
//! snapshots together with an explicit `now`; it hands back the partition
//! of new vs. existing aircraft and the set of expired ids. The caller is
//! the single writer; readers share the roster behind a `Mutex` and use
//! `snapshot_view()` which never exposes a half-updated map.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::types::SnapshotRecord;

/// Aircraft expire after this many seconds of silence (overridable).
pub const DEFAULT_EXPIRY_TIMEOUT: f64 = 300.0;

/// Maximum retained position fixes per aircraft.
const MAX_POSITIONS: usize = 120;

// ---------------------------------------------------------------------------
// Tracked aircraft
// ---------------------------------------------------------------------------

/// One recorded position sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub lat: f64,
    pub lon: f64,
    pub timestamp: f64,
}

/// State for a single remembered aircraft.
#[derive(Debug, Clone)]
pub struct TrackedAircraft {
    /// Station identifier (hex string), the primary key. Never changes.
    pub id: String,
    /// Trimmed callsign present at first classification.
    pub flight: String,
    /// Set once at creation.
    pub first_seen: f64,
    /// Refreshed on every snapshot cycle the id reappears in.
    pub last_seen: f64,
    /// Bounded ring of position samples, oldest first.
    pub positions: VecDeque<PositionFix>,
}

impl TrackedAircraft {
    fn new(record: &SnapshotRecord, now: f64) -> Self {
        let mut ac = TrackedAircraft {
            id: record.hex.clone(),
            flight: record.callsign().unwrap_or_default().to_string(),
            first_seen: now,
            last_seen: now,
            positions: VecDeque::new(),
        };
        ac.record_position(record, now);
        ac
    }

    fn record_position(&mut self, record: &SnapshotRecord, now: f64) {
        if let Some((lat, lon)) = record.position() {
            if self.positions.len() == MAX_POSITIONS {
                self.positions.pop_front();
            }
            self.positions.push_back(PositionFix {
                lat,
                lon,
                timestamp: now,
            });
        }
    }

    pub fn age(&self, now: f64) -> f64 {
        now - self.last_seen
    }

    pub fn latest_position(&self) -> Option<&PositionFix> {
        self.positions.back()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Partition of one snapshot against the current roster.
#[derive(Debug, Default)]
pub struct Classified {
    /// Valid entries whose id is not yet tracked: the arrivals.
    pub new: Vec<SnapshotRecord>,
    /// Valid entries already tracked.
    pub existing: Vec<SnapshotRecord>,
}

impl Classified {
    /// Every id present in this snapshot's valid entries.
    pub fn present_ids(&self) -> HashSet<String> {
        self.new
            .iter()
            .chain(self.existing.iter())
            .map(|r| r.hex.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Map of currently-remembered aircraft, keyed by station id.
pub struct Roster {
    aircraft: HashMap<String, TrackedAircraft>,
    expiry_timeout: f64,
}

impl Roster {
    pub fn new(expiry_timeout: f64) -> Self {
        Roster {
            aircraft: HashMap::new(),
            expiry_timeout,
        }
    }

    /// Partition a snapshot's entries into new vs. existing.
    ///
    /// Only identified aircraft count: entries without an id or without a
    /// non-blank callsign are invisible to this subsystem. If an id appears
    /// more than once in one snapshot, only the first occurrence is kept.
    /// Pure: no roster mutation happens here.
    pub fn classify(&self, records: &[SnapshotRecord]) -> Classified {
        let mut seen = HashSet::new();
        let mut out = Classified::default();

        for record in records {
            if record.hex.is_empty() || record.callsign().is_none() {
                continue;
            }
            if !seen.insert(record.hex.clone()) {
                continue;
            }
            if self.aircraft.contains_key(&record.hex) {
                out.existing.push(record.clone());
            } else {
                out.new.push(record.clone());
            }
        }

        out
    }

    /// Apply one classified snapshot: insert arrivals, refresh the rest.
    pub fn apply(&mut self, classified: &Classified, now: f64) {
        for record in &classified.new {
            self.aircraft
                .insert(record.hex.clone(), TrackedAircraft::new(record, now));
        }

        for record in &classified.existing {
            if let Some(ac) = self.aircraft.get_mut(&record.hex) {
                ac.last_seen = now;
                ac.record_position(record, now);
            }
        }
    }

    /// Remove aircraft unseen past the expiry timeout.
    ///
    /// An id present in the current snapshot is never expired, so a
    /// reappearance in the same cycle it would otherwise time out in keeps
    /// the entry alive. Returns the removed ids.
    pub fn expire(&mut self, present_ids: &HashSet<String>, now: f64) -> Vec<String> {
        let expired: Vec<String> = self
            .aircraft
            .iter()
            .filter(|(id, ac)| !present_ids.contains(*id) && ac.age(now) > self.expiry_timeout)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            self.aircraft.remove(id);
        }
        expired
    }

    /// Clone out the tracked set, most recently seen first.
    pub fn snapshot_view(&self) -> Vec<TrackedAircraft> {
        let mut all: Vec<TrackedAircraft> = self.aircraft.values().cloned().collect();
        all.sort_by(|a, b| b.last_seen.total_cmp(&a.last_seen));
        all
    }

    pub fn get(&self, id: &str) -> Option<&TrackedAircraft> {
        self.aircraft.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.aircraft.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hex: &str, flight: &str) -> SnapshotRecord {
        SnapshotRecord {
            hex: hex.to_string(),
            flight: Some(flight.to_string()),
            ..Default::default()
        }
    }

    fn record_at(hex: &str, flight: &str, lat: f64, lon: f64) -> SnapshotRecord {
        SnapshotRecord {
            lat: Some(lat),
            lon: Some(lon),
            ..record(hex, flight)
        }
    }

    fn roster() -> Roster {
        Roster::new(DEFAULT_EXPIRY_TIMEOUT)
    }

    #[test]
    fn test_first_sighting_is_new() {
        let r = roster();
        let c = r.classify(&[record("aaa111", "UAL1")]);
        assert_eq!(c.new.len(), 1);
        assert!(c.existing.is_empty());
    }

    #[test]
    fn test_apply_sets_first_seen_equal_last_seen() {
        let mut r = roster();
        let c = r.classify(&[record("aaa111", "UAL1")]);
        r.apply(&c, 100.0);

        let ac = r.get("aaa111").unwrap();
        assert_eq!(ac.first_seen, 100.0);
        assert_eq!(ac.last_seen, 100.0);
        assert_eq!(ac.flight, "UAL1");
    }

    #[test]
    fn test_reappearance_is_existing_not_new() {
        let mut r = roster();
        let snap = [record("aaa111", "UAL1")];
        let c = r.classify(&snap);
        r.apply(&c, 0.0);

        let c = r.classify(&snap);
        assert!(c.new.is_empty());
        assert_eq!(c.existing.len(), 1);

        r.apply(&c, 10.0);
        let ac = r.get("aaa111").unwrap();
        assert_eq!(ac.first_seen, 0.0);
        assert_eq!(ac.last_seen, 10.0);
    }

    #[test]
    fn test_empty_callsign_never_classified() {
        let r = roster();
        let c = r.classify(&[record("aaa111", "   "), record("bbb222", "")]);
        assert!(c.new.is_empty());
        assert!(c.existing.is_empty());
    }

    #[test]
    fn test_missing_id_skipped() {
        let r = roster();
        let c = r.classify(&[record("", "UAL1")]);
        assert!(c.new.is_empty());
    }

    #[test]
    fn test_duplicate_id_in_snapshot_first_wins() {
        let r = roster();
        let c = r.classify(&[record("aaa111", "UAL1"), record("aaa111", "UAL2")]);
        assert_eq!(c.new.len(), 1);
        assert_eq!(c.new[0].callsign(), Some("UAL1"));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let mut r = roster();
        let snap = [record("aaa111", "UAL1"), record("bbb222", "DAL2")];
        let c1 = r.classify(&snap);
        let c2 = r.classify(&snap);
        assert_eq!(c1.new, c2.new);
        assert_eq!(c1.existing, c2.existing);

        r.apply(&c1, 0.0);
        let c3 = r.classify(&snap);
        assert_eq!(c3.existing.len(), 2);
    }

    #[test]
    fn test_expiry_scenario() {
        // Arrival at t=0, re-seen at t=10, silent until t=320.
        let mut r = roster();
        let snap = [record("a1b2c3", "DAL10")];

        let c = r.classify(&snap);
        assert_eq!(c.new.len(), 1);
        r.apply(&c, 0.0);
        r.expire(&c.present_ids(), 0.0);

        let c = r.classify(&snap);
        assert!(c.new.is_empty());
        r.apply(&c, 10.0);
        r.expire(&c.present_ids(), 10.0);

        // Empty snapshots from here on.
        let empty = HashSet::new();
        assert!(r.expire(&empty, 200.0).is_empty()); // only 190s silent
        let removed = r.expire(&empty, 320.0);
        assert_eq!(removed, vec!["a1b2c3".to_string()]);
        assert!(r.is_empty());
        // A second expire returns nothing.
        assert!(r.expire(&empty, 330.0).is_empty());
    }

    #[test]
    fn test_present_id_survives_expiry() {
        let mut r = roster();
        let c = r.classify(&[record("aaa111", "UAL1")]);
        r.apply(&c, 0.0);

        // Stale by timeout but present in the current snapshot.
        let present: HashSet<String> = ["aaa111".to_string()].into();
        assert!(r.expire(&present, 1000.0).is_empty());
        assert!(r.contains("aaa111"));
    }

    #[test]
    fn test_expired_then_reappears_is_new_again() {
        let mut r = roster();
        let snap = [record("aaa111", "UAL1")];
        let c = r.classify(&snap);
        r.apply(&c, 0.0);
        r.expire(&HashSet::new(), 400.0);

        let c = r.classify(&snap);
        assert_eq!(c.new.len(), 1, "fresh arrival after expiry");
    }

    #[test]
    fn test_positions_appended_on_updates() {
        let mut r = roster();
        let c = r.classify(&[record_at("aaa111", "UAL1", 35.0, -82.0)]);
        r.apply(&c, 0.0);

        let c = r.classify(&[record_at("aaa111", "UAL1", 35.1, -82.1)]);
        r.apply(&c, 5.0);

        let ac = r.get("aaa111").unwrap();
        assert_eq!(ac.positions.len(), 2);
        let last = ac.latest_position().unwrap();
        assert_eq!(last.lat, 35.1);
        assert_eq!(last.timestamp, 5.0);
        assert!(ac.positions.iter().all(|p| p.timestamp >= ac.first_seen));
    }

    #[test]
    fn test_zero_coordinates_not_recorded() {
        let mut r = roster();
        let c = r.classify(&[record_at("aaa111", "UAL1", 0.0, 0.0)]);
        r.apply(&c, 0.0);
        assert!(r.get("aaa111").unwrap().positions.is_empty());
    }

    #[test]
    fn test_position_history_bounded() {
        let mut r = roster();
        let c = r.classify(&[record_at("aaa111", "UAL1", 35.0, -82.0)]);
        r.apply(&c, 0.0);

        for i in 1..200 {
            let c = r.classify(&[record_at("aaa111", "UAL1", 35.0, -82.0)]);
            r.apply(&c, i as f64);
        }

        let ac = r.get("aaa111").unwrap();
        assert_eq!(ac.positions.len(), MAX_POSITIONS);
        // Oldest fixes dropped first.
        assert_eq!(ac.positions.front().unwrap().timestamp, 80.0);
    }

    #[test]
    fn test_snapshot_view_sorted_and_complete() {
        let mut r = roster();
        let c = r.classify(&[record("aaa111", "UAL1")]);
        r.apply(&c, 0.0);
        let c = r.classify(&[record("bbb222", "DAL2")]);
        r.apply(&c, 50.0);

        let view = r.snapshot_view();
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].id, "bbb222");
        assert_eq!(view[1].id, "aaa111");
    }

    #[test]
    fn test_view_reflects_applied_mutations() {
        let mut r = roster();
        let c = r.classify(&[record("aaa111", "UAL1")]);
        r.apply(&c, 0.0);

        let c = r.classify(&[record("aaa111", "UAL1")]);
        r.apply(&c, 42.0);

        let view = r.snapshot_view();
        assert_eq!(view[0].last_seen, 42.0);
    }
}
