//! Enrichment policy: lookup caching, rate limiting, operator names.
//!
//! The HTTP client lives in the binary crate; this module holds the pure
//! parts: what to cache, when a remote call is allowed, and the offline
//! callsign-prefix operator table used by the display sinks.

use std::collections::HashMap;

/// Optional registry fields attached to an aircraft by a remote lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AircraftInfo {
    pub aircraft_type: Option<String>,
    pub manufacturer: Option<String>,
    pub registration: Option<String>,
    pub operator: Option<String>,
}

impl AircraftInfo {
    pub fn is_empty(&self) -> bool {
        self.aircraft_type.is_none()
            && self.manufacturer.is_none()
            && self.registration.is_none()
            && self.operator.is_none()
    }
}

// ---------------------------------------------------------------------------
// Lookup cache
// ---------------------------------------------------------------------------

/// Time-expiring cache of lookup results, keyed by station id.
///
/// Misses are cached too, so a station the registry does not know about
/// is not re-queried every render.
pub struct LookupCache {
    entries: HashMap<String, CacheEntry>,
    timeout: f64,
}

struct CacheEntry {
    stored: f64,
    info: Option<AircraftInfo>,
}

impl LookupCache {
    pub fn new(timeout: f64) -> Self {
        LookupCache {
            entries: HashMap::new(),
            timeout,
        }
    }

    /// Cached result if present and fresh. The outer `Option` is the cache
    /// hit; the inner one is the lookup outcome itself.
    pub fn get(&self, id: &str, now: f64) -> Option<Option<AircraftInfo>> {
        self.entries
            .get(id)
            .filter(|e| now - e.stored < self.timeout)
            .map(|e| e.info.clone())
    }

    pub fn store(&mut self, id: &str, info: Option<AircraftInfo>, now: f64) {
        self.entries
            .insert(id.to_string(), CacheEntry { stored: now, info });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

/// At most one upstream call per interval. A caller that is not ready
/// skips the call entirely: enrichment is best-effort and must never
/// block a render waiting for its turn.
pub struct RateLimit {
    min_interval: f64,
    last_call: f64,
}

impl RateLimit {
    pub fn new(min_interval: f64) -> Self {
        RateLimit {
            min_interval,
            last_call: f64::NEG_INFINITY,
        }
    }

    pub fn ready(&self, now: f64) -> bool {
        now - self.last_call >= self.min_interval
    }

    pub fn mark(&mut self, now: f64) {
        self.last_call = now;
    }
}

// ---------------------------------------------------------------------------
// Operator lookup (offline)
// ---------------------------------------------------------------------------

/// Airline callsign prefixes → operator name.
const AIRLINE_PREFIXES: &[(&str, &str)] = &[
    ("AAL", "American Airlines"),
    ("DAL", "Delta Air Lines"),
    ("UAL", "United Airlines"),
    ("SWA", "Southwest Airlines"),
    ("JBU", "JetBlue Airways"),
    ("NKS", "Spirit Airlines"),
    ("FFT", "Frontier Airlines"),
    ("ASA", "Alaska Airlines"),
    ("HAL", "Hawaiian Airlines"),
    ("SKW", "SkyWest Airlines"),
    ("RPA", "Republic Airways"),
    ("ENY", "Envoy Air"),
    ("JIA", "PSA Airlines"),
    ("UPS", "UPS"),
    ("FDX", "FedEx"),
    ("GTI", "Atlas Air"),
    ("ACA", "Air Canada"),
    ("WJA", "WestJet"),
    ("BAW", "British Airways"),
    ("VIR", "Virgin Atlantic"),
    ("DLH", "Lufthansa"),
    ("AFR", "Air France"),
    ("KLM", "KLM"),
    ("IBE", "Iberia"),
    ("EZY", "easyJet"),
    ("RYR", "Ryanair"),
    ("UAE", "Emirates"),
    ("QTR", "Qatar Airways"),
];

/// Offline operator name from the callsign prefix.
pub fn lookup_operator(callsign: &str) -> Option<&'static str> {
    let prefix = callsign.get(..3)?.to_ascii_uppercase();
    AIRLINE_PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix.as_str())
        .map(|(_, name)| *name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn info(registration: &str) -> AircraftInfo {
        AircraftInfo {
            registration: Some(registration.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_cache_hit_within_timeout() {
        let mut cache = LookupCache::new(300.0);
        cache.store("a1b2c3", Some(info("N12345")), 0.0);

        let hit = cache.get("a1b2c3", 100.0).expect("fresh entry");
        assert_eq!(hit.unwrap().registration.as_deref(), Some("N12345"));
    }

    #[test]
    fn test_cache_expires() {
        let mut cache = LookupCache::new(300.0);
        cache.store("a1b2c3", Some(info("N12345")), 0.0);
        assert!(cache.get("a1b2c3", 301.0).is_none());
    }

    #[test]
    fn test_cache_stores_misses() {
        let mut cache = LookupCache::new(300.0);
        cache.store("a1b2c3", None, 0.0);

        // Hit with a negative result: no re-query needed.
        assert_eq!(cache.get("a1b2c3", 10.0), Some(None));
    }

    #[test]
    fn test_cache_miss_unknown_id() {
        let cache = LookupCache::new(300.0);
        assert!(cache.get("a1b2c3", 0.0).is_none());
    }

    #[test]
    fn test_rate_limit_first_call_ready() {
        let rl = RateLimit::new(1.0);
        assert!(rl.ready(0.0));
    }

    #[test]
    fn test_rate_limit_blocks_then_reopens() {
        let mut rl = RateLimit::new(2.0);
        rl.mark(10.0);
        assert!(!rl.ready(11.0));
        assert!(rl.ready(12.0));
    }

    #[test]
    fn test_lookup_operator_known() {
        assert_eq!(lookup_operator("DAL10"), Some("Delta Air Lines"));
        assert_eq!(lookup_operator("klm1023"), Some("KLM"));
    }

    #[test]
    fn test_lookup_operator_unknown() {
        assert_eq!(lookup_operator("XYZ999"), None);
    }

    #[test]
    fn test_lookup_operator_too_short() {
        assert_eq!(lookup_operator("DA"), None);
    }

    #[test]
    fn test_aircraft_info_is_empty() {
        assert!(AircraftInfo::default().is_empty());
        assert!(!info("N12345").is_empty());
    }
}
