//! Remote aircraft registry lookups via hexdb.io.
//!
//! Consumers ask for one aircraft at a time right before showing it, so the
//! client is deliberately conservative: results (including misses) are
//! cached, and upstream calls are rate limited. When the limiter says no,
//! the lookup is skipped rather than delayed; the aircraft still gets shown,
//! just without registry data.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;

use piplane_core::config::EnrichmentConfig;
use piplane_core::enrich::{AircraftInfo, LookupCache, RateLimit};
use piplane_core::types::now_epoch;

const HEXDB_BASE_URL: &str = "https://hexdb.io";

/// Seam between consumers and the enrichment backend.
pub trait Lookup: Send {
    fn lookup(&mut self, id: &str) -> Option<AircraftInfo>;
}

/// One lookup client shared by all consumer threads.
pub type SharedLookup = Arc<Mutex<dyn Lookup>>;

// ---------------------------------------------------------------------------
// hexdb.io client
// ---------------------------------------------------------------------------

/// Response shape of `GET /api/v1/aircraft/{icao}`.
#[derive(Debug, Deserialize)]
struct HexDbRecord {
    #[serde(rename = "ICAOTypeCode")]
    type_code: Option<String>,
    #[serde(rename = "Manufacturer")]
    manufacturer: Option<String>,
    #[serde(rename = "Registration")]
    registration: Option<String>,
    #[serde(rename = "RegisteredOwners")]
    operator: Option<String>,
}

impl From<HexDbRecord> for AircraftInfo {
    fn from(r: HexDbRecord) -> Self {
        AircraftInfo {
            aircraft_type: non_empty(r.type_code),
            manufacturer: non_empty(r.manufacturer),
            registration: non_empty(r.registration),
            operator: non_empty(r.operator),
        }
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

pub struct HexDbClient {
    http: reqwest::blocking::Client,
    base_url: String,
    cache: LookupCache,
    rate: RateLimit,
}

impl HexDbClient {
    pub fn new(enrichment: &EnrichmentConfig) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs_f64(enrichment.timeout))
            .build()
            .unwrap_or_default();
        HexDbClient {
            http,
            base_url: HEXDB_BASE_URL.to_string(),
            cache: LookupCache::new(enrichment.cache_timeout),
            rate: RateLimit::new(enrichment.rate_limit),
        }
    }

    fn fetch(&self, id: &str) -> Option<AircraftInfo> {
        let url = format!("{}/api/v1/aircraft/{}", self.base_url, id);
        let response = self.http.get(&url).send().ok()?;
        if !response.status().is_success() {
            return None;
        }
        let record: HexDbRecord = response.json().ok()?;
        let info = AircraftInfo::from(record);
        if info.is_empty() {
            None
        } else {
            Some(info)
        }
    }
}

impl Lookup for HexDbClient {
    fn lookup(&mut self, id: &str) -> Option<AircraftInfo> {
        let id = id.trim().to_ascii_lowercase();
        if id.is_empty() {
            return None;
        }

        let now = now_epoch();
        if let Some(cached) = self.cache.get(&id, now) {
            return cached;
        }
        if !self.rate.ready(now) {
            // Skip rather than stall the consumer; next sighting may hit.
            return None;
        }
        self.rate.mark(now);

        let info = self.fetch(&id);
        self.cache.store(&id, info.clone(), now);
        info
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
