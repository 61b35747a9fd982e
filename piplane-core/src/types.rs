//! Shared types, error enum, and snapshot record types for piplane-core.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// All errors produced by piplane-core.
#[derive(Debug, Error)]
pub enum PiplaneError {
    #[error("aircraft data file not found: {0}")]
    SourceMissing(String),
    #[error("could not read aircraft data: {0}")]
    SourceUnavailable(String),
    #[error("invalid snapshot JSON: {0}")]
    MalformedSnapshot(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("display error: {0}")]
    Sink(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PiplaneError>;

/// Current wall-clock time as fractional epoch seconds.
pub fn now_epoch() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Snapshot records (dump1090-fa aircraft.json)
// ---------------------------------------------------------------------------

/// One aircraft entry from a dump1090-fa snapshot.
///
/// Every field except `hex` is routinely absent; `hex` itself defaults to
/// empty so a malformed entry deserializes instead of failing the whole
/// snapshot. Entries without a usable id are dropped during classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotRecord {
    /// 24-bit ICAO station address as lowercase hex (`~`-prefixed for TIS-B).
    pub hex: String,
    pub flight: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(deserialize_with = "de_altitude")]
    pub alt_baro: Option<i32>,
    pub alt_geom: Option<i32>,
    /// Ground speed in knots.
    pub gs: Option<f64>,
    pub track: Option<f64>,
    /// Vertical rate in ft/min.
    pub baro_rate: Option<i32>,
    pub squawk: Option<String>,
    /// Signal strength in dBFS.
    pub rssi: Option<f64>,
    pub messages: Option<u64>,
    /// Seconds since the receiver last heard this aircraft.
    pub seen: Option<f64>,
}

impl Default for SnapshotRecord {
    fn default() -> Self {
        SnapshotRecord {
            hex: String::new(),
            flight: None,
            lat: None,
            lon: None,
            alt_baro: None,
            alt_geom: None,
            gs: None,
            track: None,
            baro_rate: None,
            squawk: None,
            rssi: None,
            messages: None,
            seen: None,
        }
    }
}

impl SnapshotRecord {
    /// Trimmed callsign, or `None` when missing or blank.
    pub fn callsign(&self) -> Option<&str> {
        match self.flight.as_deref().map(str::trim) {
            Some(cs) if !cs.is_empty() => Some(cs),
            _ => None,
        }
    }

    /// Best available altitude: barometric preferred, geometric fallback.
    pub fn altitude_ft(&self) -> Option<i32> {
        self.alt_baro.or(self.alt_geom)
    }

    /// Position when both coordinates are present and non-zero.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0 => Some((lat, lon)),
            _ => None,
        }
    }
}

/// dump1090-fa reports `alt_baro` as either a number or the string
/// `"ground"`. Surface aircraft get no usable altitude here.
fn de_altitude<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAltitude {
        Feet(f64),
        Text(String),
    }

    Ok(match Option::<RawAltitude>::deserialize(deserializer)? {
        Some(RawAltitude::Feet(v)) => Some(v as i32),
        _ => None,
    })
}

/// A full aircraft-state snapshot as written by the receiver process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftSnapshot {
    /// Snapshot timestamp (epoch seconds), as reported by the receiver.
    pub now: Option<f64>,
    pub messages: Option<u64>,
    pub aircraft: Vec<SnapshotRecord>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_minimal() {
        let rec: SnapshotRecord = serde_json::from_str(r#"{"hex":"a1b2c3"}"#).unwrap();
        assert_eq!(rec.hex, "a1b2c3");
        assert!(rec.callsign().is_none());
        assert!(rec.position().is_none());
    }

    #[test]
    fn test_record_missing_hex() {
        let rec: SnapshotRecord = serde_json::from_str(r#"{"flight":"UAL1"}"#).unwrap();
        assert!(rec.hex.is_empty());
    }

    #[test]
    fn test_callsign_trimmed() {
        let rec: SnapshotRecord =
            serde_json::from_str(r#"{"hex":"a1b2c3","flight":"DAL10   "}"#).unwrap();
        assert_eq!(rec.callsign(), Some("DAL10"));
    }

    #[test]
    fn test_callsign_blank_is_none() {
        let rec: SnapshotRecord =
            serde_json::from_str(r#"{"hex":"a1b2c3","flight":"        "}"#).unwrap();
        assert!(rec.callsign().is_none());
    }

    #[test]
    fn test_altitude_ground_string() {
        let rec: SnapshotRecord =
            serde_json::from_str(r#"{"hex":"a1b2c3","alt_baro":"ground","alt_geom":150}"#).unwrap();
        assert_eq!(rec.alt_baro, None);
        assert_eq!(rec.altitude_ft(), Some(150));
    }

    #[test]
    fn test_altitude_baro_preferred() {
        let rec: SnapshotRecord =
            serde_json::from_str(r#"{"hex":"a1b2c3","alt_baro":35000,"alt_geom":35250}"#).unwrap();
        assert_eq!(rec.altitude_ft(), Some(35000));
    }

    #[test]
    fn test_position_requires_both_nonzero() {
        let rec: SnapshotRecord =
            serde_json::from_str(r#"{"hex":"a1b2c3","lat":35.4,"lon":0.0}"#).unwrap();
        assert!(rec.position().is_none());

        let rec: SnapshotRecord =
            serde_json::from_str(r#"{"hex":"a1b2c3","lat":35.4,"lon":-82.5}"#).unwrap();
        assert_eq!(rec.position(), Some((35.4, -82.5)));
    }

    #[test]
    fn test_snapshot_unknown_fields_ignored() {
        let snap: AircraftSnapshot = serde_json::from_str(
            r#"{"now":1700000000.5,"messages":42,"aircraft":[{"hex":"a1b2c3","category":"A3"}]}"#,
        )
        .unwrap();
        assert_eq!(snap.now, Some(1700000000.5));
        assert_eq!(snap.aircraft.len(), 1);
    }
}
