//! Flat `key=value` configuration for the tracker.
//!
//! The config file uses one `key=value` pair per line with `#` comments.
//! Values coerce to bool (`true/yes/1/on`), int, float, or string. Bad
//! lines and unknown keys are warned about and skipped; the only fatal
//! condition is a missing file or a missing data source path, for which
//! no sensible default exists. The loaded struct is built once at startup
//! and handed to every component: there is no global instance.

use std::collections::HashMap;
use std::path::Path;

use crate::types::{PiplaneError, Result};

/// Full tracker configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the dump1090-fa aircraft.json file. Required.
    pub data_source_path: String,
    /// Seconds between poll cycles.
    pub poll_interval: f64,
    /// Seconds of silence before a roster entry expires.
    pub expiry_timeout: f64,
    pub console_enabled: bool,
    pub lcd_enabled: bool,
    pub oled_enabled: bool,
    pub terminal_view_enabled: bool,
    pub oled: OledConfig,
    pub sound: SoundConfig,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone)]
pub struct OledConfig {
    pub width: u32,
    pub height: u32,
    pub i2c_address: u16,
}

#[derive(Debug, Clone)]
pub struct SoundConfig {
    /// Path to the alert audio file; empty disables sound alerts.
    pub audio_file: String,
    /// Minimum seconds between alerts.
    pub cooldown: f64,
    /// Playback volume, 0-100.
    pub volume: u8,
}

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    /// HTTP request timeout in seconds.
    pub timeout: f64,
    /// Minimum seconds between upstream lookup calls.
    pub rate_limit: f64,
    /// Seconds a cached lookup result stays valid.
    pub cache_timeout: f64,
}

impl Config {
    /// Load configuration from a flat config file.
    ///
    /// Returns the config plus non-fatal warnings for the caller to
    /// narrate. Errors only on a missing/unreadable file or a missing
    /// data source path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<(Config, Vec<String>)> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PiplaneError::Config(format!(
                "configuration file '{}' does not exist",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| PiplaneError::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&text)
    }

    /// Parse config text. See `load` for semantics.
    pub fn parse(text: &str) -> Result<(Config, Vec<String>)> {
        let mut raw: HashMap<String, RawValue> = HashMap::new();
        let mut warnings = Vec::new();

        for (line_num, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => {
                    raw.insert(key.trim().to_string(), coerce(value.trim()));
                }
                None => warnings.push(format!("invalid config line {}: {line}", line_num + 1)),
            }
        }

        let mut cfg = ConfigReader {
            raw,
            warnings: &mut warnings,
        };

        let data_source_path = match cfg.take_str("data_source_file_path") {
            Some(p) if !p.is_empty() => p,
            _ => {
                return Err(PiplaneError::Config(
                    "data_source_file_path is not set: no default exists for the \
                     aircraft data location"
                        .into(),
                ))
            }
        };

        let config = Config {
            data_source_path,
            poll_interval: cfg.float("poll_interval", 5.0),
            expiry_timeout: cfg.float("aircraft_expiry_timeout", 300.0),
            console_enabled: cfg.bool("display_console_enabled", true),
            lcd_enabled: cfg.bool("display_lcd_enabled", true),
            oled_enabled: cfg.bool("display_oled_enabled", true),
            terminal_view_enabled: cfg.bool("terminal_view_enabled", true),
            oled: OledConfig {
                width: cfg.int("oled_width", 128) as u32,
                height: cfg.int("oled_height", 32) as u32,
                i2c_address: cfg.int("oled_i2c_address", 0x3C) as u16,
            },
            sound: SoundConfig {
                audio_file: cfg.take_str("sound_alert_audio_file").unwrap_or_default(),
                cooldown: cfg.float("sound_alert_cooldown", 1.0),
                volume: cfg.int("sound_alert_volume", 70).clamp(0, 100) as u8,
            },
            enrichment: EnrichmentConfig {
                enabled: cfg.bool("enrichment_enabled", false),
                timeout: cfg.float("enrichment_timeout", 10.0),
                rate_limit: cfg.float("enrichment_rate_limit", 1.0),
                cache_timeout: cfg.float("enrichment_cache_timeout", 300.0),
            },
        };

        let mut leftover: Vec<String> = cfg.raw.into_keys().collect();
        leftover.sort();
        for key in leftover {
            warnings.push(format!("unrecognized config key: {key}"));
        }

        Ok((config, warnings))
    }
}

// ---------------------------------------------------------------------------
// Value coercion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Coerce a raw value string: bool, then int, then float, then string.
fn coerce(value: &str) -> RawValue {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => return RawValue::Bool(true),
        "false" | "no" | "off" => return RawValue::Bool(false),
        _ => {}
    }
    if !value.contains('.') {
        if let Ok(i) = value.parse::<i64>() {
            return RawValue::Int(i);
        }
    }
    if let Ok(f) = value.parse::<f64>() {
        return RawValue::Float(f);
    }
    RawValue::Str(value.to_string())
}

struct ConfigReader<'a> {
    raw: HashMap<String, RawValue>,
    warnings: &'a mut Vec<String>,
}

impl ConfigReader<'_> {
    fn bool(&mut self, key: &str, default: bool) -> bool {
        match self.raw.remove(key) {
            None => default,
            Some(RawValue::Bool(b)) => b,
            // 1/0 parse as ints before the bool check
            Some(RawValue::Int(i)) => i != 0,
            Some(other) => {
                self.warn(key, "boolean", &other);
                default
            }
        }
    }

    fn int(&mut self, key: &str, default: i64) -> i64 {
        match self.raw.remove(key) {
            None => default,
            Some(RawValue::Int(i)) => i,
            Some(other) => {
                self.warn(key, "integer", &other);
                default
            }
        }
    }

    fn float(&mut self, key: &str, default: f64) -> f64 {
        match self.raw.remove(key) {
            None => default,
            Some(RawValue::Float(f)) => f,
            Some(RawValue::Int(i)) => i as f64,
            Some(other) => {
                self.warn(key, "number", &other);
                default
            }
        }
    }

    fn take_str(&mut self, key: &str) -> Option<String> {
        match self.raw.remove(key) {
            None => None,
            Some(RawValue::Str(s)) => Some(s),
            Some(RawValue::Bool(b)) => Some(b.to_string()),
            Some(RawValue::Int(i)) => Some(i.to_string()),
            Some(RawValue::Float(f)) => Some(f.to_string()),
        }
    }

    fn warn(&mut self, key: &str, wanted: &str, got: &RawValue) {
        self.warnings
            .push(format!("config key {key}: expected {wanted}, got {got:?}: using default"));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "data_source_file_path=/var/run/dump1090-fa/aircraft.json\n";

    #[test]
    fn test_minimal_config_defaults() {
        let (cfg, warnings) = Config::parse(MINIMAL).unwrap();
        assert_eq!(cfg.data_source_path, "/var/run/dump1090-fa/aircraft.json");
        assert_eq!(cfg.poll_interval, 5.0);
        assert_eq!(cfg.expiry_timeout, 300.0);
        assert!(cfg.lcd_enabled);
        assert!(cfg.oled_enabled);
        assert_eq!(cfg.oled.width, 128);
        assert_eq!(cfg.oled.i2c_address, 0x3C);
        assert_eq!(cfg.sound.volume, 70);
        assert!(!cfg.enrichment.enabled);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_full_config() {
        let text = "\
# piplane config
data_source_file_path=/tmp/aircraft.json
poll_interval=2.5
aircraft_expiry_timeout=120
display_lcd_enabled=no
display_oled_enabled=on
oled_width=128
oled_height=64
sound_alert_volume=85
sound_alert_cooldown=3.0
sound_alert_audio_file=/opt/alert.mp3
enrichment_enabled=yes
enrichment_rate_limit=2.0
";
        let (cfg, warnings) = Config::parse(text).unwrap();
        assert_eq!(cfg.poll_interval, 2.5);
        assert_eq!(cfg.expiry_timeout, 120.0);
        assert!(!cfg.lcd_enabled);
        assert!(cfg.oled_enabled);
        assert_eq!(cfg.oled.height, 64);
        assert_eq!(cfg.sound.volume, 85);
        assert_eq!(cfg.sound.audio_file, "/opt/alert.mp3");
        assert!(cfg.enrichment.enabled);
        assert_eq!(cfg.enrichment.rate_limit, 2.0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_data_source_is_fatal() {
        assert!(matches!(
            Config::parse("poll_interval=5\n"),
            Err(PiplaneError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_line_warns_not_fatal() {
        let text = format!("{MINIMAL}this line has no equals sign\n");
        let (_, warnings) = Config::parse(&text).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("invalid config line"));
    }

    #[test]
    fn test_wrong_type_warns_and_defaults() {
        let text = format!("{MINIMAL}poll_interval=often\n");
        let (cfg, warnings) = Config::parse(&text).unwrap();
        assert_eq!(cfg.poll_interval, 5.0);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unknown_key_warns() {
        let text = format!("{MINIMAL}lcd_brightness=9\n");
        let (_, warnings) = Config::parse(&text).unwrap();
        assert!(warnings.iter().any(|w| w.contains("lcd_brightness")));
    }

    #[test]
    fn test_numeric_bool() {
        let text = format!("{MINIMAL}display_lcd_enabled=0\ndisplay_oled_enabled=1\n");
        let (cfg, _) = Config::parse(&text).unwrap();
        assert!(!cfg.lcd_enabled);
        assert!(cfg.oled_enabled);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = format!("# comment\n\n{MINIMAL}\n# trailing\n");
        let (_, warnings) = Config::parse(&text).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/piplane.conf"),
            Err(PiplaneError::Config(_))
        ));
    }
}
