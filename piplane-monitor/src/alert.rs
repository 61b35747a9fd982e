//! Sound alert for newly detected aircraft.
//!
//! Playback runs in a detached thread so the poll cycle never waits on the
//! audio player. A cooldown keeps bursts of arrivals from stacking alerts.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use piplane_core::config::SoundConfig;

// mpg123 full-scale output value for the -f gain flag.
const MPG123_FULL_SCALE: i64 = 32768;

pub struct SoundAlert {
    audio_file: PathBuf,
    cooldown: f64,
    volume: u8,
    last_alert: f64,
}

impl SoundAlert {
    /// Returns `None` when no audio file is configured or the file is absent.
    pub fn from_config(sound: &SoundConfig) -> Option<Self> {
        if sound.audio_file.is_empty() {
            return None;
        }
        let audio_file = PathBuf::from(&sound.audio_file);
        if !audio_file.exists() {
            eprintln!(
                "warning: sound alert file not found: {}",
                audio_file.display()
            );
            return None;
        }
        Some(SoundAlert {
            audio_file,
            cooldown: sound.cooldown,
            volume: sound.volume,
            last_alert: f64::NEG_INFINITY,
        })
    }

    fn should_fire(&self, now: f64) -> bool {
        now - self.last_alert >= self.cooldown
    }

    /// Fire-and-forget: spawns playback if the cooldown has elapsed.
    pub fn trigger(&mut self, now: f64) {
        if !self.should_fire(now) {
            return;
        }
        self.last_alert = now;
        spawn_playback(self.audio_file.clone(), self.volume);
    }
}

fn spawn_playback(audio_file: PathBuf, volume: u8) {
    thread::spawn(move || {
        if let Err(e) = play_file(&audio_file, volume) {
            eprintln!("sound alert failed: {e}");
        }
    });
}

fn play_file(audio_file: &Path, volume: u8) -> std::io::Result<()> {
    let gain = MPG123_FULL_SCALE * i64::from(volume) / 100;
    let status = Command::new("mpg123")
        .arg("-q")
        .arg("-f")
        .arg(gain.to_string())
        .arg(audio_file)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if !status.success() {
        eprintln!("mpg123 exited with {status}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(cooldown: f64) -> SoundAlert {
        SoundAlert {
            audio_file: PathBuf::from("/nonexistent/alert.mp3"),
            cooldown,
            volume: 70,
            last_alert: f64::NEG_INFINITY,
        }
    }

    #[test]
    fn test_first_trigger_always_fires() {
        let a = alert(60.0);
        assert!(a.should_fire(0.0));
    }

    #[test]
    fn test_cooldown_suppresses_repeat() {
        let mut a = alert(10.0);
        assert!(a.should_fire(100.0));
        a.last_alert = 100.0;
        assert!(!a.should_fire(105.0));
        assert!(a.should_fire(110.0));
    }

    #[test]
    fn test_unconfigured_file_disables_alert() {
        let sound = SoundConfig {
            audio_file: String::new(),
            cooldown: 1.0,
            volume: 70,
        };
        assert!(SoundAlert::from_config(&sound).is_none());
    }

    #[test]
    fn test_missing_file_disables_alert() {
        let sound = SoundConfig {
            audio_file: "/no/such/sound.mp3".into(),
            cooldown: 1.0,
            volume: 70,
        };
        assert!(SoundAlert::from_config(&sound).is_none());
    }
}
