//! piplane: dump1090-fa aircraft monitor for small displays.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};

use piplane_core::config::Config;
use piplane_core::country::lookup_country;
use piplane_core::{FanoutQueue, Roster, SnapshotReader};

mod alert;
mod browse;
mod consumer;
mod lookup;
mod poll;
mod sinks;

use alert::SoundAlert;
use browse::RosterBrowser;
use consumer::ConsumerLoop;
use lookup::{HexDbClient, SharedLookup};
use poll::{PollLoop, SourceStatus};
use sinks::{ConsoleSink, DisplaySink, LcdSink, OledSink, StdoutLcd, StdoutOled};

/// Wall-clock time for log lines.
pub fn clock() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[derive(Parser)]
#[command(name = "piplane", version, about = "Aircraft monitor for dump1090-fa")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "PIPLANE_CONFIG", default_value = "piplane.conf")]
    config: PathBuf,

    /// Disable the LCD display even if enabled in the config
    #[arg(long)]
    no_lcd: bool,

    /// Disable the OLED display even if enabled in the config
    #[arg(long)]
    no_oled: bool,

    /// Disable sound alerts
    #[arg(long)]
    no_sound: bool,

    /// Override the poll interval in seconds
    #[arg(long)]
    interval: Option<f64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the aircraft in the current snapshot and exit
    List,

    /// Start monitoring immediately, skipping the menu
    Monitor,
}

fn main() {
    let cli = Cli::parse();

    let (mut config, warnings) = match Config::load(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };
    for warning in &warnings {
        eprintln!("config warning: {warning}");
    }
    if let Some(interval) = cli.interval {
        config.poll_interval = interval;
    }
    if cli.no_lcd {
        config.lcd_enabled = false;
    }
    if cli.no_oled {
        config.oled_enabled = false;
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        }) {
            eprintln!("warning: could not install signal handler: {e}");
        }
    }

    match cli.command {
        Some(Commands::List) => cmd_list(&config),
        Some(Commands::Monitor) => run_monitor(&config, cli.no_sound, stop),
        None => menu(&config, cli.no_sound, stop),
    }
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

fn menu(config: &Config, no_sound: bool, stop: Arc<AtomicBool>) {
    let stdin = io::stdin();
    loop {
        println!();
        println!("PiPlane Tracker");
        println!("  1) Start monitoring");
        println!("  2) List aircraft in current snapshot");
        println!("  q) Quit");
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        match line.trim() {
            "1" => {
                run_monitor(config, no_sound, stop);
                // The monitor session owns stdin once started; exit after it.
                break;
            }
            "2" => cmd_list(config),
            "q" | "Q" => break,
            _ => println!("Unknown choice"),
        }
    }
}

// ---------------------------------------------------------------------------
// One-shot snapshot listing
// ---------------------------------------------------------------------------

fn cmd_list(config: &Config) {
    let reader = SnapshotReader::new(&config.data_source_path);
    let snapshot = match reader.read() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {e}", config.data_source_path);
            std::process::exit(1);
        }
    };

    println!();
    println!(
        "{} aircraft in snapshot ({} messages)",
        snapshot.aircraft.len(),
        snapshot.messages.unwrap_or(0)
    );

    if snapshot.aircraft.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ICAO", "Callsign", "Squawk", "Alt (ft)", "Speed", "Lat", "Lon", "Country",
    ]);
    for record in &snapshot.aircraft {
        let (lat, lon) = match record.position() {
            Some((lat, lon)) => (format!("{lat:.4}"), format!("{lon:.4}")),
            None => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            Cell::new(record.hex.to_ascii_uppercase()),
            Cell::new(record.callsign().unwrap_or("-")),
            Cell::new(record.squawk.as_deref().unwrap_or("-")),
            Cell::new(
                record
                    .altitude_ft()
                    .map(|a| a.to_string())
                    .unwrap_or("-".into()),
            ),
            Cell::new(
                record
                    .gs
                    .map(|s| format!("{s:.0}"))
                    .unwrap_or("-".into()),
            ),
            Cell::new(lat),
            Cell::new(lon),
            Cell::new(lookup_country(&record.hex).unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

// ---------------------------------------------------------------------------
// Monitor session
// ---------------------------------------------------------------------------

fn build_sinks(config: &Config) -> Vec<Box<dyn DisplaySink>> {
    let mut sinks: Vec<Box<dyn DisplaySink>> = Vec::new();
    if config.console_enabled {
        sinks.push(Box::new(ConsoleSink::new()));
    }
    if config.lcd_enabled {
        sinks.push(Box::new(LcdSink::new(Box::new(StdoutLcd))));
    }
    if config.oled_enabled {
        sinks.push(Box::new(OledSink::new(Box::new(StdoutOled), &config.oled)));
    }
    sinks
}

fn run_monitor(config: &Config, no_sound: bool, stop: Arc<AtomicBool>) {
    stop.store(false, Ordering::SeqCst);

    println!("[{}] monitoring {}", clock(), config.data_source_path);

    let roster = Arc::new(Mutex::new(Roster::new(config.expiry_timeout)));
    let status = Arc::new(Mutex::new(SourceStatus::Starting));

    let sinks = build_sinks(config);
    if sinks.is_empty() {
        eprintln!("warning: all displays disabled");
    }
    let queues: Vec<Arc<Mutex<FanoutQueue>>> = sinks
        .iter()
        .map(|_| Arc::new(Mutex::new(FanoutQueue::new())))
        .collect();

    let lookup: Option<SharedLookup> = if config.enrichment.enabled {
        Some(Arc::new(Mutex::new(HexDbClient::new(&config.enrichment))))
    } else {
        None
    };

    let sound = if no_sound {
        None
    } else {
        SoundAlert::from_config(&config.sound)
    };

    let mut handles = Vec::new();

    {
        let mut poller = PollLoop::new(
            SnapshotReader::new(&config.data_source_path),
            roster.clone(),
            queues.clone(),
            status.clone(),
            sound,
            Duration::from_secs_f64(config.poll_interval.max(0.1)),
            stop.clone(),
        );
        handles.push(thread::spawn(move || poller.run()));
    }

    for (sink, queue) in sinks.into_iter().zip(queues.iter()) {
        let mut consumer = ConsumerLoop::new(
            sink,
            queue.clone(),
            roster.clone(),
            status.clone(),
            lookup.clone(),
            stop.clone(),
        );
        handles.push(thread::spawn(move || consumer.run()));
    }

    if config.terminal_view_enabled {
        RosterBrowser::new(roster, stop.clone()).run();
    } else {
        while !stop.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(100));
        }
    }

    stop.store(true, Ordering::SeqCst);
    for handle in handles {
        let _ = handle.join();
    }
    println!("[{}] stopped", clock());
}
