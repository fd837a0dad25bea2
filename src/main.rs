//! touchgest – Touch gesture recognition.
//!
//! CLI entry point: replays a recorded pointer trace and prints gestures.

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::SystemTime;

use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record};

use touchgest::config::{AppConfig, TouchgestError, parse_config_file};
use touchgest::event::parse_trace;
use touchgest::recognizer::{GestureEvent, GestureHandlers, GestureRecognizer};
use touchgest::surface::{LocalSurface, SurfaceBinding};

#[derive(Parser)]
#[command(name = "touchgest", about = "Replay a pointer trace through the gesture engine")]
struct Cli {
    /// Trace file, one event per line (`-` reads stdin)
    trace: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the policy of this `[surface.<name>]` section
    #[arg(short, long)]
    surface: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Simple logger that writes to stderr and optionally to a log file.
struct TouchgestLogger {
    level: LevelFilter,
    file: Option<Mutex<std::fs::File>>,
}

impl Log for TouchgestLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("touchgest")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let line = format_line(secs, record);

        eprint!("{line}");

        if let Some(ref file_mutex) = self.file {
            if let Ok(mut f) = file_mutex.lock() {
                let _ = f.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Some(ref file_mutex) = self.file {
            if let Ok(mut f) = file_mutex.lock() {
                let _ = f.flush();
            }
        }
    }
}

/// `[secs LEVEL module::path] message`, newline-terminated.
fn format_line(secs: u64, record: &Record) -> String {
    let level = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    format!("[{secs} {level} {}] {}\n", record.target(), record.args())
}

fn init_logger(config: &AppConfig, verbose: bool) {
    // CLI --verbose overrides the config file setting.
    let level: LevelFilter = if verbose {
        LevelFilter::Debug
    } else {
        config.log_level.parse().unwrap_or(LevelFilter::Info)
    };

    let file = config.log_file.as_deref().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Mutex::new(file)),
            Err(e) => {
                eprintln!("Warning: cannot open log file '{path}': {e}");
                None
            }
        }
    });

    if log::set_boxed_logger(Box::new(TouchgestLogger { level, file })).is_ok() {
        log::set_max_level(level);
    }
}

fn read_trace(path: &Path) -> Result<String, TouchgestError> {
    let to_error = |source: io::Error| TouchgestError::TraceReadError {
        path: path.to_path_buf(),
        source,
    };
    if path == Path::new("-") {
        let mut contents = String::new();
        io::stdin().read_to_string(&mut contents).map_err(to_error)?;
        Ok(contents)
    } else {
        fs::read_to_string(path).map_err(to_error)
    }
}

fn printing_handlers() -> GestureHandlers {
    GestureHandlers::new()
        .on_tap(|| println!("{}", GestureEvent::Tap))
        .on_long_press(|| println!("{}", GestureEvent::LongPress))
        .on_swipe(|swipe| println!("{}", GestureEvent::Swipe(*swipe)))
        .on_pinch_update(|scale| println!("{}", GestureEvent::PinchUpdate { scale }))
        .on_pinch_end(|| println!("{}", GestureEvent::PinchEnd))
}

fn run(cli: &Cli) -> Result<(), TouchgestError> {
    let config = match &cli.config {
        Some(path) => parse_config_file(path)?,
        None => AppConfig::default(),
    };
    init_logger(&config, cli.verbose);

    let policy = config
        .policy_for(cli.surface.as_deref())
        .cloned()
        .unwrap_or_else(|| {
            log::warn!(
                "No [surface.{}] section, using the global policy",
                cli.surface.as_deref().unwrap_or_default()
            );
            config.policy.clone()
        });

    let events = parse_trace(&read_trace(&cli.trace)?)?;
    log::info!("Replaying {} events from {}", events.len(), cli.trace.display());

    let recognizer = GestureRecognizer::new(policy, printing_handlers())?;
    log::debug!("Effective policy: {:?}", recognizer.policy());
    let mut binding = SurfaceBinding::bind(LocalSurface::new(), recognizer);
    for event in events {
        binding.surface_mut().emit(event);
    }
    binding.teardown();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger(level: LevelFilter) -> TouchgestLogger {
        TouchgestLogger { level, file: None }
    }

    #[test]
    fn test_line_names_module() {
        let line = format_line(
            42,
            &Record::builder()
                .args(format_args!("Pinch ended"))
                .level(Level::Debug)
                .target("touchgest::recognizer")
                .build(),
        );
        assert_eq!(line, "[42 DEBUG touchgest::recognizer] Pinch ended\n");
    }

    #[test]
    fn test_enabled_filters_level_and_target() {
        let logger = logger(LevelFilter::Info);
        let meta = |level, target| Metadata::builder().level(level).target(target).build();
        assert!(logger.enabled(&meta(Level::Warn, "touchgest::surface")));
        assert!(!logger.enabled(&meta(Level::Debug, "touchgest::surface")));
        assert!(!logger.enabled(&meta(Level::Error, "toml::de")));
    }
}
