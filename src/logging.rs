use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use colored::Colorize;
use log::{Level, LevelFilter};

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Map the `-v` count to a level filter. `RUST_LOG` still wins when set.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Compact elapsed-time stamp: `  1.234s`, ` 2m05s`, ` 1h03m`
fn compact_timestamp(elapsed_ms: u128) -> String {
    let seconds = (elapsed_ms / 1000) as u64;
    let millis = (elapsed_ms % 1000) as u64;
    if seconds < 60 {
        format!("{:>3}.{:03}s", seconds, millis)
    } else if seconds < 3600 {
        format!("{:>2}m{:02}s", seconds / 60, seconds % 60)
    } else {
        format!("{:>2}h{:02}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

/// Last path segment of a module, cut to 12 chars for alignment
fn short_module(module_path: Option<&str>) -> &str {
    let module = module_path
        .and_then(|path| path.rsplit("::").next())
        .unwrap_or("unknown");
    module.get(..12).unwrap_or(module)
}

/// Initialize env_logger with the console's colored, timestamped line format.
/// Logs go to stderr so they never mix with the status output.
pub fn init(verbose: u8) {
    let start = *START_TIME.get_or_init(Instant::now);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_for_verbosity(verbose));
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.format(move |buf, record| {
        let level_char = match record.level() {
            Level::Error => "E".bright_red(),
            Level::Warn => "W".bright_yellow(),
            Level::Info => "I".bright_green(),
            Level::Debug => "D".bright_blue(),
            Level::Trace => "T".dimmed(),
        };
        writeln!(
            buf,
            "{} [{}] {:>12} | {}",
            compact_timestamp(start.elapsed().as_millis()).dimmed(),
            level_char,
            short_module(record.module_path()),
            record.args()
        )
    });

    // A second init (tests, embedding) keeps the first logger
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
