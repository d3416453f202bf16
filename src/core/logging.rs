//! Logging backend for the host
//!
//! All code logs through the `log` facade; this module installs flexi_logger
//! as the backend with one of three line formats (text, ext, json).

use std::sync::{Mutex, OnceLock};

static LOGGER_HANDLE: OnceLock<Mutex<flexi_logger::LoggerHandle>> = OnceLock::new();

/// Install the logger. Only the first successful call takes effect.
pub fn init_logging(
    log_level: Option<&str>,
    log_format: Option<&str>,
    log_file: Option<&str>,
    color_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use flexi_logger::{FileSpec, Logger};

    let level_str = log_level.unwrap_or("info");
    let format_type = log_format.unwrap_or("text");

    let mut logger = Logger::try_with_str(level_str)?;

    logger = match (format_type, color_enabled) {
        ("json", _) => logger.format(json_format),
        ("ext", true) => logger.format(extended_color_format),
        ("ext", false) => logger.format(extended_format),
        (_, true) => logger.format(simple_color_format),
        (_, false) => logger.format(simple_format),
    };

    if let Some(file_path) = log_file {
        let file_spec = FileSpec::try_from(std::path::Path::new(file_path))?;
        logger = logger.log_to_file(file_spec);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(Mutex::new(handle));

    Ok(())
}

/// Change the active log level at runtime
///
/// Format, file and colour are fixed at initialisation by flexi_logger;
/// only the level specification can be swapped afterwards.
pub fn reconfigure_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let handle_mutex = LOGGER_HANDLE
        .get()
        .ok_or("Logger handle not initialised. Call init_logging first.")?;
    let mut handle = handle_mutex
        .lock()
        .map_err(|_| "Could not acquire logger handle lock")?;
    handle.parse_and_push_temp_spec(log_level)?;
    Ok(())
}

/// Map a verbosity offset (-v / -q counts) onto a level string
pub fn level_for_verbosity(base: &str, verbosity: i8) -> String {
    const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
    let base_index = LEVELS
        .iter()
        .position(|l| l.eq_ignore_ascii_case(base))
        .unwrap_or(3) as i8;
    let index = (base_index + verbosity).clamp(0, LEVELS.len() as i8 - 1) as usize;
    LEVELS[index].to_string()
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

// "YYYY-MM-DD HH:mm:ss.fff INF message"
fn simple_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args()
    )
}

fn simple_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::*;

    let level_colored = match record.level() {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    };

    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored,
        record.args()
    )
}

// "YYYY-MM-DD HH:mm:ss.fff INF message (plugin/loader.rs:42)"
fn extended_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line())
    )
}

fn extended_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::*;

    let level_colored = match record.level() {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    };

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored,
        record.args(),
        format_target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use serde_json::{json, to_string};

    let json_obj = json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line())
    });

    match to_string(&json_obj) {
        Ok(json_string) => w.write_all(json_string.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log message\"}"),
    }
}

// modhost::plugin::loader -> plugin/loader.rs
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path_like = if let Some(without_prefix) = target.strip_prefix("modhost::") {
        without_prefix.replace("::", "/") + ".rs"
    } else {
        target.replace("::", "/")
    };

    match line {
        Some(line_num) => format!("{}:{}", path_like, line_num),
        None => path_like,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_format_target_as_path_strips_crate_prefix() {
        assert_eq!(
            format_target_as_path("modhost::plugin::loader", Some(42)),
            "plugin/loader.rs:42"
        );
        assert_eq!(format_target_as_path("other::thing", None), "other/thing");
    }

    #[test]
    fn test_extended_format_layout() {
        use flexi_logger::DeferredNow;

        let mut buffer = Vec::new();
        let mut now = DeferredNow::new();
        let record = log::Record::builder()
            .level(log::Level::Info)
            .target("modhost::messaging::queue")
            .line(Some(7))
            .args(format_args!("Test message"))
            .build();

        extended_format(&mut buffer, &mut now, &record).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("INF Test message"), "got: {}", output);
        assert!(output.ends_with("(messaging/queue.rs:7)"), "got: {}", output);
    }

    #[test]
    fn test_json_format_is_single_object() {
        use flexi_logger::DeferredNow;

        let mut buffer = Vec::new();
        let mut now = DeferredNow::new();
        let record = log::Record::builder()
            .level(log::Level::Warn)
            .target("modhost::plugin::source")
            .args(format_args!("skipping entry"))
            .build();

        json_format(&mut buffer, &mut now, &record).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value["level"], "WRN");
        assert_eq!(value["message"], "skipping entry");
        assert_eq!(value["target"], "plugin/source.rs");
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity("info", 0), "info");
        assert_eq!(level_for_verbosity("info", 1), "debug");
        assert_eq!(level_for_verbosity("info", 5), "trace");
        assert_eq!(level_for_verbosity("warn", -1), "error");
        assert_eq!(level_for_verbosity("error", -4), "off");
        assert_eq!(level_for_verbosity("bogus", 0), "info");
    }

    #[test]
    #[serial]
    fn test_init_logging_is_tolerant_of_repeat_calls() {
        // A second initialisation fails inside flexi_logger; either outcome is acceptable
        let first = init_logging(Some("debug"), None, None, false);
        let second = init_logging(Some("debug"), Some("ext"), None, false);
        assert!(first.is_ok() || second.is_err());

        log::debug!("logging initialised for tests");
        if LOGGER_HANDLE.get().is_some() {
            reconfigure_logging("warn").unwrap();
            reconfigure_logging("debug").unwrap();
        }
    }
}
