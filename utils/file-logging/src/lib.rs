use anyhow::Result;
use chrono::format::strftime::StrftimeItems;
use chrono::format::DelayedFormat;
use chrono::{DateTime, Local};
use flexi_logger::{
    style, AdaptiveFormat, Age, Cleanup, Criterion, DeferredNow, Duplicate, Logger, Naming, Record,
};
use std::path::PathBuf;

pub use flexi_logger::LoggerHandle;

/// Local time with offset and milliseconds, e.g. `2024-01-15T12:00:00.123+0100`.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";
const ROTATE_SIZE: u64 = 256 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 2;
const KEEP_COMPRESSED_FILES: usize = 14;

/// Where and how verbosely the service logs.
#[derive(Clone, Debug)]
pub struct LogSettings {
    pub default_level: String,
    /// `module=level` pairs applied on top of the default level.
    pub module_levels: Vec<(String, String)>,
    /// Duplicate logs into rotated files in this directory.
    pub log_dir: Option<PathBuf>,
    /// Raise the default level to `debug`. Module levels stay untouched.
    pub debug: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            default_level: "info".to_string(),
            module_levels: Vec::new(),
            log_dir: None,
            debug: false,
        }
    }
}

impl LogSettings {
    pub fn module(mut self, module: &str, level: &str) -> Self {
        self.module_levels.push((module.to_string(), level.to_string()));
        self
    }

    /// Filter string in the `env_logger` syntax, used when `RUST_LOG` is unset.
    pub fn filter_spec(&self) -> String {
        let level = match self.debug {
            true => "debug",
            false => self.default_level.as_str(),
        };
        self.module_levels
            .iter()
            .map(|(module, level)| format!("{}={}", module, level))
            .chain(std::iter::once(level.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn format_date(now: &mut DeferredNow) -> DelayedFormat<StrftimeItems> {
    DateTime::<Local>::from(*now.now()).format(DATE_FORMAT)
}

fn plain_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "[{} {:5} {}] {}",
        format_date(now),
        record.level(),
        record.module_path().unwrap_or("<unnamed>"),
        record.args()
    )
}

fn color_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let level = record.level();
    let gray = yansi::Color::Fixed(247);
    write!(
        w,
        "[{} {:5} {}] {}",
        gray.paint(format_date(now)),
        style(level, level),
        gray.paint(record.module_path().unwrap_or("<unnamed>")),
        record.args()
    )
}

pub fn start_logger(settings: &LogSettings) -> Result<LoggerHandle> {
    let mut logger = Logger::with_env_or_str(settings.filter_spec()).format(plain_format);
    if let Some(log_dir) = &settings.log_dir {
        logger = logger
            .log_to_file()
            .directory(log_dir)
            .rotate(
                Criterion::AgeOrSize(Age::Day, ROTATE_SIZE),
                Naming::Timestamps,
                Cleanup::KeepLogAndCompressedFiles(KEEP_LOG_FILES, KEEP_COMPRESSED_FILES),
            )
            .print_message()
            .duplicate_to_stderr(Duplicate::All);
    }

    let handle = logger
        .adaptive_format_for_stderr(AdaptiveFormat::Custom(plain_format, color_format))
        .set_palette("9;11;2;7;8".to_string())
        .start()?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_spec_default() {
        assert_eq!(LogSettings::default().filter_spec(), "info");
    }

    #[test]
    fn test_filter_spec_debug_keeps_module_levels() {
        let settings = LogSettings {
            debug: true,
            ..LogSettings::default()
        }
        .module("actix_server", "warn")
        .module("tf_persistence", "info");

        assert_eq!(
            settings.filter_spec(),
            "actix_server=warn,tf_persistence=info,debug"
        );
    }
}
