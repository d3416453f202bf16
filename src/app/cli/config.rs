//! TOML configuration file parsing and loading
//!
//! The configuration file is optional. When no file is named on the command
//! line, `<config dir>/modhost/modhost.toml` is used if it exists. Values given
//! on the command line take precedence over the file; list values (module
//! directories, obsolete names) are merged, file entries first.
//!
//! ```toml
//! system-dir = "/usr/share/modhost/plugins"
//! user-dir = "~/.local/share/modhost/plugins"
//! module-dir = ["/srv/extra-module"]
//! obsolete = "legacy-sync"
//! log-level = "debug"
//! log-format = "ext"
//! log-file = "none"
//! color = false
//! ```

use crate::app::cli::args::Args;
use crate::core::error_handling::ContextualError;
use crate::core::logging::level_for_verbosity;
use crate::plugin::api::SourceSettings;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
const LOG_FORMATS: [&str; 3] = ["text", "ext", "json"];

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {path}")]
    NotFound { path: String },

    #[error("Error reading configuration file {path}: {cause}")]
    Read { path: String, cause: String },

    #[error("Error parsing configuration file {path}: {cause}")]
    Parse { path: String, cause: String },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

/// `<config dir>/modhost/modhost.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("modhost").join("modhost.toml"))
}

/// Load the configuration table
///
/// An explicitly named file must exist; the default file is optional.
pub async fn load_config_file(explicit: Option<&Path>) -> ConfigResult<Option<toml::Table>> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                });
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                log::debug!("No configuration file found");
                return Ok(None);
            }
        },
    };

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

    let table = toml::from_str::<toml::Table>(&contents).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        cause: e.to_string(),
    })?;

    log::debug!("Loaded configuration from {}", path.display());
    Ok(Some(table))
}

/// Fully resolved host configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub system_dir: PathBuf,
    pub user_dir: Option<PathBuf>,
    pub module_dirs: Vec<PathBuf>,
    pub obsolete: Vec<String>,
    pub log_level: String,
    pub log_format: String,
    pub log_file: Option<PathBuf>,
    pub color: Option<bool>,
}

impl HostConfig {
    /// Combine command line arguments with an optional configuration table
    pub fn resolve(args: &Args, file: Option<&toml::Table>) -> ConfigResult<Self> {
        let empty = toml::Table::new();
        let file = file.unwrap_or(&empty);

        let system_dir = args
            .system_dir
            .clone()
            .or(string_value(file, "system-dir")?.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("plugins"));

        let user_dir = args
            .user_dir
            .clone()
            .or(string_value(file, "user-dir")?.map(PathBuf::from))
            .or_else(|| dirs::data_dir().map(|d| d.join("modhost").join("plugins")));

        let mut module_dirs: Vec<PathBuf> = string_list(file, "module-dir")?
            .into_iter()
            .map(PathBuf::from)
            .collect();
        module_dirs.extend(args.module_dirs.iter().cloned());
        dedup(&mut module_dirs);

        let mut obsolete = string_list(file, "obsolete")?;
        obsolete.extend(args.obsolete.iter().map(|s| s.trim().to_string()));
        obsolete.retain(|s| !s.is_empty());
        dedup(&mut obsolete);

        let base_level = match &args.log_level {
            Some(level) => level.clone(),
            None => checked(file, "log-level", &LOG_LEVELS)?
                .unwrap_or_else(|| "info".to_string()),
        };
        let log_level = level_for_verbosity(&base_level, args.verbosity());

        let log_format = match &args.log_format {
            Some(format) => format.clone(),
            None => checked(file, "log-format", &LOG_FORMATS)?
                .unwrap_or_else(|| "text".to_string()),
        };

        let log_file = args
            .log_file
            .clone()
            .or(string_value(file, "log-file")?.map(PathBuf::from))
            .filter(|p| {
                let text = p.to_string_lossy();
                !(text.eq_ignore_ascii_case("none") || text == "-")
            });

        let color = match args.color_choice() {
            Some(choice) => Some(choice),
            None => bool_value(file, "color")?,
        };

        Ok(Self {
            system_dir,
            user_dir,
            module_dirs,
            obsolete,
            log_level,
            log_format,
            log_file,
            color,
        })
    }

    /// Settings for the module source registry
    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings {
            system_dir: self.system_dir.clone(),
            user_dir: self.user_dir.clone(),
            module_dirs: self.module_dirs.clone(),
        }
    }

    /// Explicit choice, otherwise colour when stdout is a terminal
    pub fn use_color(&self) -> bool {
        self.color.unwrap_or_else(|| std::io::stdout().is_terminal())
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn string_value(table: &toml::Table, key: &str) -> ConfigResult<Option<String>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.trim().to_string()))
            .ok_or_else(|| invalid(key, "expected a string")),
    }
}

fn bool_value(table: &toml::Table, key: &str) -> ConfigResult<Option<bool>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| invalid(key, "expected true or false")),
    }
}

/// A string or an array of strings
fn string_list(table: &toml::Table, key: &str) -> ConfigResult<Vec<String>> {
    match table.get(key) {
        None => Ok(Vec::new()),
        Some(toml::Value::String(s)) => Ok(vec![s.trim().to_string()]),
        Some(toml::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| invalid(key, "expected an array of strings"))
            })
            .collect(),
        Some(_) => Err(invalid(key, "expected a string or an array of strings")),
    }
}

fn checked(table: &toml::Table, key: &str, allowed: &[&str]) -> ConfigResult<Option<String>> {
    match string_value(table, key)? {
        Some(value) if !allowed.contains(&value.as_str()) => Err(invalid(
            key,
            &format!("'{}' is not one of {}", value, allowed.join(", ")),
        )),
        other => Ok(other),
    }
}

fn dedup<T: PartialEq>(items: &mut Vec<T>) {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    *items = unique;
}
