//! Module sources
//!
//! A module source knows where candidate module directories live. Sources are
//! ordered by an explicit priority table so that system modules are always
//! considered before user modules, independent of declaration order.

use crate::plugin::error::{PluginError, PluginResult};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Kind of a module source
#[derive(EnumIter, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// Modules shipped with the host
    System,
    /// Modules installed by the user
    User,
    /// Module directories named explicitly in configuration
    Config,
}

impl SourceType {
    /// Sort priority, lower first
    pub fn priority(&self) -> u8 {
        match self {
            Self::System => 0,
            Self::User => 1,
            Self::Config => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Config => "config",
        }
    }

    /// Resolve a source type from its name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::iter().find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A provider of candidate module directories
pub trait ModuleSource: Send + Sync + fmt::Debug {
    /// Human readable source name, used in logs
    fn name(&self) -> &str;

    /// The source's type; `None` sorts ahead of every typed source
    fn source_type(&self) -> Option<SourceType>;

    /// Candidate module directories, scanned once and memoized
    fn find(&self) -> &[PathBuf];
}

/// Order two sources: typeless first, then by type priority
pub fn compare_sources(a: &dyn ModuleSource, b: &dyn ModuleSource) -> Ordering {
    let a = a.source_type().map(|t| t.priority());
    let b = b.source_type().map(|t| t.priority());
    a.cmp(&b)
}

/// Stable sort of sources by [`compare_sources`]; ties keep discovery order
pub fn sort_sources(sources: &mut [Box<dyn ModuleSource>]) {
    sources.sort_by(|a, b| compare_sources(a.as_ref(), b.as_ref()));
}

/// True if `path` is a directory we can list
fn is_readable_dir(path: &Path) -> bool {
    path.is_dir() && std::fs::read_dir(path).is_ok()
}

/// Accept `path` as a module directory, logging the outcome
fn accept_dir(path: &Path) -> bool {
    if is_readable_dir(path) {
        log::info!("Adding module directory {}", path.display());
        true
    } else {
        log::warn!(
            "Skipping {}: not a readable directory",
            path.display()
        );
        false
    }
}

/// The immediate child directories of `root`, sorted by path
///
/// An absent root yields an empty list.
pub(crate) fn scan_children(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        log::debug!("Module root {} does not exist", root.display());
        return Vec::new();
    }

    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Unable to list module root {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                log::warn!("Unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .collect();
    candidates.sort();

    candidates.into_iter().filter(|path| accept_dir(path)).collect()
}

/// Modules shipped with the host: every child directory of the system root
#[derive(Debug)]
pub struct SystemDirSource {
    root: PathBuf,
    found: OnceLock<Vec<PathBuf>>,
}

impl SystemDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            found: OnceLock::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModuleSource for SystemDirSource {
    fn name(&self) -> &str {
        "system directory"
    }

    fn source_type(&self) -> Option<SourceType> {
        Some(SourceType::System)
    }

    fn find(&self) -> &[PathBuf] {
        self.found.get_or_init(|| scan_children(&self.root))
    }
}

/// Modules installed by the user: every child directory of the user root
#[derive(Debug)]
pub struct UserDirSource {
    root: PathBuf,
    found: OnceLock<Vec<PathBuf>>,
}

impl UserDirSource {
    /// Fails when no user directory is configured
    pub fn new(root: Option<PathBuf>) -> PluginResult<Self> {
        let root = root.ok_or_else(|| PluginError::SourceUnavailable {
            source_name: "user directory".to_string(),
            cause: "no user directory configured".to_string(),
        })?;
        Ok(Self {
            root,
            found: OnceLock::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModuleSource for UserDirSource {
    fn name(&self) -> &str {
        "user directory"
    }

    fn source_type(&self) -> Option<SourceType> {
        Some(SourceType::User)
    }

    fn find(&self) -> &[PathBuf] {
        self.found.get_or_init(|| scan_children(&self.root))
    }
}

/// Module directories listed one by one in configuration
#[derive(Debug)]
pub struct ConfigDirSource {
    dirs: Vec<PathBuf>,
    found: OnceLock<Vec<PathBuf>>,
}

impl ConfigDirSource {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            found: OnceLock::new(),
        }
    }
}

impl ModuleSource for ConfigDirSource {
    fn name(&self) -> &str {
        "configured directories"
    }

    fn source_type(&self) -> Option<SourceType> {
        Some(SourceType::Config)
    }

    fn find(&self) -> &[PathBuf] {
        self.found.get_or_init(|| {
            let mut accepted: Vec<PathBuf> = Vec::new();
            for dir in &self.dirs {
                if accepted.contains(dir) {
                    continue;
                }
                if accept_dir(dir) {
                    accepted.push(dir.clone());
                }
            }
            accepted
        })
    }
}
