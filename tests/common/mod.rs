//! Shared fixtures for integration tests

use modhost::app::host::build_services;
use modhost::core::services::HostServices;
use modhost::plugin::api::{SourceSettings, MANIFEST_FILE_NAME};
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch module tree with `system/`, `user/` and `extra/` roots
///
/// Modules under `extra/` are only seen when passed as configured module
/// directories.
pub struct ModuleTree {
    pub root: TempDir,
}

#[allow(dead_code)]
impl ModuleTree {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        for dir in ["system", "user", "extra"] {
            std::fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        Self { root }
    }

    pub fn dir(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Write `<root>/<dir>/<module>/module.toml`
    pub fn module(&self, root: &str, module: &str, manifest: &str) -> PathBuf {
        let path = self.dir(root).join(module);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join(MANIFEST_FILE_NAME), manifest).unwrap();
        path
    }

    pub fn settings(&self, module_dirs: Vec<PathBuf>) -> SourceSettings {
        SourceSettings {
            system_dir: self.dir("system"),
            user_dir: Some(self.dir("user")),
            module_dirs,
        }
    }

    pub fn services(&self, module_dirs: Vec<PathBuf>, obsolete: &[&str]) -> HostServices {
        build_services(
            self.settings(module_dirs),
            obsolete.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }
}

#[allow(dead_code)]
pub fn manifest(name: &str, version: &str, extra: &str) -> String {
    format!("name = \"{}\"\nversion = \"{}\"\n{}", name, version, extra)
}
