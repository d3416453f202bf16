//! Module loader
//!
//! Turns source directories into registered manifests and decides which
//! modules count as loaded. Resolution iterates until nothing changes, so a
//! module may depend on one discovered after it.

use crate::core::error_handling::log_skipped;
use crate::plugin::dependency::Dependency;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::manifest::Manifest;
use crate::plugin::registry::ModuleRegistry;
use crate::plugin::source_registry::ModuleSourceRegistry;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Why a module was not loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnloadedReason {
    Disabled,
    /// The required edges that did not check
    UnsatisfiedDependencies(Vec<Dependency>),
}

/// A module left unloaded after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnloadedModule {
    pub name: String,
    pub reason: UnloadedReason,
}

/// Outcome of [`PluginLoader::resolve`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Loaded module names, in the order they became loaded
    pub loaded: Vec<String>,
    pub unloaded: Vec<UnloadedModule>,
}

impl LoadReport {
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.iter().any(|n| n == name)
    }

    pub fn unloaded(&self, name: &str) -> Option<&UnloadedModule> {
        self.unloaded.iter().find(|m| m.name == name)
    }
}

/// Discovers modules from the source registry and resolves their dependencies
#[derive(Debug)]
pub struct PluginLoader {
    modules: Arc<ModuleRegistry>,
    sources: Arc<ModuleSourceRegistry>,
}

impl PluginLoader {
    pub fn new(modules: Arc<ModuleRegistry>, sources: Arc<ModuleSourceRegistry>) -> Self {
        Self { modules, sources }
    }

    /// Read the manifest of every candidate directory and register it
    ///
    /// Sources are walked in priority order, so on a name clash the
    /// higher-priority module wins. Returns the number of new registrations.
    pub fn discover(&self) -> PluginResult<usize> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut registered = 0;

        for source in self.sources.get_sources() {
            log::debug!("Scanning module source '{}'", source.name());

            for dir in source.find() {
                let key = dir.canonicalize().unwrap_or_else(|_| dir.clone());
                if !seen.insert(key) {
                    log::debug!("Already scanned {}", dir.display());
                    continue;
                }

                let mut manifest = match Manifest::load(dir) {
                    Ok(manifest) => manifest,
                    Err(e) => {
                        log_skipped(&format!("Invalid module in {}", dir.display()), &e);
                        continue;
                    }
                };
                manifest.set_source_type(source.source_type());

                match self.modules.register(manifest) {
                    Ok(manifest) => {
                        log::debug!(
                            "Registered module '{}' {} from {}",
                            manifest.name(),
                            manifest.version(),
                            dir.display()
                        );
                        registered += 1;
                    }
                    Err(PluginError::DuplicateModule { name }) => {
                        log::warn!(
                            "Module '{}' in {} is already registered - skipping",
                            name,
                            dir.display()
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        log::info!("Discovered {} module(s)", registered);
        Ok(registered)
    }

    /// Mark every enabled module whose dependencies check as loaded
    pub fn resolve(&self) -> LoadReport {
        let manifests = self.modules.manifests();
        let mut report = LoadReport::default();

        loop {
            let mut progressed = false;
            for manifest in manifests.iter().filter(|m| m.is_enabled() && !m.is_loaded()) {
                if self.unsatisfied(manifest).is_empty() {
                    manifest.set_loaded(true);
                    log::info!("Loaded module '{}' {}", manifest.name(), manifest.version());
                    report.loaded.push(manifest.name().to_string());
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        for manifest in manifests.iter().filter(|m| !m.is_loaded()) {
            let reason = if !manifest.is_enabled() {
                log::info!("Module '{}' is disabled", manifest.name());
                UnloadedReason::Disabled
            } else {
                let failing = self.unsatisfied(manifest);
                log::warn!(
                    "Module '{}' not loaded, unsatisfied dependencies: {}",
                    manifest.name(),
                    failing
                        .iter()
                        .map(|d| d.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                UnloadedReason::UnsatisfiedDependencies(failing)
            };
            report.unloaded.push(UnloadedModule {
                name: manifest.name().to_string(),
                reason,
            });
        }

        report
    }

    fn unsatisfied(&self, manifest: &Manifest) -> Vec<Dependency> {
        manifest
            .dependencies()
            .iter()
            .filter(|d| !d.check(self.modules.as_ref()))
            .cloned()
            .collect()
    }
}
