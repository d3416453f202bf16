//! Module Registry
//!
//! Thread-safe registry of installed module manifests, the host's own
//! manifest and the set of obsolete module names. It is the live lookup that
//! dependency checks run against.

use crate::core::sync::{handle_rwlock_read, handle_rwlock_write};
use crate::core::version::{host_version, is_host_name};
use crate::plugin::dependency::{DependencyContext, ModuleState};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::manifest::Manifest;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Registry of installed modules
pub struct ModuleRegistry {
    /// Installed manifests in registration (discovery) order
    manifests: RwLock<Vec<Arc<Manifest>>>,

    /// The host runtime's own manifest
    host: Arc<Manifest>,

    /// Module names the host no longer expects to exist
    obsolete: HashSet<String>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .manifests()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        f.debug_struct("ModuleRegistry")
            .field("manifests", &names)
            .field("host", &self.host.name())
            .field("obsolete", &self.obsolete)
            .finish()
    }
}

impl ModuleRegistry {
    /// Create a registry around the host manifest
    pub fn new(host: Manifest, obsolete: impl IntoIterator<Item = String>) -> Self {
        host.set_loaded(true);
        Self {
            manifests: RwLock::new(Vec::new()),
            host: Arc::new(host),
            obsolete: obsolete
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Register an installed module manifest
    ///
    /// Names are unique: a second manifest with a known name is rejected and
    /// the first one stays. The host's name is reserved in any letter case,
    /// since dependencies on it always resolve to the host.
    pub fn register(&self, manifest: Manifest) -> PluginResult<Arc<Manifest>> {
        let mut manifests = handle_rwlock_write(self.manifests.write(), PluginError::lock)?;

        if manifest.name() == self.host.name()
            || is_host_name(manifest.name())
            || manifests.iter().any(|m| m.name() == manifest.name())
        {
            return Err(PluginError::DuplicateModule {
                name: manifest.name().to_string(),
            });
        }

        let manifest = Arc::new(manifest);
        manifests.push(Arc::clone(&manifest));
        Ok(manifest)
    }

    /// Installed manifests in registration order (host excluded)
    pub fn manifests(&self) -> Vec<Arc<Manifest>> {
        match self.manifests.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Installed manifests followed by the host manifest
    pub fn all_with_host(&self) -> Vec<Arc<Manifest>> {
        let mut all = self.manifests();
        all.push(Arc::clone(&self.host));
        all
    }

    pub fn host_manifest(&self) -> Arc<Manifest> {
        Arc::clone(&self.host)
    }

    /// Find an installed manifest by exact name
    pub fn find(&self, name: &str) -> PluginResult<Option<Arc<Manifest>>> {
        let manifests = handle_rwlock_read(self.manifests.read(), PluginError::lock)?;
        Ok(manifests.iter().find(|m| m.name() == name).cloned())
    }

    pub fn obsolete_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.obsolete.iter().cloned().collect();
        names.sort();
        names
    }

    pub fn module_count(&self) -> usize {
        self.manifests().len()
    }

    pub fn loaded_count(&self) -> usize {
        self.manifests().iter().filter(|m| m.is_loaded()).count()
    }
}

impl DependencyContext for ModuleRegistry {
    fn host_version(&self) -> &str {
        if self.host.version().is_empty() {
            host_version()
        } else {
            self.host.version()
        }
    }

    fn is_obsolete(&self, name: &str) -> bool {
        self.obsolete.contains(name)
    }

    fn module_state(&self, name: &str) -> Option<ModuleState> {
        // A poisoned lock degrades to "not installed" rather than failing the check
        self.find(name).ok().flatten().map(|m| ModuleState {
            version: m.version().to_string(),
            loaded: m.is_loaded(),
        })
    }
}
