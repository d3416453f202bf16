//! Plugin Error Handling
//!
//! Error types for manifest parsing, dependency declarations, class scope
//! resolution and module source discovery.

use crate::core::error_handling::ContextualError;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Errors raised by the plugin subsystem
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PluginError {
    /// Manifest declares no module name
    #[error("Manifest at {location} contains no module name")]
    BlankModuleName { location: String },

    /// A dependency declaration names no module
    #[error("Module '{module}' declares a dependency without a module name")]
    BlankDependencyName { module: String },

    /// A version string could not be parsed
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Manifest file could not be read
    #[error("Unable to read manifest {path}: {cause}")]
    ManifestRead { path: String, cause: String },

    /// Manifest file is not valid TOML or has wrong field types
    #[error("Unable to parse manifest {path}: {cause}")]
    ManifestParse { path: String, cause: String },

    /// Another manifest with the same module name is already registered
    #[error("Module '{name}' is already registered")]
    DuplicateModule { name: String },

    /// No class scope exists for a module
    #[error("No class scope for module '{scope}'")]
    ScopeNotFound { scope: String },

    /// Class name unknown in the module's class scope
    #[error("Class '{class_name}' not found in scope '{scope}'")]
    ClassNotFound { scope: String, class_name: String },

    /// A class factory failed to construct its consumer
    #[error("Unable to instantiate '{class_name}': {cause}")]
    InstantiationFailed { class_name: String, cause: String },

    /// A module source could not be constructed
    #[error("Module source '{source_name}' unavailable: {cause}")]
    SourceUnavailable { source_name: String, cause: String },

    /// Internal lock poisoned
    #[error("{message}")]
    Lock { message: String },
}

impl PluginError {
    pub(crate) fn lock(message: String) -> Self {
        PluginError::Lock { message }
    }
}

impl ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            PluginError::BlankModuleName { .. }
                | PluginError::BlankDependencyName { .. }
                | PluginError::InvalidVersion { .. }
                | PluginError::ManifestParse { .. }
                | PluginError::DuplicateModule { .. }
        )
    }

    fn user_message(&self) -> Option<String> {
        if self.is_user_actionable() {
            Some(self.to_string())
        } else {
            None
        }
    }
}
