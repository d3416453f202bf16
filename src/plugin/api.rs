//! Public API for the plugin system
//!
//! This module provides the complete public API for the plugin system.
//! External modules should import from here rather than directly from internal modules.

// Versions and dependency edges
pub use crate::plugin::dependency::{Dependency, DependencyContext, ModuleState};
pub use crate::plugin::version::{compare_versions, complies, Version, VersionConstraint};

// Manifests and the module registry
pub use crate::plugin::manifest::{
    ConsumerDescriptor, Manifest, ManifestBuilder, MANIFEST_FILE_NAME,
};
pub use crate::plugin::registry::ModuleRegistry;

// Class scopes
pub use crate::plugin::classes::{
    ClassRegistry, ClassScope, ConsumerClass, ConsumerFactory, FactoryResult,
};

// Module sources and loading
pub use crate::plugin::loader::{LoadReport, PluginLoader, UnloadedModule, UnloadedReason};
pub use crate::plugin::source::{
    compare_sources, sort_sources, ConfigDirSource, ModuleSource, SourceType, SystemDirSource,
    UserDirSource,
};
pub use crate::plugin::source_registry::{ModuleSourceRegistry, SourceFactory, SourceSettings};

// Error handling
pub use crate::plugin::error::{PluginError, PluginResult};
