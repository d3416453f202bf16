//! Plugin System Module
//!
//! Module manifests and their dependency edges, the registry of installed
//! modules, per-module class scopes, module sources and the loader that
//! discovers and resolves modules.

// Internal modules - all access should go through api module
pub(crate) mod classes;
pub(crate) mod dependency;
pub(crate) mod error;
pub(crate) mod loader;
pub(crate) mod manifest;
pub(crate) mod registry;
pub(crate) mod source;
pub(crate) mod source_registry;
pub(crate) mod version;

// Public API module - the only public interface for the plugin system
pub mod api;

#[cfg(test)]
mod tests;
