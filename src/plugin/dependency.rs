//! Dependency edges between modules
//!
//! A [`Dependency`] is one module's declared requirement on another module or
//! on the host runtime itself. Satisfaction is evaluated against a
//! [`DependencyContext`], which answers the three questions the check needs:
//! the host's version, whether a name is obsolete, and the state of an
//! installed module.

use crate::core::validation::non_blank;
use crate::core::version::is_host_name;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::version::VersionConstraint;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Load state of an installed module as seen by dependency checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleState {
    pub version: String,
    pub loaded: bool,
}

/// Lookups a dependency check needs from the live module registry
pub trait DependencyContext {
    /// Version of the host runtime
    fn host_version(&self) -> &str;

    /// True if the host no longer expects a module of this name to exist
    fn is_obsolete(&self, name: &str) -> bool;

    /// State of the installed module with exactly this name, if any
    fn module_state(&self, name: &str) -> Option<ModuleState>;
}

/// A declared requirement on another module (or on the host)
///
/// Equality and hashing use the target name and version constraint only;
/// the `required` flag does not take part.
#[derive(Debug, Clone)]
pub struct Dependency {
    name: String,
    version: VersionConstraint,
    required: bool,
}

impl Dependency {
    /// Create a mandatory dependency
    pub fn new(name: &str, version: Option<&str>) -> PluginResult<Self> {
        Self::with_required(name, version, true)
    }

    /// Create a dependency with an explicit required flag
    ///
    /// A blank target name violates the declaration contract and is rejected.
    pub fn with_required(name: &str, version: Option<&str>, required: bool) -> PluginResult<Self> {
        let name = non_blank(Some(name)).ok_or_else(|| PluginError::BlankDependencyName {
            module: "<unknown>".to_string(),
        })?;

        Ok(Self {
            name: name.to_string(),
            version: VersionConstraint::parse(version),
            required,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &VersionConstraint {
        &self.version
    }

    /// The declared required flag, ignoring obsolescence
    pub fn declared_required(&self) -> bool {
        self.required
    }

    /// Whether the dependency must be satisfied
    ///
    /// A dependency on an obsolete module is never required, whatever was declared.
    pub fn is_required(&self, ctx: &dyn DependencyContext) -> bool {
        if ctx.is_obsolete(&self.name) {
            return false;
        }
        self.required
    }

    /// Evaluate whether the dependency is satisfied
    ///
    /// Rules, first match wins:
    /// 1. the host itself: satisfied iff the host version complies
    /// 2. an obsolete target: always satisfied
    /// 3. an optional dependency: always satisfied
    /// 4. an installed target: satisfied iff it loaded and its version complies
    /// 5. otherwise: not satisfied
    pub fn check(&self, ctx: &dyn DependencyContext) -> bool {
        if is_host_name(&self.name) {
            return self.version.is_satisfied_by(ctx.host_version());
        }

        if ctx.is_obsolete(&self.name) {
            return true;
        }

        if !self.is_required(ctx) {
            return true;
        }

        match ctx.module_state(&self.name) {
            Some(state) => state.loaded && self.version.is_satisfied_by(&state.version),
            None => false,
        }
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.version)
    }
}
