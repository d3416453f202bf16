//! Module manifests
//!
//! A manifest is the static description of one module: identity, version,
//! dependency edges and the message consumers it wants registered. Manifests
//! live in a `module.toml` file at the root of each module directory:
//!
//! ```toml
//! name = "greeter"
//! version = "1.2"
//! description = "Says hello on startup"
//!
//! [[dependency]]
//! name = "modhost"
//! version = "+0.1"
//!
//! [[dependency]]
//! name = "spellcheck"
//! required = false
//!
//! [[consumer]]
//! class = "greeter::Hello"
//! queue = "greeter.inbox"
//! ```
//!
//! The host builds its own manifest in code with [`ManifestBuilder`].

use crate::core::validation::non_blank;
use crate::plugin::dependency::Dependency;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::source::SourceType;
use crate::plugin::version::Version;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// File name of the manifest inside a module directory
pub const MANIFEST_FILE_NAME: &str = "module.toml";

/// One declared consumer binding: which class to instantiate and on which queue
///
/// Either field may be blank; blank bindings are skipped with a warning when
/// consumers are registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerDescriptor {
    pub class_name: String,
    pub queue: String,
}

impl ConsumerDescriptor {
    pub fn new(class_name: &str, queue: &str) -> Self {
        Self {
            class_name: class_name.trim().to_string(),
            queue: queue.trim().to_string(),
        }
    }
}

/// Static metadata for one module plus its runtime load flag
#[derive(Debug)]
pub struct Manifest {
    name: String,
    version: String,
    description: Option<String>,
    enabled: bool,
    system: bool,
    dependencies: Vec<Dependency>,
    consumers: Vec<ConsumerDescriptor>,
    location: Option<PathBuf>,
    source_type: Option<SourceType>,
    loaded: AtomicBool,
}

impl Manifest {
    pub fn builder(name: &str, version: &str) -> ManifestBuilder {
        ManifestBuilder::new(name, version)
    }

    /// Read and parse `<dir>/module.toml`
    pub fn load(dir: &Path) -> PluginResult<Self> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let content = std::fs::read_to_string(&path).map_err(|e| PluginError::ManifestRead {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;
        Self::from_toml_str(&content, &path)
    }

    /// Parse manifest text; `path` is recorded as the module location's manifest
    pub fn from_toml_str(content: &str, path: &Path) -> PluginResult<Self> {
        let raw: ManifestFile = toml::from_str(content).map_err(|e| PluginError::ManifestParse {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let name = non_blank(raw.name.as_deref()).ok_or_else(|| PluginError::BlankModuleName {
            location: path.display().to_string(),
        })?;

        let mut builder = ManifestBuilder::new(name, raw.version.as_deref().unwrap_or(""))
            .enabled(raw.enabled);

        if let Some(description) = non_blank(raw.description.as_deref()) {
            builder = builder.description(description);
        }
        if let Some(dir) = path.parent() {
            builder = builder.location(dir);
        }

        for entry in raw.dependencies {
            let dependency = Dependency::with_required(
                entry.name.as_deref().unwrap_or(""),
                entry.version.as_deref(),
                entry.required,
            )
            .map_err(|_| PluginError::BlankDependencyName {
                module: name.to_string(),
            })?;
            builder = builder.dependency(dependency);
        }

        for entry in raw.consumers {
            builder = builder.consumer(
                entry.class.as_deref().unwrap_or(""),
                entry.queue.as_deref().unwrap_or(""),
            );
        }

        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True for the host's own manifest; its classes resolve through the host scope
    pub fn is_system(&self) -> bool {
        self.system
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn consumers(&self) -> &[ConsumerDescriptor] {
        &self.consumers
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn source_type(&self) -> Option<SourceType> {
        self.source_type
    }

    pub(crate) fn set_source_type(&mut self, source_type: Option<SourceType>) {
        self.source_type = source_type;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::Release);
    }
}

/// Programmatic manifest construction (host manifest, tests)
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    name: String,
    version: String,
    description: Option<String>,
    enabled: bool,
    system: bool,
    dependencies: Vec<Dependency>,
    consumers: Vec<ConsumerDescriptor>,
    location: Option<PathBuf>,
    source_type: Option<SourceType>,
}

impl ManifestBuilder {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            version: version.trim().to_string(),
            description: None,
            enabled: true,
            system: false,
            dependencies: Vec::new(),
            consumers: Vec::new(),
            location: None,
            source_type: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn system(mut self, system: bool) -> Self {
        self.system = system;
        self
    }

    pub fn dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn consumer(mut self, class_name: &str, queue: &str) -> Self {
        self.consumers.push(ConsumerDescriptor::new(class_name, queue));
        self
    }

    pub fn location(mut self, location: &Path) -> Self {
        self.location = Some(location.to_path_buf());
        self
    }

    pub fn source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type);
        self
    }

    /// Validate name and version and produce the manifest (initially not loaded)
    pub fn build(self) -> PluginResult<Manifest> {
        if self.name.is_empty() {
            return Err(PluginError::BlankModuleName {
                location: self
                    .location
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<builder>".to_string()),
            });
        }

        self.version.parse::<Version>()?;

        Ok(Manifest {
            name: self.name,
            version: self.version,
            description: self.description,
            enabled: self.enabled,
            system: self.system,
            dependencies: self.dependencies,
            consumers: self.consumers,
            location: self.location,
            source_type: self.source_type,
            loaded: AtomicBool::new(false),
        })
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default, rename = "dependency")]
    dependencies: Vec<DependencyEntry>,
    #[serde(default, rename = "consumer")]
    consumers: Vec<ConsumerEntry>,
}

#[derive(Debug, Deserialize)]
struct DependencyEntry {
    name: Option<String>,
    version: Option<String>,
    #[serde(default = "default_true")]
    required: bool,
}

#[derive(Debug, Deserialize)]
struct ConsumerEntry {
    class: Option<String>,
    queue: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL_MANIFEST: &str = r#"
name = "greeter"
version = "1.2"
description = "Says hello"

[[dependency]]
name = "modhost"
version = "+0.1"

[[dependency]]
name = "spellcheck"
required = false

[[consumer]]
class = "greeter::Hello"
queue = "greeter.inbox"

[[consumer]]
class = ""
queue = "greeter.inbox"
"#;

    #[test]
    fn test_parse_full_manifest() {
        let manifest =
            Manifest::from_toml_str(FULL_MANIFEST, Path::new("/mods/greeter/module.toml")).unwrap();

        assert_eq!(manifest.name(), "greeter");
        assert_eq!(manifest.version(), "1.2");
        assert_eq!(manifest.description(), Some("Says hello"));
        assert!(manifest.is_enabled());
        assert!(!manifest.is_system());
        assert!(!manifest.is_loaded());
        assert_eq!(manifest.location(), Some(Path::new("/mods/greeter")));

        assert_eq!(manifest.dependencies().len(), 2);
        assert_eq!(manifest.dependencies()[0].name(), "modhost");
        assert_eq!(manifest.dependencies()[0].version().to_string(), "+0.1");
        assert!(!manifest.dependencies()[1].declared_required());

        // Blank bindings survive parsing; the bootstrap skips them later
        assert_eq!(manifest.consumers().len(), 2);
        assert_eq!(
            manifest.consumers()[0],
            ConsumerDescriptor::new("greeter::Hello", "greeter.inbox")
        );
        assert!(manifest.consumers()[1].class_name.is_empty());
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let result = Manifest::from_toml_str("version = \"1.0\"", Path::new("x/module.toml"));
        assert!(matches!(result, Err(PluginError::BlankModuleName { .. })));
    }

    #[test]
    fn test_malformed_version_is_rejected() {
        let result = Manifest::from_toml_str(
            "name = \"a\"\nversion = \"one\"",
            Path::new("a/module.toml"),
        );
        assert!(matches!(result, Err(PluginError::InvalidVersion { .. })));
    }

    #[test]
    fn test_blank_dependency_name_is_rejected_with_module_name() {
        let content = "name = \"a\"\nversion = \"1\"\n[[dependency]]\nversion = \"+1\"";
        let result = Manifest::from_toml_str(content, Path::new("a/module.toml"));
        assert_eq!(
            result.unwrap_err(),
            PluginError::BlankDependencyName {
                module: "a".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = Manifest::from_toml_str("name = ", Path::new("a/module.toml"));
        assert!(matches!(result, Err(PluginError::ManifestParse { .. })));
    }

    #[test]
    fn test_load_from_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE_NAME), FULL_MANIFEST).unwrap();

        let manifest = Manifest::load(temp.path()).unwrap();
        assert_eq!(manifest.name(), "greeter");
        assert_eq!(manifest.location(), Some(temp.path()));
    }

    #[test]
    fn test_load_without_manifest_file() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            Manifest::load(temp.path()),
            Err(PluginError::ManifestRead { .. })
        ));
    }

    #[test]
    fn test_builder_and_loaded_flag() {
        let manifest = Manifest::builder("host", "0.1.0")
            .system(true)
            .consumer("host::Logger", "modhost.system")
            .build()
            .unwrap();

        assert!(manifest.is_system());
        assert!(!manifest.is_loaded());
        manifest.set_loaded(true);
        assert!(manifest.is_loaded());
    }

    #[test]
    fn test_disabled_manifest() {
        let manifest = Manifest::from_toml_str(
            "name = \"off\"\nversion = \"1\"\nenabled = false",
            Path::new("off/module.toml"),
        )
        .unwrap();
        assert!(!manifest.is_enabled());
    }
}
