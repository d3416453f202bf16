//! Module source registry
//!
//! Builds every registered [`ModuleSource`] once, on first use, and keeps the
//! resulting ordered list for the life of the registry. A source that fails
//! to construct (error or panic) is logged and left out; the others are kept.

use crate::core::error_handling::log_skipped;
use crate::plugin::error::PluginResult;
use crate::plugin::source::{
    sort_sources, ConfigDirSource, ModuleSource, SystemDirSource, UserDirSource,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Locations the builtin sources are built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSettings {
    /// Root holding the host's shipped modules
    pub system_dir: PathBuf,
    /// Root holding user-installed modules, if any
    pub user_dir: Option<PathBuf>,
    /// Individual module directories
    pub module_dirs: Vec<PathBuf>,
}

/// Constructor for one kind of module source
#[derive(Clone, Copy)]
pub struct SourceFactory {
    pub name: &'static str,
    pub create: fn(&SourceSettings) -> PluginResult<Box<dyn ModuleSource>>,
}

inventory::collect!(SourceFactory);

fn create_system_source(settings: &SourceSettings) -> PluginResult<Box<dyn ModuleSource>> {
    Ok(Box::new(SystemDirSource::new(settings.system_dir.clone())))
}

fn create_user_source(settings: &SourceSettings) -> PluginResult<Box<dyn ModuleSource>> {
    Ok(Box::new(UserDirSource::new(settings.user_dir.clone())?))
}

fn create_config_source(settings: &SourceSettings) -> PluginResult<Box<dyn ModuleSource>> {
    Ok(Box::new(ConfigDirSource::new(settings.module_dirs.clone())))
}

inventory::submit!(SourceFactory {
    name: "system directory",
    create: create_system_source,
});

inventory::submit!(SourceFactory {
    name: "user directory",
    create: create_user_source,
});

inventory::submit!(SourceFactory {
    name: "configured directories",
    create: create_config_source,
});

/// Lazily built, immutable, ordered list of module sources
pub struct ModuleSourceRegistry {
    settings: SourceSettings,
    factories: Vec<SourceFactory>,
    sources: OnceLock<Vec<Box<dyn ModuleSource>>>,
}

impl std::fmt::Debug for ModuleSourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let factories: Vec<&str> = self.factories.iter().map(|f| f.name).collect();
        f.debug_struct("ModuleSourceRegistry")
            .field("settings", &self.settings)
            .field("factories", &factories)
            .field("sources", &self.sources.get())
            .finish()
    }
}

impl ModuleSourceRegistry {
    /// Registry over every compiled-in [`SourceFactory`]
    pub fn new(settings: SourceSettings) -> Self {
        let factories = inventory::iter::<SourceFactory>().copied().collect();
        Self::with_factories(settings, factories)
    }

    /// Registry over an explicit factory list, in that discovery order
    pub fn with_factories(settings: SourceSettings, factories: Vec<SourceFactory>) -> Self {
        Self {
            settings,
            factories,
            sources: OnceLock::new(),
        }
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    /// The ordered sources, built on first call
    ///
    /// Concurrent first callers block until one of them has built the list;
    /// everyone sees the same slice afterwards.
    pub fn get_sources(&self) -> &[Box<dyn ModuleSource>] {
        self.sources.get_or_init(|| self.build_sources())
    }

    fn build_sources(&self) -> Vec<Box<dyn ModuleSource>> {
        let mut sources: Vec<Box<dyn ModuleSource>> = Vec::new();

        for factory in &self.factories {
            log::debug!("Constructing module source '{}'", factory.name);
            match catch_unwind(AssertUnwindSafe(|| (factory.create)(&self.settings))) {
                Ok(Ok(source)) => sources.push(source),
                Ok(Err(e)) => log_skipped(
                    &format!("Unable to create module source '{}'", factory.name),
                    &e,
                ),
                Err(_) => log::error!(
                    "Module source '{}' panicked during construction - skipping",
                    factory.name
                ),
            }
        }

        sort_sources(&mut sources);
        log::debug!(
            "Module sources: {:?}",
            sources.iter().map(|s| s.name()).collect::<Vec<_>>()
        );
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::error::PluginError;
    use crate::plugin::source::SourceType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Typed(Option<SourceType>, &'static str);

    impl ModuleSource for Typed {
        fn name(&self) -> &str {
            self.1
        }

        fn source_type(&self) -> Option<SourceType> {
            self.0
        }

        fn find(&self) -> &[PathBuf] {
            &[]
        }
    }

    fn config_source(_: &SourceSettings) -> PluginResult<Box<dyn ModuleSource>> {
        Ok(Box::new(Typed(Some(SourceType::Config), "config")))
    }

    fn user_source(_: &SourceSettings) -> PluginResult<Box<dyn ModuleSource>> {
        Ok(Box::new(Typed(Some(SourceType::User), "user")))
    }

    fn system_source(_: &SourceSettings) -> PluginResult<Box<dyn ModuleSource>> {
        Ok(Box::new(Typed(Some(SourceType::System), "system")))
    }

    fn typeless_source(_: &SourceSettings) -> PluginResult<Box<dyn ModuleSource>> {
        Ok(Box::new(Typed(None, "typeless")))
    }

    fn failing_source(_: &SourceSettings) -> PluginResult<Box<dyn ModuleSource>> {
        Err(PluginError::SourceUnavailable {
            source_name: "failing".to_string(),
            cause: "broken on purpose".to_string(),
        })
    }

    fn panicking_source(_: &SourceSettings) -> PluginResult<Box<dyn ModuleSource>> {
        panic!("source constructor exploded")
    }

    fn factory(
        name: &'static str,
        create: fn(&SourceSettings) -> PluginResult<Box<dyn ModuleSource>>,
    ) -> SourceFactory {
        SourceFactory { name, create }
    }

    fn names(registry: &ModuleSourceRegistry) -> Vec<String> {
        registry
            .get_sources()
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    #[test]
    fn test_sources_sorted_by_priority() {
        let registry = ModuleSourceRegistry::with_factories(
            SourceSettings::default(),
            vec![
                factory("config", config_source),
                factory("user", user_source),
                factory("typeless", typeless_source),
                factory("system", system_source),
            ],
        );
        assert_eq!(names(&registry), vec!["typeless", "system", "user", "config"]);
    }

    #[test]
    fn test_failing_sources_are_skipped() {
        let registry = ModuleSourceRegistry::with_factories(
            SourceSettings::default(),
            vec![
                factory("failing", failing_source),
                factory("user", user_source),
                factory("panicking", panicking_source),
                factory("system", system_source),
            ],
        );
        assert_eq!(names(&registry), vec!["system", "user"]);
    }

    #[test]
    fn test_all_failing_yields_empty() {
        let registry = ModuleSourceRegistry::with_factories(
            SourceSettings::default(),
            vec![factory("failing", failing_source)],
        );
        assert!(registry.get_sources().is_empty());
    }

    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    fn counting_source(_: &SourceSettings) -> PluginResult<Box<dyn ModuleSource>> {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(10));
        Ok(Box::new(Typed(Some(SourceType::System), "counted")))
    }

    #[test]
    fn test_sources_built_once_under_concurrency() {
        let registry = Arc::new(ModuleSourceRegistry::with_factories(
            SourceSettings::default(),
            vec![factory("counted", counting_source)],
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.get_sources().len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }

        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        let first = registry.get_sources().as_ptr();
        assert_eq!(first, registry.get_sources().as_ptr());
    }

    #[test]
    fn test_builtin_sources_without_user_dir() {
        let settings = SourceSettings {
            system_dir: PathBuf::from("does-not-exist"),
            user_dir: None,
            module_dirs: Vec::new(),
        };
        let registry = ModuleSourceRegistry::new(settings);
        let types: Vec<Option<SourceType>> = registry
            .get_sources()
            .iter()
            .map(|s| s.source_type())
            .collect();
        assert_eq!(types, vec![Some(SourceType::System), Some(SourceType::Config)]);
    }
}
