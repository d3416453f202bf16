//! Class scopes
//!
//! Each module gets its own namespace of consumer classes: a map from a
//! stable class name to a factory. A module's manifest can only name classes
//! from its own scope; the host manifest resolves through the host scope.
//!
//! Compiled-in classes register themselves with [`consumer_class!`]; tests
//! and embedders can call [`ClassRegistry::register`] directly.
//!
//! Instances are cached per class: the first successful `instantiate` builds
//! the consumer, later calls hand out the same `Arc`.

use crate::core::services::HostServices;
use crate::core::sync::{handle_mutex_poison, handle_rwlock_read, handle_rwlock_write};
use crate::core::version::host_module_name;
use crate::messaging::consumer::MessageConsumer;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::manifest::Manifest;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, RwLock};

/// Outcome of a consumer factory
pub type FactoryResult =
    Result<Arc<dyn MessageConsumer>, Box<dyn std::error::Error + Send + Sync>>;

/// Shared consumer factory; dependencies are injected through [`HostServices`]
pub type ConsumerFactory = Arc<dyn Fn(&HostServices) -> FactoryResult + Send + Sync>;

/// Compile-time class registration entry, collected with `inventory`
pub struct ConsumerClass {
    /// Owning module name (or the host module name for host classes)
    pub scope: &'static str,
    pub class_name: &'static str,
    pub factory: fn(&HostServices) -> FactoryResult,
}

inventory::collect!(ConsumerClass);

/// Register a compiled-in consumer class in a module's scope
///
/// ```ignore
/// consumer_class!("greeter", "greeter::Hello", |_services| Ok(Arc::new(Hello)));
/// ```
#[macro_export]
macro_rules! consumer_class {
    ($scope:expr, $class_name:expr, $factory:expr) => {
        inventory::submit!($crate::plugin::api::ConsumerClass {
            scope: $scope,
            class_name: $class_name,
            factory: $factory,
        });
    };
}

struct ClassEntry {
    factory: ConsumerFactory,
    instance: Mutex<Option<Arc<dyn MessageConsumer>>>,
}

/// The class namespace of one module
pub struct ClassScope {
    name: String,
    classes: RwLock<HashMap<String, Arc<ClassEntry>>>,
}

impl std::fmt::Debug for ClassScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassScope")
            .field("name", &self.name)
            .field("classes", &self.class_names())
            .finish()
    }
}

impl ClassScope {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            classes: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes
            .read()
            .map(|classes| classes.contains_key(class_name))
            .unwrap_or(false)
    }

    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.classes.read() {
            Ok(classes) => classes.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    fn define(&self, class_name: &str, factory: ConsumerFactory) -> PluginResult<()> {
        let mut classes = handle_rwlock_write(self.classes.write(), PluginError::lock)?;
        if classes.contains_key(class_name) {
            log::warn!(
                "Class '{}' redefined in scope '{}', keeping the newest factory",
                class_name,
                self.name
            );
        }
        classes.insert(
            class_name.to_string(),
            Arc::new(ClassEntry {
                factory,
                instance: Mutex::new(None),
            }),
        );
        Ok(())
    }

    /// Resolve a class name to its factory
    pub fn load(&self, class_name: &str) -> PluginResult<ConsumerFactory> {
        self.entry(class_name).map(|entry| Arc::clone(&entry.factory))
    }

    fn entry(&self, class_name: &str) -> PluginResult<Arc<ClassEntry>> {
        let classes = handle_rwlock_read(self.classes.read(), PluginError::lock)?;
        classes
            .get(class_name)
            .cloned()
            .ok_or_else(|| PluginError::ClassNotFound {
                scope: self.name.clone(),
                class_name: class_name.to_string(),
            })
    }

    /// Resolve a class and return its (cached) consumer instance
    ///
    /// Factory errors and panics become `InstantiationFailed`; a failed
    /// construction is not cached, so a later call retries.
    ///
    /// The factory runs without the cache lock held, so it may use the host
    /// services freely. Two racing first calls can both run the factory; the
    /// first instance stored wins and both callers receive it.
    pub fn instantiate(
        &self,
        class_name: &str,
        services: &HostServices,
    ) -> PluginResult<Arc<dyn MessageConsumer>> {
        let entry = self.entry(class_name)?;
        if let Some(existing) =
            handle_mutex_poison(entry.instance.lock(), PluginError::lock)?.as_ref()
        {
            return Ok(Arc::clone(existing));
        }

        let failed = |cause: String| PluginError::InstantiationFailed {
            class_name: class_name.to_string(),
            cause,
        };

        let created = catch_unwind(AssertUnwindSafe(|| (entry.factory)(services)))
            .map_err(|_| failed("factory panicked".to_string()))?
            .map_err(|e| failed(e.to_string()))?;

        let mut instance = handle_mutex_poison(entry.instance.lock(), PluginError::lock)?;
        if let Some(existing) = instance.as_ref() {
            return Ok(Arc::clone(existing));
        }
        log::trace!("Instantiated '{}' in scope '{}'", class_name, self.name);
        *instance = Some(Arc::clone(&created));
        Ok(created)
    }
}

/// All class scopes known to the host
#[derive(Default)]
pub struct ClassRegistry {
    scopes: RwLock<HashMap<String, Arc<ClassScope>>>,
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("scopes", &self.scope_names())
            .finish()
    }
}

impl ClassRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every compiled-in [`ConsumerClass`]
    pub fn with_compiled_classes() -> Self {
        let registry = Self::new();
        for class in inventory::iter::<ConsumerClass>() {
            let factory = class.factory;
            if let Err(e) = registry.register(class.scope, class.class_name, factory) {
                log::error!(
                    "Unable to register compiled class '{}': {}",
                    class.class_name,
                    e
                );
            }
        }
        log::debug!(
            "Class registry populated with scopes {:?}",
            registry.scope_names()
        );
        registry
    }

    /// Define a class in a scope, creating the scope on first use
    pub fn register<F>(&self, scope: &str, class_name: &str, factory: F) -> PluginResult<()>
    where
        F: Fn(&HostServices) -> FactoryResult + Send + Sync + 'static,
    {
        let scope = {
            let mut scopes = handle_rwlock_write(self.scopes.write(), PluginError::lock)?;
            Arc::clone(
                scopes
                    .entry(scope.to_string())
                    .or_insert_with(|| Arc::new(ClassScope::new(scope))),
            )
        };
        scope.define(class_name, Arc::new(factory))
    }

    /// The scope with exactly this name
    pub fn scope(&self, name: &str) -> PluginResult<Arc<ClassScope>> {
        let scopes = handle_rwlock_read(self.scopes.read(), PluginError::lock)?;
        scopes
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::ScopeNotFound {
                scope: name.to_string(),
            })
    }

    /// The scope a manifest's consumer classes resolve through
    pub fn scope_for(&self, manifest: &Manifest) -> PluginResult<Arc<ClassScope>> {
        if manifest.is_system() {
            self.scope(host_module_name())
        } else {
            self.scope(manifest.name())
        }
    }

    pub fn scopes(&self) -> Vec<Arc<ClassScope>> {
        let mut scopes: Vec<Arc<ClassScope>> = match self.scopes.read() {
            Ok(scopes) => scopes.values().cloned().collect(),
            Err(_) => Vec::new(),
        };
        scopes.sort_by(|a, b| a.name().cmp(b.name()));
        scopes
    }

    pub fn scope_names(&self) -> Vec<String> {
        self.scopes().iter().map(|s| s.name().to_string()).collect()
    }
}
