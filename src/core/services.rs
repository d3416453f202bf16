//! Host service handles
//!
//! The process-scoped state objects of the host, bundled into one cheap to
//! clone handle. Consumer factories receive it to pick up the services they
//! need; nothing here is a global.

use crate::messaging::api::MessagingFactory;
use crate::plugin::api::{ClassRegistry, ModuleRegistry, ModuleSourceRegistry};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct HostServices {
    messaging: Arc<MessagingFactory>,
    modules: Arc<ModuleRegistry>,
    classes: Arc<ClassRegistry>,
    sources: Arc<ModuleSourceRegistry>,
}

impl HostServices {
    pub fn new(
        messaging: Arc<MessagingFactory>,
        modules: Arc<ModuleRegistry>,
        classes: Arc<ClassRegistry>,
        sources: Arc<ModuleSourceRegistry>,
    ) -> Self {
        Self {
            messaging,
            modules,
            classes,
            sources,
        }
    }

    pub fn messaging(&self) -> &Arc<MessagingFactory> {
        &self.messaging
    }

    pub fn modules(&self) -> &Arc<ModuleRegistry> {
        &self.modules
    }

    pub fn classes(&self) -> &Arc<ClassRegistry> {
        &self.classes
    }

    pub fn sources(&self) -> &Arc<ModuleSourceRegistry> {
        &self.sources
    }

    /// Services with empty registries and no module sources
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        use crate::core::version::{host_module_name, host_version};
        use crate::plugin::api::{Manifest, SourceSettings};

        let host = Manifest::builder(host_module_name(), host_version())
            .system(true)
            .build()
            .unwrap();
        Self::new(
            Arc::new(MessagingFactory::new()),
            Arc::new(ModuleRegistry::new(host, Vec::new())),
            Arc::new(ClassRegistry::new()),
            Arc::new(ModuleSourceRegistry::with_factories(
                SourceSettings::default(),
                Vec::new(),
            )),
        )
    }
}
