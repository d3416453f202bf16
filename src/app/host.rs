//! Host wiring
//!
//! Builds the host's own manifest and services, registers the host's
//! consumer classes, and drives the lifecycle: discover and resolve modules,
//! announce `Started`, and later `ShuttingDown`.

use crate::core::services::HostServices;
use crate::core::version::{host_module_name, host_version, HOST_MODULE_NAME};
use crate::messaging::api::{
    AutoRegisterBootstrap, ConsumerResult, DeliveryReport, ManifestConsumerBootstrap, Message,
    MessageConsumer, MessageKind, MessagingFactory, MessagingResult, QueryMessage, SystemMessage,
    SystemStatus, DEFAULT_QUEUE, QUERY, SYSTEM,
};
use crate::plugin::api::{
    ClassRegistry, FactoryResult, LoadReport, Manifest, ModuleRegistry, ModuleSourceRegistry,
    PluginLoader, PluginResult, SourceSettings,
};
use std::sync::Arc;

pub const LIFECYCLE_LOGGER: &str = "modhost::LifecycleLogger";
pub const STATUS_REPORTER: &str = "modhost::ModuleStatusReporter";

/// Query name answered by [`ModuleStatusReporter`]
pub const STATUS_QUERY: &str = "modhost.status";

/// The host's own manifest
pub fn host_manifest() -> PluginResult<Manifest> {
    Manifest::builder(host_module_name(), host_version())
        .description("Module host runtime")
        .system(true)
        .consumer(LIFECYCLE_LOGGER, DEFAULT_QUEUE)
        .build()
}

/// Logs host lifecycle messages
#[derive(Debug, Default)]
pub struct LifecycleLogger;

impl MessageConsumer for LifecycleLogger {
    fn expected_types(&self) -> Vec<&'static MessageKind> {
        vec![&SYSTEM]
    }

    fn handle_message(&self, message: &dyn Message) -> ConsumerResult {
        if let Some(system) = message.downcast_ref::<SystemMessage>() {
            match system.text() {
                Some(text) => log::info!("Host {}: {}", system.status(), text),
                None => log::info!("Host {}", system.status()),
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        LIFECYCLE_LOGGER
    }
}

/// Answers the status query with loaded/total module counts
#[derive(Debug)]
pub struct ModuleStatusReporter {
    modules: Arc<ModuleRegistry>,
}

impl ModuleStatusReporter {
    pub fn new(modules: Arc<ModuleRegistry>) -> Self {
        Self { modules }
    }
}

impl MessageConsumer for ModuleStatusReporter {
    fn expected_types(&self) -> Vec<&'static MessageKind> {
        vec![&QUERY]
    }

    fn handle_message(&self, message: &dyn Message) -> ConsumerResult {
        let Some(query) = message.downcast_ref::<QueryMessage>() else {
            return Ok(());
        };
        if query.name() == STATUS_QUERY {
            log::info!(
                "{} of {} module(s) loaded",
                self.modules.loaded_count(),
                self.modules.module_count()
            );
        }
        Ok(())
    }

    fn auto_register(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        STATUS_REPORTER
    }
}

fn create_lifecycle_logger(_services: &HostServices) -> FactoryResult {
    Ok(Arc::new(LifecycleLogger))
}

fn create_status_reporter(services: &HostServices) -> FactoryResult {
    Ok(Arc::new(ModuleStatusReporter::new(Arc::clone(
        services.modules(),
    ))))
}

crate::consumer_class!(HOST_MODULE_NAME, LIFECYCLE_LOGGER, create_lifecycle_logger);
crate::consumer_class!(HOST_MODULE_NAME, STATUS_REPORTER, create_status_reporter);

/// Fresh services for one host process
pub fn build_services(settings: SourceSettings, obsolete: Vec<String>) -> PluginResult<HostServices> {
    Ok(HostServices::new(
        Arc::new(MessagingFactory::new()),
        Arc::new(ModuleRegistry::new(host_manifest()?, obsolete)),
        Arc::new(ClassRegistry::with_compiled_classes()),
        Arc::new(ModuleSourceRegistry::new(settings)),
    ))
}

/// A started host
#[derive(Debug)]
pub struct HostRuntime {
    services: HostServices,
    report: LoadReport,
}

impl HostRuntime {
    /// Discover and resolve modules, then announce `Started`
    pub fn boot(services: HostServices) -> MessagingResult<Self> {
        let loader = PluginLoader::new(
            Arc::clone(services.modules()),
            Arc::clone(services.sources()),
        );
        loader.discover()?;
        let report = loader.resolve();

        let queue = services.messaging().default_queue()?;
        queue.register_consumer(Arc::new(AutoRegisterBootstrap::new(services.clone())))?;
        queue.register_consumer(Arc::new(ManifestConsumerBootstrap::new(services.clone())))?;

        let delivery = services.messaging().send_message(&SystemMessage::with_text(
            SystemStatus::Started,
            &format!("{} module(s) loaded", report.loaded.len()),
        ))?;
        log::debug!("Started delivered: {:?}", delivery);

        services.messaging().send_message(&QueryMessage::new(
            STATUS_QUERY,
            serde_json::json!({ "requested_by": host_module_name() }),
        ))?;

        Ok(Self { services, report })
    }

    pub fn services(&self) -> &HostServices {
        &self.services
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Announce `ShuttingDown` and release every queue
    pub fn shutdown(self) -> MessagingResult<DeliveryReport> {
        let report = self
            .services
            .messaging()
            .send_message(&SystemMessage::shutting_down())?;
        self.services.messaging().close();
        Ok(report)
    }
}
