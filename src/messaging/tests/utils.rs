//! Messaging test fixtures

use crate::core::services::HostServices;
use crate::core::version::{host_module_name, host_version};
use crate::messaging::api::{
    ConsumerResult, Message, MessageConsumer, MessageKind, MessagingFactory,
};
use crate::plugin::api::{
    ClassRegistry, Manifest, ModuleRegistry, ModuleSourceRegistry, SourceSettings,
};
use std::sync::{Arc, Mutex};

/// Consumer that remembers the kinds of the messages it handled
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub auto: bool,
    pub seen: Mutex<Vec<String>>,
}

impl Recorder {
    pub(crate) fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl MessageConsumer for Recorder {
    fn expected_types(&self) -> Vec<&'static MessageKind> {
        Vec::new()
    }

    fn handle_message(&self, message: &dyn Message) -> ConsumerResult {
        self.seen.lock().unwrap().push(message.kind().name().to_string());
        Ok(())
    }

    fn auto_register(&self) -> bool {
        self.auto
    }
}

/// Services around a host manifest with the given consumer bindings
pub(crate) fn services_with_host_bindings(bindings: &[(&str, &str)]) -> HostServices {
    let mut host = Manifest::builder(host_module_name(), host_version()).system(true);
    for (class_name, queue) in bindings {
        host = host.consumer(class_name, queue);
    }

    HostServices::new(
        Arc::new(MessagingFactory::new()),
        Arc::new(ModuleRegistry::new(host.build().unwrap(), Vec::new())),
        Arc::new(ClassRegistry::new()),
        Arc::new(ModuleSourceRegistry::with_factories(
            SourceSettings::default(),
            Vec::new(),
        )),
    )
}

/// Register a loaded (or not) module with consumer bindings
pub(crate) fn add_module(
    services: &HostServices,
    name: &str,
    bindings: &[(&str, &str)],
    loaded: bool,
) -> Arc<Manifest> {
    let mut builder = Manifest::builder(name, "1.0");
    for (class_name, queue) in bindings {
        builder = builder.consumer(class_name, queue);
    }
    let manifest = services.modules().register(builder.build().unwrap()).unwrap();
    manifest.set_loaded(loaded);
    manifest
}

/// Define a `Recorder` class in a scope and return a handle to the instance it builds
pub(crate) fn define_recorder(
    services: &HostServices,
    scope: &str,
    class_name: &str,
    auto: bool,
) -> Arc<Recorder> {
    let recorder = Arc::new(Recorder {
        auto,
        ..Default::default()
    });
    let instance = Arc::clone(&recorder);
    services
        .classes()
        .register(scope, class_name, move |_| {
            Ok(Arc::clone(&instance) as Arc<dyn MessageConsumer>)
        })
        .unwrap();
    recorder
}

/// Number of consumers on a queue
pub(crate) fn queue_size(services: &HostServices, queue: &str) -> usize {
    services.messaging().get_queue(queue).unwrap().consumer_count()
}
