//! Auto-register bootstrap
//!
//! On the first `Started` message, every class of the host scope and of each
//! loaded module's scope is instantiated; consumers reporting
//! `auto_register()` are added to the default queue. Instances come from the
//! class cache, so the manifest bootstrap later sees the same objects.

use crate::core::services::HostServices;
use crate::core::version::host_module_name;
use crate::messaging::bootstrap::{is_startup, mark_done, BootstrapState};
use crate::messaging::consumer::{ConsumerResult, MessageConsumer};
use crate::messaging::error::MessagingResult;
use crate::messaging::message::{Message, MessageKind, SYSTEM};
use crate::plugin::api::ClassScope;
use std::sync::Mutex;

#[derive(Debug)]
pub struct AutoRegisterBootstrap {
    services: HostServices,
    state: Mutex<BootstrapState>,
}

impl AutoRegisterBootstrap {
    pub fn new(services: HostServices) -> Self {
        Self {
            services,
            state: Mutex::new(BootstrapState::Pending),
        }
    }

    fn scope_is_active(&self, scope: &ClassScope) -> bool {
        if scope.name() == host_module_name() {
            return true;
        }
        matches!(
            self.services.modules().find(scope.name()),
            Ok(Some(manifest)) if manifest.is_loaded()
        )
    }

    /// Register every self-registering consumer, once
    pub fn register_auto_consumers(&self) -> MessagingResult<usize> {
        if !mark_done(&self.state)? {
            return Ok(0);
        }

        let queue = self.services.messaging().default_queue()?;
        let mut registered = 0;

        for scope in self.services.classes().scopes() {
            if !self.scope_is_active(&scope) {
                log::debug!("Scope '{}' belongs to no loaded module", scope.name());
                continue;
            }

            for class_name in scope.class_names() {
                let consumer = match scope.instantiate(&class_name, &self.services) {
                    Ok(consumer) => consumer,
                    Err(e) => {
                        log::error!("Unable to inspect consumer '{}': {}", class_name, e);
                        continue;
                    }
                };
                if !consumer.auto_register() {
                    continue;
                }
                match queue.register_consumer(consumer) {
                    Ok(true) => registered += 1,
                    Ok(false) => {}
                    Err(e) => log::error!("Unable to register '{}': {}", class_name, e),
                }
            }
        }

        log::info!("Auto-registered {} message consumer(s)", registered);
        Ok(registered)
    }
}

impl MessageConsumer for AutoRegisterBootstrap {
    fn expected_types(&self) -> Vec<&'static MessageKind> {
        vec![&SYSTEM]
    }

    fn handle_message(&self, message: &dyn Message) -> ConsumerResult {
        if is_startup(message) {
            self.register_auto_consumers()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "AutoRegisterBootstrap"
    }
}
