//! Manifest consumer bootstrap
//!
//! Registers the consumers that module manifests declare. The work happens
//! once, when the first `Started` lifecycle message arrives; every later
//! delivery is a no-op.

use crate::core::services::HostServices;
use crate::core::sync::handle_mutex_poison;
use crate::messaging::consumer::{ConsumerResult, MessageConsumer};
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::message::{Message, MessageKind, SystemMessage, SystemStatus, SYSTEM};
use crate::plugin::api::{ConsumerDescriptor, Manifest};
use std::sync::Mutex;

/// One-shot state shared by the startup bootstraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BootstrapState {
    Pending,
    Done,
}

/// True if `message` is the host's `Started` lifecycle message
pub(crate) fn is_startup(message: &dyn Message) -> bool {
    message
        .downcast_ref::<SystemMessage>()
        .map(|m| m.status() == SystemStatus::Started)
        .unwrap_or(false)
}

/// Move `state` from `Pending` to `Done`; false if it was already `Done`
///
/// The guard is dropped on return, the caller's work runs unlocked.
pub(crate) fn mark_done(state: &Mutex<BootstrapState>) -> MessagingResult<bool> {
    let mut state = handle_mutex_poison(state.lock(), MessagingError::lock)?;
    if *state == BootstrapState::Done {
        return Ok(false);
    }
    *state = BootstrapState::Done;
    Ok(true)
}

#[derive(Debug)]
pub struct ManifestConsumerBootstrap {
    services: HostServices,
    state: Mutex<BootstrapState>,
}

impl ManifestConsumerBootstrap {
    pub fn new(services: HostServices) -> Self {
        Self {
            services,
            state: Mutex::new(BootstrapState::Pending),
        }
    }

    pub fn is_done(&self) -> bool {
        self.state
            .lock()
            .map(|state| *state == BootstrapState::Done)
            .unwrap_or(true)
    }

    /// Register every declared consumer, once
    ///
    /// Returns the number of consumers registered by this call; 0 once the
    /// bootstrap has already run. The state flips to `Done` before the scan
    /// starts and the lock is released, so factories that send `Started`
    /// again (or a concurrent trigger) see `Done` and return at once.
    pub fn register_declared_consumers(&self) -> MessagingResult<usize> {
        if !mark_done(&self.state)? {
            log::trace!("Manifest consumers already registered");
            return Ok(0);
        }

        let mut registered = 0;
        for manifest in self.services.modules().all_with_host() {
            if !manifest.is_loaded() {
                if !manifest.consumers().is_empty() {
                    log::warn!(
                        "Module '{}' is not loaded, skipping its {} consumer binding(s)",
                        manifest.name(),
                        manifest.consumers().len()
                    );
                }
                continue;
            }

            for binding in manifest.consumers() {
                if binding.class_name.is_empty() {
                    log::warn!(
                        "Module '{}' declares a consumer without class name - skipping",
                        manifest.name()
                    );
                    continue;
                }
                if binding.queue.is_empty() {
                    log::warn!(
                        "Module '{}' declares consumer '{}' without queue name - skipping",
                        manifest.name(),
                        binding.class_name
                    );
                    continue;
                }

                match self.register_binding(&manifest, binding) {
                    Ok(true) => registered += 1,
                    Ok(false) => {}
                    Err(e) => log::error!(
                        "Unable to register consumer '{}' of module '{}' on queue '{}': {}",
                        binding.class_name,
                        manifest.name(),
                        binding.queue,
                        e
                    ),
                }
            }
        }

        log::info!(
            "Registered {} message consumer(s) declared in module manifests",
            registered
        );
        Ok(registered)
    }

    fn register_binding(
        &self,
        manifest: &Manifest,
        binding: &ConsumerDescriptor,
    ) -> MessagingResult<bool> {
        let scope = self.services.classes().scope_for(manifest)?;
        let consumer = scope.instantiate(&binding.class_name, &self.services)?;

        if consumer.auto_register() {
            log::debug!(
                "Consumer '{}' registers itself, not adding it to '{}'",
                binding.class_name,
                binding.queue
            );
            return Ok(false);
        }

        let queue = self.services.messaging().get_queue(&binding.queue)?;
        let added = queue.register_consumer(consumer)?;
        if added {
            log::debug!(
                "Registered '{}' from module '{}' on queue '{}'",
                binding.class_name,
                manifest.name(),
                binding.queue
            );
        }
        Ok(added)
    }
}

impl MessageConsumer for ManifestConsumerBootstrap {
    fn expected_types(&self) -> Vec<&'static MessageKind> {
        vec![&SYSTEM]
    }

    fn handle_message(&self, message: &dyn Message) -> ConsumerResult {
        if !is_startup(message) {
            return Ok(());
        }
        self.register_declared_consumers()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "ManifestConsumerBootstrap"
    }
}
