//! Named message queues
//!
//! A queue is an ordered list of consumers. Sending a message walks a
//! snapshot of that list in registration order and hands the message to
//! every consumer that accepts its kind. A consumer that fails (error or
//! panic) is logged and skipped; the rest still receive the message.

use crate::core::sync::handle_rwlock_write;
use crate::messaging::consumer::{accepts, MessageConsumer};
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::message::Message;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

/// Delivery counts for one sent message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Consumers that handled the message successfully
    pub delivered: usize,
    /// Consumers that returned an error or panicked
    pub failed: usize,
}

fn same_consumer(a: &Arc<dyn MessageConsumer>, b: &Arc<dyn MessageConsumer>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

pub struct MessagingQueue {
    name: String,
    consumers: RwLock<Vec<Arc<dyn MessageConsumer>>>,
}

impl std::fmt::Debug for MessagingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingQueue")
            .field("name", &self.name)
            .field("consumers", &self.consumer_count())
            .finish()
    }
}

impl MessagingQueue {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            consumers: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a consumer; returns `false` if this instance is already registered
    pub fn register_consumer(&self, consumer: Arc<dyn MessageConsumer>) -> MessagingResult<bool> {
        let mut consumers = handle_rwlock_write(self.consumers.write(), MessagingError::lock)?;
        if consumers.iter().any(|c| same_consumer(c, &consumer)) {
            log::debug!(
                "Consumer '{}' already registered on queue '{}'",
                consumer.name(),
                self.name
            );
            return Ok(false);
        }
        log::debug!(
            "Registering consumer '{}' on queue '{}'",
            consumer.name(),
            self.name
        );
        consumers.push(consumer);
        Ok(true)
    }

    /// Remove a consumer instance; returns `false` if it was not registered
    pub fn unregister_consumer(&self, consumer: &Arc<dyn MessageConsumer>) -> MessagingResult<bool> {
        let mut consumers = handle_rwlock_write(self.consumers.write(), MessagingError::lock)?;
        let before = consumers.len();
        consumers.retain(|c| !same_consumer(c, consumer));
        Ok(consumers.len() != before)
    }

    pub fn consumer_count(&self) -> usize {
        self.snapshot().len()
    }

    pub(crate) fn clear(&self) {
        match self.consumers.write() {
            Ok(mut consumers) => consumers.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn MessageConsumer>> {
        match self.consumers.read() {
            Ok(consumers) => consumers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Deliver a message to every accepting consumer
    ///
    /// Consumers registered while the message is being delivered do not
    /// receive it.
    pub fn send_message(&self, message: &dyn Message) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for consumer in self.snapshot() {
            if !accepts(consumer.as_ref(), message) {
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| consumer.handle_message(message))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    log::error!(
                        "Consumer '{}' failed on '{}' message from queue '{}': {}",
                        consumer.name(),
                        message.kind(),
                        self.name,
                        e
                    );
                    report.failed += 1;
                }
                Err(_) => {
                    log::error!(
                        "Consumer '{}' panicked on '{}' message from queue '{}'",
                        consumer.name(),
                        message.kind(),
                        self.name
                    );
                    report.failed += 1;
                }
            }
        }

        log::trace!(
            "Queue '{}': '{}' message delivered to {}, failed for {}",
            self.name,
            message.kind(),
            report.delivered,
            report.failed
        );
        report
    }
}
