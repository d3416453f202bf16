//! Messaging factory
//!
//! Owns every queue of the process. Queues are created on first lookup and
//! live until [`MessagingFactory::close`].

use crate::core::sync::handle_rwlock_write;
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::message::Message;
use crate::messaging::queue::{DeliveryReport, MessagingQueue};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Name of the queue lifecycle messages are published on
pub const DEFAULT_QUEUE: &str = "modhost.system";

#[derive(Debug, Default)]
pub struct MessagingFactory {
    queues: RwLock<HashMap<String, Arc<MessagingQueue>>>,
}

impl MessagingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The queue with this name, created if it does not exist yet
    ///
    /// Concurrent first lookups of one name all receive the same queue.
    pub fn get_queue(&self, name: &str) -> MessagingResult<Arc<MessagingQueue>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MessagingError::BlankQueueName);
        }

        if let Ok(queues) = self.queues.read() {
            if let Some(queue) = queues.get(name) {
                return Ok(Arc::clone(queue));
            }
        }

        let mut queues = handle_rwlock_write(self.queues.write(), MessagingError::lock)?;
        let queue = queues.entry(name.to_string()).or_insert_with(|| {
            log::debug!("Creating message queue '{}'", name);
            Arc::new(MessagingQueue::new(name))
        });
        Ok(Arc::clone(queue))
    }

    pub fn default_queue(&self) -> MessagingResult<Arc<MessagingQueue>> {
        self.get_queue(DEFAULT_QUEUE)
    }

    /// Send a message on the default queue
    pub fn send_message(&self, message: &dyn Message) -> MessagingResult<DeliveryReport> {
        Ok(self.default_queue()?.send_message(message))
    }

    pub fn queue_names(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.queues.read() {
            Ok(queues) => queues.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        };
        names.sort();
        names
    }

    /// Drop every consumer and queue
    ///
    /// Consumers commonly hold host services, which hold this factory; closing
    /// releases those references at shutdown.
    pub fn close(&self) {
        let drained: Vec<Arc<MessagingQueue>> = match self.queues.write() {
            Ok(mut queues) => queues.drain().map(|(_, q)| q).collect(),
            Err(poisoned) => poisoned.into_inner().drain().map(|(_, q)| q).collect(),
        };
        for queue in &drained {
            queue.clear();
        }
        log::debug!("Closed {} message queue(s)", drained.len());
    }
}
