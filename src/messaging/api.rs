//! Public API for the messaging system
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Messages and kinds
pub use crate::messaging::message::{
    Message, MessageKind, QueryMessage, SystemMessage, SystemStatus, ANY, QUERY, SYSTEM,
};

// Consumers
pub use crate::messaging::consumer::{accepts, ConsumerResult, MessageConsumer};

// Queues
pub use crate::messaging::factory::{MessagingFactory, DEFAULT_QUEUE};
pub use crate::messaging::queue::{DeliveryReport, MessagingQueue};

// Startup bootstraps
pub use crate::messaging::auto_register::AutoRegisterBootstrap;
pub use crate::messaging::bootstrap::ManifestConsumerBootstrap;

// Error handling
pub use crate::messaging::error::{MessagingError, MessagingResult};
