//! Message consumer trait

use crate::messaging::message::{Message, MessageKind};

/// Outcome of handling one message
pub type ConsumerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A handler bound to one or more message kinds
pub trait MessageConsumer: Send + Sync {
    /// Kinds this consumer accepts; an empty list accepts everything
    fn expected_types(&self) -> Vec<&'static MessageKind>;

    fn handle_message(&self, message: &dyn Message) -> ConsumerResult;

    /// True if the consumer is registered by the auto-register bootstrap
    /// rather than through a manifest binding
    fn auto_register(&self) -> bool {
        false
    }

    /// Name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// True if `consumer` declares a kind compatible with the message's kind
pub fn accepts(consumer: &dyn MessageConsumer, message: &dyn Message) -> bool {
    let expected = consumer.expected_types();
    expected.is_empty() || expected.iter().any(|kind| message.kind().is_a(kind))
}
