//! Error types for the messaging system

use crate::core::error_handling::ContextualError;
use crate::plugin::api::PluginError;

/// Result type alias for messaging operations
pub type MessagingResult<T> = std::result::Result<T, MessagingError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MessagingError {
    /// Queues are looked up by a non-empty name
    #[error("Queue name must not be blank")]
    BlankQueueName,

    /// Resolving or instantiating a consumer class failed
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// Internal lock poisoned
    #[error("{message}")]
    Lock { message: String },
}

impl MessagingError {
    pub(crate) fn lock(message: String) -> Self {
        MessagingError::Lock { message }
    }
}

impl ContextualError for MessagingError {
    fn is_user_actionable(&self) -> bool {
        match self {
            MessagingError::BlankQueueName => true,
            MessagingError::Plugin(inner) => inner.is_user_actionable(),
            MessagingError::Lock { .. } => false,
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            MessagingError::BlankQueueName => Some(self.to_string()),
            MessagingError::Plugin(inner) => inner.user_message(),
            MessagingError::Lock { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_errors_keep_their_context() {
        let error: MessagingError = PluginError::ClassNotFound {
            scope: "greeter".to_string(),
            class_name: "greeter::Missing".to_string(),
        }
        .into();
        assert!(error.to_string().contains("greeter::Missing"));
        assert!(!error.is_user_actionable());

        assert!(MessagingError::BlankQueueName.is_user_actionable());
        assert_eq!(MessagingError::lock("poisoned".into()).user_message(), None);
    }
}
