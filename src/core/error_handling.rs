//! Contextual error logging shared by every subsystem
//!
//! Errors that reach the top of an operation are logged once through
//! [`log_error_with_context`], which decides between the error's own
//! user-facing message and a generic operation description.

/// Errors that know whether their message is meant for the user
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`. System-level errors return `false` and `None`.
pub trait ContextualError: std::error::Error {
    /// True if the message can be acted on by the user (bad config, blank names)
    fn is_user_actionable(&self) -> bool;

    /// The user-facing message for actionable errors
    fn user_message(&self) -> Option<String>;
}

/// Log a terminal error with the right level of detail
///
/// User-actionable errors print their own message; system errors print
/// `operation_context`. Full details always go to debug level.
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message().filter(|_| error.is_user_actionable()) {
        Some(user_msg) => log::error!("FATAL: {}", user_msg),
        None => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Log a recoverable error for one item of a batch and carry on
///
/// Used where a single failing entry (a binding, a source, a manifest) must
/// not abort the surrounding loop.
pub fn log_skipped<E: std::fmt::Display>(what: &str, error: &E) {
    log::error!("{} - skipping: {}", what, error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::api::PluginError;

    #[test]
    fn test_blank_name_errors_are_user_actionable() {
        let error = PluginError::BlankModuleName {
            location: "plugins/broken/module.toml".to_string(),
        };
        assert!(error.is_user_actionable());
        assert!(error.user_message().is_some());
        log_error_with_context(&error, "Loading modules");
    }

    #[test]
    fn test_resolution_errors_are_system_errors() {
        let error = PluginError::ClassNotFound {
            scope: "hello".to_string(),
            class_name: "hello::Missing".to_string(),
        };
        assert!(!error.is_user_actionable());
        assert_eq!(error.user_message(), None);
        log_error_with_context(&error, "Registering consumers");
    }
}
