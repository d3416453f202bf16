//! Messaging System Module
//!
//! Named queues of message consumers, typed messages with a kind hierarchy,
//! and the startup bootstraps that wire module-declared consumers onto
//! their queues.

// Internal modules - all access should go through api module
pub(crate) mod auto_register;
pub(crate) mod bootstrap;
pub(crate) mod consumer;
pub(crate) mod error;
pub(crate) mod factory;
pub(crate) mod message;
pub(crate) mod queue;

// Public API module - the only public interface for the messaging system
pub mod api;

#[cfg(test)]
mod tests;
