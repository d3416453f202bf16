pub mod app;
pub mod core;
pub mod messaging;
pub mod plugin;
