//! Test modules for the messaging system

mod auto_register_tests;
mod utils;
