//! Test modules for the plugin system

mod dependency_scenarios;
