//! Auto-register bootstrap behaviour

use super::utils::{add_module, define_recorder, queue_size, services_with_host_bindings};
use crate::core::version::host_module_name;
use crate::messaging::api::{
    AutoRegisterBootstrap, ManifestConsumerBootstrap, MessageConsumer, SystemMessage,
    DEFAULT_QUEUE,
};

#[test]
fn test_registers_auto_consumers_on_default_queue_once() {
    let services = services_with_host_bindings(&[]);
    define_recorder(&services, host_module_name(), "host::Auto", true);
    define_recorder(&services, host_module_name(), "host::Manual", false);
    add_module(&services, "live", &[], true);
    define_recorder(&services, "live", "live::Auto", true);
    add_module(&services, "dormant", &[], false);
    define_recorder(&services, "dormant", "dormant::Auto", true);
    define_recorder(&services, "unknown", "unknown::Auto", true);

    let bootstrap = AutoRegisterBootstrap::new(services.clone());
    bootstrap
        .handle_message(&SystemMessage::shutting_down())
        .unwrap();
    assert_eq!(queue_size(&services, DEFAULT_QUEUE), 0);

    assert_eq!(bootstrap.register_auto_consumers().unwrap(), 2);
    assert_eq!(bootstrap.register_auto_consumers().unwrap(), 0);
    assert_eq!(queue_size(&services, DEFAULT_QUEUE), 2);
}

#[test]
fn test_both_bootstraps_never_double_register() {
    let services =
        services_with_host_bindings(&[("host::Auto", "inbox"), ("host::Plain", "inbox")]);
    define_recorder(&services, host_module_name(), "host::Auto", true);
    define_recorder(&services, host_module_name(), "host::Plain", false);

    let auto = AutoRegisterBootstrap::new(services.clone());
    let manifest = ManifestConsumerBootstrap::new(services.clone());
    let started = SystemMessage::started();
    auto.handle_message(&started).unwrap();
    manifest.handle_message(&started).unwrap();

    assert_eq!(queue_size(&services, DEFAULT_QUEUE), 1);
    assert_eq!(queue_size(&services, "inbox"), 1);
}
