//! Module discovery and dependency resolution across real source directories

mod common;

use common::{manifest, ModuleTree};
use modhost::plugin::api::{
    complies, PluginLoader, SourceType, UnloadedReason, MANIFEST_FILE_NAME,
};
use std::sync::Arc;

fn loader(services: &modhost::core::services::HostServices) -> PluginLoader {
    PluginLoader::new(
        Arc::clone(services.modules()),
        Arc::clone(services.sources()),
    )
}

#[test]
fn test_sources_are_scanned_in_priority_order() {
    let tree = ModuleTree::new();
    let configured = tree.module("extra", "clock", &manifest("clock", "3.0", ""));
    tree.module("user", "clock", &manifest("clock", "2.0", ""));
    tree.module("system", "clock", &manifest("clock", "1.0", ""));
    tree.module("user", "notes", &manifest("notes", "0.4", ""));
    let scratch = tree.module("extra", "scratch", &manifest("scratch", "0.1", ""));

    let services = tree.services(vec![configured, scratch], &[]);
    let loader = loader(&services);
    assert_eq!(loader.discover().unwrap(), 3);

    let clock = services.modules().find("clock").unwrap().unwrap();
    assert_eq!(clock.version(), "1.0");
    assert_eq!(clock.source_type(), Some(SourceType::System));

    let notes = services.modules().find("notes").unwrap().unwrap();
    assert_eq!(notes.source_type(), Some(SourceType::User));

    let scratch = services.modules().find("scratch").unwrap().unwrap();
    assert_eq!(scratch.source_type(), Some(SourceType::Config));
}

#[test]
fn test_invalid_manifests_are_skipped() {
    let tree = ModuleTree::new();
    tree.module("system", "good", &manifest("good", "1.0", ""));
    tree.module("system", "nameless", "version = \"1.0\"\n");
    tree.module("system", "garbage", "this is not toml");
    tree.module(
        "system",
        "blank-dep",
        &manifest("blank-dep", "1.0", "[[dependency]]\nname = \"  \"\n"),
    );
    std::fs::create_dir_all(tree.dir("system").join("empty")).unwrap();

    let services = tree.services(Vec::new(), &[]);
    assert_eq!(loader(&services).discover().unwrap(), 1);
    assert_eq!(services.modules().module_count(), 1);
    assert!(services.modules().find("blank-dep").unwrap().is_none());
}

#[test]
fn test_resolution_follows_version_constraints() {
    let tree = ModuleTree::new();
    tree.module("system", "base", &manifest("base", "2.1", ""));
    tree.module(
        "system",
        "newer",
        &manifest("newer", "1.0", "[[dependency]]\nname = \"base\"\nversion = \"+2.0\"\n"),
    );
    tree.module(
        "system",
        "older",
        &manifest("older", "1.0", "[[dependency]]\nname = \"base\"\nversion = \"-2.0\"\n"),
    );
    let pinned = tree.module(
        "extra",
        "pinned",
        &manifest("pinned", "1.0", "[[dependency]]\nname = \"base\"\nversion = \"2.1\"\n"),
    );
    let optional = tree.module(
        "extra",
        "optional",
        &manifest(
            "optional",
            "1.0",
            "[[dependency]]\nname = \"absent\"\nrequired = false\n",
        ),
    );

    let services = tree.services(vec![pinned, optional], &[]);
    let loader = loader(&services);
    loader.discover().unwrap();
    let report = loader.resolve();

    assert!(report.is_loaded("base"));
    assert!(report.is_loaded("newer"));
    assert!(report.is_loaded("pinned"));
    assert!(report.is_loaded("optional"));
    assert!(!report.is_loaded("older"));

    match &report.unloaded("older").unwrap().reason {
        UnloadedReason::UnsatisfiedDependencies(deps) => {
            assert_eq!(deps.len(), 1);
            assert_eq!(deps[0].name(), "base");
        }
        other => panic!("unexpected reason {:?}", other),
    }
    assert!(complies("2.1", Some("+2.0")));
    assert_eq!(services.modules().loaded_count(), 4);
}

#[test]
fn test_host_and_obsolete_targets() {
    let tree = ModuleTree::new();
    tree.module(
        "system",
        "needs-future-host",
        &manifest(
            "needs-future-host",
            "1.0",
            "[[dependency]]\nname = \"modhost\"\nversion = \"+999.0\"\n",
        ),
    );
    tree.module(
        "system",
        "needs-host",
        &manifest("needs-host", "1.0", "[[dependency]]\nname = \"MODHOST\"\n"),
    );
    tree.module(
        "system",
        "needs-retired",
        &manifest("needs-retired", "1.0", "[[dependency]]\nname = \"retired\"\n"),
    );

    let services = tree.services(Vec::new(), &["retired"]);
    let loader = loader(&services);
    loader.discover().unwrap();
    let report = loader.resolve();

    assert!(!report.is_loaded("needs-future-host"));
    assert!(report.is_loaded("needs-host"));
    assert!(report.is_loaded("needs-retired"));
}

#[test]
fn test_disabled_module_blocks_its_dependents() {
    let tree = ModuleTree::new();
    tree.module("system", "off", &manifest("off", "1.0", "enabled = false\n"));
    tree.module(
        "system",
        "dependent",
        &manifest("dependent", "1.0", "[[dependency]]\nname = \"off\"\n"),
    );

    let services = tree.services(Vec::new(), &[]);
    let loader = loader(&services);
    loader.discover().unwrap();
    let report = loader.resolve();

    assert!(report.loaded.is_empty());
    assert_eq!(
        report.unloaded("off").map(|u| &u.reason),
        Some(&UnloadedReason::Disabled)
    );
    assert!(matches!(
        report.unloaded("dependent").map(|u| &u.reason),
        Some(UnloadedReason::UnsatisfiedDependencies(_))
    ));
}

#[test]
fn test_directory_named_twice_is_scanned_once() {
    let tree = ModuleTree::new();
    let module = tree.module("extra", "solo", &manifest("solo", "1.0", ""));
    assert!(module.join(MANIFEST_FILE_NAME).is_file());

    let alias = tree.dir("extra").join(".").join("solo");
    let services = tree.services(vec![module.clone(), alias, module], &[]);

    assert_eq!(loader(&services).discover().unwrap(), 1);
}
