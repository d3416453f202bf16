//! Dependency checks against a live module registry

use crate::plugin::api::{Dependency, Manifest, ModuleRegistry};

fn registry_with(modules: &[(&str, &str, bool)], obsolete: &[&str]) -> ModuleRegistry {
    let host = Manifest::builder("modhost", "3.2").system(true).build().unwrap();
    let registry = ModuleRegistry::new(host, obsolete.iter().map(|s| s.to_string()));
    for (name, version, loaded) in modules {
        registry
            .register(Manifest::builder(name, version).build().unwrap())
            .unwrap()
            .set_loaded(*loaded);
    }
    registry
}

#[test]
fn test_a_requires_b_at_least_two() {
    let a_needs_b = Dependency::new("B", Some("+2.0")).unwrap();

    assert!(a_needs_b.check(&registry_with(&[("B", "2.1", true)], &[])));
    assert!(!a_needs_b.check(&registry_with(&[("B", "2.1", false)], &[])));
    assert!(!a_needs_b.check(&registry_with(&[("B", "1.9", true)], &[])));
    assert!(!a_needs_b.check(&registry_with(&[], &[])));
}

#[test]
fn test_obsolescence_overrides_required_flag() {
    let registry = registry_with(&[("legacy", "0.1", false)], &["legacy"]);
    let dep = Dependency::new("legacy", Some("+5.0")).unwrap();

    assert!(dep.declared_required());
    assert!(!dep.is_required(&registry));
    assert!(dep.check(&registry));
}

#[test]
fn test_host_target_uses_host_manifest_version() {
    let registry = registry_with(&[], &[]);

    assert!(Dependency::new("MODHOST", Some("+3.0")).unwrap().check(&registry));
    assert!(Dependency::new("modhost", Some("3.2.0")).unwrap().check(&registry));
    assert!(!Dependency::new("modhost", Some("-3.1")).unwrap().check(&registry));
}

#[test]
fn test_name_match_is_exact() {
    let registry = registry_with(&[("Mail", "1.0", true)], &[]);
    assert!(!Dependency::new("mail", None).unwrap().check(&registry));
    assert!(Dependency::new("Mail", None).unwrap().check(&registry));
}
