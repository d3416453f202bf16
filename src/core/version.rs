//! Build metadata shared across the host and its modules.
//! This includes the generated version.rs from the build script into a core module,
//! providing a single source of truth for the host's own identity.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Name under which the host runtime itself can be named as a dependency
pub fn host_module_name() -> &'static str {
    HOST_MODULE_NAME
}

/// Version of the host runtime, as declared in Cargo.toml
pub fn host_version() -> &'static str {
    HOST_VERSION
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// True if `name` denotes the host runtime (case-insensitive)
pub fn is_host_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(HOST_MODULE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_name_matches_ignoring_case() {
        assert!(is_host_name(host_module_name()));
        assert!(is_host_name(&host_module_name().to_uppercase()));
        assert!(!is_host_name("something-else"));
    }

    #[test]
    fn test_host_version_is_not_empty() {
        assert!(!host_version().is_empty());
    }
}
