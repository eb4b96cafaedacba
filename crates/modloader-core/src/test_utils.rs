//! Builders for tests. Enabled by the `test-utils` feature.

use crate::dependency::Dependency;
use crate::package::Package;
use crate::registry::PackageRegistry;
use semver::Version;

/// Parse a version literal, panicking on bad input.
pub fn version(v: &str) -> Version {
    Version::parse(v).unwrap()
}

/// A dependency descriptor on `name` at version `v`.
pub fn dependency(name: &str, v: &str) -> Dependency {
    Dependency::new(name, version(v)).unwrap()
}

/// A package rooted at `/packages/<name>` with the given `(name, version)`
/// dependencies.
pub fn package(name: &str, v: &str, deps: &[(&str, &str)]) -> Package {
    let deps = deps.iter().map(|(n, dv)| dependency(n, dv)).collect();
    Package::new(name, version(v), deps, format!("/packages/{name}")).unwrap()
}

/// A registry holding `packages`, registered in the given order.
pub fn registry_of(packages: Vec<Package>) -> PackageRegistry {
    let mut registry = PackageRegistry::new();
    for p in packages {
        registry.register(p).unwrap();
    }
    registry
}
