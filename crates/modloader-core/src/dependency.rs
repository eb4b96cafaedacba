use crate::error::PackageError;
use crate::name::validate_name;
use semver::{Comparator, Op, Version};
use std::fmt;

/// A named, version-constrained requirement one package places on another.
///
/// Immutable once constructed; the name is validated on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    name: String,
    version: Version,
}

impl Dependency {
    /// Create a descriptor. Fails with `InvalidName` if `name` is rejected by
    /// the package-name validator.
    pub fn new(name: impl Into<String>, version: Version) -> Result<Self, PackageError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, version })
    }

    /// Name of the required package.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum compatible version of the required package.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Whether `installed` satisfies this requirement.
    ///
    /// Caret compatibility: `installed` must be at least the required version
    /// and share its major version (or, for `0.x`, its minor version).
    pub fn is_satisfied_by(&self, installed: &Version) -> bool {
        let comparator = Comparator {
            op: Op::Caret,
            major: self.version.major,
            minor: Some(self.version.minor),
            patch: Some(self.version.patch),
            pre: self.version.pre.clone(),
        };
        comparator.matches(installed)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(name: &str, version: &str) -> Dependency {
        Dependency::new(name, Version::parse(version).unwrap()).unwrap()
    }

    #[test]
    fn rejects_invalid_name() {
        let result = Dependency::new("../core", Version::new(1, 0, 0));
        assert!(matches!(result, Err(PackageError::InvalidName(_))));
    }

    #[test]
    fn exact_version_satisfies() {
        assert!(dep("core", "1.2.3").is_satisfied_by(&Version::new(1, 2, 3)));
    }

    #[test]
    fn newer_compatible_version_satisfies() {
        let d = dep("core", "1.2.0");
        assert!(d.is_satisfied_by(&Version::new(1, 2, 5)));
        assert!(d.is_satisfied_by(&Version::new(1, 9, 0)));
    }

    #[test]
    fn older_version_does_not_satisfy() {
        assert!(!dep("core", "1.2.0").is_satisfied_by(&Version::new(1, 1, 9)));
    }

    #[test]
    fn next_major_does_not_satisfy() {
        assert!(!dep("core", "1.2.0").is_satisfied_by(&Version::new(2, 0, 0)));
    }

    #[test]
    fn zero_major_pins_minor() {
        let d = dep("core", "0.3.1");
        assert!(d.is_satisfied_by(&Version::new(0, 3, 4)));
        assert!(!d.is_satisfied_by(&Version::new(0, 4, 0)));
    }

    #[test]
    fn display_shows_name_and_version() {
        assert_eq!(dep("core", "1.0.0").to_string(), "core: 1.0.0");
    }
}
