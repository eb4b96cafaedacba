//! Error types shared by the package and asset layers.

use crate::id::Guid;
use semver::Version;

/// Errors raised while constructing, registering, or resolving packages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageError {
    /// A package or dependency name failed validation.
    #[error("invalid package name '{0}'")]
    InvalidName(String),

    /// A package with the same name is already registered.
    #[error("duplicate package name '{0}'")]
    DuplicateName(String),

    /// A declared dependency is missing or its installed version does not
    /// satisfy the constraint.
    #[error("package '{package}' has unresolved dependency '{dependency}' ({required})")]
    UnresolvedDependency {
        package: String,
        dependency: String,
        required: Version,
    },

    /// The package is part of a dependency cycle.
    #[error("package '{0}' is part of a dependency cycle")]
    CyclicDependency(String),

    /// No package with the given name is registered.
    #[error("package '{0}' not found")]
    NotFound(String),
}

/// Errors raised by the asset registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    /// Two assets were assigned the same GUID. This is a logic error, not
    /// bad input.
    #[error("duplicate asset guid {0}")]
    DuplicateGuid(Guid),

    /// An asset is already registered at this logical path.
    #[error("duplicate asset path '{0}'")]
    DuplicatePath(String),
}
