//! Modloader Core -- packages, dependency resolution, and the asset registry.
//!
//! This crate holds the session state of a mod import: the set of loaded
//! [`package::Package`]s, the [`resolver`] that validates their dependencies
//! and orders them, and the [`asset_registry::AssetRegistry`] that imported
//! content is stored in and cross-referenced through.
//!
//! # Resolution
//!
//! 1. **Register** -- every package goes into a [`registry::PackageRegistry`];
//!    names are unique per session.
//! 2. **Validate** -- [`resolver::validate`] checks every dependency
//!    descriptor and marks packages with unmet requirements invalid.
//! 3. **Order** -- [`resolver::compute_order`] sorts the valid packages so
//!    every dependency comes first, breaking ties by name. Cycle members are
//!    excluded; the rest of the batch is unaffected.
//!
//! # Key Types
//!
//! - [`id::Guid`] -- stable 64-bit asset identifier derived from file paths.
//! - [`dependency::Dependency`] -- named, version-constrained requirement.
//! - [`asset::Asset`] -- textures, materials, material libraries, meshes.
//! - [`session::Session`] -- packages, assets, and processing order together.

pub mod asset;
pub mod asset_registry;
pub mod dependency;
pub mod error;
pub mod id;
pub mod name;
pub mod package;
pub mod registry;
pub mod resolver;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use semver::Version;
