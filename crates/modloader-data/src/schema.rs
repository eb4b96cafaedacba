//! Serde structs for the on-disk package manifest.
//!
//! A manifest is `<manifest_name>.{ron,toml,json}` at the package root. It is
//! deserialized as-is and then turned into a
//! [`Package`](modloader_core::package::Package) by [`crate::manifest`].

use serde::Deserialize;

// ===========================================================================
// Manifest
// ===========================================================================

/// Package manifest as written on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestData {
    pub name: String,
    /// Semantic version string, e.g. `"1.2.0"`.
    pub version: String,
    #[serde(default)]
    pub dependencies: Vec<DependencyData>,
    /// Asset files relative to the package root, imported in this order.
    /// Empty means "scan the package directory".
    #[serde(default)]
    pub assets: Vec<String>,
}

/// One dependency entry in a manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyData {
    pub name: String,
    /// Minimum compatible version.
    pub version: String,
}
