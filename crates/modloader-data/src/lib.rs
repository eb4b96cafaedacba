//! Modloader Data -- reads packages from disk and imports them into a
//! [`Session`](modloader_core::session::Session).
//!
//! A package is a directory holding a manifest (`mod.ron`, `mod.toml` or
//! `mod.json`) and its asset files:
//!
//! ```text
//! packages/
//!   core/
//!     mod.ron
//!     textures/stone.png
//!     materials/stone.mtl
//!   extra/
//!     mod.toml
//!     models/tower.obj
//! ```
//!
//! [`Importer`] walks such a tree, resolves package dependencies, and imports
//! every asset in dependency order so cross-package references resolve.

pub mod config;
pub mod error;
pub mod importer;
pub mod loader;
pub mod manifest;
pub mod schema;

pub use config::{FileKind, ImportConfig};
pub use error::ImportError;
pub use importer::{ImportReport, Importer};
pub use loader::DataLoadError;
pub use manifest::load_package;
