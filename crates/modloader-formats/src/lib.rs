//! Text asset formats for the modloader.
//!
//! Both formats are line-oriented and whitespace-delimited, share the
//! tokenizer in [`text`], and resolve cross-file references through a
//! read-only [`AssetRegistry`](modloader_core::asset_registry::AssetRegistry)
//! lookup. Parsers are pure functions of the file text and the registry, so
//! independent files can be parsed in any order or in parallel.
//!
//! - [`mtl`] -- material libraries.
//! - [`obj`] -- triangle meshes referencing those materials.

pub mod mtl;
pub mod obj;
pub mod text;

pub use mtl::{ParsedLibrary, parse_material_library};
pub use obj::parse_mesh;
pub use text::{ParseError, SourceFile};
