//! Typed assets produced by importing package files.
//!
//! Assets form a closed set of variants ([`AssetData`]) sharing a common
//! header ([`Asset`]). Cross-references between assets are stored as
//! [`Guid`]s and resolved through the
//! [`AssetRegistry`](crate::asset_registry::AssetRegistry).

use crate::id::Guid;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Common header
// ---------------------------------------------------------------------------

/// Discriminant of [`AssetData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Texture,
    MaterialLibrary,
    Material,
    Mesh,
}

/// A typed, uniquely identified content object.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub guid: Guid,
    /// Name of the owning package.
    pub package: String,
    /// File the asset was read from.
    pub source_path: PathBuf,
    /// Package-qualified path, e.g. `core/materials/stone.mtl#granite`.
    pub logical_path: String,
    pub data: AssetData,
}

impl Asset {
    pub fn new(
        guid: Guid,
        package: impl Into<String>,
        source_path: impl Into<PathBuf>,
        logical_path: impl Into<String>,
        data: AssetData,
    ) -> Self {
        Self {
            guid,
            package: package.into(),
            source_path: source_path.into(),
            logical_path: logical_path.into(),
            data,
        }
    }

    pub fn kind(&self) -> AssetKind {
        self.data.kind()
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Whether the backing data is present. Library membership is checked by
    /// the registry, see
    /// [`AssetRegistry::is_valid`](crate::asset_registry::AssetRegistry::is_valid).
    pub fn is_loaded(&self) -> bool {
        match &self.data {
            AssetData::Texture(t) => !t.bytes.is_empty(),
            AssetData::MaterialLibrary(_) | AssetData::Material(_) => true,
            AssetData::Mesh(m) => !m.positions.is_empty(),
        }
    }

    pub fn as_texture(&self) -> Option<&Texture> {
        match &self.data {
            AssetData::Texture(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_material(&self) -> Option<&Material> {
        match &self.data {
            AssetData::Material(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_material_library(&self) -> Option<&MaterialLibrary> {
        match &self.data {
            AssetData::MaterialLibrary(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.data {
            AssetData::Mesh(m) => Some(m),
            _ => None,
        }
    }
}

/// Variant payload of an asset.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetData {
    Texture(Texture),
    MaterialLibrary(MaterialLibrary),
    Material(Material),
    Mesh(Mesh),
}

impl AssetData {
    pub fn kind(&self) -> AssetKind {
        match self {
            AssetData::Texture(_) => AssetKind::Texture,
            AssetData::MaterialLibrary(_) => AssetKind::MaterialLibrary,
            AssetData::Material(_) => AssetKind::Material,
            AssetData::Mesh(_) => AssetKind::Mesh,
        }
    }
}

// ---------------------------------------------------------------------------
// Textures
// ---------------------------------------------------------------------------

/// Raw image file contents. Decoding is left to the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Texture {
    pub bytes: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// Linear RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color, clamping every component to `[0, 1]`.
    pub fn clamped(r: f32, g: f32, b: f32) -> Self {
        Self::new(clamp01(r), clamp01(g), clamp01(b))
    }

    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v)
    }
}

/// Clamp to `[0, 1]`. NaN maps to 0.
pub fn clamp01(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Illumination model of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IlluminationModel {
    /// Color only, no ambient term.
    ColorOnly,
    /// Flat material with no specular highlights.
    Flat,
    /// Material with specular highlights.
    Specular,
    /// Any other model index, kept verbatim.
    Other(i32),
}

impl IlluminationModel {
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => IlluminationModel::ColorOnly,
            1 => IlluminationModel::Flat,
            2 => IlluminationModel::Specular,
            other => IlluminationModel::Other(other),
        }
    }

    pub fn index(self) -> i32 {
        match self {
            IlluminationModel::ColorOnly => 0,
            IlluminationModel::Flat => 1,
            IlluminationModel::Specular => 2,
            IlluminationModel::Other(i) => i,
        }
    }
}

/// A surface material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: Color,
    /// Diffuse color, used as the base color.
    pub base: Color,
    pub specular: Color,
    /// 1.0 is fully opaque.
    pub opacity: f32,
    pub shininess: f32,
    pub illumination: IlluminationModel,
    /// Texture attached as the base map, if one was found.
    pub base_map: Option<Guid>,
}

impl Material {
    pub const DEFAULT_AMBIENT: Color = Color::gray(0.2);
    pub const DEFAULT_BASE: Color = Color::gray(0.8);
    pub const DEFAULT_SPECULAR: Color = Color::gray(1.0);

    /// A material with default properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: Self::DEFAULT_AMBIENT,
            base: Self::DEFAULT_BASE,
            specular: Self::DEFAULT_SPECULAR,
            opacity: 1.0,
            shininess: 0.0,
            illumination: IlluminationModel::Flat,
            base_map: None,
        }
    }
}

/// The set of materials defined by one material file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterialLibrary {
    /// Member materials, in definition order.
    pub materials: Vec<Guid>,
}

/// Logical path of a material inside a library.
pub fn material_path(library_logical_path: &str, material_name: &str) -> String {
    format!("{library_logical_path}#{material_name}")
}

// ---------------------------------------------------------------------------
// Meshes
// ---------------------------------------------------------------------------

/// A run of triangles drawn with one material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialGroup {
    /// Index of the first triangle in [`Mesh::triangles`].
    pub start: usize,
    pub count: usize,
    /// `None` when the referenced material was not found.
    pub material: Option<Guid>,
}

/// Corner of a triangle: indices into the mesh attribute arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    pub position: u32,
    pub tex_coord: Option<u32>,
    pub normal: Option<u32>,
}

/// A triangle mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub triangles: Vec<[Corner; 3]>,
    pub material_groups: Vec<MaterialGroup>,
}
