//! Session-scoped store of imported assets.
//!
//! Assets are keyed by [`Guid`] and indexed by logical path and, for
//! file-level assets (textures, material libraries, meshes), by source path.
//! Lookups return `Option`: an asset that has not been imported yet is simply
//! absent, which callers such as the format parsers treat as a soft miss.

use crate::asset::{Asset, AssetKind, Material, Texture};
use crate::error::AssetError;
use crate::id::Guid;
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: BTreeMap<Guid, Asset>,
    by_source: HashMap<PathBuf, Guid>,
    by_logical: HashMap<String, Guid>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an asset.
    ///
    /// A repeated GUID is a logic error: it panics in debug builds and is
    /// rejected with `DuplicateGuid` otherwise. A repeated logical path is
    /// rejected with `DuplicatePath`.
    pub fn insert(&mut self, asset: Asset) -> Result<Guid, AssetError> {
        let guid = asset.guid;
        debug_assert!(
            !self.assets.contains_key(&guid),
            "duplicate asset guid {guid}"
        );
        if self.assets.contains_key(&guid) {
            return Err(AssetError::DuplicateGuid(guid));
        }
        if self.by_logical.contains_key(&asset.logical_path) {
            return Err(AssetError::DuplicatePath(asset.logical_path));
        }

        self.by_logical.insert(asset.logical_path.clone(), guid);
        if is_file_level(asset.kind()) {
            self.by_source
                .insert(normalize_path(&asset.source_path), guid);
        }
        self.assets.insert(guid, asset);
        Ok(guid)
    }

    /// Remove an asset and its index entries.
    pub fn remove(&mut self, guid: Guid) -> Option<Asset> {
        let asset = self.assets.remove(&guid)?;
        self.by_logical.remove(&asset.logical_path);
        let source = normalize_path(&asset.source_path);
        if self.by_source.get(&source) == Some(&guid) {
            self.by_source.remove(&source);
        }
        Some(asset)
    }

    /// Remove every asset owned by `package`. Returns how many were removed.
    pub fn remove_owned_by(&mut self, package: &str) -> usize {
        let owned: Vec<Guid> = self
            .assets
            .values()
            .filter(|a| a.package == package)
            .map(|a| a.guid)
            .collect();
        for guid in &owned {
            self.remove(*guid);
        }
        owned.len()
    }

    pub fn clear(&mut self) {
        self.assets.clear();
        self.by_source.clear();
        self.by_logical.clear();
    }

    // -- Lookups --

    pub fn get(&self, guid: Guid) -> Option<&Asset> {
        self.assets.get(&guid)
    }

    pub fn contains(&self, guid: Guid) -> bool {
        self.assets.contains_key(&guid)
    }

    /// Find the file-level asset imported from `path`. The path is compared
    /// after folding `.` and `..` components.
    pub fn find_by_source_path(&self, path: &Path) -> Option<&Asset> {
        self.by_source
            .get(&normalize_path(path))
            .and_then(|guid| self.assets.get(guid))
    }

    pub fn find_by_logical_path(&self, logical_path: &str) -> Option<&Asset> {
        self.by_logical
            .get(logical_path)
            .and_then(|guid| self.assets.get(guid))
    }

    /// Texture imported from `path`, if any.
    pub fn texture_at(&self, path: &Path) -> Option<(Guid, &Texture)> {
        let asset = self.find_by_source_path(path)?;
        asset.as_texture().map(|t| (asset.guid, t))
    }

    /// Material registered at `logical_path`, if any.
    pub fn material_at(&self, logical_path: &str) -> Option<(Guid, &Material)> {
        let asset = self.find_by_logical_path(logical_path)?;
        asset.as_material().map(|m| (asset.guid, m))
    }

    /// Whether the asset exists and its backing data is present. A material
    /// library is valid only while all of its members are registered.
    pub fn is_valid(&self, guid: Guid) -> bool {
        let Some(asset) = self.assets.get(&guid) else {
            return false;
        };
        if !asset.is_loaded() {
            return false;
        }
        match asset.as_material_library() {
            Some(library) => library.materials.iter().all(|m| self.contains(*m)),
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// All assets in GUID order.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// All GUIDs in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = Guid> + '_ {
        self.assets.keys().copied()
    }

    /// All assets owned by `package`, in GUID order.
    pub fn owned_by<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a Asset> + 'a {
        self.assets.values().filter(move |a| a.package == package)
    }
}

fn is_file_level(kind: AssetKind) -> bool {
    !matches!(kind, AssetKind::Material)
}

/// Fold `.` and `..` components without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
