use crate::asset_registry::AssetRegistry;
use crate::error::PackageError;
use crate::package::Package;
use std::collections::HashMap;

/// The set of packages loaded in one import session, in registration order.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    packages: Vec<Package>,
    name_to_index: HashMap<String, usize>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package. Fails with `DuplicateName` if a package with the
    /// same name is already registered; the existing package is untouched.
    pub fn register(&mut self, package: Package) -> Result<(), PackageError> {
        if self.name_to_index.contains_key(package.name()) {
            return Err(PackageError::DuplicateName(package.name().to_string()));
        }
        self.name_to_index
            .insert(package.name().to_string(), self.packages.len());
        self.packages.push(package);
        Ok(())
    }

    /// Dispose of every package, removing the assets each one owns from
    /// `assets`, and clear the registry. Safe to call repeatedly.
    pub fn unload_all(&mut self, assets: &mut AssetRegistry) {
        for mut package in self.packages.drain(..) {
            let owned = package.take_assets();
            let mut removed = 0;
            for guid in owned {
                if assets.remove(guid).is_some() {
                    removed += 1;
                }
            }
            // Anything inserted for the package but not recorded on it.
            removed += assets.remove_owned_by(package.name());
            log::debug!("unloaded package `{}` ({removed} assets)", package.name());
        }
        self.name_to_index.clear();
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.name_to_index.get(name).map(|&i| &self.packages[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Package> {
        let index = *self.name_to_index.get(name)?;
        Some(&mut self.packages[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// All packages in registration order. Each call starts a fresh pass.
    pub fn all(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub(crate) fn all_mut(&mut self) -> impl Iterator<Item = &mut Package> {
        self.packages.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Number of packages currently marked valid.
    pub fn valid_count(&self) -> usize {
        self.packages.iter().filter(|p| p.is_valid()).count()
    }

    /// Number of packages currently marked invalid.
    pub fn invalid_count(&self) -> usize {
        self.packages.iter().filter(|p| p.is_invalid()).count()
    }
}
