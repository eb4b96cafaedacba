//! Batch import pipeline.
//!
//! [`Importer::import_all`] walks the packages directory and drives a
//! [`Session`] through four phases:
//!
//! 1. **Discover** -- every immediate subdirectory is a package candidate,
//!    visited in name order.
//! 2. **Construct** -- manifests are read and asset files listed. A candidate
//!    that fails is logged and skipped; its siblings are unaffected. With the
//!    `parallel` feature this phase runs on the rayon pool.
//! 3. **Resolve** -- dependencies are validated and the processing order is
//!    computed (see [`modloader_core::resolver`]).
//! 4. **Import** -- packages are visited in processing order and each asset
//!    file is parsed and registered. A file that fails is logged and recorded
//!    in the report; the rest of the package still imports.

use crate::config::{FileKind, ImportConfig};
use crate::error::ImportError;
use crate::loader::DataLoadError;
use crate::manifest::load_package;
use modloader_core::asset::{Asset, AssetData, Texture};
use modloader_core::asset_registry::AssetRegistry;
use modloader_core::error::AssetError;
use modloader_core::id::Guid;
use modloader_core::package::Package;
use modloader_core::resolver::{self, ProcessingOrder, ValidationReport};
use modloader_core::session::Session;
use modloader_formats::{SourceFile, parse_material_library, parse_mesh};
use std::fs;
use std::path::{Path, PathBuf};

// ===========================================================================
// Report
// ===========================================================================

/// A package directory that could not be turned into a registered package.
#[derive(Debug)]
pub struct ConstructionFailure {
    pub dir: PathBuf,
    pub error: ImportError,
}

/// An asset file that failed to import.
#[derive(Debug)]
pub struct AssetFailure {
    pub package: String,
    /// Path relative to the package root.
    pub file: PathBuf,
    pub error: ImportError,
}

/// Outcome of importing one package's asset files.
#[derive(Debug, Default)]
pub struct PackageImport {
    /// Assets registered, counting each material of a library separately.
    pub assets: usize,
    pub failures: Vec<AssetFailure>,
}

/// Outcome of an [`Importer::import_all`] run.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Package directories found.
    pub discovered: usize,
    /// Packages constructed and registered.
    pub constructed: usize,
    pub construction_failures: Vec<ConstructionFailure>,
    pub validation: ValidationReport,
    /// Names of registered packages excluded by resolution, in registration
    /// order.
    pub invalid: Vec<String>,
    pub order: ProcessingOrder,
    /// Packages whose asset files were processed.
    pub imported_packages: usize,
    pub assets_imported: usize,
    pub asset_failures: Vec<AssetFailure>,
}

impl ImportReport {
    /// Packages that made it through resolution and were imported.
    pub fn imported(&self) -> usize {
        self.imported_packages
    }

    /// Packages that failed construction or were excluded by resolution.
    pub fn failed(&self) -> usize {
        self.construction_failures.len() + self.invalid.len()
    }
}

// ===========================================================================
// Importer
// ===========================================================================

#[derive(Debug, Clone, Default)]
pub struct Importer {
    config: ImportConfig,
}

impl Importer {
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Package directories under the configured packages directory, sorted
    /// by name. A missing packages directory holds no packages.
    pub fn discover(&self) -> Result<Vec<PathBuf>, DataLoadError> {
        let root = &self.config.packages_dir;
        if !root.exists() {
            log::info!("packages directory {} does not exist", root.display());
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Import every package into `session`.
    ///
    /// Starts from an empty session: anything already loaded is unloaded
    /// first.
    pub fn import_all(&self, session: &mut Session) -> ImportReport {
        if !session.packages.is_empty() || !session.assets.is_empty() {
            log::debug!("unloading previous session before import");
            session.unload_all();
        }

        let mut report = ImportReport::default();

        let dirs = match self.discover() {
            Ok(dirs) => dirs,
            Err(e) => {
                log::error!(
                    "failed to list packages in {}: {e}",
                    self.config.packages_dir.display()
                );
                return report;
            }
        };
        report.discovered = dirs.len();
        log::info!("{} identified", plural(dirs.len(), "package", "packages"));

        // -- Construct --
        let constructed = self.construct_all(&dirs);
        for (dir, result) in dirs.into_iter().zip(constructed) {
            let package = match result {
                Ok(package) => package,
                Err(error) => {
                    log::error!("failed to load package at {}: {error}", dir.display());
                    report
                        .construction_failures
                        .push(ConstructionFailure { dir, error });
                    continue;
                }
            };

            let summary = format!(
                "package `{}` with {} and {}",
                package.name(),
                plural(package.dependency_count(), "dependency", "dependencies"),
                plural(package.asset_files().len(), "asset file", "asset files"),
            );
            match session.packages.register(package) {
                Ok(()) => {
                    log::info!("loaded {summary}");
                    report.constructed += 1;
                }
                Err(e) => {
                    log::error!("failed to register {summary}: {e}");
                    report.construction_failures.push(ConstructionFailure {
                        dir,
                        error: e.into(),
                    });
                }
            }
        }
        log::info!("constructed {}", plural(report.constructed, "package", "packages"));

        // -- Resolve --
        let (validation, order) = resolver::resolve(&mut session.packages);
        report.validation = validation;
        report.invalid = session
            .packages
            .all()
            .filter(|p| p.is_invalid())
            .map(|p| p.name().to_string())
            .collect();
        session.order = order.clone();
        report.order = order;

        // -- Import --
        for name in session.order.iter() {
            let Some(package) = session.packages.get_mut(name) else {
                continue;
            };
            let result = self.import_package(package, &mut session.assets);
            log::info!(
                "imported package `{name}` with {} and {}",
                plural(package.dependency_count(), "dependency", "dependencies"),
                plural(result.assets, "asset", "assets"),
            );
            report.imported_packages += 1;
            report.assets_imported += result.assets;
            report.asset_failures.extend(result.failures);
        }

        log::info!(
            "import finished: {} imported, {} failed, {} imported, {} failed",
            plural(report.imported(), "package", "packages"),
            report.failed(),
            plural(report.assets_imported, "asset", "assets"),
            report.asset_failures.len(),
        );
        report
    }

    /// Unload everything in `session` and import again from disk.
    ///
    /// Both steps happen under the one `&mut Session` borrow, so no reader
    /// can observe the half-unloaded state.
    pub fn reimport_all(&self, session: &mut Session) -> ImportReport {
        session.unload_all();
        self.import_all(session)
    }

    /// Import every asset file of `package` into `assets`, in the package's
    /// file order. Failed files are reported and skipped.
    pub fn import_package(&self, package: &mut Package, assets: &mut AssetRegistry) -> PackageImport {
        let mut result = PackageImport::default();
        let root = package.root_path().to_path_buf();
        let files = package.asset_files().to_vec();

        for relative in files {
            match self.import_file(package.name(), &root, &relative, assets) {
                Ok(guids) => {
                    result.assets += guids.len();
                    for guid in guids {
                        package.record_asset(guid);
                    }
                }
                Err(error) => {
                    log::error!(
                        "failed to import {} from package `{}`: {error}",
                        relative.display(),
                        package.name()
                    );
                    result.failures.push(AssetFailure {
                        package: package.name().to_string(),
                        file: relative,
                        error,
                    });
                }
            }
        }
        result
    }

    /// Read, parse and register one asset file. Either every asset the file
    /// produces is registered or none is.
    pub fn import_file(
        &self,
        package: &str,
        root: &Path,
        relative: &Path,
        assets: &mut AssetRegistry,
    ) -> Result<Vec<Guid>, ImportError> {
        let kind = self
            .config
            .classify(relative)
            .ok_or_else(|| ImportError::Unrecognized(relative.to_path_buf()))?;
        let file = SourceFile::new(package, root, relative);
        if assets.contains(file.guid) {
            return Err(AssetError::DuplicateGuid(file.guid).into());
        }

        let produced = match kind {
            FileKind::Texture => {
                let bytes = fs::read(&file.source_path)
                    .map_err(|e| ImportError::io(&file.source_path, e))?;
                vec![Asset::new(
                    file.guid,
                    package,
                    file.source_path.clone(),
                    file.logical_path.clone(),
                    AssetData::Texture(Texture { bytes }),
                )]
            }
            FileKind::MaterialLibrary => {
                let text = read_text(&file.source_path)?;
                parse_material_library(&text, &file, assets)
                    .map_err(|source| parse_error(&file, source))?
                    .into_assets()
            }
            FileKind::Mesh => {
                let text = read_text(&file.source_path)?;
                vec![parse_mesh(&text, &file, assets).map_err(|source| parse_error(&file, source))?]
            }
        };

        Ok(insert_all(assets, produced)?)
    }

    #[cfg(feature = "parallel")]
    fn construct_all(&self, dirs: &[PathBuf]) -> Vec<Result<Package, ImportError>> {
        use rayon::prelude::*;
        dirs.par_iter()
            .map(|dir| load_package(dir, &self.config))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn construct_all(&self, dirs: &[PathBuf]) -> Vec<Result<Package, ImportError>> {
        dirs.iter()
            .map(|dir| load_package(dir, &self.config))
            .collect()
    }
}

// ===========================================================================
// Helpers
// ===========================================================================

fn read_text(path: &Path) -> Result<String, ImportError> {
    fs::read_to_string(path).map_err(|e| ImportError::io(path, e))
}

fn parse_error(file: &SourceFile, source: modloader_formats::ParseError) -> ImportError {
    ImportError::Parse {
        file: file.source_path.clone(),
        source,
    }
}

/// Insert `produced` in order, rolling back on the first failure.
fn insert_all(assets: &mut AssetRegistry, produced: Vec<Asset>) -> Result<Vec<Guid>, AssetError> {
    let mut inserted = Vec::with_capacity(produced.len());
    for asset in produced {
        match assets.insert(asset) {
            Ok(guid) => inserted.push(guid),
            Err(e) => {
                for guid in inserted {
                    assets.remove(guid);
                }
                return Err(e);
            }
        }
    }
    Ok(inserted)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}
