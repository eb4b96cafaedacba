//! Package construction: manifest reading and asset file discovery.

use crate::config::{FileKind, ImportConfig};
use crate::error::ImportError;
use crate::loader::{deserialize_file, require_data_file};
use crate::schema::ManifestData;
use modloader_core::Version;
use modloader_core::dependency::Dependency;
use modloader_core::error::PackageError;
use modloader_core::name::validate_name;
use modloader_core::package::Package;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

// ===========================================================================
// Construction
// ===========================================================================

/// Build a [`Package`] from the directory `dir`.
///
/// The directory name is the package name; the manifest must agree with it.
/// Asset files come from the manifest's `assets` list when present, otherwise
/// from a recursive scan of the directory (see [`scan_asset_files`]).
pub fn load_package(dir: &Path, config: &ImportConfig) -> Result<Package, ImportError> {
    let dir_name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PackageError::InvalidName(dir.display().to_string()))?;
    validate_name(dir_name)?;

    let manifest_path = require_data_file(dir, &config.manifest_name)?;
    let data: ManifestData = deserialize_file(&manifest_path)?;

    validate_name(&data.name)?;
    if data.name != dir_name {
        return Err(ImportError::NameMismatch {
            manifest: data.name,
            directory: dir_name.to_string(),
        });
    }

    let version = parse_version(&data.version, &manifest_path)?;
    let dependencies = data
        .dependencies
        .iter()
        .map(|dep| {
            let required = parse_version(&dep.version, &manifest_path)?;
            Ok(Dependency::new(dep.name.as_str(), required)?)
        })
        .collect::<Result<Vec<_>, ImportError>>()?;

    let asset_files = if data.assets.is_empty() {
        scan_asset_files(dir, config)?
    } else {
        listed_asset_files(dir, &data.assets, config)?
    };

    Ok(Package::new(data.name, version, dependencies, dir)?.with_asset_files(asset_files))
}

fn parse_version(text: &str, file: &Path) -> Result<Version, ImportError> {
    Version::parse(text.trim()).map_err(|e| ImportError::InvalidVersion {
        file: file.to_path_buf(),
        version: text.to_string(),
        detail: e.to_string(),
    })
}

// ===========================================================================
// Asset files
// ===========================================================================

/// Validate the manifest's explicit asset list. Order is kept verbatim.
///
/// `.` components are dropped, so `./a.png` and `a.png` name the same file
/// and listing both is a [`ImportError::DuplicateAsset`].
fn listed_asset_files(
    dir: &Path,
    listed: &[String],
    config: &ImportConfig,
) -> Result<Vec<PathBuf>, ImportError> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    listed
        .iter()
        .map(|entry| {
            let written = PathBuf::from(entry.replace('\\', "/"));
            let mut relative = PathBuf::new();
            for component in written.components() {
                match component {
                    Component::Normal(part) => relative.push(part),
                    Component::CurDir => {}
                    _ => return Err(ImportError::OutsidePackage(written)),
                }
            }
            if !seen.insert(relative.clone()) {
                return Err(ImportError::DuplicateAsset(relative));
            }
            if config.classify(&relative).is_none() {
                return Err(ImportError::Unrecognized(relative));
            }
            if !dir.join(&relative).is_file() {
                return Err(ImportError::MissingAsset(dir.join(&relative)));
            }
            Ok(relative)
        })
        .collect()
}

/// Every asset file under `dir`, relative to it.
///
/// Hidden entries (leading `.`) and files no asset kind claims are skipped.
/// The result is sorted by [`FileKind`] and then by path, so textures import
/// before the material libraries that reference them and libraries before
/// meshes.
pub fn scan_asset_files(dir: &Path, config: &ImportConfig) -> Result<Vec<PathBuf>, ImportError> {
    let mut found: Vec<(FileKind, String, PathBuf)> = Vec::new();
    scan_dir(dir, Path::new(""), config, &mut found)?;
    found.sort();
    Ok(found.into_iter().map(|(_, _, path)| path).collect())
}

fn scan_dir(
    root: &Path,
    relative: &Path,
    config: &ImportConfig,
    found: &mut Vec<(FileKind, String, PathBuf)>,
) -> Result<(), ImportError> {
    let current = root.join(relative);
    let entries = fs::read_dir(&current).map_err(|e| ImportError::io(&current, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ImportError::io(&current, e))?;
        let file_name = entry.file_name();
        if file_name.to_string_lossy().starts_with('.') {
            continue;
        }
        let child = relative.join(&file_name);
        let file_type = entry.file_type().map_err(|e| ImportError::io(entry.path(), e))?;

        // Symlinked directories are not followed.
        if file_type.is_dir() {
            scan_dir(root, &child, config, found)?;
        } else if entry.path().is_file() {
            match config.classify(&child) {
                Some(kind) => {
                    let key = child.to_string_lossy().replace('\\', "/");
                    found.push((kind, key, child));
                }
                None => log::trace!("skipping non-asset file {}", child.display()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DataLoadError;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn package_dir(name: &str) -> (TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(name);
        fs::create_dir(&dir).unwrap();
        (tmp, dir)
    }

    // -----------------------------------------------------------------------
    // Manifest
    // -----------------------------------------------------------------------

    #[test]
    fn loads_ron_manifest() {
        let (_tmp, dir) = package_dir("extra");
        write(
            &dir,
            "mod.ron",
            r#"(
                name: "extra",
                version: "1.2.0",
                dependencies: [(name: "core", version: "1.0.0")],
            )"#,
        );

        let package = load_package(&dir, &ImportConfig::default()).unwrap();
        assert_eq!(package.name(), "extra");
        assert_eq!(package.version(), &Version::new(1, 2, 0));
        assert_eq!(package.dependency_count(), 1);
        assert_eq!(package.dependencies()[0].name(), "core");
        assert_eq!(package.root_path(), dir.as_path());
        assert!(package.asset_files().is_empty());
    }

    #[test]
    fn loads_json_manifest() {
        let (_tmp, dir) = package_dir("core");
        write(&dir, "mod.json", r#"{"name": "core", "version": "0.3.1"}"#);

        let package = load_package(&dir, &ImportConfig::default()).unwrap();
        assert_eq!(package.version(), &Version::new(0, 3, 1));
    }

    #[test]
    fn missing_manifest() {
        let (_tmp, dir) = package_dir("core");
        let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Data(DataLoadError::MissingRequired { .. })
        ));
    }

    #[test]
    fn name_must_match_directory() {
        let (_tmp, dir) = package_dir("core");
        write(&dir, "mod.json", r#"{"name": "other", "version": "1.0.0"}"#);

        let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::NameMismatch { .. }));
    }

    #[test]
    fn invalid_manifest_name() {
        let (_tmp, dir) = package_dir("core");
        write(&dir, "mod.json", r#"{"name": "bad name", "version": "1.0.0"}"#);

        let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Package(PackageError::InvalidName(_))
        ));
    }

    #[test]
    fn invalid_directory_name() {
        let (_tmp, dir) = package_dir("bad name");
        write(&dir, "mod.json", r#"{"name": "bad name", "version": "1.0.0"}"#);

        let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Package(PackageError::InvalidName(_))
        ));
    }

    #[test]
    fn bad_version_strings() {
        let (_tmp, dir) = package_dir("core");
        write(&dir, "mod.json", r#"{"name": "core", "version": "one"}"#);
        let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidVersion { .. }));

        write(
            &dir,
            "mod.json",
            r#"{"name": "core", "version": "1.0.0",
                "dependencies": [{"name": "base", "version": "^1"}]}"#,
        );
        let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidVersion { .. }));
    }

    #[test]
    fn invalid_dependency_name() {
        let (_tmp, dir) = package_dir("core");
        write(
            &dir,
            "mod.json",
            r#"{"name": "core", "version": "1.0.0",
                "dependencies": [{"name": "../base", "version": "1.0.0"}]}"#,
        );
        let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Package(PackageError::InvalidName(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Asset files
    // -----------------------------------------------------------------------

    #[test]
    fn scan_orders_by_kind_then_path() {
        let (_tmp, dir) = package_dir("core");
        write(&dir, "mod.json", r#"{"name": "core", "version": "1.0.0"}"#);
        write(&dir, "models/ship.obj", "");
        write(&dir, "materials/ship.mtl", "");
        write(&dir, "textures/b.png", "");
        write(&dir, "a.tga", "");
        write(&dir, "notes.txt", "");
        write(&dir, ".hidden/secret.png", "");

        let package = load_package(&dir, &ImportConfig::default()).unwrap();
        let files: Vec<String> = package
            .asset_files()
            .iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            files,
            vec![
                "a.tga",
                "textures/b.png",
                "materials/ship.mtl",
                "models/ship.obj"
            ]
        );
    }

    #[test]
    fn listed_assets_keep_manifest_order() {
        let (_tmp, dir) = package_dir("core");
        write(
            &dir,
            "mod.json",
            r#"{"name": "core", "version": "1.0.0",
                "assets": ["b.mtl", "a.png"]}"#,
        );
        write(&dir, "a.png", "x");
        write(&dir, "b.mtl", "");

        let package = load_package(&dir, &ImportConfig::default()).unwrap();
        assert_eq!(
            package.asset_files(),
            &[PathBuf::from("b.mtl"), PathBuf::from("a.png")]
        );
    }

    #[test]
    fn listed_asset_must_exist() {
        let (_tmp, dir) = package_dir("core");
        write(
            &dir,
            "mod.json",
            r#"{"name": "core", "version": "1.0.0", "assets": ["gone.png"]}"#,
        );
        let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::MissingAsset(_)));
    }

    #[test]
    fn listed_asset_cannot_escape() {
        let (_tmp, dir) = package_dir("core");
        write(
            &dir,
            "mod.json",
            r#"{"name": "core", "version": "1.0.0", "assets": ["../other/a.png"]}"#,
        );
        let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::OutsidePackage(_)));
    }

    #[test]
    fn listed_asset_drops_cur_dir() {
        let (_tmp, dir) = package_dir("core");
        write(
            &dir,
            "mod.json",
            r#"{"name": "core", "version": "1.0.0", "assets": ["./textures/./a.png"]}"#,
        );
        write(&dir, "textures/a.png", "x");

        let package = load_package(&dir, &ImportConfig::default()).unwrap();
        assert_eq!(package.asset_files(), &[PathBuf::from("textures/a.png")]);
    }

    #[test]
    fn listed_asset_twice_is_rejected() {
        let (_tmp, dir) = package_dir("core");
        write(&dir, "a.png", "x");

        for assets in [r#"["a.png", "a.png"]"#, r#"["a.png", "./a.png"]"#] {
            write(
                &dir,
                "mod.json",
                &format!(r#"{{"name": "core", "version": "1.0.0", "assets": {assets}}}"#),
            );
            let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
            match err {
                ImportError::DuplicateAsset(path) => assert_eq!(path, PathBuf::from("a.png")),
                other => panic!("expected DuplicateAsset for {assets}, got {other:?}"),
            }
        }
    }

    #[test]
    fn listed_asset_must_be_recognized() {
        let (_tmp, dir) = package_dir("core");
        write(
            &dir,
            "mod.json",
            r#"{"name": "core", "version": "1.0.0", "assets": ["notes.txt"]}"#,
        );
        write(&dir, "notes.txt", "");
        let err = load_package(&dir, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::Unrecognized(_)));
    }
}
