//! Import configuration.

use crate::loader::{DataLoadError, deserialize_file};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Kind of asset file, decided by extension.
///
/// Ordered so that sorting by kind imports textures before the material
/// libraries that reference them, and material libraries before meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileKind {
    Texture,
    MaterialLibrary,
    Mesh,
}

/// Where packages live and which files are imported as assets.
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Directory whose immediate subdirectories are packages.
    pub packages_dir: PathBuf,
    /// Base name of the manifest file inside each package.
    pub manifest_name: String,
    pub texture_extensions: Vec<String>,
    pub material_extensions: Vec<String>,
    pub mesh_extensions: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            packages_dir: PathBuf::from("packages"),
            manifest_name: "mod".to_string(),
            texture_extensions: ["png", "jpg", "jpeg", "bmp", "tga"]
                .map(String::from)
                .to_vec(),
            material_extensions: vec!["mtl".to_string()],
            mesh_extensions: vec!["obj".to_string()],
        }
    }
}

impl ImportConfig {
    /// Defaults with the given packages directory.
    pub fn new(packages_dir: impl Into<PathBuf>) -> Self {
        Self {
            packages_dir: packages_dir.into(),
            ..Self::default()
        }
    }

    /// Read a config file (RON, TOML or JSON, by extension).
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        deserialize_file(path)
    }

    /// Classify a file by extension, case-insensitively. `None` for files
    /// that are not assets.
    pub fn classify(&self, path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let matches = |list: &[String]| list.iter().any(|e| e.eq_ignore_ascii_case(&ext));
        if matches(&self.texture_extensions) {
            Some(FileKind::Texture)
        } else if matches(&self.material_extensions) {
            Some(FileKind::MaterialLibrary)
        } else if matches(&self.mesh_extensions) {
            Some(FileKind::Mesh)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn classify_by_extension() {
        let config = ImportConfig::default();
        assert_eq!(config.classify(Path::new("a/b.png")), Some(FileKind::Texture));
        assert_eq!(config.classify(Path::new("b.PNG")), Some(FileKind::Texture));
        assert_eq!(
            config.classify(Path::new("m.mtl")),
            Some(FileKind::MaterialLibrary)
        );
        assert_eq!(config.classify(Path::new("m.obj")), Some(FileKind::Mesh));
        assert_eq!(config.classify(Path::new("readme.txt")), None);
        assert_eq!(config.classify(Path::new("Makefile")), None);
    }

    #[test]
    fn kinds_sort_in_import_order() {
        let mut kinds = vec![FileKind::Mesh, FileKind::Texture, FileKind::MaterialLibrary];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![FileKind::Texture, FileKind::MaterialLibrary, FileKind::Mesh]
        );
    }

    #[test]
    fn new_keeps_defaults() {
        let config = ImportConfig::new("/srv/mods");
        assert_eq!(config.packages_dir, PathBuf::from("/srv/mods"));
        assert_eq!(config.manifest_name, "mod");
    }

    #[test]
    fn load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.toml");
        fs::write(
            &path,
            "packages_dir = \"content\"\nmesh_extensions = [\"obj\", \"mesh\"]\n",
        )
        .unwrap();

        let config = ImportConfig::load(&path).unwrap();
        assert_eq!(config.packages_dir, PathBuf::from("content"));
        assert_eq!(config.mesh_extensions, vec!["obj", "mesh"]);
        assert_eq!(config.manifest_name, "mod");
        assert_eq!(config.classify(Path::new("x.mesh")), Some(FileKind::Mesh));
    }

    #[test]
    fn load_ron() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.ron");
        fs::write(&path, r#"(manifest_name: "package")"#).unwrap();

        let config = ImportConfig::load(&path).unwrap();
        assert_eq!(config.manifest_name, "package");
        assert_eq!(config.packages_dir, PathBuf::from("packages"));
    }
}
