use crate::loader::DataLoadError;
use modloader_core::error::{AssetError, PackageError};
use modloader_formats::ParseError;
use std::path::PathBuf;

/// Errors raised while constructing a package from disk or importing one of
/// its asset files.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Data(#[from] DataLoadError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error("invalid version '{version}' in {file}: {detail}")]
    InvalidVersion {
        file: PathBuf,
        version: String,
        detail: String,
    },

    /// The manifest names a different package than its directory.
    #[error("manifest declares '{manifest}' but the package directory is '{directory}'")]
    NameMismatch { manifest: String, directory: String },

    /// A listed asset file does not exist.
    #[error("asset file {0} does not exist")]
    MissingAsset(PathBuf),

    /// A listed asset path is absolute or climbs out of the package root.
    #[error("asset path {0} is outside the package")]
    OutsidePackage(PathBuf),

    /// The same asset file is listed more than once.
    #[error("asset file {0} is listed more than once")]
    DuplicateAsset(PathBuf),

    /// The file extension is not configured for any asset kind.
    #[error("unrecognized asset file {0}")]
    Unrecognized(PathBuf),

    #[error("{file}: {source}")]
    Parse {
        file: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("failed to read {file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImportError {
    pub(crate) fn io(file: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImportError::Io {
            file: file.into(),
            source,
        }
    }
}
