use crate::dependency::Dependency;
use crate::error::PackageError;
use crate::id::Guid;
use crate::name::validate_name;
use semver::Version;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Validity
// ---------------------------------------------------------------------------

/// Why a dependency could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No package with the dependency's name is loaded.
    Missing,
    /// A package with the name is loaded but its version is incompatible.
    VersionMismatch { installed: Version },
    /// The dependency is loaded but was itself excluded from processing.
    DependencyInvalid,
}

/// A problem that excludes a package from processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageFault {
    UnresolvedDependency {
        dependency: Dependency,
        reason: UnresolvedReason,
    },
    CyclicDependency,
}

impl PackageFault {
    /// The error describing this fault for the package named `package`.
    pub fn to_error(&self, package: &str) -> PackageError {
        match self {
            PackageFault::UnresolvedDependency { dependency, .. } => {
                PackageError::UnresolvedDependency {
                    package: package.to_string(),
                    dependency: dependency.name().to_string(),
                    required: dependency.version().clone(),
                }
            }
            PackageFault::CyclicDependency => PackageError::CyclicDependency(package.to_string()),
        }
    }
}

impl fmt::Display for PackageFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageFault::UnresolvedDependency { dependency, reason } => match reason {
                UnresolvedReason::Missing => write!(f, "missing dependency `{dependency}`"),
                UnresolvedReason::VersionMismatch { installed } => write!(
                    f,
                    "dependency `{dependency}` not satisfied by installed version {installed}"
                ),
                UnresolvedReason::DependencyInvalid => {
                    write!(f, "dependency `{dependency}` is invalid")
                }
            },
            PackageFault::CyclicDependency => write!(f, "part of a dependency cycle"),
        }
    }
}

/// Lifecycle state of a package within an import session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PackageState {
    /// Constructed and registered; dependencies not yet checked.
    #[default]
    Loaded,
    /// Dependencies resolved; eligible for processing.
    Valid,
    /// Excluded from processing. The package stays loaded so the faults can
    /// be inspected.
    Invalid(Vec<PackageFault>),
}

// ---------------------------------------------------------------------------
// Package
// ---------------------------------------------------------------------------

/// A self-contained unit of content with a name, version, and dependencies.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    version: Version,
    dependencies: Vec<Dependency>,
    root_path: PathBuf,
    /// Asset files relative to `root_path`, in import order.
    asset_files: Vec<PathBuf>,
    /// GUIDs of the assets this package produced. The asset registry holds
    /// the data; the package is their owner.
    assets: Vec<Guid>,
    state: PackageState,
}

impl Package {
    /// Create a package. Fails with `InvalidName` if `name` is rejected.
    pub fn new(
        name: impl Into<String>,
        version: Version,
        dependencies: Vec<Dependency>,
        root_path: impl Into<PathBuf>,
    ) -> Result<Self, PackageError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            version,
            dependencies,
            root_path: root_path.into(),
            asset_files: Vec::new(),
            assets: Vec::new(),
            state: PackageState::Loaded,
        })
    }

    /// Set the asset files to import, relative to the package root.
    pub fn with_asset_files(mut self, files: Vec<PathBuf>) -> Self {
        self.asset_files = files;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn asset_files(&self) -> &[PathBuf] {
        &self.asset_files
    }

    /// GUIDs of the assets imported for this package.
    pub fn assets(&self) -> &[Guid] {
        &self.assets
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Number of imported assets. Before import this is zero; see
    /// [`Package::asset_files`] for the files awaiting import.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn state(&self) -> &PackageState {
        &self.state
    }

    pub fn is_valid(&self) -> bool {
        self.state == PackageState::Valid
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.state, PackageState::Invalid(_))
    }

    /// Faults recorded against this package. Empty unless invalid.
    pub fn faults(&self) -> &[PackageFault] {
        match &self.state {
            PackageState::Invalid(faults) => faults,
            _ => &[],
        }
    }

    // -- State transitions (driven by the resolver and importer) --

    /// Record a fault, moving the package to `Invalid`.
    pub fn add_fault(&mut self, fault: PackageFault) {
        match &mut self.state {
            PackageState::Invalid(faults) => {
                if !faults.contains(&fault) {
                    faults.push(fault);
                }
            }
            state => *state = PackageState::Invalid(vec![fault]),
        }
    }

    /// Mark the package valid if no fault has been recorded.
    pub fn mark_valid(&mut self) {
        if !self.is_invalid() {
            self.state = PackageState::Valid;
        }
    }

    /// Forget all resolution results.
    pub fn reset_state(&mut self) {
        self.state = PackageState::Loaded;
    }

    /// Record an asset produced for this package.
    pub fn record_asset(&mut self, guid: Guid) {
        self.assets.push(guid);
    }

    /// Release ownership of all assets, returning their GUIDs.
    pub fn take_assets(&mut self) -> Vec<Guid> {
        std::mem::take(&mut self.assets)
    }
}
