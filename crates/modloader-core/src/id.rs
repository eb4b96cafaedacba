use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies an asset within one import session. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Guid(pub u64);

impl Guid {
    /// Stable identifier for a source file, derived from the owning package
    /// and the file's path relative to the package root.
    ///
    /// The same (package, path) pair yields the same GUID on every run, which
    /// keeps reimports over an unchanged directory tree identical.
    pub fn for_file(package: &str, relative_path: &str) -> Self {
        let mut hasher = GuidHasher::new();
        hasher.write(package.as_bytes());
        // Separator so ("ab", "c") and ("a", "bc") differ.
        hasher.write(&[0]);
        hasher.write(relative_path.replace('\\', "/").as_bytes());
        Guid(hasher.finish())
    }

    /// Identifier for the `ordinal`-th asset produced from the file `base`.
    ///
    /// Pure function of its inputs: no global counter is involved, so files
    /// can be parsed independently of each other.
    pub fn derived(base: Guid, ordinal: u32) -> Self {
        let mut hasher = GuidHasher::new();
        hasher.write_u64(base.0);
        hasher.write_u32(ordinal);
        Guid(hasher.finish())
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// GUID hashing
// ---------------------------------------------------------------------------

/// Deterministic 64-bit hasher used to derive GUIDs.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidHasher(u64);

impl GuidHasher {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    /// Start a new hash.
    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    /// Feed bytes into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    /// Feed a u64 into the hash.
    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    /// Feed a u32 into the hash.
    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    /// Finalize and return the hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for GuidHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_guid_is_stable() {
        let a = Guid::for_file("core", "materials/stone.mtl");
        let b = Guid::for_file("core", "materials/stone.mtl");
        assert_eq!(a, b);
    }

    #[test]
    fn file_guid_ignores_separator_style() {
        let a = Guid::for_file("core", "materials/stone.mtl");
        let b = Guid::for_file("core", "materials\\stone.mtl");
        assert_eq!(a, b);
    }

    #[test]
    fn file_guid_depends_on_package() {
        let a = Guid::for_file("core", "stone.mtl");
        let b = Guid::for_file("extra", "stone.mtl");
        assert_ne!(a, b);
    }

    #[test]
    fn file_guid_boundary_is_unambiguous() {
        assert_ne!(Guid::for_file("ab", "c"), Guid::for_file("a", "bc"));
    }

    #[test]
    fn derived_guids_differ_by_ordinal() {
        let base = Guid::for_file("core", "stone.mtl");
        let first = Guid::derived(base, 0);
        let second = Guid::derived(base, 1);
        assert_ne!(first, second);
        assert_ne!(first, base);
        assert_eq!(first, Guid::derived(base, 0));
    }

    #[test]
    fn guid_display_is_fixed_width_hex() {
        assert_eq!(Guid(0xab).to_string(), "00000000000000ab");
    }

    #[test]
    fn hasher_order_matters() {
        let mut h1 = GuidHasher::new();
        h1.write_u32(1);
        h1.write_u32(2);

        let mut h2 = GuidHasher::new();
        h2.write_u32(2);
        h2.write_u32(1);

        assert_ne!(h1.finish(), h2.finish());
    }
}
