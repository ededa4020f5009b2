//! Deterministic fingerprinting of the installed-package set.
//!
//! The fingerprint keys the result cache and detects when the dependency set
//! has changed between runs. It is a cache key, not a trust boundary:
//! collision resistance is a correctness nicety, not a security requirement.

use sha2::{Digest, Sha256};

use crate::model::PackageInventory;

/// Computes a fixed-length hex fingerprint of the inventory.
///
/// The canonical serialization is the name-sorted `name@version` pairs joined
/// by newlines, hashed with SHA-256. The same pairs always produce the same
/// fingerprint regardless of how the inventory was assembled; any change to a
/// name or version changes it with overwhelming probability.
///
/// # Example
///
/// ```
/// use advisory_check::fingerprint::fingerprint;
/// use advisory_check::model::PackageInventory;
///
/// let mut inventory = PackageInventory::new();
/// inventory.insert("serde", "1.0.219");
///
/// let hash = fingerprint(&inventory);
/// assert_eq!(hash.len(), 64);
/// ```
pub fn fingerprint(inventory: &PackageInventory) -> String {
    let mut hasher = Sha256::new();

    for (name, version) in inventory {
        hasher.update(name.as_bytes());
        hasher.update(b"@");
        hasher.update(version.as_bytes());
        hasher.update(b"\n");
    }

    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let mut inventory = PackageInventory::new();
        inventory.insert("serde", "1.0.219");
        inventory.insert("tokio", "1.44.0");

        assert_eq!(fingerprint(&inventory), fingerprint(&inventory));
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let mut first = PackageInventory::new();
        first.insert("serde", "1.0.219");
        first.insert("tokio", "1.44.0");

        let mut second = PackageInventory::new();
        second.insert("tokio", "1.44.0");
        second.insert("serde", "1.0.219");

        assert_eq!(fingerprint(&first), fingerprint(&second));
    }

    #[test]
    fn test_fingerprint_changes_with_version() {
        let mut first = PackageInventory::new();
        first.insert("serde", "1.0.219");

        let mut second = PackageInventory::new();
        second.insert("serde", "1.0.220");

        assert_ne!(fingerprint(&first), fingerprint(&second));
    }

    #[test]
    fn test_fingerprint_changes_with_package_set() {
        let mut first = PackageInventory::new();
        first.insert("serde", "1.0.219");

        let mut second = PackageInventory::new();
        second.insert("serde", "1.0.219");
        second.insert("tokio", "1.44.0");

        assert_ne!(fingerprint(&first), fingerprint(&second));
    }

    #[test]
    fn test_fingerprint_is_fixed_length_hex() {
        let empty = fingerprint(&PackageInventory::new());
        assert_eq!(empty.len(), 64);
        assert!(empty.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_name_version_boundary_is_unambiguous() {
        // "ab"@"c" must not collide with "a"@"bc"
        let mut first = PackageInventory::new();
        first.insert("ab", "c");

        let mut second = PackageInventory::new();
        second.insert("a", "bc");

        assert_ne!(fingerprint(&first), fingerprint(&second));
    }
}
