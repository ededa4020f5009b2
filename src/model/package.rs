use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::{BTreeMap, HashSet};

/// A single entry from the dependency manifest, before filtering.
///
/// The manifest collaborator may report entries without a resolved version
/// (e.g. path dependencies or workspace members); those are dropped when the
/// inventory is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: Option<String>,
}

impl InstalledPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// An entry whose version could not be resolved.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }
}

/// The set of installed packages the check reports on: package name mapped to
/// its installed version.
///
/// Backed by a [`BTreeMap`] so iteration is always name-sorted, which gives
/// the fingerprint its canonical order for free. Insertion order never
/// matters; two inventories with the same pairs compare equal.
///
/// # Example
///
/// ```
/// use advisory_check::model::{InstalledPackage, PackageInventory};
/// use std::collections::HashSet;
///
/// let raw = vec![
///     InstalledPackage::new("serde", "1.0.219"),
///     InstalledPackage::unresolved("my-workspace-member"),
/// ];
/// let inventory = PackageInventory::from_installed(raw, &HashSet::new());
///
/// assert_eq!(inventory.len(), 1);
/// assert_eq!(inventory.version_of("serde"), Some("1.0.219"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageInventory {
    packages: BTreeMap<String, String>,
}

impl PackageInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an inventory from raw manifest entries.
    ///
    /// Entries without a resolvable version and entries whose name appears in
    /// `ignore` are filtered out. An empty input yields an empty inventory,
    /// never an error.
    pub fn from_installed(raw: Vec<InstalledPackage>, ignore: &HashSet<String>) -> Self {
        let packages = raw
            .into_iter()
            .filter(|pkg| !ignore.contains(&pkg.name))
            .filter_map(|pkg| Some((pkg.name, pkg.version?)))
            .collect();

        Self { packages }
    }

    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.packages.insert(name.into(), version.into());
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.packages.get(name).map(String::as_str)
    }

    /// Iterates over `(name, version)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.packages.iter()
    }
}

impl<'a> IntoIterator for &'a PackageInventory {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(String, String)> for PackageInventory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            packages: iter.into_iter().collect(),
        }
    }
}
