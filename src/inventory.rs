//! Reading the installed-package inventory from the dependency manifest.
//!
//! The manifest mechanism is a collaborator behind the [`PackageSource`]
//! trait: anything able to report installed name/version pairs can feed the
//! check. [`CargoLockSource`] is the default and reads the resolved package
//! list from a `Cargo.lock`; [`StaticSource`] serves hosts and tests that
//! already hold the mapping.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::model::InstalledPackage;

/// Source of raw installed-package entries.
///
/// Implementations only enumerate; filtering (ignore set, unresolved
/// versions) happens when the inventory is built. Reading an environment with
/// no packages at all is not an error: return an empty list.
#[async_trait]
pub trait PackageSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &'static str;

    /// Enumerates all installed packages, resolved or not.
    async fn installed(&self) -> Result<Vec<InstalledPackage>>;
}

#[derive(Deserialize)]
struct Lockfile {
    #[serde(default)]
    package: Vec<LockedPackage>,
}

#[derive(Deserialize)]
struct LockedPackage {
    name: String,
    version: Option<String>,
}

/// Reads the resolved dependency set from a `Cargo.lock` file.
///
/// # Example
///
/// ```no_run
/// use advisory_check::inventory::{CargoLockSource, PackageSource};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let source = CargoLockSource::discover();
///     let packages = source.installed().await?;
///     println!("{} locked packages", packages.len());
///     Ok(())
/// }
/// ```
pub struct CargoLockSource {
    path: PathBuf,
}

impl CargoLockSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locates `Cargo.lock` by walking up from the current directory.
    ///
    /// Falls back to `./Cargo.lock` when no ancestor carries one; the read
    /// then reports an empty inventory rather than failing the check.
    pub fn discover() -> Self {
        let start = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::discover_from(&start)
    }

    pub fn discover_from(start: &Path) -> Self {
        for dir in start.ancestors() {
            let candidate = dir.join("Cargo.lock");
            if candidate.exists() {
                return Self::new(candidate);
            }
        }
        Self::new(start.join("Cargo.lock"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PackageSource for CargoLockSource {
    fn name(&self) -> &'static str {
        "Cargo.lock"
    }

    async fn installed(&self) -> Result<Vec<InstalledPackage>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        let lockfile: Lockfile = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;

        Ok(lockfile
            .package
            .into_iter()
            .map(|pkg| InstalledPackage {
                name: pkg.name,
                version: pkg.version,
            })
            .collect())
    }
}

/// A fixed list of packages, handed over at construction.
///
/// Useful when the host framework already introspected the environment, and
/// in tests.
#[derive(Default)]
pub struct StaticSource {
    packages: Vec<InstalledPackage>,
}

impl StaticSource {
    pub fn new(packages: Vec<InstalledPackage>) -> Self {
        Self { packages }
    }
}

#[async_trait]
impl PackageSource for StaticSource {
    fn name(&self) -> &'static str {
        "static package list"
    }

    async fn installed(&self) -> Result<Vec<InstalledPackage>> {
        Ok(self.packages.clone())
    }
}
