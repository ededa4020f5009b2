//! Core data types for inventories, advisories, and check results.
//!
//! This module contains the fundamental types used throughout advisory-check:
//!
//! - [`PackageInventory`] - Installed package name → version mapping
//! - [`InstalledPackage`] - A raw manifest entry, version possibly unresolved
//! - [`AdvisoryRecord`] / [`AdvisoryCollection`] - Vulnerability data from the
//!   remote advisory service
//! - [`CheckResult`] / [`Status`] - The verdict handed to the host framework
//! - [`Check`] - The capability interface the host scheduler invokes
//!
//! # Example
//!
//! ```
//! use advisory_check::model::{CheckResult, PackageInventory, Status};
//!
//! let mut inventory = PackageInventory::new();
//! inventory.insert("serde", "1.0.219");
//!
//! let verdict = CheckResult::ok("No security vulnerability advisories found");
//! assert_eq!(verdict.status, Status::Ok);
//! ```

mod advisory;
mod package;
mod result;

pub use advisory::*;
pub use package::*;
pub use result::*;
