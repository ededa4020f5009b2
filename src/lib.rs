//! Health check reporting known security advisories for installed
//! dependencies.
//!
//! The check reads the installed package/version pairs from a dependency
//! manifest, queries a remote advisory registry for exactly that set, and
//! renders an ok/failed verdict for the host monitoring framework. Transient
//! gateway outages of the registry are retried and, when persistent, reported
//! as a non-alarming "service unreachable" ok. Successful fetches can be
//! memoized under a fingerprint of the dependency set.
//!
//! # Example
//!
//! ```no_run
//! use advisory_check::SecurityAdvisoriesCheck;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let check = SecurityAdvisoriesCheck::new()
//!         .ignore_package("internal/tool")
//!         .cache_results_for_minutes(60);
//!
//!     let result = check.run().await?;
//!     println!("{}", result.message);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod check;
pub mod client;
pub mod config;
pub mod fingerprint;
pub mod inventory;
pub mod model;
pub mod retry;

pub use cache::{CacheStore, MemoryStore};
pub use check::SecurityAdvisoriesCheck;
pub use client::{AdvisoryProvider, HttpAdvisoryClient, RemoteError};
pub use config::Config;
pub use model::{AdvisoryCollection, AdvisoryRecord, Check, CheckResult, PackageInventory, Status};
