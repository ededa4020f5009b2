//! The security-advisories check itself.
//!
//! [`SecurityAdvisoriesCheck`] composes the inventory source, fingerprint,
//! retry-wrapped advisory client, and result cache into a single `run()` the
//! host framework invokes per evaluation cycle.
//!
//! # Example
//!
//! ```no_run
//! use advisory_check::check::SecurityAdvisoriesCheck;
//! use advisory_check::model::Status;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let check = SecurityAdvisoriesCheck::new()
//!         .ignore_package("internal/tool")
//!         .retry_times(5)
//!         .cache_results_for_minutes(60);
//!
//!     let result = check.run().await?;
//!     if result.status == Status::Failed {
//!         eprintln!("{}", result.message);
//!     }
//!     Ok(())
//! }
//! ```

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::{CacheStore, ResultCache};
use crate::client::{AdvisoryProvider, HttpAdvisoryClient};
use crate::config::Config;
use crate::fingerprint::fingerprint;
use crate::inventory::{CargoLockSource, PackageSource};
use crate::model::{AdvisoryCollection, Check, CheckResult, PackageInventory};
use crate::retry::{RetryError, RetryPolicy};

/// Prefix of every cache key; the fingerprint follows.
const CACHE_KEY_PREFIX: &str = "security-advisories:";

const MSG_NO_ADVISORIES: &str = "No security vulnerability advisories found";
const MSG_UNREACHABLE: &str = "Advisory service could not be reached";

type StoreProvider = Box<dyn Fn() -> Option<Arc<dyn CacheStore>> + Send + Sync>;

/// Health check reporting known security advisories for installed packages.
///
/// Configured with builder methods before the first run; the configuration is
/// immutable during a run. Each `run()` collects the inventory fresh,
/// fingerprints it, consults the cache when enabled, and otherwise fetches
/// advisories through the retry controller.
pub struct SecurityAdvisoriesCheck {
    source: Arc<dyn PackageSource>,
    provider: Arc<dyn AdvisoryProvider>,
    ignored: HashSet<String>,
    retry: RetryPolicy,
    cache_ttl: Duration,
    store_provider: Option<StoreProvider>,
    // The backing store is resolved on the first run, not at construction,
    // so the check can be built before the host's cache backend exists.
    resolved_store: OnceLock<Option<Arc<dyn CacheStore>>>,
}

impl SecurityAdvisoriesCheck {
    /// Creates a check with the default Cargo.lock source and HTTP client,
    /// five retry attempts, and caching disabled.
    pub fn new() -> Self {
        Self {
            source: Arc::new(CargoLockSource::discover()),
            provider: Arc::new(HttpAdvisoryClient::new()),
            ignored: HashSet::new(),
            retry: RetryPolicy::default(),
            cache_ttl: Duration::ZERO,
            store_provider: None,
            resolved_store: OnceLock::new(),
        }
    }

    /// Creates a check configured from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .ignored_packages(config.ignore_packages.iter().cloned())
            .retry_times(config.retry_times)
            .cache_results_for_minutes(config.cache_ttl_minutes)
    }

    /// Replaces the inventory source.
    pub fn with_source(mut self, source: impl PackageSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    /// Replaces the advisory provider.
    pub fn with_provider(mut self, provider: impl AdvisoryProvider + 'static) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    /// Excludes a package from the reported inventory. Repeatable.
    pub fn ignore_package(mut self, name: impl Into<String>) -> Self {
        self.ignored.insert(name.into());
        self
    }

    /// Excludes several packages at once.
    pub fn ignored_packages<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the total number of fetch attempts per run.
    pub fn retry_times(mut self, times: u32) -> Self {
        self.retry = RetryPolicy::new(times).with_delay(self.retry.delay());
        self
    }

    /// Sets the pause between fetch attempts.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry = self.retry.with_delay(delay);
        self
    }

    /// Caches successful fetch results for the given number of minutes.
    ///
    /// Zero (the default) disables caching. Caching also requires a store,
    /// supplied via [`with_cache_store`](Self::with_cache_store) or
    /// [`with_cache_store_provider`](Self::with_cache_store_provider).
    pub fn cache_results_for_minutes(mut self, minutes: u64) -> Self {
        self.cache_ttl = Duration::from_secs(minutes * 60);
        self
    }

    /// Supplies the cache backing store directly.
    pub fn with_cache_store(self, store: Arc<dyn CacheStore>) -> Self {
        self.with_cache_store_provider(move || Some(store.clone()))
    }

    /// Supplies a provider that resolves the backing store on the first run.
    ///
    /// A provider returning `None` leaves caching disabled; it is never an
    /// error.
    pub fn with_cache_store_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Option<Arc<dyn CacheStore>> + Send + Sync + 'static,
    {
        self.store_provider = Some(Box::new(provider));
        self
    }

    /// Runs the check once and renders a verdict.
    ///
    /// An `Err` means the advisory service rejected the request with a
    /// non-gateway error even after retrying — a hard failure of the check
    /// run, not a vulnerability verdict. A fully transient outage degrades to
    /// an `Ok` verdict instead.
    pub async fn run(&self) -> Result<CheckResult> {
        let inventory = self.collect_inventory().await;
        let key = format!("{CACHE_KEY_PREFIX}{}", fingerprint(&inventory));
        let cache = ResultCache::new(self.store(), self.cache_ttl);

        let outcome = cache
            .get_or_compute(&key, || self.fetch_with_retry(&inventory))
            .await;

        match outcome {
            Ok(advisories) if advisories.is_empty() => Ok(CheckResult::ok(MSG_NO_ADVISORIES)),
            Ok(advisories) => {
                let names = join_quoted(advisories.package_names());
                let meta = serde_json::to_value(&advisories)?;
                Ok(CheckResult::failed(format!("Security advisories found for {names}"))
                    .with_meta(meta))
            }
            Err(RetryError::AllTransient { attempts }) => {
                debug!(attempts, "advisory service unreachable, reporting ok");
                Ok(CheckResult::ok(MSG_UNREACHABLE))
            }
            Err(RetryError::Terminal(err)) => Err(err.into()),
        }
    }

    async fn collect_inventory(&self) -> PackageInventory {
        match self.source.installed().await {
            Ok(raw) => PackageInventory::from_installed(raw, &self.ignored),
            Err(err) => {
                // No resolvable package list is not a failure of the check;
                // it reads as a clean, empty inventory.
                warn!(source = self.source.name(), error = %err, "could not read installed packages");
                PackageInventory::new()
            }
        }
    }

    async fn fetch_with_retry(
        &self,
        inventory: &PackageInventory,
    ) -> Result<AdvisoryCollection, RetryError> {
        self.retry.run(|| self.provider.fetch(inventory)).await
    }

    fn store(&self) -> Option<Arc<dyn CacheStore>> {
        self.resolved_store
            .get_or_init(|| self.store_provider.as_ref().and_then(|provider| provider()))
            .clone()
    }
}

impl Default for SecurityAdvisoriesCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Check for SecurityAdvisoriesCheck {
    fn name(&self) -> &'static str {
        "security-advisories"
    }

    async fn run(&self) -> Result<CheckResult> {
        SecurityAdvisoriesCheck::run(self).await
    }
}

/// Joins package names as `` `a`, `b` and `c` ``.
fn join_quoted<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = names.map(|name| format!("`{name}`")).collect();

    match quoted.split_last() {
        None => String::new(),
        Some((only, [])) => only.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
    }
}
