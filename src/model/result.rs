use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a single check evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Failed,
}

/// The verdict a check hands back to the host framework.
///
/// Constructed fresh per run and owned by the caller. The metadata pairing is
/// an invariant the test suite checks: `Ok` results carry no metadata, while
/// `Failed` results always carry the structured advisory detail.
///
/// # Example
///
/// ```
/// use advisory_check::model::{CheckResult, Status};
///
/// let result = CheckResult::ok("No security vulnerability advisories found");
/// assert_eq!(result.status, Status::Ok);
/// assert!(!result.has_meta());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub meta: Value,
}

impl CheckResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            message: message.into(),
            meta: Value::Null,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            message: message.into(),
            meta: Value::Null,
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }

    pub fn has_meta(&self) -> bool {
        !self.meta.is_null()
    }
}

/// Capability interface the host framework's scheduler invokes.
///
/// A check is constructed once, configured, and then `run` once per
/// evaluation cycle. An `Err` from `run` is a hard failure of the check
/// itself (e.g. a malformed request the remote rejected), distinct from a
/// [`Status::Failed`] verdict.
#[async_trait]
pub trait Check: Send + Sync {
    /// Human-readable name of this check.
    fn name(&self) -> &'static str;

    async fn run(&self) -> Result<CheckResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_result_has_no_meta() {
        let result = CheckResult::ok("all clear");
        assert_eq!(result.status, Status::Ok);
        assert!(!result.has_meta());
    }

    #[test]
    fn test_failed_result_carries_meta() {
        let result =
            CheckResult::failed("advisories found").with_meta(json!({"vendor/pkg": []}));
        assert_eq!(result.status, Status::Failed);
        assert!(result.has_meta());
    }

    #[test]
    fn test_serialization_skips_null_meta() {
        let value = serde_json::to_value(CheckResult::ok("fine")).unwrap();
        assert_eq!(value, json!({"status": "ok", "message": "fine"}));
    }
}
