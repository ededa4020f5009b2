use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// One published vulnerability reported by the advisory service.
///
/// All fields are pass-through data owned by the remote service; the check
/// never interprets the version-range expression itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRecord {
    pub advisory_id: String,
    #[serde(default)]
    pub package_name: String,
    pub affected_versions: String,
    pub title: String,
}

/// Advisories grouped by package name, as returned by the advisory service.
///
/// An empty collection means no known issues. Packages without advisories are
/// never present as keys. Immutable once parsed from a response; serializable
/// so it can be cached and attached to a failed [`CheckResult`] as metadata.
///
/// [`CheckResult`]: crate::model::CheckResult
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvisoryCollection {
    advisories: BTreeMap<String, Vec<AdvisoryRecord>>,
}

impl AdvisoryCollection {
    pub fn is_empty(&self) -> bool {
        self.advisories.is_empty()
    }

    /// Number of packages with at least one advisory.
    pub fn len(&self) -> usize {
        self.advisories.len()
    }

    /// Affected package names, in name order.
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.advisories.keys().map(String::as_str)
    }

    pub fn records_for(&self, package: &str) -> Option<&[AdvisoryRecord]> {
        self.advisories.get(package).map(Vec::as_slice)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<AdvisoryRecord>> {
        self.advisories.iter()
    }
}

impl FromIterator<(String, Vec<AdvisoryRecord>)> for AdvisoryCollection {
    fn from_iter<I: IntoIterator<Item = (String, Vec<AdvisoryRecord>)>>(iter: I) -> Self {
        Self {
            advisories: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_uses_camel_case_on_the_wire() {
        let json = json!({
            "advisoryId": "PKSA-dvth-xxxx-yyyy",
            "packageName": "vendor/package",
            "affectedVersions": ">=1.0,<1.2.3",
            "title": "Remote code execution"
        });

        let record: AdvisoryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.advisory_id, "PKSA-dvth-xxxx-yyyy");
        assert_eq!(record.package_name, "vendor/package");
        assert_eq!(record.affected_versions, ">=1.0,<1.2.3");
        assert_eq!(record.title, "Remote code execution");
    }

    #[test]
    fn test_record_tolerates_missing_package_name() {
        let json = json!({
            "advisoryId": "PKSA-0000",
            "affectedVersions": "<2.0",
            "title": "Issue"
        });

        let record: AdvisoryRecord = serde_json::from_value(json).unwrap();
        assert!(record.package_name.is_empty());
    }

    #[test]
    fn test_collection_round_trips_through_json() {
        let collection: AdvisoryCollection = [(
            "vendor/package".to_string(),
            vec![AdvisoryRecord {
                advisory_id: "PKSA-1234".to_string(),
                package_name: "vendor/package".to_string(),
                affected_versions: "<1.5".to_string(),
                title: "SQL injection".to_string(),
            }],
        )]
        .into_iter()
        .collect();

        let value = serde_json::to_value(&collection).unwrap();
        let back: AdvisoryCollection = serde_json::from_value(value).unwrap();
        assert_eq!(back, collection);
    }

    #[test]
    fn test_package_names_are_sorted() {
        let collection: AdvisoryCollection = [
            ("b/pkg".to_string(), Vec::new()),
            ("a/pkg".to_string(), Vec::new()),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = collection.package_names().collect();
        assert_eq!(names, vec!["a/pkg", "b/pkg"]);
    }
}
