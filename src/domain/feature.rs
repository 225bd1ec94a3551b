//! Feature domain model
//!
//! Features are the units of work in a registry. Each carries a status and
//! an ordered set of features it depends on.

use serde::{Deserialize, Serialize};

use super::id::FeatureId;

/// Lifecycle status of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureStatus {
    #[default]
    Planned,
    #[serde(alias = "in_progress")]
    InProgress,
    Testing,
    Review,
    Completed,
}

impl FeatureStatus {
    /// All statuses in lifecycle order
    pub const ALL: [FeatureStatus; 5] = [
        FeatureStatus::Planned,
        FeatureStatus::InProgress,
        FeatureStatus::Testing,
        FeatureStatus::Review,
        FeatureStatus::Completed,
    ];

    /// Returns true if this status satisfies dependents
    pub fn is_complete(&self) -> bool {
        matches!(self, FeatureStatus::Completed)
    }

    /// Completion assumed when a record does not state one
    pub fn default_completion(&self) -> u8 {
        if self.is_complete() {
            100
        } else {
            0
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureStatus::Planned => "planned",
            FeatureStatus::InProgress => "in-progress",
            FeatureStatus::Testing => "testing",
            FeatureStatus::Review => "review",
            FeatureStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feature record as it appears in a registry document, before validation
///
/// IDs are kept as raw strings here so malformed ones can be reported
/// instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub status: FeatureStatus,

    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<f64>,
}

impl FeatureRecord {
    pub fn new(id: impl Into<String>, status: FeatureStatus) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            status,
            dependencies: Vec::new(),
            completion_percentage: None,
        }
    }

    /// Builder-style helper for declaring dependencies
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn completed_percent(mut self, percent: f64) -> Self {
        self.completion_percentage = Some(percent);
        self
    }
}

/// A validated feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub id: FeatureId,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub status: FeatureStatus,

    /// Declared dependencies, duplicates removed, declaration order kept
    pub dependencies: Vec<FeatureId>,

    /// Progress within the feature, 0-100
    pub completion_percentage: u8,
}

impl Feature {
    pub fn new(id: FeatureId, status: FeatureStatus) -> Self {
        Self {
            id,
            name: String::new(),
            status,
            dependencies: Vec::new(),
            completion_percentage: status.default_completion(),
        }
    }

    /// Adds a dependency; returns false if it was already declared
    pub fn add_dependency(&mut self, dep: FeatureId) -> bool {
        if self.dependencies.contains(&dep) {
            false
        } else {
            self.dependencies.push(dep);
            true
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    pub fn depends_on(&self, id: &FeatureId) -> bool {
        self.dependencies.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&FeatureStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");

        let parsed: FeatureStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(parsed, FeatureStatus::InProgress);

        let parsed: FeatureStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, FeatureStatus::Completed);
    }

    #[test]
    fn only_completed_is_complete() {
        for status in FeatureStatus::ALL {
            assert_eq!(status.is_complete(), status == FeatureStatus::Completed);
        }
    }

    #[test]
    fn record_defaults() {
        let record: FeatureRecord = serde_json::from_str(r#"{"id": "FR-001"}"#).unwrap();
        assert_eq!(record.status, FeatureStatus::Planned);
        assert!(record.dependencies.is_empty());
        assert!(record.name.is_empty());
    }

    #[test]
    fn completion_defaults_follow_status() {
        let done = Feature::new(FeatureId::new(1).unwrap(), FeatureStatus::Completed);
        let started = Feature::new(FeatureId::new(2).unwrap(), FeatureStatus::InProgress);
        assert_eq!(done.completion_percentage, 100);
        assert_eq!(started.completion_percentage, 0);

        let record: FeatureRecord = serde_json::from_str(
            r#"{"id": "FR-003", "status": "in-progress", "completion_percentage": 50}"#,
        )
        .unwrap();
        assert_eq!(record.completion_percentage, Some(50.0));
    }

    #[test]
    fn record_rejects_null_dependencies() {
        let result: Result<FeatureRecord, _> =
            serde_json::from_str(r#"{"id": "FR-001", "dependencies": null}"#);
        assert!(result.is_err());
    }

    #[test]
    fn add_dependency_ignores_duplicates() {
        let mut feature = Feature::new(FeatureId::new(3).unwrap(), FeatureStatus::Planned);
        let dep = FeatureId::new(1).unwrap();

        assert!(feature.add_dependency(dep));
        assert!(!feature.add_dependency(dep));
        assert_eq!(feature.dependencies, vec![dep]);
        assert!(feature.depends_on(&dep));
    }
}
