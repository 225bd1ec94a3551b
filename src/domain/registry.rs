//! Feature registry snapshot
//!
//! A [`Registry`] is an immutable, validated view of a registry document.
//! It is built once per call from raw records and handed to the resolver by
//! reference; nothing in this crate mutates it afterwards.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::feature::{Feature, FeatureRecord, FeatureStatus};
use super::id::FeatureId;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Malformed registry: {0}")]
    Malformed(String),

    #[error("Duplicate feature ID in registry: {0}")]
    DuplicateFeature(FeatureId),
}

/// On-disk shape of a registry document
///
/// Only the fields the resolver needs are read. Stored derived data such as
/// `dependency_graph` or `execution_order` is ignored and always re-derived.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub last_updated: Option<String>,

    /// `None` when the key is absent or `null`
    #[serde(default)]
    pub features: Option<Vec<FeatureRecord>>,
}

/// Completion summary across the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total_features: usize,
    pub planned: usize,
    pub in_progress: usize,
    pub testing: usize,
    pub review: usize,
    pub completed: usize,
    pub completion_percentage: u8,
}

/// Validated, read-only registry snapshot
#[derive(Debug, Clone, Default)]
pub struct Registry {
    version: Option<String>,
    project_id: Option<String>,
    last_updated: Option<DateTime<Utc>>,

    features: BTreeMap<FeatureId, Feature>,

    /// Raw IDs of records whose own ID is malformed
    rejected_ids: Vec<String>,

    /// Malformed dependency IDs, keyed by the feature that declared them
    invalid_references: BTreeMap<FeatureId, Vec<String>>,
}

impl Registry {
    /// Builds a registry from raw feature records
    ///
    /// Malformed IDs never abort construction: they are set aside and
    /// reported later. Duplicate feature IDs do abort, since the registry
    /// could not say which record is authoritative.
    pub fn from_records(
        records: impl IntoIterator<Item = FeatureRecord>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();

        for record in records {
            let id = match record.id.parse::<FeatureId>() {
                Ok(id) => id,
                Err(_) => {
                    registry.rejected_ids.push(record.id);
                    continue;
                }
            };

            let mut feature = Feature::new(id, record.status);
            feature.name = record.name;
            if let Some(percent) = record.completion_percentage {
                feature.completion_percentage = percent.clamp(0.0, 100.0).round() as u8;
            }

            for raw in record.dependencies {
                match raw.parse::<FeatureId>() {
                    Ok(dep) => {
                        feature.add_dependency(dep);
                    }
                    Err(_) => {
                        let invalid = registry.invalid_references.entry(id).or_default();
                        if !invalid.contains(&raw) {
                            invalid.push(raw);
                        }
                    }
                }
            }

            match registry.features.entry(id) {
                Entry::Occupied(_) => return Err(RegistryError::DuplicateFeature(id)),
                Entry::Vacant(slot) => {
                    slot.insert(feature);
                }
            }
        }

        Ok(registry)
    }

    /// Builds a registry from a parsed document
    pub fn from_document(document: RegistryDocument) -> Result<Self, RegistryError> {
        let records = document.features.ok_or_else(|| {
            RegistryError::Malformed("missing or null 'features' list".to_string())
        })?;

        let mut registry = Self::from_records(records)?;
        registry.version = document.version;
        registry.project_id = document.project_id;
        registry.last_updated = document.last_updated.as_deref().and_then(|raw| {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    tracing::warn!(value = raw, error = %e, "ignoring unparseable last_updated");
                    None
                }
            }
        });

        Ok(registry)
    }

    /// Parses a registry from JSON text
    ///
    /// Accepts either a full document (`{"features": [...]}`) or a bare
    /// array of feature records.
    pub fn from_json(content: &str) -> Result<Self, RegistryError> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| RegistryError::Malformed(format!("invalid JSON: {}", e)))?;

        match value {
            serde_json::Value::Null => {
                Err(RegistryError::Malformed("registry is null".to_string()))
            }
            serde_json::Value::Array(_) => {
                let records: Vec<FeatureRecord> = serde_json::from_value(value)
                    .map_err(|e| RegistryError::Malformed(e.to_string()))?;
                Self::from_records(records)
            }
            serde_json::Value::Object(_) => {
                let document: RegistryDocument = serde_json::from_value(value)
                    .map_err(|e| RegistryError::Malformed(e.to_string()))?;
                Self::from_document(document)
            }
            other => Err(RegistryError::Malformed(format!(
                "expected an object or array, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Returns a feature by ID
    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.get(id)
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.features.contains_key(id)
    }

    /// Returns the status of a feature, if known
    pub fn status_of(&self, id: &FeatureId) -> Option<FeatureStatus> {
        self.features.get(id).map(|f| f.status)
    }

    /// Iterates features in ascending ID order
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Raw IDs of records that were excluded for having a malformed ID
    pub fn rejected_ids(&self) -> &[String] {
        &self.rejected_ids
    }

    /// Malformed dependency IDs declared by `id`
    pub fn invalid_references(&self, id: &FeatureId) -> &[String] {
        self.invalid_references
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates every feature that declared malformed dependency IDs
    pub fn all_invalid_references(&self) -> impl Iterator<Item = (&FeatureId, &[String])> {
        self.invalid_references
            .iter()
            .map(|(id, refs)| (id, refs.as_slice()))
    }

    /// Summarizes feature counts per status
    ///
    /// The overall percentage is the rounded mean of each feature's own
    /// completion, so partially done work counts.
    pub fn progress(&self) -> Progress {
        let mut progress = Progress {
            total_features: self.features.len(),
            ..Progress::default()
        };

        let mut percent_sum = 0usize;
        for feature in self.features.values() {
            percent_sum += usize::from(feature.completion_percentage);
            match feature.status {
                FeatureStatus::Planned => progress.planned += 1,
                FeatureStatus::InProgress => progress.in_progress += 1,
                FeatureStatus::Testing => progress.testing += 1,
                FeatureStatus::Review => progress.review += 1,
                FeatureStatus::Completed => progress.completed += 1,
            }
        }

        if progress.total_features > 0 {
            let total = progress.total_features;
            progress.completion_percentage = ((percent_sum + total / 2) / total) as u8;
        }

        progress
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
