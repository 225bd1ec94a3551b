//! Output formatting for CLI commands

use serde::Serialize;

use crate::domain::{FeatureId, Registry};
use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        let rendered = match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        };
        match rendered {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("failed to serialize output: {}", e),
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// Prints one `ID  STATUS  NAME` line per feature
pub(crate) fn print_features(registry: &Registry, ids: &[FeatureId]) {
    println!("{:<10} {:<14} NAME", "ID", "STATUS");
    println!("{}", "-".repeat(60));
    for id in ids {
        let id_str = id.to_string();
        match registry.get(id) {
            Some(feature) => println!(
                "{:<10} {:<14} {}",
                id_str,
                feature.status.as_str(),
                feature.name
            ),
            None => println!("{:<10} (missing)", id_str),
        }
    }
}

pub(crate) fn join_ids(ids: &[FeatureId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
