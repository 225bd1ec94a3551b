//! Domain models for featplan
//!
//! Contains the feature and registry types without any I/O concerns.

mod id;
mod feature;
mod registry;

pub use id::{FeatureId, IdError, FEATURE_ID_DIGITS, FEATURE_ID_PREFIX};
pub use feature::{Feature, FeatureRecord, FeatureStatus};
pub use registry::{Progress, Registry, RegistryDocument, RegistryError};
