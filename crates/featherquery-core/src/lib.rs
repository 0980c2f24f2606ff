//! # featherquery core library
//!
//! Foundation crate for the featherquery feature store SDK. It holds the
//! metadata model (feature groups, features, training datasets, storage
//! connectors), the REST payload DTOs that snapshots are parsed from, the
//! identifier validation backing the SQL layer, and the shared error
//! taxonomy.
//!
//! Nothing in this crate performs I/O. The query planner
//! (`featherquery-planner`) consumes the model; the client crate
//! (`featherquery-client`) fetches, caches and executes.

pub use error::{Error, Result};
pub use payload::MetadataPayload;
pub use types::{
    Feature, FeatureGroup, FeatureGroupKind, FeatureStoreMetadata, FeatureValue, QueryResult,
    StorageConnector, StorageConnectorKind, TrainingDataset,
};

pub mod error;
pub mod payload;
pub mod types;
pub mod validation;

/// Commonly used imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::payload::MetadataPayload;
    pub use crate::types::{
        Feature, FeatureGroup, FeatureGroupKind, FeatureStoreMetadata, FeatureValue, QueryResult,
        StorageConnector, StorageConnectorKind, TrainingDataset,
    };
}
