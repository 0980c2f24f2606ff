//! Error types for featherquery
//!
//! All errors that can surface from the SDK live in one enum so callers can
//! match on them directly. The `thiserror` crate keeps the definitions
//! concise.

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the feature store SDK
#[derive(Error, Debug)]
pub enum Error {
    /// The requested feature group (name, version) is not in the metadata
    /// snapshot.
    #[error("Feature group '{name}' with version {version} was not found in feature store '{store}'")]
    FeatureGroupNotFound {
        name: String,
        version: u32,
        store: String,
    },

    /// The requested training dataset (name, version) is not in the
    /// metadata snapshot.
    #[error("Training dataset '{name}' with version {version} was not found")]
    TrainingDatasetNotFound { name: String, version: u32 },

    /// The requested storage connector is not in the metadata snapshot.
    #[error("Storage connector '{name}' was not found, available connectors: {available:?}")]
    StorageConnectorNotFound {
        name: String,
        available: Vec<String>,
    },

    /// No feature group in the snapshot owns a feature with this name.
    #[error("Feature '{name}' was not found in any feature group")]
    FeatureNotFound { name: String },

    /// The feature name cannot be uniquely resolved. The caller must
    /// disambiguate with an explicit feature group.
    #[error("Feature name '{name}' is ambiguous, it occurs in feature groups: {groups:?}")]
    FeatureNameCollision { name: String, groups: Vec<String> },

    /// No common primary-key column exists across the participating feature
    /// groups, so a join key cannot be inferred.
    #[error("Could not infer a join key for feature groups {groups:?}, supply join_key explicitly")]
    InferJoinKey { groups: Vec<String> },

    /// Partitions were requested for an on-demand feature group. Only
    /// cached feature groups are physically partitioned.
    #[error("Feature group '{name}' with version {version} is on-demand, partitions exist only for cached feature groups")]
    OnDemandPartitions { name: String, version: u32 },

    /// An identifier violated the feature store naming constraint.
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Client configuration problem (missing or malformed settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The metadata service answered with a non-success status.
    #[error("Feature store REST call failed with HTTP status {status}: {message}")]
    Rest { status: u16, message: String },

    /// Transport-level failure talking to the metadata service.
    #[error("Transport error: {0}")]
    Transport(#[from] anyhow::Error),

    /// Malformed payload or result serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The SQL executor reported a failure.
    #[error("Query execution error: {0}")]
    Execution(String),
}

impl Error {
    /// Creates an InvalidName error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an Execution error from any executor-side error type
    pub fn execution<E: std::fmt::Display>(err: E) -> Self {
        Self::Execution(err.to_string())
    }

    /// True for errors that a metadata refresh can cure.
    ///
    /// Only the not-found family qualifies: the entity may have been
    /// registered after the cached snapshot was taken. Collisions,
    /// join-key inference failures, validation, transport and execution
    /// errors are never cured by refreshing and must propagate unchanged.
    pub fn is_stale_metadata(&self) -> bool {
        matches!(
            self,
            Error::FeatureGroupNotFound { .. }
                | Error::TrainingDatasetNotFound { .. }
                | Error::StorageConnectorNotFound { .. }
                | Error::FeatureNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FeatureGroupNotFound {
            name: "trx_summary_features".to_string(),
            version: 1,
            store: "demo_featurestore".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Feature group 'trx_summary_features' with version 1 was not found in feature store 'demo_featurestore'"
        );
    }

    #[test]
    fn test_stale_metadata_classification() {
        assert!(Error::FeatureNotFound {
            name: "max_trx".to_string()
        }
        .is_stale_metadata());
        assert!(Error::StorageConnectorNotFound {
            name: "jdbc_main".to_string(),
            available: vec![],
        }
        .is_stale_metadata());

        assert!(!Error::FeatureNameCollision {
            name: "cust_id".to_string(),
            groups: vec!["a_1".to_string(), "b_1".to_string()],
        }
        .is_stale_metadata());
        assert!(!Error::InferJoinKey { groups: vec![] }.is_stale_metadata());
        assert!(!Error::Execution("boom".to_string()).is_stale_metadata());
    }
}
