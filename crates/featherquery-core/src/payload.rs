//! REST payload DTOs for the metadata endpoint
//!
//! The metadata service returns one JSON document enumerating everything
//! the SDK needs to plan queries: feature groups with their features,
//! training datasets and storage connectors. These DTOs mirror the wire
//! shape; `FeatureStoreMetadata::from_payload` turns them into the
//! validated in-memory model.
//!
//! Identifier validation happens here, not in the SQL layer: every name
//! that can end up in a synthesized query is lowercased and checked against
//! the `[a-z][a-z0-9_]*` naming constraint while the snapshot is built.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{
    Feature, FeatureGroup, FeatureGroupKind, FeatureStoreMetadata, StorageConnector,
    StorageConnectorKind, TrainingDataset,
};
use crate::validation::normalize_identifier;

/// DTO type tag for cached feature groups
pub const CACHED_FEATUREGROUP_TYPE: &str = "cachedFeaturegroupDTO";
/// DTO type tag for on-demand feature groups
pub const ON_DEMAND_FEATUREGROUP_TYPE: &str = "onDemandFeaturegroupDTO";
/// Connector type tag for JDBC connectors
pub const JDBC_CONNECTOR_TYPE: &str = "JDBC";
/// Connector type tag for distributed file system connectors
pub const FILESYSTEM_CONNECTOR_TYPE: &str = "HOPSFS";

/// Full metadata response for one feature store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPayload {
    pub featurestore_name: String,
    #[serde(default)]
    pub featuregroups: Vec<FeatureGroupPayload>,
    #[serde(default)]
    pub training_datasets: Vec<TrainingDatasetPayload>,
    #[serde(default)]
    pub storage_connectors: Vec<StorageConnectorPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureGroupPayload {
    pub name: String,
    pub version: u32,
    pub featuregroup_type: String,
    #[serde(default)]
    pub features: Vec<FeaturePayload>,
    /// Stored SQL query, present for on-demand feature groups
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePayload {
    pub name: String,
    #[serde(rename = "type")]
    pub feature_type: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub partition: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingDatasetPayload {
    pub name: String,
    pub version: u32,
    #[serde(default)]
    pub data_format: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConnectorPayload {
    pub name: String,
    pub storage_connector_type: String,
    #[serde(default)]
    pub connection_string: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
    #[serde(default)]
    pub root_path: Option<String>,
}

impl FeatureStoreMetadata {
    /// Builds a validated metadata snapshot from a server payload.
    ///
    /// The snapshot preserves payload order, which fixes the iteration
    /// order of every resolver scan.
    pub fn from_payload(payload: MetadataPayload) -> Result<Self> {
        let store_name = normalize_identifier(&payload.featurestore_name)?;

        let mut feature_groups = Vec::with_capacity(payload.featuregroups.len());
        for fg in payload.featuregroups {
            feature_groups.push(convert_feature_group(fg)?);
        }

        let mut training_datasets = Vec::with_capacity(payload.training_datasets.len());
        for td in payload.training_datasets {
            training_datasets.push(TrainingDataset {
                name: normalize_identifier(&td.name)?,
                version: td.version,
                data_format: td.data_format,
                location: td.location,
            });
        }

        let mut storage_connectors = Vec::with_capacity(payload.storage_connectors.len());
        for sc in payload.storage_connectors {
            storage_connectors.push(convert_storage_connector(sc)?);
        }

        Ok(Self {
            store_name,
            feature_groups,
            training_datasets,
            storage_connectors,
            fetched_at: Utc::now(),
        })
    }
}

fn convert_feature_group(payload: FeatureGroupPayload) -> Result<FeatureGroup> {
    let kind = match payload.featuregroup_type.as_str() {
        CACHED_FEATUREGROUP_TYPE => FeatureGroupKind::Cached,
        ON_DEMAND_FEATUREGROUP_TYPE => FeatureGroupKind::OnDemand,
        other => {
            return Err(Error::invalid_name(
                &payload.name,
                format!(
                    "unrecognized feature group type '{}', expected '{}' or '{}'",
                    other, CACHED_FEATUREGROUP_TYPE, ON_DEMAND_FEATUREGROUP_TYPE
                ),
            ))
        }
    };

    if payload.version == 0 {
        return Err(Error::invalid_name(
            &payload.name,
            "feature group version must be a positive integer",
        ));
    }

    let mut features = Vec::with_capacity(payload.features.len());
    for f in payload.features {
        features.push(Feature {
            name: normalize_identifier(&f.name)?,
            feature_type: f.feature_type,
            primary: f.primary,
            partition: f.partition,
            description: f.description,
        });
    }

    Ok(FeatureGroup {
        name: normalize_identifier(&payload.name)?,
        version: payload.version,
        kind,
        features,
        query: payload.query,
        description: payload.description,
    })
}

fn convert_storage_connector(payload: StorageConnectorPayload) -> Result<StorageConnector> {
    let kind = match payload.storage_connector_type.as_str() {
        JDBC_CONNECTOR_TYPE => StorageConnectorKind::Jdbc {
            connection_string: payload.connection_string.unwrap_or_default(),
            arguments: payload.arguments,
        },
        FILESYSTEM_CONNECTOR_TYPE => StorageConnectorKind::FileSystem {
            root_path: payload.root_path.unwrap_or_default(),
        },
        other => {
            return Err(Error::invalid_name(
                &payload.name,
                format!("unrecognized storage connector type '{}'", other),
            ))
        }
    };
    Ok(StorageConnector {
        name: payload.name,
        kind,
    })
}
