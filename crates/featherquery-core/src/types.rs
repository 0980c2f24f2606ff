//! Core data types for featherquery
//!
//! The metadata model is a read-only snapshot of what the feature store
//! service knows: feature groups and their features, training datasets and
//! storage connectors. A snapshot is built once from a server payload,
//! cached, and replaced wholesale on refresh; nothing in here mutates
//! incrementally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single named column within a feature group.
///
/// A feature is exclusively owned by its feature group. Two feature groups
/// may each own a feature literally named `cust_id`; those are distinct
/// entities that happen to share a join key name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feature {
    /// Feature name, unique within the owning feature group
    pub name: String,

    /// Source-system type tag (e.g. "int", "bigint", "string")
    pub feature_type: String,

    /// Whether this feature is part of the feature group's key.
    /// Primary features drive join-key inference.
    pub primary: bool,

    /// Whether this feature is a partition column
    pub partition: bool,

    /// Optional free-text description
    pub description: Option<String>,
}

impl Feature {
    /// Creates a feature with the given flags (convenience for tests and
    /// programmatic snapshot construction)
    pub fn new(name: impl Into<String>, feature_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            feature_type: feature_type.into(),
            primary: false,
            partition: false,
            description: None,
        }
    }

    /// Marks the feature as part of the feature group's primary key
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Marks the feature as a partition column
    pub fn partition(mut self) -> Self {
        self.partition = true;
        self
    }
}

/// Kind of a feature group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FeatureGroupKind {
    /// Physically materialized, backed by a managed table
    Cached,

    /// A virtual view defined by a stored SQL query against an external
    /// JDBC source. Has no physical partitions.
    OnDemand,
}

/// A named, versioned collection of features.
///
/// The pair `(name, version)` is the unique key; the physical table name is
/// `name_version`. Immutable value object, superseded wholesale on metadata
/// refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub name: String,
    pub version: u32,
    pub kind: FeatureGroupKind,

    /// Ordered sequence of features owned by this group
    pub features: Vec<Feature>,

    /// For on-demand groups: the stored SQL query defining the view
    pub query: Option<String>,

    pub description: Option<String>,
}

impl FeatureGroup {
    pub fn new(name: impl Into<String>, version: u32, kind: FeatureGroupKind) -> Self {
        Self {
            name: name.into(),
            version,
            kind,
            features: Vec::new(),
            query: None,
            description: None,
        }
    }

    /// Adds a feature (builder pattern)
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    /// Physical table name of this feature group: `name_version`
    pub fn table_name(&self) -> String {
        format!("{}_{}", self.name, self.version)
    }

    /// Looks up an owned feature by name
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    /// True if this group owns a feature with the given name
    pub fn has_feature(&self, name: &str) -> bool {
        self.feature(name).is_some()
    }

    /// Names of the primary-key features, in feature order
    pub fn primary_key_names(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.primary)
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// A materialized, versioned join/projection of features for model
/// training. Consumed only as a metadata entity; creation and reading of
/// training datasets happen server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingDataset {
    pub name: String,
    pub version: u32,
    pub data_format: Option<String>,
    pub location: Option<String>,
}

/// Kind-specific storage connector attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageConnectorKind {
    /// JDBC connector (backs on-demand feature groups)
    Jdbc {
        connection_string: String,
        arguments: Option<String>,
    },

    /// Distributed file system connector
    FileSystem { root_path: String },
}

/// A named storage connector descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConnector {
    pub name: String,
    pub kind: StorageConnectorKind,
}

/// A full metadata snapshot of one feature store.
///
/// Feature groups are held in payload order; resolver scans are therefore
/// deterministic for a fixed snapshot. The snapshot carries its fetch time
/// so callers can reason about staleness, but nothing in the SDK expires it
/// automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStoreMetadata {
    pub store_name: String,
    pub feature_groups: Vec<FeatureGroup>,
    pub training_datasets: Vec<TrainingDataset>,
    pub storage_connectors: Vec<StorageConnector>,
    pub fetched_at: DateTime<Utc>,
}

impl FeatureStoreMetadata {
    /// Creates an empty snapshot (programmatic construction, tests)
    pub fn new(store_name: impl Into<String>) -> Self {
        Self {
            store_name: store_name.into(),
            feature_groups: Vec::new(),
            training_datasets: Vec::new(),
            storage_connectors: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Adds a feature group (builder pattern)
    pub fn with_group(mut self, group: FeatureGroup) -> Self {
        self.feature_groups.push(group);
        self
    }

    /// Looks up a feature group by (name, version)
    pub fn find_group(&self, name: &str, version: u32) -> Option<&FeatureGroup> {
        self.feature_groups
            .iter()
            .find(|fg| fg.name == name && fg.version == version)
    }

    /// Looks up a feature group by its physical table name (`name_version`)
    pub fn group_by_table_name(&self, table_name: &str) -> Option<&FeatureGroup> {
        self.feature_groups
            .iter()
            .find(|fg| fg.table_name() == table_name)
    }

    /// Latest registered version of a feature group, 0 when absent
    pub fn latest_group_version(&self, name: &str) -> u32 {
        self.feature_groups
            .iter()
            .filter(|fg| fg.name == name)
            .map(|fg| fg.version)
            .max()
            .unwrap_or(0)
    }

    /// Looks up a training dataset by (name, version)
    pub fn find_training_dataset(&self, name: &str, version: u32) -> Option<&TrainingDataset> {
        self.training_datasets
            .iter()
            .find(|td| td.name == name && td.version == version)
    }

    /// Latest registered version of a training dataset, 0 when absent
    pub fn latest_training_dataset_version(&self, name: &str) -> u32 {
        self.training_datasets
            .iter()
            .filter(|td| td.name == name)
            .map(|td| td.version)
            .max()
            .unwrap_or(0)
    }

    /// Looks up a storage connector by name
    pub fn storage_connector(&self, name: &str) -> Option<&StorageConnector> {
        self.storage_connectors.iter().find(|sc| sc.name == name)
    }

    /// Physical table names of all feature groups, in snapshot order
    pub fn group_table_names(&self) -> Vec<String> {
        self.feature_groups
            .iter()
            .map(|fg| fg.table_name())
            .collect()
    }

    /// Names of all features across all feature groups, in snapshot order
    pub fn feature_names(&self) -> Vec<&str> {
        self.feature_groups
            .iter()
            .flat_map(|fg| fg.features.iter().map(|f| f.name.as_str()))
            .collect()
    }
}

/// A single cell value in a query result.
///
/// Uses `#[serde(untagged)]` for clean JSON: `Int(42)` serializes as `42`,
/// not `{"Int": 42}`. `Null` must come first so it wins over other variants
/// during untagged deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Null/missing value
    Null,

    /// Boolean value
    Bool(bool),

    /// Integer value
    Int(i64),

    /// Floating point value
    Float(f64),

    /// String value
    String(String),
}

/// Tabular result of an executed SQL query: an ordered sequence of named
/// columns and the rows beneath them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<FeatureValue>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Strips the `table.` qualification prefix from every column name so
    /// callers see plain feature names. If a column name contains a dot,
    /// only the suffix after the last dot is kept.
    pub fn strip_column_qualifiers(&mut self) {
        for column in &mut self.columns {
            if let Some(idx) = column.rfind('.') {
                *column = column[idx + 1..].to_string();
            }
        }
    }

    /// Index of a column by (unqualified) name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}
