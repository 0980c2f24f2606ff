//! # featherquery query planner
//!
//! The planning core of the SDK: given requested features and a metadata
//! snapshot, decide which physical tables hold them, how those tables join,
//! and what SQL to emit.
//!
//! The crate is pure and synchronous; it never touches the network. All
//! inputs come in as a `FeatureStoreMetadata` snapshot plus request
//! parameters, all output is a [`LogicalQueryPlan`] (or its rendered SQL
//! string).
//!
//! ```
//! use featherquery_core::{Feature, FeatureGroup, FeatureGroupKind, FeatureStoreMetadata};
//! use featherquery_planner::plan_feature;
//!
//! let meta = FeatureStoreMetadata::new("demo_featurestore").with_group(
//!     FeatureGroup::new("trx_summary_features", 1, FeatureGroupKind::Cached)
//!         .with_feature(Feature::new("cust_id", "int").primary())
//!         .with_feature(Feature::new("max_trx", "float")),
//! );
//! let plan = plan_feature(&meta, "max_trx", None, 1).unwrap();
//! assert_eq!(
//!     plan.sql(),
//!     "SELECT trx_summary_features_1.max_trx FROM trx_summary_features_1"
//! );
//! ```

pub use plan::{
    plan_feature, plan_featuregroup, plan_featuregroup_partitions, plan_features,
    LogicalQueryPlan, Projection, QualifiedColumn,
};
pub use resolver::{find_featuregroup, find_training_dataset, resolve_feature};
pub use sql::render;

pub mod plan;
pub mod resolver;
pub mod sql;
