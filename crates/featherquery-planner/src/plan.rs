//! Logical query plans
//!
//! A `LogicalQueryPlan` is a transient, per-request value: the set of
//! participating tables (anchor first), the projection, and the join key
//! when more than one table takes part. Plans are built fresh for every
//! query and rendered to SQL by [`crate::sql::render`].
//!
//! Planning rules for multi-feature queries:
//! 1. every requested feature is resolved to its owning feature group,
//!    applying per-group version overrides;
//! 2. participating tables are deduplicated, first appearance first; the
//!    first table is the join anchor;
//! 3. with several tables, the join key is the explicit one if supplied
//!    (trusted, not validated against the tables' columns), otherwise the
//!    first of the anchor's primary-key names that is primary in every
//!    participating table;
//! 4. every selected column is qualified by its table alias and the join
//!    key is projected once, from the anchor;
//! 5. two selected columns that would strip to the same output name are a
//!    collision, never left to the engine's ambiguity rules.

use std::collections::HashMap;

use tracing::debug;

use featherquery_core::validation::normalize_identifier;
use featherquery_core::{Error, FeatureGroup, FeatureGroupKind, FeatureStoreMetadata, Result};

use crate::resolver::{find_featuregroup, resolve_feature};

/// A column qualified by its table alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedColumn {
    pub table: String,
    pub column: String,
}

impl QualifiedColumn {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// The name the caller sees once qualifiers are stripped from the
    /// result columns
    pub fn output_name(&self) -> &str {
        &self.column
    }
}

/// Select-list of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `SELECT *`
    Star,
    /// Explicit qualified columns
    Columns(Vec<QualifiedColumn>),
}

/// A logical query plan, ready for SQL synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalQueryPlan {
    Select {
        /// Participating physical table names, anchor first.
        /// More than one table implies `join_key` is set.
        tables: Vec<String>,
        projection: Projection,
        join_key: Option<String>,
    },
    ShowPartitions {
        table: String,
    },
}

impl LogicalQueryPlan {
    /// Renders the plan as a SQL string
    pub fn sql(&self) -> String {
        crate::sql::render(self)
    }
}

/// Plans a single-feature query.
///
/// Without `group`, the feature is resolved by scanning the snapshot; an
/// explicit group at `version` turns the scan into a direct lookup.
pub fn plan_feature(
    metadata: &FeatureStoreMetadata,
    feature: &str,
    group: Option<&str>,
    version: u32,
) -> Result<LogicalQueryPlan> {
    let feature = normalize_identifier(feature)?;
    let group = group.map(normalize_identifier).transpose()?;
    let fg = resolve_feature(metadata, &feature, group.as_deref(), version)?;
    let table = fg.table_name();
    Ok(LogicalQueryPlan::Select {
        tables: vec![table.clone()],
        projection: Projection::Columns(vec![QualifiedColumn::new(table, feature)]),
        join_key: None,
    })
}

/// Plans a query over one or more features, joining the owning feature
/// groups when they differ.
///
/// `version_overrides` maps a feature group name to the version to read;
/// features resolving to an overridden group are re-pointed at that
/// version. `join_key` overrides inference and is trusted as given.
pub fn plan_features(
    metadata: &FeatureStoreMetadata,
    features: &[&str],
    version_overrides: &HashMap<String, u32>,
    join_key: Option<&str>,
) -> Result<LogicalQueryPlan> {
    if features.is_empty() {
        return Err(Error::invalid_name("", "no features requested"));
    }

    // Resolve every feature in input order.
    let mut resolved: Vec<(String, &FeatureGroup)> = Vec::with_capacity(features.len());
    for raw in features {
        let feature = normalize_identifier(raw)?;
        let mut fg = resolve_feature(metadata, &feature, None, 1)?;
        if let Some(&version) = version_overrides.get(&fg.name) {
            let pinned = find_featuregroup(metadata, &fg.name, version)?;
            if !pinned.has_feature(&feature) {
                return Err(Error::FeatureNotFound { name: feature });
            }
            fg = pinned;
        }
        resolved.push((feature, fg));
    }

    // Distinct participating tables, first appearance first.
    let mut participants: Vec<&FeatureGroup> = Vec::new();
    for (_, fg) in &resolved {
        if !participants
            .iter()
            .any(|p| p.table_name() == fg.table_name())
        {
            participants.push(fg);
        }
    }

    let chosen_key = if participants.len() > 1 {
        let key = match join_key {
            Some(key) => normalize_identifier(key)?,
            None => infer_join_key(&participants)?,
        };
        debug!(join_key = %key, tables = participants.len(), "joining feature groups");
        Some(key)
    } else {
        None
    };

    // Qualified select-list in input order, exact duplicates dropped.
    let mut columns: Vec<QualifiedColumn> = Vec::new();
    for (feature, fg) in &resolved {
        let column = QualifiedColumn::new(fg.table_name(), feature.clone());
        if !columns.contains(&column) {
            columns.push(column);
        }
    }

    // Project the join key once, qualified by the anchor.
    if let Some(key) = &chosen_key {
        if !columns.iter().any(|c| c.output_name() == key) {
            columns.push(QualifiedColumn::new(participants[0].table_name(), key));
        }
    }

    detect_output_collisions(&columns)?;

    Ok(LogicalQueryPlan::Select {
        tables: participants.iter().map(|fg| fg.table_name()).collect(),
        projection: Projection::Columns(columns),
        join_key: chosen_key,
    })
}

/// Plans a whole-feature-group read (`SELECT *`).
pub fn plan_featuregroup(
    metadata: &FeatureStoreMetadata,
    name: &str,
    version: u32,
) -> Result<LogicalQueryPlan> {
    let name = normalize_identifier(name)?;
    let fg = find_featuregroup(metadata, &name, version)?;
    Ok(LogicalQueryPlan::Select {
        tables: vec![fg.table_name()],
        projection: Projection::Star,
        join_key: None,
    })
}

/// Plans a partition listing. Only cached feature groups have physical
/// partitions; on-demand groups fail.
pub fn plan_featuregroup_partitions(
    metadata: &FeatureStoreMetadata,
    name: &str,
    version: u32,
) -> Result<LogicalQueryPlan> {
    let name = normalize_identifier(name)?;
    let fg = find_featuregroup(metadata, &name, version)?;
    if fg.kind == FeatureGroupKind::OnDemand {
        return Err(Error::OnDemandPartitions {
            name: fg.name.clone(),
            version: fg.version,
        });
    }
    Ok(LogicalQueryPlan::ShowPartitions {
        table: fg.table_name(),
    })
}

/// Infers the join key as the first of the anchor's primary-key names that
/// is primary in every participating feature group.
fn infer_join_key(participants: &[&FeatureGroup]) -> Result<String> {
    let Some((anchor, rest)) = participants.split_first() else {
        return Err(Error::InferJoinKey { groups: vec![] });
    };
    for candidate in anchor.primary_key_names() {
        let shared = rest
            .iter()
            .all(|fg| fg.feature(candidate).map(|f| f.primary).unwrap_or(false));
        if shared {
            return Ok(candidate.to_string());
        }
    }
    Err(Error::InferJoinKey {
        groups: participants.iter().map(|fg| fg.table_name()).collect(),
    })
}

/// Fails when two distinct selected columns would strip to the same output
/// name.
fn detect_output_collisions(columns: &[QualifiedColumn]) -> Result<()> {
    for (i, a) in columns.iter().enumerate() {
        for b in &columns[i + 1..] {
            if a.output_name() == b.output_name() {
                return Err(Error::FeatureNameCollision {
                    name: a.output_name().to_string(),
                    groups: vec![a.table.clone(), b.table.clone()],
                });
            }
        }
    }
    Ok(())
}
