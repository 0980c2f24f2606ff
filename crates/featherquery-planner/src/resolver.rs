//! Feature and entity resolution against a metadata snapshot
//!
//! Resolution is a pure scan over the snapshot. Feature groups are held in
//! payload order, so for a fixed snapshot every lookup here is
//! deterministic.
//!
//! Bare feature names (no feature group given) resolve by searching every
//! feature group for an owned feature with that name:
//! - no owner: `FeatureNotFound`
//! - owners in two or more distinct feature group names:
//!   `FeatureNameCollision`, the caller must name a feature group
//! - owners that are multiple versions of one feature group name: the
//!   latest version wins

use featherquery_core::{Error, FeatureGroup, FeatureStoreMetadata, Result, TrainingDataset};

/// Looks up a feature group by (name, version).
pub fn find_featuregroup<'a>(
    metadata: &'a FeatureStoreMetadata,
    name: &str,
    version: u32,
) -> Result<&'a FeatureGroup> {
    metadata
        .find_group(name, version)
        .ok_or_else(|| Error::FeatureGroupNotFound {
            name: name.to_string(),
            version,
            store: metadata.store_name.clone(),
        })
}

/// Looks up a training dataset by (name, version).
pub fn find_training_dataset<'a>(
    metadata: &'a FeatureStoreMetadata,
    name: &str,
    version: u32,
) -> Result<&'a TrainingDataset> {
    metadata
        .find_training_dataset(name, version)
        .ok_or_else(|| Error::TrainingDatasetNotFound {
            name: name.to_string(),
            version,
        })
}

/// Resolves a feature name to the feature group that owns it.
///
/// With a `group_hint` the lookup is direct: the group must exist at
/// `hint_version` and must own the feature. Without a hint the snapshot is
/// scanned in order.
pub fn resolve_feature<'a>(
    metadata: &'a FeatureStoreMetadata,
    feature: &str,
    group_hint: Option<&str>,
    hint_version: u32,
) -> Result<&'a FeatureGroup> {
    if let Some(group) = group_hint {
        let fg = find_featuregroup(metadata, group, hint_version)?;
        if !fg.has_feature(feature) {
            return Err(Error::FeatureNotFound {
                name: feature.to_string(),
            });
        }
        return Ok(fg);
    }

    let owners: Vec<&FeatureGroup> = metadata
        .feature_groups
        .iter()
        .filter(|fg| fg.has_feature(feature))
        .collect();

    if owners.is_empty() {
        return Err(Error::FeatureNotFound {
            name: feature.to_string(),
        });
    }

    // Distinct owning group names, in first-appearance order.
    let mut distinct_names: Vec<&str> = Vec::new();
    for fg in &owners {
        if !distinct_names.contains(&fg.name.as_str()) {
            distinct_names.push(&fg.name);
        }
    }

    if distinct_names.len() > 1 {
        return Err(Error::FeatureNameCollision {
            name: feature.to_string(),
            groups: owners.iter().map(|fg| fg.table_name()).collect(),
        });
    }

    // Single group name, possibly at several versions: latest version wins.
    owners
        .into_iter()
        .max_by_key(|fg| fg.version)
        .ok_or_else(|| Error::FeatureNotFound {
            name: feature.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use featherquery_core::{Feature, FeatureGroupKind};

    fn snapshot() -> FeatureStoreMetadata {
        FeatureStoreMetadata::new("demo_featurestore")
            .with_group(
                FeatureGroup::new("trx_summary_features", 1, FeatureGroupKind::Cached)
                    .with_feature(Feature::new("cust_id", "int").primary())
                    .with_feature(Feature::new("max_trx", "float")),
            )
            .with_group(
                FeatureGroup::new("trx_graph_summary_features", 1, FeatureGroupKind::Cached)
                    .with_feature(Feature::new("cust_id", "int").primary())
                    .with_feature(Feature::new("pagerank", "float")),
            )
    }

    #[test]
    fn test_find_featuregroup() {
        let meta = snapshot();
        assert!(find_featuregroup(&meta, "trx_summary_features", 1).is_ok());
        assert!(matches!(
            find_featuregroup(&meta, "trx_summary_features", 9),
            Err(Error::FeatureGroupNotFound { version: 9, .. })
        ));
    }

    #[test]
    fn test_resolve_unique_feature() {
        let meta = snapshot();
        let fg = resolve_feature(&meta, "max_trx", None, 1).unwrap();
        assert_eq!(fg.table_name(), "trx_summary_features_1");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let meta = snapshot();
        for _ in 0..10 {
            let fg = resolve_feature(&meta, "pagerank", None, 1).unwrap();
            assert_eq!(fg.table_name(), "trx_graph_summary_features_1");
        }
    }

    #[test]
    fn test_resolve_missing_feature() {
        let meta = snapshot();
        assert!(matches!(
            resolve_feature(&meta, "no_such_feature", None, 1),
            Err(Error::FeatureNotFound { .. })
        ));
    }

    #[test]
    fn test_bare_ambiguous_feature_collides() {
        // cust_id lives in both groups, bare lookup must not pick a winner
        let meta = snapshot();
        let err = resolve_feature(&meta, "cust_id", None, 1).unwrap_err();
        match err {
            Error::FeatureNameCollision { name, groups } => {
                assert_eq!(name, "cust_id");
                assert_eq!(groups.len(), 2);
            }
            other => panic!("expected collision, got {other}"),
        }
    }

    #[test]
    fn test_hint_disambiguates_collision() {
        let meta = snapshot();
        let fg = resolve_feature(&meta, "cust_id", Some("trx_summary_features"), 1).unwrap();
        assert_eq!(fg.table_name(), "trx_summary_features_1");
    }

    #[test]
    fn test_hint_group_without_feature() {
        let meta = snapshot();
        assert!(matches!(
            resolve_feature(&meta, "pagerank", Some("trx_summary_features"), 1),
            Err(Error::FeatureNotFound { .. })
        ));
    }

    #[test]
    fn test_same_group_two_versions_prefers_latest() {
        let meta = snapshot().with_group(
            FeatureGroup::new("trx_summary_features", 2, FeatureGroupKind::Cached)
                .with_feature(Feature::new("cust_id", "int").primary())
                .with_feature(Feature::new("max_trx", "float")),
        );
        let fg = resolve_feature(&meta, "max_trx", None, 1).unwrap();
        assert_eq!(fg.version, 2);
    }
}
