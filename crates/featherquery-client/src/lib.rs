//! # featherquery client
//!
//! The public operation surface of the SDK. A [`FeatureStoreClient`] ties
//! together a [`MetadataProvider`] (fetches the metadata snapshot), a
//! [`MetadataCache`] (one slot per feature store) and a [`SqlExecutor`]
//! (runs the synthesized SQL). Planning itself lives in
//! `featherquery-planner`.
//!
//! Every metadata-dependent operation runs under a two-attempt protocol:
//! try with the cached snapshot, and if that fails with an error a refresh
//! can cure (the not-found family), refresh once and retry once. This is a
//! correctness mechanism for cache staleness, not a resilience mechanism:
//! transient network failures are not retried, and nothing is retried more
//! than once.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use featherquery_client::{ClientConfig, FeatureStoreClient, RestMetadataProvider};
//!
//! let config = ClientConfig::from_env()?;
//! let provider = Arc::new(RestMetadataProvider::new(&config)?);
//! let client = FeatureStoreClient::new(provider, executor, &config.default_store);
//!
//! let result = client.get_feature("max_trx", None, 1).await?;
//! let sql = client.features_sql(&["pagerank", "max_trx"], &Default::default(), None).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use featherquery_core::{FeatureStoreMetadata, QueryResult, Result, StorageConnector};
use featherquery_planner::{
    plan_feature, plan_featuregroup, plan_featuregroup_partitions, plan_features,
};

pub use cache::MetadataCache;
pub use config::ClientConfig;
pub use executor::SqlExecutor;
pub use provider::{MetadataProvider, RestMetadataProvider};

pub mod cache;
pub mod config;
pub mod executor;
pub mod provider;

/// Client for one feature store.
///
/// Cheap to clone; `for_store` rebinds a clone to another store while
/// sharing the provider, executor and cache, so concurrent use of several
/// stores keeps independent snapshot slots.
#[derive(Clone)]
pub struct FeatureStoreClient {
    provider: Arc<dyn MetadataProvider>,
    executor: Arc<dyn SqlExecutor>,
    cache: MetadataCache,
    store: String,
}

impl FeatureStoreClient {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        executor: Arc<dyn SqlExecutor>,
        store: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            executor,
            cache: MetadataCache::new(),
            store: store.into().to_ascii_lowercase(),
        }
    }

    /// The feature store this client is bound to
    pub fn store(&self) -> &str {
        &self.store
    }

    /// A handle bound to another feature store, sharing provider, executor
    /// and cache with this one
    pub fn for_store(&self, store: impl Into<String>) -> Self {
        let mut client = self.clone();
        client.store = store.into().to_ascii_lowercase();
        client
    }

    /// Returns the metadata snapshot, fetching it when the cache is empty
    /// or `force_refresh` is set
    pub async fn metadata(&self, force_refresh: bool) -> Result<Arc<FeatureStoreMetadata>> {
        if !force_refresh {
            if let Some(snapshot) = self.cache.get(&self.store) {
                return Ok(snapshot);
            }
        }
        self.refresh_metadata().await
    }

    async fn refresh_metadata(&self) -> Result<Arc<FeatureStoreMetadata>> {
        info!(store = %self.store, "fetching feature store metadata");
        let payload = self.provider.fetch_metadata(&self.store).await?;
        let snapshot = FeatureStoreMetadata::from_payload(payload)?;
        Ok(self.cache.insert(snapshot))
    }

    /// Two-attempt optimistic-cache protocol around a metadata-dependent
    /// operation: attempt with the cached snapshot; on a stale-metadata
    /// error, refresh exactly once and retry; any other error, and any
    /// second failure, propagates unchanged.
    async fn with_metadata<T>(
        &self,
        op: impl Fn(&FeatureStoreMetadata) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.metadata(false).await?;
        match op(&snapshot) {
            Ok(value) => Ok(value),
            Err(err) if err.is_stale_metadata() => {
                warn!(
                    store = %self.store,
                    error = %err,
                    "operation failed on cached metadata, refreshing and retrying once"
                );
                let snapshot = self.refresh_metadata().await?;
                op(&snapshot)
            }
            Err(err) => Err(err),
        }
    }

    async fn run_sql(&self, sql: &str) -> Result<QueryResult> {
        info!(store = %self.store, %sql, "running sql against the feature store");
        let mut result = self.executor.execute(sql, &self.store).await?;
        result.strip_column_qualifiers();
        Ok(result)
    }

    // --- SQL-producing surface ------------------------------------------

    /// Synthesizes the SQL for a single feature. Without `group` the
    /// feature is resolved by scanning the snapshot.
    pub async fn feature_sql(
        &self,
        feature: &str,
        group: Option<&str>,
        version: u32,
    ) -> Result<String> {
        self.with_metadata(|meta| Ok(plan_feature(meta, feature, group, version)?.sql()))
            .await
    }

    /// Synthesizes the SQL for a set of features, joining the owning
    /// feature groups when they differ
    pub async fn features_sql(
        &self,
        features: &[&str],
        version_overrides: &HashMap<String, u32>,
        join_key: Option<&str>,
    ) -> Result<String> {
        self.with_metadata(|meta| {
            Ok(plan_features(meta, features, version_overrides, join_key)?.sql())
        })
        .await
    }

    /// Synthesizes `SELECT *` over a feature group
    pub async fn featuregroup_sql(&self, name: &str, version: u32) -> Result<String> {
        self.with_metadata(|meta| Ok(plan_featuregroup(meta, name, version)?.sql()))
            .await
    }

    /// Synthesizes the partition listing for a cached feature group.
    /// Fails with `OnDemandPartitions` for on-demand groups.
    pub async fn featuregroup_partitions_sql(&self, name: &str, version: u32) -> Result<String> {
        self.with_metadata(|meta| Ok(plan_featuregroup_partitions(meta, name, version)?.sql()))
            .await
    }

    // --- Executing surface ----------------------------------------------

    /// Fetches a single feature
    pub async fn get_feature(
        &self,
        feature: &str,
        group: Option<&str>,
        version: u32,
    ) -> Result<QueryResult> {
        let sql = self.feature_sql(feature, group, version).await?;
        self.run_sql(&sql).await
    }

    /// Fetches a set of features, joined across feature groups when needed
    pub async fn get_features(
        &self,
        features: &[&str],
        version_overrides: &HashMap<String, u32>,
        join_key: Option<&str>,
    ) -> Result<QueryResult> {
        let sql = self.features_sql(features, version_overrides, join_key).await?;
        self.run_sql(&sql).await
    }

    /// Fetches a whole feature group
    pub async fn get_featuregroup(&self, name: &str, version: u32) -> Result<QueryResult> {
        let sql = self.featuregroup_sql(name, version).await?;
        self.run_sql(&sql).await
    }

    /// Lists the partitions of a cached feature group
    pub async fn get_featuregroup_partitions(
        &self,
        name: &str,
        version: u32,
    ) -> Result<QueryResult> {
        let sql = self.featuregroup_partitions_sql(name, version).await?;
        self.run_sql(&sql).await
    }

    /// Runs a raw SQL query against the feature store.
    ///
    /// Escape hatch: bypasses the planner entirely and is not validated in
    /// any way. The query text is the caller's responsibility.
    pub async fn sql(&self, query: &str) -> Result<QueryResult> {
        self.run_sql(query).await
    }

    // --- Metadata listings ----------------------------------------------

    /// Physical table names (`name_version`) of all feature groups
    pub async fn get_featuregroups(&self) -> Result<Vec<String>> {
        self.with_metadata(|meta| Ok(meta.group_table_names())).await
    }

    /// Names of all features across all feature groups
    pub async fn get_features_list(&self) -> Result<Vec<String>> {
        self.with_metadata(|meta| {
            Ok(meta.feature_names().into_iter().map(String::from).collect())
        })
        .await
    }

    /// Names of all training datasets
    pub async fn get_training_datasets(&self) -> Result<Vec<String>> {
        self.with_metadata(|meta| {
            Ok(meta
                .training_datasets
                .iter()
                .map(|td| td.name.clone())
                .collect())
        })
        .await
    }

    /// All storage connector descriptors
    pub async fn get_storage_connectors(&self) -> Result<Vec<StorageConnector>> {
        self.with_metadata(|meta| Ok(meta.storage_connectors.clone()))
            .await
    }

    /// Looks up a storage connector by name
    pub async fn get_storage_connector(&self, name: &str) -> Result<StorageConnector> {
        self.with_metadata(|meta| {
            meta.storage_connector(name).cloned().ok_or_else(|| {
                featherquery_core::Error::StorageConnectorNotFound {
                    name: name.to_string(),
                    available: meta
                        .storage_connectors
                        .iter()
                        .map(|sc| sc.name.clone())
                        .collect(),
                }
            })
        })
        .await
    }

    /// Latest registered version of a feature group, 0 when absent
    pub async fn get_latest_featuregroup_version(&self, name: &str) -> Result<u32> {
        let name = name.to_ascii_lowercase();
        self.with_metadata(|meta| Ok(meta.latest_group_version(&name)))
            .await
    }

    /// Latest registered version of a training dataset, 0 when absent
    pub async fn get_latest_training_dataset_version(&self, name: &str) -> Result<u32> {
        let name = name.to_ascii_lowercase();
        self.with_metadata(|meta| Ok(meta.latest_training_dataset_version(&name)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use featherquery_core::payload::{FeatureGroupPayload, FeaturePayload, MetadataPayload};
    use featherquery_core::{Error, FeatureValue};

    fn feature(name: &str, primary: bool) -> FeaturePayload {
        FeaturePayload {
            name: name.to_string(),
            feature_type: "int".to_string(),
            primary,
            partition: false,
            description: None,
        }
    }

    fn group(name: &str, version: u32, features: Vec<FeaturePayload>) -> FeatureGroupPayload {
        FeatureGroupPayload {
            name: name.to_string(),
            version,
            featuregroup_type: "cachedFeaturegroupDTO".to_string(),
            features,
            query: None,
            description: None,
        }
    }

    fn payload(groups: Vec<FeatureGroupPayload>) -> MetadataPayload {
        MetadataPayload {
            featurestore_name: "demo_featurestore".to_string(),
            featuregroups: groups,
            training_datasets: vec![],
            storage_connectors: vec![],
        }
    }

    /// Serves a sequence of payloads, the last one repeating, and counts
    /// fetches.
    struct SequenceProvider {
        payloads: Mutex<Vec<MetadataPayload>>,
        fetches: AtomicUsize,
    }

    impl SequenceProvider {
        fn new(payloads: Vec<MetadataPayload>) -> Self {
            Self {
                payloads: Mutex::new(payloads),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetadataProvider for SequenceProvider {
        async fn fetch_metadata(&self, _store: &str) -> Result<MetadataPayload> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut payloads = self.payloads.lock().unwrap();
            if payloads.len() > 1 {
                Ok(payloads.remove(0))
            } else {
                Ok(payloads[0].clone())
            }
        }
    }

    /// Records executed SQL and returns a canned result.
    struct RecordingExecutor {
        executed: Mutex<Vec<String>>,
        result_columns: Vec<String>,
    }

    impl RecordingExecutor {
        fn new(result_columns: Vec<String>) -> Self {
            Self {
                executed: Mutex::new(Vec::new()),
                result_columns,
            }
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SqlExecutor for RecordingExecutor {
        async fn execute(&self, sql: &str, _database: &str) -> Result<QueryResult> {
            self.executed.lock().unwrap().push(sql.to_string());
            let mut result = QueryResult::new(self.result_columns.clone());
            result.rows.push(vec![FeatureValue::Int(1); self.result_columns.len()]);
            Ok(result)
        }
    }

    fn client_with(
        provider: Arc<SequenceProvider>,
        executor: Arc<RecordingExecutor>,
    ) -> FeatureStoreClient {
        FeatureStoreClient::new(provider, executor, "demo_featurestore")
    }

    fn base_payload() -> MetadataPayload {
        payload(vec![group(
            "trx_summary_features",
            1,
            vec![feature("cust_id", true), feature("max_trx", false)],
        )])
    }

    #[tokio::test]
    async fn test_metadata_is_cached() {
        let provider = Arc::new(SequenceProvider::new(vec![base_payload()]));
        let executor = Arc::new(RecordingExecutor::new(vec![]));
        let client = client_with(Arc::clone(&provider), executor);

        client.metadata(false).await.unwrap();
        client.metadata(false).await.unwrap();
        assert_eq!(provider.fetch_count(), 1);

        client.metadata(true).await.unwrap();
        assert_eq!(provider.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_cache_refreshes_exactly_once() {
        // First payload lacks the group; the refreshed one has it.
        let late = payload(vec![
            group(
                "trx_summary_features",
                1,
                vec![feature("cust_id", true), feature("max_trx", false)],
            ),
            group(
                "late_features",
                1,
                vec![feature("cust_id", true), feature("score", false)],
            ),
        ]);
        let provider = Arc::new(SequenceProvider::new(vec![base_payload(), late]));
        let executor = Arc::new(RecordingExecutor::new(vec!["late_features_1.score".into()]));
        let client = client_with(Arc::clone(&provider), Arc::clone(&executor));

        let result = client.get_featuregroup("late_features", 1).await.unwrap();
        // one initial fetch plus exactly one forced refresh
        assert_eq!(provider.fetch_count(), 2);
        assert_eq!(executor.executed(), vec!["SELECT * FROM late_features_1"]);
        assert_eq!(result.columns, vec!["score"]);
    }

    #[tokio::test]
    async fn test_permanently_stale_cache_fails_after_second_attempt() {
        let provider = Arc::new(SequenceProvider::new(vec![base_payload()]));
        let executor = Arc::new(RecordingExecutor::new(vec![]));
        let client = client_with(Arc::clone(&provider), Arc::clone(&executor));

        let err = client.get_featuregroup("never_there", 1).await.unwrap_err();
        assert!(matches!(err, Error::FeatureGroupNotFound { .. }));
        // initial fetch plus exactly one refresh, then the failure
        assert_eq!(provider.fetch_count(), 2);
        assert!(executor.executed().is_empty());
    }

    #[tokio::test]
    async fn test_collision_does_not_trigger_refresh() {
        let ambiguous = payload(vec![
            group(
                "trx_summary_features",
                1,
                vec![feature("cust_id", true), feature("max_trx", false)],
            ),
            group(
                "trx_graph_summary_features",
                1,
                vec![feature("cust_id", true), feature("pagerank", false)],
            ),
        ]);
        let provider = Arc::new(SequenceProvider::new(vec![ambiguous]));
        let executor = Arc::new(RecordingExecutor::new(vec![]));
        let client = client_with(Arc::clone(&provider), executor);

        let err = client.get_feature("cust_id", None, 1).await.unwrap_err();
        assert!(matches!(err, Error::FeatureNameCollision { .. }));
        // a refresh cannot cure a collision, so only the initial fetch ran
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_for_store_keeps_independent_cache_slots() {
        let provider = Arc::new(SequenceProvider::new(vec![base_payload()]));
        let executor = Arc::new(RecordingExecutor::new(vec![]));
        let client = client_with(Arc::clone(&provider), executor);

        client.metadata(false).await.unwrap();
        let other = client.for_store("demo_featurestore");
        // same store name: the rebound handle reuses the shared slot
        other.metadata(false).await.unwrap();
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_raw_sql_passthrough_bypasses_planner() {
        let provider = Arc::new(SequenceProvider::new(vec![base_payload()]));
        let executor = Arc::new(RecordingExecutor::new(vec!["cnt".into()]));
        let client = client_with(provider.clone(), Arc::clone(&executor));

        client
            .sql("SELECT count(*) AS cnt FROM trx_summary_features_1")
            .await
            .unwrap();
        assert_eq!(
            executor.executed(),
            vec!["SELECT count(*) AS cnt FROM trx_summary_features_1"]
        );
        // the pass-through never consults metadata
        assert_eq!(provider.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_result_columns_are_unqualified() {
        let provider = Arc::new(SequenceProvider::new(vec![base_payload()]));
        let executor = Arc::new(RecordingExecutor::new(vec![
            "trx_summary_features_1.max_trx".into(),
        ]));
        let client = client_with(provider, executor);

        let result = client.get_feature("max_trx", None, 1).await.unwrap();
        assert_eq!(result.columns, vec!["max_trx"]);
    }

    #[tokio::test]
    async fn test_metadata_listings() {
        let provider = Arc::new(SequenceProvider::new(vec![base_payload()]));
        let executor = Arc::new(RecordingExecutor::new(vec![]));
        let client = client_with(provider, executor);

        assert_eq!(
            client.get_featuregroups().await.unwrap(),
            vec!["trx_summary_features_1"]
        );
        assert_eq!(
            client.get_features_list().await.unwrap(),
            vec!["cust_id", "max_trx"]
        );
        assert_eq!(
            client
                .get_latest_featuregroup_version("trx_summary_features")
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            client
                .get_latest_training_dataset_version("fraud_model")
                .await
                .unwrap(),
            0
        );
    }
}
