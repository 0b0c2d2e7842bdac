use crate::application::aggregate::Aggregator;
use crate::application::dedup::dedup_global;
use crate::application::display_name::DisplayNames;
use crate::application::identity::IdentityResolver;
use crate::application::profitability::ProfitabilityResolver;
use crate::application::scope::{ScopeSelector, Selection};
use crate::domain::error::DomainError;
use crate::domain::ports::ads_platform::AdsPlatform;
use crate::domain::ports::planner_registry::PlannerRegistry;
use crate::domain::ports::record_store::{RecordFilter, RecordStore};
use crate::domain::values::canonical::{Canonicalizer, CanonicalizerConfig};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Source tag of the authoritative advertising platform; records from
    /// any other source are ignored by the engine.
    pub source_tag: String,
    pub canonicalizer: CanonicalizerConfig,
    pub cache_ttl: Duration,
    /// Cap on concurrent platform/store enrichment calls.
    pub fallback_concurrency: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            source_tag: "meta".into(),
            canonicalizer: CanonicalizerConfig::default(),
            cache_ttl: Duration::from_secs(60),
            fallback_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    pub only_primary_group: bool,
    pub ad_account_id: Option<String>,
    pub campaign_id: Option<String>,
}

/// One output row, recomputed fresh on every query (modulo the TTL cache).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub month: String,
    pub display_name: String,
    pub cpm: f64,
    pub cpc: f64,
    pub ctr: f64,
    pub cpr: f64,
    pub roi_combined: String,
}

type CacheKey = (String, String, bool, Option<String>, Option<String>);

struct CacheEntry {
    computed_at: Instant,
    rows: Vec<HistoryRow>,
}

/// Orchestrates the pipeline: identity resolution over a planner snapshot,
/// global dedup, display-name scan, scope selection, aggregation and the
/// profitability cascade, sorted into the final table. The cache only damps
/// repeated UI refresh bursts; correctness never depends on a hit.
pub struct HistoryUseCase {
    store: Arc<dyn RecordStore>,
    planner: Arc<dyn PlannerRegistry>,
    platform: Arc<dyn AdsPlatform>,
    canonicalizer: Canonicalizer,
    config: HistoryConfig,
    cache: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl HistoryUseCase {
    pub fn new(
        store: Arc<dyn RecordStore>,
        planner: Arc<dyn PlannerRegistry>,
        platform: Arc<dyn AdsPlatform>,
        config: HistoryConfig,
    ) -> Self {
        Self {
            store,
            planner,
            platform,
            canonicalizer: Canonicalizer::new(config.canonicalizer.clone()),
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn execute(
        &self,
        client: &str,
        product: &str,
        options: &HistoryOptions,
    ) -> Result<Vec<HistoryRow>, DomainError> {
        let cache_key: CacheKey = (
            client.to_string(),
            product.to_string(),
            options.only_primary_group,
            options.ad_account_id.clone(),
            options.campaign_id.clone(),
        );
        if let Some(rows) = self.cache_get(&cache_key) {
            debug!("history cache hit for {client}/{product}");
            return Ok(rows);
        }

        // the one terminal failure: without the raw record set there is no
        // history to reconcile
        let mut records = self
            .store
            .query_records(&RecordFilter {
                product: product.to_string(),
                client: Some(client.to_string()),
            })
            .await?;

        // placeholder labels do not represent a real group
        records.retain(|r| !self.canonicalizer.is_placeholder(&r.audience_label));

        let known = match self.planner.list_known_groups(client, product).await {
            Ok(known) => known,
            Err(e) => {
                warn!("planner registry unavailable for {client}/{product}: {e}");
                Vec::new()
            }
        };
        let resolver = IdentityResolver::new(self.canonicalizer.clone(), &known);

        let deduped = dedup_global(records);
        let names = DisplayNames::build(&deduped, &resolver);

        let selection = Selection {
            ad_account_id: options.ad_account_id.clone(),
            campaign_id: options.campaign_id.clone(),
            only_primary_group: options.only_primary_group,
        };
        let scoped =
            ScopeSelector::new(&resolver, &self.config.source_tag).select(&deduped, &selection);

        let aggregates = Aggregator::new(
            Arc::clone(&self.platform),
            self.config.fallback_concurrency,
        )
        .aggregate(scoped, &resolver)
        .await;

        let roi = ProfitabilityResolver::new(
            Arc::clone(&self.store),
            self.config.fallback_concurrency,
        )
        .resolve(&aggregates, &resolver, product, client)
        .await;

        let mut keyed_rows: Vec<(i64, HistoryRow)> = aggregates
            .iter()
            .zip(roi)
            .map(|(aggregate, roi_combined)| {
                (
                    aggregate.month.ordinal(),
                    HistoryRow {
                        month: aggregate.month.label(),
                        display_name: names.get(&aggregate.key, &aggregate.latest_label),
                        cpm: aggregate.cpm,
                        cpc: aggregate.cpc,
                        ctr: aggregate.ctr,
                        cpr: aggregate.cpr,
                        roi_combined,
                    },
                )
            })
            .collect();
        keyed_rows.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| a.1.display_name.cmp(&b.1.display_name))
        });
        let rows: Vec<HistoryRow> = keyed_rows.into_iter().map(|(_, row)| row).collect();

        self.cache_put(cache_key, rows.clone());
        Ok(rows)
    }

    fn cache_get(&self, key: &CacheKey) -> Option<Vec<HistoryRow>> {
        let cache = self.cache.lock().ok()?;
        let entry = cache.get(key)?;
        if entry.computed_at.elapsed() < self.config.cache_ttl {
            Some(entry.rows.clone())
        } else {
            None
        }
    }

    fn cache_put(&self, key: CacheKey, rows: Vec<HistoryRow>) {
        // last write wins; recomputation is deterministic for equal inputs
        if let Ok(mut cache) = self.cache.lock() {
            let ttl = self.config.cache_ttl;
            cache.retain(|_, entry| entry.computed_at.elapsed() < ttl);
            cache.insert(
                key,
                CacheEntry {
                    computed_at: Instant::now(),
                    rows,
                },
            );
        }
    }
}
