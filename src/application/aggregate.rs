use crate::application::dedup::dedup_by_date;
use crate::application::identity::IdentityResolver;
use crate::domain::entities::metric_record::MetricRecord;
use crate::domain::ports::ads_platform::AdsPlatform;
use crate::domain::values::group_key::GroupKey;
use crate::domain::values::month::Month;
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// One reconciled (month, group) cell with its derived metrics.
#[derive(Debug, Clone)]
pub struct MonthGroupAggregate {
    pub month: Month,
    pub key: GroupKey,
    /// Label of the newest record in the bucket; display-name resolution
    /// falls back to it when the key was never seen in the full scan.
    pub latest_label: String,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cpm: f64,
    pub cpc: f64,
    pub ctr: f64,
    pub cpr: f64,
}

struct Bucket {
    month: Month,
    key: GroupKey,
    latest_label: String,
    spend: f64,
    impressions: u64,
    clicks: u64,
    leads: u64,
    sales: u64,
    result_count: u64,
    reported_cprs: Vec<f64>,
    has_link_field: bool,
}

/// Sums scoped records into per-(month, group) aggregates. Click totals
/// prefer per-record link clicks; buckets with no link-click field at all get
/// one best-effort platform lookup, issued concurrently under a small cap so
/// the external API's rate limits are respected.
pub struct Aggregator {
    platform: Arc<dyn AdsPlatform>,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(platform: Arc<dyn AdsPlatform>, concurrency: usize) -> Self {
        Self {
            platform,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn aggregate(
        &self,
        records: Vec<MetricRecord>,
        resolver: &IdentityResolver,
    ) -> Vec<MonthGroupAggregate> {
        let mut grouped: HashMap<(Month, GroupKey), Vec<MetricRecord>> = HashMap::new();
        for record in records {
            let key = resolver.resolve(&record);
            grouped.entry((record.month(), key)).or_default().push(record);
        }

        let buckets: Vec<Bucket> = grouped
            .into_iter()
            .map(|((month, key), bucket)| sum_bucket(month, key, dedup_by_date(bucket)))
            .collect();

        let mut aggregates: Vec<MonthGroupAggregate> = stream::iter(buckets)
            .map(|bucket| self.finish_bucket(bucket))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        // filtered-out delivery can leave an all-zero bucket behind
        aggregates.retain(|a| a.spend > 0.0);
        aggregates.sort_by(|a, b| (a.month, &a.key).cmp(&(b.month, &b.key)));
        aggregates
    }

    async fn finish_bucket(&self, bucket: Bucket) -> MonthGroupAggregate {
        let mut clicks = bucket.clicks;

        if !bucket.has_link_field {
            if let Some(ad_set_id) = bucket.key.ad_set_id() {
                match self
                    .platform
                    .get_link_clicks(
                        ad_set_id,
                        bucket.month.first_day(),
                        bucket.month.last_day(),
                    )
                    .await
                {
                    Ok(link_clicks) if link_clicks > 0 => {
                        debug!(
                            "link-click fallback for {} {}: {}",
                            bucket.key, bucket.month, link_clicks
                        );
                        clicks = link_clicks;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        // recovered: summed clicks stand in
                        warn!(
                            "link-click fallback failed for {} {} via {}: {e}",
                            bucket.key,
                            bucket.month,
                            self.platform.name()
                        );
                    }
                }
            }
        }

        let conversions = if bucket.leads > 0 {
            bucket.leads
        } else if bucket.result_count > 0 {
            bucket.result_count
        } else {
            bucket.sales
        };

        let mean_cpr = if bucket.reported_cprs.is_empty() {
            None
        } else {
            Some(bucket.reported_cprs.iter().sum::<f64>() / bucket.reported_cprs.len() as f64)
        };

        let spend = bucket.spend;
        let cpm = if bucket.impressions > 0 {
            spend * 1000.0 / bucket.impressions as f64
        } else {
            0.0
        };
        let cpc = if clicks > 0 { spend / clicks as f64 } else { 0.0 };
        let ctr = if bucket.impressions > 0 {
            clicks as f64 / bucket.impressions as f64 * 100.0
        } else {
            0.0
        };
        let cpr = if conversions > 0 {
            spend / conversions as f64
        } else {
            mean_cpr.unwrap_or(0.0)
        };

        MonthGroupAggregate {
            month: bucket.month,
            key: bucket.key,
            latest_label: bucket.latest_label,
            spend,
            impressions: bucket.impressions,
            clicks,
            conversions,
            cpm,
            cpc,
            ctr,
            cpr,
        }
    }
}

fn sum_bucket(month: Month, key: GroupKey, records: Vec<MetricRecord>) -> Bucket {
    let mut bucket = Bucket {
        month,
        key,
        latest_label: String::new(),
        spend: 0.0,
        impressions: 0,
        clicks: 0,
        leads: 0,
        sales: 0,
        result_count: 0,
        reported_cprs: Vec::new(),
        has_link_field: false,
    };

    for record in &records {
        bucket.spend += record.investment;
        bucket.impressions += record.impressions;
        // the more specific count wins whenever it is present and positive
        bucket.clicks += match record.link_clicks {
            Some(link_clicks) if link_clicks > 0 => link_clicks,
            _ => record.clicks,
        };
        bucket.leads += record.leads;
        bucket.sales += record.sales;
        bucket.result_count += record.result_count.unwrap_or(0);
        if let Some(cpr) = record.cpr {
            if cpr > 0.0 {
                bucket.reported_cprs.push(cpr);
            }
        }
        if record.link_clicks.is_some() {
            bucket.has_link_field = true;
        }
    }

    // dedup_by_date returns records date-ascending
    if let Some(last) = records.last() {
        bucket.latest_label = last.audience_label.clone();
    }
    bucket
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::values::canonical::Canonicalizer;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    enum FakeOutcome {
        Clicks(u64),
        Fail,
    }

    struct FakePlatform {
        outcome: FakeOutcome,
    }

    #[async_trait]
    impl AdsPlatform for FakePlatform {
        async fn get_link_clicks(
            &self,
            _ad_set_id: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<u64, DomainError> {
            match self.outcome {
                FakeOutcome::Clicks(n) => Ok(n),
                FakeOutcome::Fail => Err(DomainError::Platform("insights down".into())),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn aggregator(outcome: FakeOutcome) -> Aggregator {
        Aggregator::new(Arc::new(FakePlatform { outcome }), 4)
    }

    fn resolver() -> IdentityResolver {
        IdentityResolver::new(Canonicalizer::default(), &[])
    }

    fn record(id: &str, date: &str, investment: f64) -> MetricRecord {
        MetricRecord {
            id: id.into(),
            date: date.parse().unwrap(),
            month_label: "January 2025".into(),
            source: "meta".into(),
            client: "c1".into(),
            product: "p1".into(),
            audience_label: "Women".into(),
            ad_set_id: Some("as1".into()),
            campaign_id: None,
            ad_account_id: None,
            investment,
            impressions: 0,
            clicks: 0,
            link_clicks: None,
            leads: 0,
            sales: 0,
            result_count: None,
            result_type: None,
            cpr: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_link_clicks_preferred_over_clicks() {
        let mut a = record("a", "2025-01-10", 100.0);
        a.impressions = 10_000;
        a.clicks = 500;
        a.link_clicks = Some(200);
        let mut b = record("b", "2025-01-11", 100.0);
        b.impressions = 10_000;
        b.clicks = 400;
        b.link_clicks = Some(100);

        let out = aggregator(FakeOutcome::Fail)
            .aggregate(vec![a, b], &resolver())
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].clicks, 300);
        assert!((out[0].ctr - 1.5).abs() < 1e-9);
        assert!((out[0].cpc - 200.0 / 300.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_zero_link_clicks_falls_back_to_clicks_per_record() {
        let mut a = record("a", "2025-01-10", 100.0);
        a.clicks = 50;
        a.link_clicks = Some(0);
        let out = aggregator(FakeOutcome::Fail)
            .aggregate(vec![a], &resolver())
            .await;
        // field present, so no external lookup either
        assert_eq!(out[0].clicks, 50);
    }

    #[tokio::test]
    async fn test_platform_fallback_replaces_summed_clicks() {
        let mut a = record("a", "2025-01-10", 100.0);
        a.clicks = 50;
        let out = aggregator(FakeOutcome::Clicks(80))
            .aggregate(vec![a], &resolver())
            .await;
        assert_eq!(out[0].clicks, 80);
    }

    #[tokio::test]
    async fn test_platform_failure_is_recovered() {
        // spend 500, impressions 10000, clicks 200, no link clicks anywhere,
        // fallback call fails
        let mut a = record("a", "2025-01-10", 500.0);
        a.impressions = 10_000;
        a.clicks = 200;
        let out = aggregator(FakeOutcome::Fail)
            .aggregate(vec![a], &resolver())
            .await;
        assert_eq!(out.len(), 1);
        assert!((out[0].ctr - 2.0).abs() < 1e-9);
        assert!((out[0].cpc - 2.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fallback_skipped_for_synthetic_keys() {
        let mut a = record("a", "2025-01-10", 100.0);
        a.ad_set_id = None;
        a.clicks = 50;
        // a positive fake result must not leak in: synthetic keys have no
        // ad-set id to query with
        let out = aggregator(FakeOutcome::Clicks(999))
            .aggregate(vec![a], &resolver())
            .await;
        assert!(out[0].key.is_synthetic());
        assert_eq!(out[0].clicks, 50);
    }

    #[tokio::test]
    async fn test_conversion_cascade() {
        let mut with_leads = record("a", "2025-01-10", 100.0);
        with_leads.leads = 4;
        with_leads.sales = 1;
        let out = aggregator(FakeOutcome::Fail)
            .aggregate(vec![with_leads], &resolver())
            .await;
        assert_eq!(out[0].conversions, 4);
        assert!((out[0].cpr - 25.0).abs() < 1e-9);

        let mut with_results = record("b", "2025-01-10", 100.0);
        with_results.result_count = Some(5);
        let out = aggregator(FakeOutcome::Fail)
            .aggregate(vec![with_results], &resolver())
            .await;
        assert_eq!(out[0].conversions, 5);

        let mut with_sales = record("c", "2025-01-10", 100.0);
        with_sales.sales = 2;
        let out = aggregator(FakeOutcome::Fail)
            .aggregate(vec![with_sales], &resolver())
            .await;
        assert_eq!(out[0].conversions, 2);
        assert!((out[0].cpr - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_mean_cpr_fallback() {
        let mut a = record("a", "2025-01-10", 100.0);
        a.cpr = Some(20.0);
        let mut b = record("b", "2025-01-11", 100.0);
        b.cpr = Some(40.0);
        let mut c = record("c", "2025-01-12", 100.0);
        c.cpr = Some(0.0); // zeros ignored
        let out = aggregator(FakeOutcome::Fail)
            .aggregate(vec![a, b, c], &resolver())
            .await;
        assert_eq!(out[0].conversions, 0);
        assert!((out[0].cpr - 30.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_per_group_date_dedup_applies() {
        let a = record("a", "2025-01-10", 100.0);
        let b = record("b", "2025-01-10", 150.0);
        let out = aggregator(FakeOutcome::Fail)
            .aggregate(vec![a, b], &resolver())
            .await;
        assert!((out[0].spend - 150.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_order_invariance() {
        let mut a = record("a", "2025-01-10", 100.0);
        a.impressions = 1000;
        a.clicks = 10;
        let mut b = record("b", "2025-01-11", 200.0);
        b.impressions = 2000;
        b.clicks = 30;
        let mut c = record("c", "2025-02-01", 50.0);
        c.audience_label = "Men".into();
        c.ad_set_id = Some("as2".into());

        let forward = aggregator(FakeOutcome::Fail)
            .aggregate(vec![a.clone(), b.clone(), c.clone()], &resolver())
            .await;
        let shuffled = aggregator(FakeOutcome::Fail)
            .aggregate(vec![c, a, b], &resolver())
            .await;
        assert_eq!(forward.len(), shuffled.len());
        for (x, y) in forward.iter().zip(shuffled.iter()) {
            assert_eq!(x.key, y.key);
            assert_eq!(x.month, y.month);
            assert_eq!(x.clicks, y.clicks);
            assert!((x.spend - y.spend).abs() < 1e-9);
        }
    }
}
