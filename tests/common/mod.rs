//! Shared test helpers.

use adlens::domain::entities::metric_record::MetricRecord;
use adlens::domain::ports::ads_platform::AdsPlatform;
use adlens::infrastructure::platform::noop::NoopPlatform;
use adlens::{AdLens, HistoryConfig};
use std::sync::Arc;
use std::time::Duration;

/// In-memory store with the cache disabled so every query recomputes.
pub fn setup() -> AdLens {
    setup_with_platform(Arc::new(NoopPlatform))
}

pub fn setup_with_platform(platform: Arc<dyn AdsPlatform>) -> AdLens {
    let config = HistoryConfig {
        cache_ttl: Duration::ZERO,
        ..HistoryConfig::default()
    };
    AdLens::with_providers(":memory:", platform, config).unwrap()
}

pub struct RecordBuilder {
    record: MetricRecord,
}

pub fn record(month_label: &str, date: &str, audience_label: &str) -> RecordBuilder {
    RecordBuilder {
        record: MetricRecord {
            id: uuid::Uuid::new_v4().to_string(),
            date: date.parse().unwrap(),
            month_label: month_label.to_string(),
            source: "meta".to_string(),
            client: "c1".to_string(),
            product: "p1".to_string(),
            audience_label: audience_label.to_string(),
            ad_set_id: None,
            campaign_id: None,
            ad_account_id: None,
            investment: 100.0,
            impressions: 0,
            clicks: 0,
            link_clicks: None,
            leads: 0,
            sales: 0,
            result_count: None,
            result_type: None,
            cpr: None,
            updated_at: None,
        },
    }
}

impl RecordBuilder {
    pub fn source(mut self, source: &str) -> Self {
        self.record.source = source.into();
        self
    }

    pub fn client(mut self, client: &str) -> Self {
        self.record.client = client.into();
        self
    }

    pub fn product(mut self, product: &str) -> Self {
        self.record.product = product.into();
        self
    }

    pub fn ad_set(mut self, id: &str) -> Self {
        self.record.ad_set_id = Some(id.into());
        self
    }

    pub fn campaign(mut self, id: &str) -> Self {
        self.record.campaign_id = Some(id.into());
        self
    }

    pub fn account(mut self, id: &str) -> Self {
        self.record.ad_account_id = Some(id.into());
        self
    }

    pub fn investment(mut self, investment: f64) -> Self {
        self.record.investment = investment;
        self
    }

    pub fn impressions(mut self, impressions: u64) -> Self {
        self.record.impressions = impressions;
        self
    }

    pub fn clicks(mut self, clicks: u64) -> Self {
        self.record.clicks = clicks;
        self
    }

    pub fn link_clicks(mut self, link_clicks: u64) -> Self {
        self.record.link_clicks = Some(link_clicks);
        self
    }

    pub fn leads(mut self, leads: u64) -> Self {
        self.record.leads = leads;
        self
    }

    pub fn build(self) -> MetricRecord {
        self.record
    }
}
