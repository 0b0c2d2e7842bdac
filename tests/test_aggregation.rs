//! Metric aggregation through the facade, including the link-click
//! fallback against a scriptable platform adapter.

mod common;

use adlens::domain::error::DomainError;
use adlens::domain::ports::ads_platform::AdsPlatform;
use adlens::HistoryOptions;
use async_trait::async_trait;
use chrono::NaiveDate;
use common::record;
use std::sync::Arc;

struct ScriptedPlatform {
    outcome: Result<u64, &'static str>,
}

#[async_trait]
impl AdsPlatform for ScriptedPlatform {
    async fn get_link_clicks(
        &self,
        _ad_set_id: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<u64, DomainError> {
        self.outcome
            .map_err(|e| DomainError::Platform(e.to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[tokio::test]
async fn test_link_clicks_drive_ctr_and_cpc() {
    let lens = common::setup();
    lens.add_record(
        &record("January 2025", "2025-01-10", "Women")
            .ad_set("as1")
            .investment(100.0)
            .impressions(10_000)
            .clicks(500)
            .link_clicks(200)
            .build(),
    )
    .await
    .unwrap();

    let rows = lens
        .get_history("c1", "p1", &HistoryOptions::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!((rows[0].ctr - 2.0).abs() < 1e-9);
    assert!((rows[0].cpc - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_platform_fallback_fills_missing_link_clicks() {
    let lens = common::setup_with_platform(Arc::new(ScriptedPlatform { outcome: Ok(80) }));
    lens.add_record(
        &record("January 2025", "2025-01-10", "Women")
            .ad_set("as1")
            .investment(400.0)
            .impressions(10_000)
            .clicks(50)
            .build(),
    )
    .await
    .unwrap();

    let rows = lens
        .get_history("c1", "p1", &HistoryOptions::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!((rows[0].cpc - 5.0).abs() < 1e-9);
    assert!((rows[0].ctr - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_platform_failure_degrades_to_summed_clicks() {
    let lens = common::setup_with_platform(Arc::new(ScriptedPlatform {
        outcome: Err("insights down"),
    }));
    lens.add_record(
        &record("January 2025", "2025-01-10", "Women")
            .ad_set("as1")
            .investment(500.0)
            .impressions(10_000)
            .clicks(200)
            .build(),
    )
    .await
    .unwrap();

    let rows = lens
        .get_history("c1", "p1", &HistoryOptions::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1, "One degraded row beats zero rows");
    assert!((rows[0].ctr - 2.0).abs() < 1e-9);
    assert!((rows[0].cpc - 2.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_cpr_prefers_conversions_over_reported_cpr() {
    let lens = common::setup();
    lens.add_record(
        &record("January 2025", "2025-01-10", "Women")
            .ad_set("as1")
            .investment(100.0)
            .leads(4)
            .build(),
    )
    .await
    .unwrap();

    let rows = lens
        .get_history("c1", "p1", &HistoryOptions::default())
        .await
        .unwrap();
    assert!((rows[0].cpr - 25.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_zero_impressions_yield_zero_ratios() {
    let lens = common::setup();
    lens.add_record(
        &record("January 2025", "2025-01-10", "Women")
            .ad_set("as1")
            .investment(100.0)
            .build(),
    )
    .await
    .unwrap();

    let rows = lens
        .get_history("c1", "p1", &HistoryOptions::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cpm, 0.0);
    assert_eq!(rows[0].cpc, 0.0);
    assert_eq!(rows[0].ctr, 0.0);
}
