//! Selection-context behavior through the facade: account/campaign
//! narrowing with empty-guards and primary-group mode.

mod common;

use adlens::HistoryOptions;
use common::record;

#[tokio::test]
async fn test_account_narrowing_applies_per_month() {
    let lens = common::setup();
    lens.add_record(
        &record("January 2025", "2025-01-10", "Women")
            .ad_set("as1")
            .account("acc1")
            .build(),
    )
    .await
    .unwrap();
    lens.add_record(
        &record("January 2025", "2025-01-11", "Men")
            .ad_set("as2")
            .account("acc2")
            .build(),
    )
    .await
    .unwrap();
    // February has no acc1 data at all; the filter is skipped there
    lens.add_record(
        &record("February 2025", "2025-02-10", "Men")
            .ad_set("as2")
            .account("acc2")
            .build(),
    )
    .await
    .unwrap();

    let rows = lens
        .get_history(
            "c1",
            "p1",
            &HistoryOptions {
                ad_account_id: Some("acc1".into()),
                ..HistoryOptions::default()
            },
        )
        .await
        .unwrap();

    let names: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.month.as_str(), r.display_name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![("February 2025", "Men"), ("January 2025", "Women")]
    );
}

#[tokio::test]
async fn test_campaign_narrowing_with_empty_guard() {
    let lens = common::setup();
    lens.add_record(
        &record("January 2025", "2025-01-10", "Women")
            .ad_set("as1")
            .campaign("camp1")
            .build(),
    )
    .await
    .unwrap();
    lens.add_record(
        &record("January 2025", "2025-01-11", "Men")
            .ad_set("as2")
            .campaign("camp2")
            .build(),
    )
    .await
    .unwrap();

    // camp3 matches nothing: the January slice survives unfiltered
    let rows = lens
        .get_history(
            "c1",
            "p1",
            &HistoryOptions {
                campaign_id: Some("camp3".into()),
                ..HistoryOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let narrowed = lens
        .get_history(
            "c1",
            "p1",
            &HistoryOptions {
                campaign_id: Some("camp1".into()),
                ..HistoryOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].display_name, "Women");
}

#[tokio::test]
async fn test_primary_group_mode_keeps_only_top_spender() {
    let lens = common::setup();
    // Women leads all-time, Men leads the latest month
    lens.add_record(
        &record("January 2025", "2025-01-10", "Women")
            .ad_set("as1")
            .investment(500.0)
            .build(),
    )
    .await
    .unwrap();
    lens.add_record(
        &record("February 2025", "2025-02-10", "Women")
            .ad_set("as1")
            .investment(30.0)
            .build(),
    )
    .await
    .unwrap();
    lens.add_record(
        &record("February 2025", "2025-02-10", "Men")
            .ad_set("as2")
            .investment(80.0)
            .build(),
    )
    .await
    .unwrap();

    let rows = lens
        .get_history(
            "c1",
            "p1",
            &HistoryOptions {
                only_primary_group: true,
                ..HistoryOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].display_name, "Men");
    assert_eq!(rows[0].month, "February 2025");
}

#[tokio::test]
async fn test_zero_spend_days_do_not_surface() {
    let lens = common::setup();
    lens.add_record(
        &record("January 2025", "2025-01-10", "Women")
            .ad_set("as1")
            .investment(0.0)
            .build(),
    )
    .await
    .unwrap();

    let rows = lens
        .get_history("c1", "p1", &HistoryOptions::default())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_non_platform_sources_are_ignored() {
    let lens = common::setup();
    lens.add_record(
        &record("January 2025", "2025-01-10", "Manual entry")
            .source("spreadsheet")
            .build(),
    )
    .await
    .unwrap();

    let rows = lens
        .get_history("c1", "p1", &HistoryOptions::default())
        .await
        .unwrap();
    assert!(rows.is_empty());
}
