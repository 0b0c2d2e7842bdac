use crate::domain::values::month::Month;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One daily performance fact as written by a report sync. Records are
/// append-only: a logical fact may exist in several superseded copies, which
/// the deduplicator collapses at read time. Nothing here is ever mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(default = "new_record_id")]
    pub id: String,
    pub date: NaiveDate,
    /// Human month label at write time, e.g. "August 2025".
    pub month_label: String,
    /// Report source tag. Only the authoritative platform tag participates in
    /// history reconciliation.
    pub source: String,
    pub client: String,
    pub product: String,
    /// Free-text group name at the time of the write; groups get renamed.
    pub audience_label: String,
    #[serde(default)]
    pub ad_set_id: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub ad_account_id: Option<String>,
    /// Spend for the day, in account currency.
    pub investment: f64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    /// More specific click count, when the platform reported one.
    #[serde(default)]
    pub link_clicks: Option<u64>,
    #[serde(default)]
    pub leads: u64,
    #[serde(default)]
    pub sales: u64,
    /// Generic conversion count and its kind, when neither leads nor sales
    /// apply.
    #[serde(default)]
    pub result_count: Option<u64>,
    #[serde(default)]
    pub result_type: Option<String>,
    /// Precomputed cost-per-result carried by some report rows.
    #[serde(default)]
    pub cpr: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl MetricRecord {
    /// Calendar month this record belongs to. The human label wins when it
    /// parses; otherwise the month is derived from the record date.
    pub fn month(&self) -> Month {
        self.month_label
            .parse()
            .unwrap_or_else(|_| Month::from_date(self.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(month_label: &str, date: &str) -> MetricRecord {
        MetricRecord {
            id: new_record_id(),
            date: date.parse().unwrap(),
            month_label: month_label.to_string(),
            source: "meta".into(),
            client: "c1".into(),
            product: "p1".into(),
            audience_label: "Women".into(),
            ad_set_id: None,
            campaign_id: None,
            ad_account_id: None,
            investment: 10.0,
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

    #[test]
    fn test_month_prefers_label() {
        // label says March even though the date slipped into April
        let r = record("March 2025", "2025-04-01");
        assert_eq!(r.month(), Month::new(2025, 3).unwrap());
    }

    #[test]
    fn test_month_falls_back_to_date() {
        let r = record("not a month", "2025-04-01");
        assert_eq!(r.month(), Month::new(2025, 4).unwrap());
    }
}
