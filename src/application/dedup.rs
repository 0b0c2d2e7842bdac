use crate::domain::entities::metric_record::MetricRecord;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Authority rule shared by both dedup passes: the later `updated_at` wins;
/// when either side lacks one, the larger investment wins. The remaining
/// comparisons make the rule a total order over distinct records so that
/// results never depend on input order.
pub fn supersedes(candidate: &MetricRecord, incumbent: &MetricRecord) -> bool {
    match (candidate.updated_at, incumbent.updated_at) {
        (Some(a), Some(b)) if a != b => a > b,
        _ => {
            if candidate.investment != incumbent.investment {
                return candidate.investment > incumbent.investment;
            }
            if candidate.impressions != incumbent.impressions {
                return candidate.impressions > incumbent.impressions;
            }
            if candidate.clicks != incumbent.clicks {
                return candidate.clicks > incumbent.clicks;
            }
            candidate.id > incumbent.id
        }
    }
}

/// Global pass: collapses literal duplicate writes of the same report row
/// before any identity resolution happens. Output is sorted by (date, id)
/// so downstream stages see a stable order.
pub fn dedup_global(records: Vec<MetricRecord>) -> Vec<MetricRecord> {
    type Key = (NaiveDate, Option<String>, Option<String>, String);
    let mut kept: HashMap<Key, MetricRecord> = HashMap::new();
    for record in records {
        let key = (
            record.date,
            record.campaign_id.clone(),
            record.ad_set_id.clone(),
            record.audience_label.clone(),
        );
        match kept.get(&key) {
            Some(incumbent) if !supersedes(&record, incumbent) => {}
            _ => {
                kept.insert(key, record);
            }
        }
    }
    let mut out: Vec<MetricRecord> = kept.into_values().collect();
    out.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
    out
}

/// Per-group pass: within one (month, group) bucket two writes for the same
/// day are the same fact even when their labels differed before identity
/// resolution.
pub fn dedup_by_date(records: Vec<MetricRecord>) -> Vec<MetricRecord> {
    let mut kept: HashMap<NaiveDate, MetricRecord> = HashMap::new();
    for record in records {
        match kept.get(&record.date) {
            Some(incumbent) if !supersedes(&record, incumbent) => {}
            _ => {
                kept.insert(record.date, record);
            }
        }
    }
    let mut out: Vec<MetricRecord> = kept.into_values().collect();
    out.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
    out
}
