use crate::application::dedup::supersedes;
use crate::application::identity::IdentityResolver;
use crate::domain::entities::metric_record::MetricRecord;
use crate::domain::values::canonical::clean_whitespace;
use crate::domain::values::group_key::GroupKey;
use std::collections::HashMap;

/// Chooses the current human name for each group: renamed groups show their
/// latest label even in rows for old months. Built from the full record
/// history, not the scoped subset, so the scan sees every rename.
pub struct DisplayNames {
    latest: HashMap<GroupKey, String>,
}

impl DisplayNames {
    pub fn build(records: &[MetricRecord], resolver: &IdentityResolver) -> Self {
        let mut best: HashMap<GroupKey, (i64, &MetricRecord)> = HashMap::new();
        for record in records {
            let key = resolver.resolve(record);
            let ordinal = record.month().ordinal();
            match best.get(&key) {
                Some((seen, incumbent))
                    if ordinal < *seen || (ordinal == *seen && !supersedes(record, incumbent)) => {}
                _ => {
                    best.insert(key, (ordinal, record));
                }
            }
        }
        let latest = best
            .into_iter()
            .map(|(key, (_, record))| (key, clean_whitespace(&record.audience_label)))
            .collect();
        Self { latest }
    }

    /// The fallback label only fires for keys the full scan never saw, which
    /// should not normally happen.
    pub fn get(&self, key: &GroupKey, fallback_label: &str) -> String {
        self.latest
            .get(key)
            .cloned()
            .unwrap_or_else(|| clean_whitespace(fallback_label))
    }
}
