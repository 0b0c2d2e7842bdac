use crate::application::identity::IdentityResolver;
use crate::domain::entities::metric_record::MetricRecord;
use crate::domain::values::group_key::GroupKey;
use std::collections::HashMap;

/// Caller-supplied selection context. The engine reads it, never owns it.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub ad_account_id: Option<String>,
    pub campaign_id: Option<String>,
    pub only_primary_group: bool,
}

/// Narrows the record set for aggregation. Every narrowing step is
/// reversible: a filter that would erase all data for a month is skipped for
/// that month, so a genuinely empty result means no qualifying spend exists,
/// not that a filter misfired.
pub struct ScopeSelector<'a> {
    resolver: &'a IdentityResolver,
    source_tag: &'a str,
}

impl<'a> ScopeSelector<'a> {
    pub fn new(resolver: &'a IdentityResolver, source_tag: &'a str) -> Self {
        Self {
            resolver,
            source_tag,
        }
    }

    pub fn select(&self, records: &[MetricRecord], selection: &Selection) -> Vec<MetricRecord> {
        let source_filtered: Vec<MetricRecord> = records
            .iter()
            .filter(|r| r.source == self.source_tag)
            .cloned()
            .collect();

        let mut scoped = source_filtered.clone();
        if let Some(account) = selection.ad_account_id.as_deref() {
            scoped = narrow_per_month(scoped, |r| r.ad_account_id.as_deref() == Some(account));
        }
        if let Some(campaign) = selection.campaign_id.as_deref() {
            scoped = narrow_per_month(scoped, |r| r.campaign_id.as_deref() == Some(campaign));
        }

        // Very thin results usually mean the account/campaign context is off;
        // a registry-membership match is then the better cut, adopted only
        // when it is strictly larger.
        if scoped.len() <= 3 && !self.resolver.is_empty() {
            let by_registry: Vec<MetricRecord> = source_filtered
                .iter()
                .filter(|r| self.resolver.matches_registry(r))
                .cloned()
                .collect();
            if by_registry.len() > scoped.len() {
                scoped = by_registry;
            }
        }

        if scoped.is_empty() {
            scoped = source_filtered;
        }

        // no delivery that day
        scoped.retain(|r| r.investment > 0.0);

        if selection.only_primary_group {
            if let Some(primary) = self.pick_primary(&scoped) {
                scoped.retain(|r| self.resolver.resolve(r) == primary);
            }
        }

        scoped
    }

    /// The "primary" group is the top spender in the most recent month with
    /// any positive spend; when that month yields nothing, the group that was
    /// active latest, tie-broken by all-time spend.
    fn pick_primary(&self, records: &[MetricRecord]) -> Option<GroupKey> {
        struct Activity {
            latest_ordinal: i64,
            total_spend: f64,
            spend_by_month: HashMap<i64, f64>,
        }

        let mut groups: HashMap<GroupKey, Activity> = HashMap::new();
        let mut latest_with_spend: Option<i64> = None;

        for record in records {
            let key = self.resolver.resolve(record);
            let ordinal = record.month().ordinal();
            if record.investment > 0.0 {
                latest_with_spend = Some(latest_with_spend.map_or(ordinal, |l| l.max(ordinal)));
            }
            let activity = groups.entry(key).or_insert_with(|| Activity {
                latest_ordinal: ordinal,
                total_spend: 0.0,
                spend_by_month: HashMap::new(),
            });
            activity.latest_ordinal = activity.latest_ordinal.max(ordinal);
            activity.total_spend += record.investment;
            *activity.spend_by_month.entry(ordinal).or_insert(0.0) += record.investment;
        }

        let latest = latest_with_spend?;

        let mut in_latest: Vec<(&GroupKey, f64)> = groups
            .iter()
            .filter_map(|(key, activity)| {
                let spend = activity.spend_by_month.get(&latest).copied().unwrap_or(0.0);
                (spend > 0.0).then_some((key, spend))
            })
            .collect();
        in_latest.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        if let Some((key, _)) = in_latest.first() {
            return Some((*key).clone());
        }

        let mut by_activity: Vec<(&GroupKey, i64, f64)> = groups
            .iter()
            .map(|(key, a)| (key, a.latest_ordinal, a.total_spend))
            .collect();
        by_activity.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| {
                    b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.0.cmp(b.0))
        });
        by_activity.first().map(|(key, _, _)| (*key).clone())
    }
}

/// Applies `keep` month by month, retaining the unfiltered slice for any
/// month the filter would empty.
fn narrow_per_month<F>(records: Vec<MetricRecord>, keep: F) -> Vec<MetricRecord>
where
    F: Fn(&MetricRecord) -> bool,
{
    let mut by_month: HashMap<i64, Vec<MetricRecord>> = HashMap::new();
    for record in records {
        by_month
            .entry(record.month().ordinal())
            .or_default()
            .push(record);
    }

    let mut ordinals: Vec<i64> = by_month.keys().copied().collect();
    ordinals.sort_unstable();

    let mut out = Vec::new();
    for ordinal in ordinals {
        let slice = by_month.remove(&ordinal).unwrap_or_default();
        let narrowed: Vec<MetricRecord> = slice.iter().filter(|r| keep(r)).cloned().collect();
        if narrowed.is_empty() {
            out.extend(slice);
        } else {
            out.extend(narrowed);
        }
    }
    out
}
