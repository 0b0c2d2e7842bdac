use crate::domain::entities::details::KnownGroup;
use crate::domain::entities::metric_record::MetricRecord;
use crate::domain::values::canonical::Canonicalizer;
use crate::domain::values::group_key::GroupKey;
use std::collections::{HashMap, HashSet};

/// Resolves records to a stable `GroupKey` across renames. Built once per
/// query from a planner-registry snapshot: every known (label, ad-set id)
/// pair is canonicalized up front so lookups are pure map hits.
pub struct IdentityResolver {
    canonicalizer: Canonicalizer,
    by_canonical: HashMap<String, String>,
    known_ids: HashSet<String>,
}

impl IdentityResolver {
    pub fn new(canonicalizer: Canonicalizer, known_groups: &[KnownGroup]) -> Self {
        let mut by_canonical = HashMap::new();
        let mut known_ids = HashSet::new();
        for group in known_groups {
            let signature = canonicalizer.canonicalize(&group.audience_label);
            if !signature.is_empty() {
                by_canonical.insert(signature, group.ad_set_id.clone());
            }
            known_ids.insert(group.ad_set_id.clone());
        }
        Self {
            canonicalizer,
            by_canonical,
            known_ids,
        }
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// True when the planner has no entries for this client/product; the
    /// registry-membership rescue in the scope selector is skipped then.
    pub fn is_empty(&self) -> bool {
        self.by_canonical.is_empty() && self.known_ids.is_empty()
    }

    pub fn resolve(&self, record: &MetricRecord) -> GroupKey {
        self.resolve_label(record.ad_set_id.as_deref(), &record.audience_label)
    }

    /// Identity cascade: explicit ad-set id, then registry match on the
    /// canonical label, then a synthetic name-based key so that unresolvable
    /// records still surface instead of silently disappearing.
    pub fn resolve_label(&self, ad_set_id: Option<&str>, audience_label: &str) -> GroupKey {
        if let Some(id) = ad_set_id {
            if !id.is_empty() {
                return GroupKey::ad_set(id);
            }
        }
        let signature = self.canonicalizer.canonicalize(audience_label);
        match self.by_canonical.get(&signature) {
            Some(id) => GroupKey::ad_set(id.clone()),
            None => GroupKey::synthetic(&signature),
        }
    }

    /// Registry membership by either ad-set id or canonical label.
    pub fn matches_registry(&self, record: &MetricRecord) -> bool {
        if let Some(id) = record.ad_set_id.as_deref() {
            if self.known_ids.contains(id) {
                return true;
            }
        }
        self.by_canonical
            .contains_key(&self.canonicalizer.canonicalize(&record.audience_label))
    }
}
