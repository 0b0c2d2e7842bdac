use serde::{Deserialize, Serialize};

/// Audience-level financial outcome for one month, edited by users
/// independently of the report sync. May lag behind reality or be missing;
/// the profitability cascade treats it as best-effort input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceSalesDetail {
    pub month_label: String,
    pub product: String,
    pub audience_label: String,
    #[serde(default)]
    pub ad_set_id: Option<String>,
    #[serde(default)]
    pub sales: u64,
    #[serde(default)]
    pub appointments: u64,
    #[serde(default)]
    pub ticket_price: f64,
}

/// Month-level plan figures for one product: coarser fallback source for
/// sales counts and the ticket price used to turn sales into revenue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyPlanDetail {
    pub month_label: String,
    pub product: String,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub sales: u64,
    #[serde(default)]
    pub ticket_price: f64,
}

/// A (label, ad-set id) pair from the planner: the registry ground truth used
/// to resolve renamed groups back to their stable id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownGroup {
    pub client: String,
    pub product: String,
    pub audience_label: String,
    pub ad_set_id: String,
}
