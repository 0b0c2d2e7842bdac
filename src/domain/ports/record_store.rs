use crate::domain::entities::details::{AudienceSalesDetail, MonthlyPlanDetail};
use crate::domain::entities::metric_record::MetricRecord;
use crate::domain::error::DomainError;
use crate::domain::values::month::Month;
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub product: String,
    pub client: Option<String>,
}

/// Sync-health readout for the operator surface.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StoreStats {
    pub total_records: usize,
    pub by_product: Vec<(String, usize)>,
    pub by_source: Vec<(String, usize)>,
}

/// Document-store seam. A failing record query is terminal for the whole
/// history computation; detail lookups are best-effort and callers default
/// them to "no detail found".
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query_records(&self, filter: &RecordFilter) -> Result<Vec<MetricRecord>, DomainError>;

    async fn get_audience_sales_detail(
        &self,
        month: Month,
        product: &str,
        audience: &str,
    ) -> Result<Option<AudienceSalesDetail>, DomainError>;

    async fn list_audience_sales_details(
        &self,
        month: Month,
        product: &str,
    ) -> Result<Vec<AudienceSalesDetail>, DomainError>;

    async fn get_monthly_plan_detail(
        &self,
        month: Month,
        product: &str,
        client: Option<&str>,
    ) -> Result<Option<MonthlyPlanDetail>, DomainError>;

    /// Appends one immutable record. Ingest-only; the engine never rewrites
    /// or deletes existing facts.
    async fn add_record(&self, record: &MetricRecord) -> Result<(), DomainError>;

    async fn put_audience_sales_detail(
        &self,
        detail: &AudienceSalesDetail,
    ) -> Result<(), DomainError>;

    async fn put_monthly_plan_detail(&self, detail: &MonthlyPlanDetail)
        -> Result<(), DomainError>;

    async fn stats(&self) -> Result<StoreStats, DomainError>;
}
