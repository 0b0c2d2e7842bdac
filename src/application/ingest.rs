use crate::domain::entities::details::{AudienceSalesDetail, KnownGroup, MonthlyPlanDetail};
use crate::domain::entities::metric_record::MetricRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::planner_registry::PlannerRegistry;
use crate::domain::ports::record_store::{RecordStore, StoreStats};
use crate::domain::values::month::Month;
use std::sync::Arc;

/// Append-only writes into the document store and planner registry. The
/// history engine itself never mutates anything; this is the operator path
/// used by the sync job and the manual detail editors.
pub struct IngestUseCase {
    store: Arc<dyn RecordStore>,
    planner: Arc<dyn PlannerRegistry>,
}

impl IngestUseCase {
    pub fn new(store: Arc<dyn RecordStore>, planner: Arc<dyn PlannerRegistry>) -> Self {
        Self { store, planner }
    }

    pub async fn add_record(&self, record: &MetricRecord) -> Result<(), DomainError> {
        if record.investment < 0.0 {
            return Err(DomainError::InvalidInput(
                "investment must be non-negative".into(),
            ));
        }
        if record.cpr.is_some_and(|cpr| cpr < 0.0) {
            return Err(DomainError::InvalidInput("cpr must be non-negative".into()));
        }
        if record.product.is_empty() || record.client.is_empty() {
            return Err(DomainError::InvalidInput(
                "client and product are required".into(),
            ));
        }
        self.store.add_record(record).await
    }

    pub async fn set_audience_sales(&self, detail: &AudienceSalesDetail) -> Result<(), DomainError> {
        detail
            .month_label
            .parse::<Month>()
            .map_err(DomainError::Parse)?;
        if detail.audience_label.is_empty() {
            return Err(DomainError::InvalidInput("audience_label is required".into()));
        }
        self.store.put_audience_sales_detail(detail).await
    }

    pub async fn set_monthly_plan(&self, detail: &MonthlyPlanDetail) -> Result<(), DomainError> {
        detail
            .month_label
            .parse::<Month>()
            .map_err(DomainError::Parse)?;
        self.store.put_monthly_plan_detail(detail).await
    }

    pub async fn add_known_group(&self, group: &KnownGroup) -> Result<(), DomainError> {
        if group.ad_set_id.is_empty() || group.audience_label.is_empty() {
            return Err(DomainError::InvalidInput(
                "audience_label and ad_set_id are required".into(),
            ));
        }
        self.planner.add_known_group(group).await
    }

    pub async fn stats(&self) -> Result<StoreStats, DomainError> {
        self.store.stats().await
    }
}
