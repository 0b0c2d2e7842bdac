use crate::domain::error::DomainError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Advertising-platform seam, used only for the link-click fallback when a
/// month of records carries no link-click figures at all. Best-effort: a
/// failure here is recovered by the aggregator, never propagated.
#[async_trait]
pub trait AdsPlatform: Send + Sync {
    async fn get_link_clicks(
        &self,
        ad_set_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, DomainError>;

    /// Adapter name for logging.
    fn name(&self) -> &str;
}
