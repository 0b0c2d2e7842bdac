use crate::domain::error::DomainError;
use crate::domain::ports::ads_platform::AdsPlatform;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Inert platform adapter for offline use: reports no link clicks, which
/// leaves summed record clicks in place.
pub struct NoopPlatform;

#[async_trait]
impl AdsPlatform for NoopPlatform {
    async fn get_link_clicks(
        &self,
        _ad_set_id: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<u64, DomainError> {
        Ok(0)
    }

    fn name(&self) -> &str {
        "noop"
    }
}
