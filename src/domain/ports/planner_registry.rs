use crate::domain::entities::details::KnownGroup;
use crate::domain::error::DomainError;
use async_trait::async_trait;

/// Planner seam: the externally maintained mapping from audience labels to
/// stable ad-set ids, scoped by client and product.
#[async_trait]
pub trait PlannerRegistry: Send + Sync {
    async fn list_known_groups(
        &self,
        client: &str,
        product: &str,
    ) -> Result<Vec<KnownGroup>, DomainError>;

    async fn add_known_group(&self, group: &KnownGroup) -> Result<(), DomainError>;
}
