pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::history::HistoryUseCase;
use crate::application::ingest::IngestUseCase;
use crate::domain::entities::details::{AudienceSalesDetail, KnownGroup, MonthlyPlanDetail};
use crate::domain::entities::metric_record::MetricRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::ads_platform::AdsPlatform;
use crate::domain::ports::planner_registry::PlannerRegistry;
use crate::domain::ports::record_store::{RecordStore, StoreStats};
use crate::infrastructure::platform::http::HttpAdsPlatform;
use crate::infrastructure::platform::noop::NoopPlatform;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::store::SqliteStore;
use rusqlite::Connection;
use std::sync::Arc;

pub use crate::application::history::{HistoryConfig, HistoryOptions, HistoryRow};

pub struct AdLens {
    history_uc: HistoryUseCase,
    ingest_uc: IngestUseCase,
}

impl AdLens {
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let provider = std::env::var("ADLENS_PLATFORM").unwrap_or_else(|_| "noop".into());
        let token = std::env::var("ADLENS_PLATFORM_TOKEN").unwrap_or_default();

        let platform: Arc<dyn AdsPlatform> = match provider.as_str() {
            "graph" => Arc::new(HttpAdsPlatform::new(token, None)),
            _ => Arc::new(NoopPlatform),
        };

        Self::with_providers(db_path, platform, HistoryConfig::default())
    }

    pub fn with_providers(
        db_path: &str,
        platform: Arc<dyn AdsPlatform>,
        config: HistoryConfig,
    ) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Store(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Store(format!("WAL error: {e}")))?;

        run_migrations(&conn)?;

        let store = Arc::new(SqliteStore::new(conn));
        let record_store: Arc<dyn RecordStore> = store.clone();
        let planner: Arc<dyn PlannerRegistry> = store;

        Ok(Self {
            history_uc: HistoryUseCase::new(
                record_store.clone(),
                planner.clone(),
                platform,
                config,
            ),
            ingest_uc: IngestUseCase::new(record_store, planner),
        })
    }

    // Delegating methods
    pub async fn get_history(
        &self,
        client: &str,
        product: &str,
        options: &HistoryOptions,
    ) -> Result<Vec<HistoryRow>, DomainError> {
        self.history_uc.execute(client, product, options).await
    }

    pub async fn add_record(&self, record: &MetricRecord) -> Result<(), DomainError> {
        self.ingest_uc.add_record(record).await
    }

    pub async fn set_audience_sales(&self, detail: &AudienceSalesDetail) -> Result<(), DomainError> {
        self.ingest_uc.set_audience_sales(detail).await
    }

    pub async fn set_monthly_plan(&self, detail: &MonthlyPlanDetail) -> Result<(), DomainError> {
        self.ingest_uc.set_monthly_plan(detail).await
    }

    pub async fn add_known_group(&self, group: &KnownGroup) -> Result<(), DomainError> {
        self.ingest_uc.add_known_group(group).await
    }

    pub async fn stats(&self) -> Result<StoreStats, DomainError> {
        self.ingest_uc.stats().await
    }
}
