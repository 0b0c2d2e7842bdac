use crate::domain::entities::details::{AudienceSalesDetail, KnownGroup, MonthlyPlanDetail};
use crate::domain::entities::metric_record::MetricRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::planner_registry::PlannerRegistry;
use crate::domain::ports::record_store::{RecordFilter, RecordStore, StoreStats};
use crate::domain::values::month::Month;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use log::warn;
use rusqlite::{params, Connection};
use std::sync::Mutex;

const RECORD_COLS: &str = "id, date, month_label, source, client, product, audience_label, ad_set_id, campaign_id, ad_account_id, investment, impressions, clicks, link_clicks, leads, sales, result_count, result_type, cpr, updated_at";

/// Local SQLite rendition of the remote document store. Serves both the
/// record/detail queries and the planner registry.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<MetricRecord, rusqlite::Error> {
        let date_str: String = row.get(1)?;
        let updated_str: Option<String> = row.get(19)?;
        Ok(MetricRecord {
            id: row.get(0)?,
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_else(|_| {
                warn!("invalid date '{date_str}' in record, defaulting to epoch");
                NaiveDate::default()
            }),
            month_label: row.get(2)?,
            source: row.get(3)?,
            client: row.get(4)?,
            product: row.get(5)?,
            audience_label: row.get(6)?,
            ad_set_id: row.get(7)?,
            campaign_id: row.get(8)?,
            ad_account_id: row.get(9)?,
            investment: row.get(10)?,
            impressions: row.get::<_, i64>(11)?.max(0) as u64,
            clicks: row.get::<_, i64>(12)?.max(0) as u64,
            link_clicks: row.get::<_, Option<i64>>(13)?.map(|v| v.max(0) as u64),
            leads: row.get::<_, i64>(14)?.max(0) as u64,
            sales: row.get::<_, i64>(15)?.max(0) as u64,
            result_count: row.get::<_, Option<i64>>(16)?.map(|v| v.max(0) as u64),
            result_type: row.get(17)?,
            cpr: row.get(18)?,
            updated_at: updated_str.and_then(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .ok()
            }),
        })
    }

    fn row_to_audience_detail(row: &rusqlite::Row) -> Result<AudienceSalesDetail, rusqlite::Error> {
        Ok(AudienceSalesDetail {
            month_label: row.get(0)?,
            product: row.get(1)?,
            audience_label: row.get(2)?,
            ad_set_id: row.get(3)?,
            sales: row.get::<_, i64>(4)?.max(0) as u64,
            appointments: row.get::<_, i64>(5)?.max(0) as u64,
            ticket_price: row.get(6)?,
        })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn query_records(&self, filter: &RecordFilter) -> Result<Vec<MetricRecord>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut sql = format!("SELECT {RECORD_COLS} FROM metric_records WHERE product = ?1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
            vec![Box::new(filter.product.clone())];
        if let Some(client) = &filter.client {
            sql.push_str(" AND client = ?2");
            param_values.push(Box::new(client.clone()));
        }
        sql.push_str(" ORDER BY date ASC");

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let records = stmt
            .query_map(params_refs.as_slice(), Self::row_to_record)
            .map_err(|e| DomainError::Store(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    async fn get_audience_sales_detail(
        &self,
        month: Month,
        product: &str,
        audience: &str,
    ) -> Result<Option<AudienceSalesDetail>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT month_label, product, audience_label, ad_set_id, sales, appointments, ticket_price
                 FROM audience_sales_details
                 WHERE month_label = ?1 AND product = ?2 AND audience_label = ?3",
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut rows = stmt
            .query_map(
                params![month.label(), product, audience],
                Self::row_to_audience_detail,
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    async fn list_audience_sales_details(
        &self,
        month: Month,
        product: &str,
    ) -> Result<Vec<AudienceSalesDetail>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT month_label, product, audience_label, ad_set_id, sales, appointments, ticket_price
                 FROM audience_sales_details
                 WHERE month_label = ?1 AND product = ?2",
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let details = stmt
            .query_map(params![month.label(), product], Self::row_to_audience_detail)
            .map_err(|e| DomainError::Store(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(details)
    }

    async fn get_monthly_plan_detail(
        &self,
        month: Month,
        product: &str,
        client: Option<&str>,
    ) -> Result<Option<MonthlyPlanDetail>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT month_label, product, client, sales, ticket_price
                 FROM monthly_plan_details
                 WHERE month_label = ?1 AND product = ?2
                   AND (?3 IS NULL OR client IS NULL OR client = ?3)",
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![month.label(), product, client], |row| {
                Ok(MonthlyPlanDetail {
                    month_label: row.get(0)?,
                    product: row.get(1)?,
                    client: row.get(2)?,
                    sales: row.get::<_, i64>(3)?.max(0) as u64,
                    ticket_price: row.get(4)?,
                })
            })
            .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    async fn add_record(&self, record: &MetricRecord) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        conn.execute(
            "INSERT INTO metric_records (id, date, month_label, source, client, product, audience_label, ad_set_id, campaign_id, ad_account_id, investment, impressions, clicks, link_clicks, leads, sales, result_count, result_type, cpr, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            params![
                record.id,
                record.date.format("%Y-%m-%d").to_string(),
                record.month_label,
                record.source,
                record.client,
                record.product,
                record.audience_label,
                record.ad_set_id,
                record.campaign_id,
                record.ad_account_id,
                record.investment,
                record.impressions as i64,
                record.clicks as i64,
                record.link_clicks.map(|v| v as i64),
                record.leads as i64,
                record.sales as i64,
                record.result_count.map(|v| v as i64),
                record.result_type,
                record.cpr,
                record.updated_at.map(|dt| dt.to_rfc3339()),
            ],
        )
        .map_err(|e| DomainError::Store(format!("Failed to add record: {e}")))?;
        Ok(())
    }

    async fn put_audience_sales_detail(
        &self,
        detail: &AudienceSalesDetail,
    ) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO audience_sales_details (month_label, product, audience_label, ad_set_id, sales, appointments, ticket_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                detail.month_label,
                detail.product,
                detail.audience_label,
                detail.ad_set_id,
                detail.sales as i64,
                detail.appointments as i64,
                detail.ticket_price,
            ],
        )
        .map_err(|e| DomainError::Store(format!("Failed to put audience detail: {e}")))?;
        Ok(())
    }

    async fn put_monthly_plan_detail(
        &self,
        detail: &MonthlyPlanDetail,
    ) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO monthly_plan_details (month_label, product, client, sales, ticket_price)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                detail.month_label,
                detail.product,
                detail.client,
                detail.sales as i64,
                detail.ticket_price,
            ],
        )
        .map_err(|e| DomainError::Store(format!("Failed to put plan detail: {e}")))?;
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let total: usize = conn
            .query_row("SELECT COUNT(*) FROM metric_records", [], |r| r.get(0))
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT product, COUNT(*) FROM metric_records GROUP BY product ORDER BY 2 DESC")
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let by_product: Vec<(String, usize)> = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?)))
            .map_err(|e| DomainError::Store(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        let mut stmt = conn
            .prepare("SELECT source, COUNT(*) FROM metric_records GROUP BY source ORDER BY 2 DESC")
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let by_source: Vec<(String, usize)> = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?)))
            .map_err(|e| DomainError::Store(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(StoreStats {
            total_records: total,
            by_product,
            by_source,
        })
    }
}

#[async_trait]
impl PlannerRegistry for SqliteStore {
    async fn list_known_groups(
        &self,
        client: &str,
        product: &str,
    ) -> Result<Vec<KnownGroup>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT client, product, audience_label, ad_set_id FROM planner_groups
                 WHERE client = ?1 AND product = ?2",
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let groups = stmt
            .query_map(params![client, product], |row| {
                Ok(KnownGroup {
                    client: row.get(0)?,
                    product: row.get(1)?,
                    audience_label: row.get(2)?,
                    ad_set_id: row.get(3)?,
                })
            })
            .map_err(|e| DomainError::Store(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(groups)
    }

    async fn add_known_group(&self, group: &KnownGroup) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO planner_groups (client, product, audience_label, ad_set_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                group.client,
                group.product,
                group.audience_label,
                group.ad_set_id,
            ],
        )
        .map_err(|e| DomainError::Store(format!("Failed to add planner group: {e}")))?;
        Ok(())
    }
}
