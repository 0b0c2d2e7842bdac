use crate::application::aggregate::MonthGroupAggregate;
use crate::application::identity::IdentityResolver;
use crate::domain::entities::details::{AudienceSalesDetail, MonthlyPlanDetail};
use crate::domain::ports::record_store::RecordStore;
use crate::domain::values::month::Month;
use futures::stream::{self, StreamExt};
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;

/// Computes the combined ROI string per (month, group) through a cascading
/// lookup over audience-level and month-level financial records. Every
/// lookup in the cascade is best-effort: a failure reads as "no detail
/// found", never as an error.
pub struct ProfitabilityResolver {
    store: Arc<dyn RecordStore>,
    concurrency: usize,
}

struct MonthDetails {
    audience: Vec<AudienceSalesDetail>,
    plan: Option<MonthlyPlanDetail>,
}

impl ProfitabilityResolver {
    pub fn new(store: Arc<dyn RecordStore>, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Returns one formatted ROI string per aggregate, in input order.
    pub async fn resolve(
        &self,
        aggregates: &[MonthGroupAggregate],
        resolver: &IdentityResolver,
        product: &str,
        client: &str,
    ) -> Vec<String> {
        let prefetched = self.prefetch_months(aggregates, product, client).await;

        let mut out = Vec::with_capacity(aggregates.len());
        for aggregate in aggregates {
            let details = prefetched.get(&aggregate.month);
            let sales = self
                .resolve_sales(aggregate, aggregates, resolver, details, product)
                .await;
            let ticket_price = details
                .and_then(|d| d.plan.as_ref())
                .map(|p| p.ticket_price)
                .unwrap_or(0.0);
            out.push(format_roi(sales, ticket_price, aggregate.spend));
        }
        out
    }

    async fn prefetch_months(
        &self,
        aggregates: &[MonthGroupAggregate],
        product: &str,
        client: &str,
    ) -> HashMap<Month, MonthDetails> {
        let mut months: Vec<Month> = aggregates.iter().map(|a| a.month).collect();
        months.sort_unstable();
        months.dedup();

        stream::iter(months)
            .map(|month| async move {
                let audience = match self
                    .store
                    .list_audience_sales_details(month, product)
                    .await
                {
                    Ok(details) => details,
                    Err(e) => {
                        warn!("audience detail prefetch failed for {month}: {e}");
                        Vec::new()
                    }
                };
                let plan = match self
                    .store
                    .get_monthly_plan_detail(month, product, Some(client))
                    .await
                {
                    Ok(plan) => plan,
                    Err(e) => {
                        warn!("plan detail prefetch failed for {month}: {e}");
                        None
                    }
                };
                (month, MonthDetails { audience, plan })
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    /// Sales cascade for one aggregate. The single-active-group inheritance
    /// of month-level sales is a compatibility heuristic carried over from
    /// the original dashboard; it awaits product clarification and must not
    /// be changed silently.
    async fn resolve_sales(
        &self,
        aggregate: &MonthGroupAggregate,
        all: &[MonthGroupAggregate],
        resolver: &IdentityResolver,
        details: Option<&MonthDetails>,
        product: &str,
    ) -> u64 {
        let empty = Vec::new();
        let audience_details = details.map(|d| &d.audience).unwrap_or(&empty);

        // batch match by group key; canonical-name matches resolve to the
        // same key as the aggregate
        let matched = audience_details
            .iter()
            .filter(|d| {
                resolver.resolve_label(d.ad_set_id.as_deref(), &d.audience_label) == aggregate.key
            })
            .max_by_key(|d| d.sales);
        let mut sales = matched.map(|d| d.sales).unwrap_or(0);

        // the batch read can race a fresh edit; a direct re-fetch catches it
        let audience_label = matched
            .map(|d| d.audience_label.as_str())
            .unwrap_or(aggregate.latest_label.as_str());
        match self
            .store
            .get_audience_sales_detail(aggregate.month, product, audience_label)
            .await
        {
            Ok(Some(fresh)) => sales = sales.max(fresh.sales),
            Ok(None) => {}
            Err(e) => warn!(
                "direct audience detail lookup failed for {} {}: {e}",
                aggregate.month, audience_label
            ),
        }

        let active_in_month = all
            .iter()
            .filter(|a| a.month == aggregate.month && a.spend > 0.0)
            .count();
        if active_in_month == 1 {
            let plan_sales = details
                .and_then(|d| d.plan.as_ref())
                .map(|p| p.sales)
                .unwrap_or(0);
            if plan_sales > sales {
                sales = plan_sales;
            } else if plan_sales == 0 {
                let summed: u64 = audience_details.iter().map(|d| d.sales).sum();
                if summed > sales {
                    sales = summed;
                }
            }
        }

        sales
    }
}

fn format_roi(sales: u64, ticket_price: f64, spend: f64) -> String {
    if sales == 0 || spend <= 0.0 {
        return "0% (0.0x)".to_string();
    }
    let revenue = sales as f64 * ticket_price;
    let profit = revenue - spend;
    let roi_percent = profit / spend * 100.0;
    let multiplier = revenue / spend;
    format!("{}% ({multiplier:.1}x)", roi_percent.round() as i64)
}
