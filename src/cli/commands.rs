use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "adlens", about = "Campaign-group history reconciliation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Append a daily metric record
    RecordAdd {
        /// JSON with date, month_label, source, client, product,
        /// audience_label, investment and the optional metric fields
        json: String,
    },
    /// Print the reconciled per-month history table
    History {
        client: String,
        product: String,
        /// Keep only the primary group (top spender of the latest month)
        #[arg(long)]
        primary_group: bool,
        /// Narrow to one ad account where possible
        #[arg(long)]
        account: Option<String>,
        /// Narrow to one campaign where possible
        #[arg(long)]
        campaign: Option<String>,
    },
    /// Upsert an audience-level sales detail
    SalesSet {
        /// JSON with month_label, product, audience_label, sales,
        /// appointments, ticket_price and optional ad_set_id
        json: String,
    },
    /// Upsert a month-level plan detail
    PlanSet {
        /// JSON with month_label, product, sales, ticket_price and optional
        /// client
        json: String,
    },
    /// Register a planner group (label to ad-set id mapping)
    GroupAdd {
        /// JSON with client, product, audience_label, ad_set_id
        json: String,
    },
    /// Show store statistics
    Stats,
}
