pub mod aggregate;
pub mod dedup;
pub mod display_name;
pub mod history;
pub mod identity;
pub mod ingest;
pub mod profitability;
pub mod scope;
