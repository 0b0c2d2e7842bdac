pub mod details;
pub mod metric_record;
