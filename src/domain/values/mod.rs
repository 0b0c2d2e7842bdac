pub mod canonical;
pub mod group_key;
pub mod month;
