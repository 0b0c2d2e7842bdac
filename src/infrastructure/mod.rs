pub mod platform;
pub mod sqlite;
