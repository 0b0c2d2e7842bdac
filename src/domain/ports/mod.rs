pub mod ads_platform;
pub mod planner_registry;
pub mod record_store;
