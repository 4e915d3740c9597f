pub mod app_settings;
pub mod enrichment;
pub mod messages;
pub mod network;
pub mod plan;
