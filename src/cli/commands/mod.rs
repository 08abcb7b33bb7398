//! CLI command implementations.

mod analyze;
mod config;
mod doctor;
mod ingest;
mod search;
mod serve;

pub use analyze::run_analyze;
pub use config::run_config;
pub use doctor::run_doctor;
pub use ingest::run_ingest;
pub use search::run_search;
pub use serve::run_serve;
