pub mod config;
pub mod error;
pub mod fs;
pub mod lock;
pub mod log;
pub mod orchestrator;
pub mod paths;
pub mod report;
pub mod types;

pub use config::{PromotionConfig, Subsystem};
pub use error::{PromoteError, Result};
pub use orchestrator::{MigrationSummary, Migrator, Stage};
