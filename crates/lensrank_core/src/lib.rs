//! Core review logic for the lens ranker.
//! This crate is the single source of truth for ledger and navigation invariants.

pub mod catalog;
pub mod config;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use catalog::build_catalog;
pub use config::{ConfigError, ResamplePolicy, ReviewConfig, ScoreScale};
pub use ledger::Ledger;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::presentation::{Presentation, Resolution, Rotation};
pub use model::record::{ImageRecord, SCORE_SEPARATOR};
pub use repo::ledger_repo::{
    FileLedgerStore, LedgerError, LedgerResult, LedgerStore, MemoryLedgerStore,
};
pub use service::review_service::{
    Progress, ReviewError, ReviewResult, ReviewService, SubmitOutcome,
};
pub use session::navigation::{ResampleRule, Session};
pub use session::submission::RejectReason;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
