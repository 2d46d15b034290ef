//! Persistence layer for the scoring ledger.
//!
//! # Responsibility
//! - Define the storage contract the ledger is saved through.
//! - Keep the text file format details inside one module.
//!
//! # Invariants
//! - Saves rewrite the full ledger; there is no incremental append.
//! - Loads reject malformed files instead of repairing them.

pub mod ledger_repo;
