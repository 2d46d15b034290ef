//! Domain model for the review ledger and what the reviewer is shown.
//!
//! # Responsibility
//! - Define the record shape persisted by the ledger.
//! - Define the presentation values handed to the display layer.
//!
//! # Invariants
//! - Records are addressed by catalog position; identifiers are unique.

pub mod presentation;
pub mod record;
