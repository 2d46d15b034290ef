//! Review session: cursor state machine and submission rules.
//!
//! # Responsibility
//! - Keep navigation state out of the display layer as an explicit value.
//! - Provide pure functions for choosing the next record and applying input.
//!
//! # Invariants
//! - No function here touches storage; persistence is the caller's job.

pub mod navigation;
pub mod submission;
