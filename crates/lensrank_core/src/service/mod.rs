//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate ledger and session calls into review-level APIs.
//! - Keep display layers decoupled from storage and state-machine details.

pub mod review_service;
