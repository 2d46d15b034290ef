//! Submission validation and score update rules.
//!
//! # Responsibility
//! - Accept or reject raw reviewer input against the configured score scale.
//! - Compute the updated score string for the presented record.
//!
//! # Invariants
//! - Accepted input is the empty string or exactly one digit of the scale.
//! - Empty input always records `0`, whether or not the scale lists it.
//! - A back-edit replaces the last pass; any other submission on a scored
//!   record appends a new pass.

use crate::config::ScoreScale;
use crate::logging::sanitize_message;
use crate::model::record::{append_pass, replace_last_pass};
use std::fmt::{Display, Formatter};

/// Digit recorded for an empty submission.
pub const EMPTY_INPUT_DIGIT: char = '0';
const MAX_ECHOED_INPUT_CHARS: usize = 16;

/// Why a submission was rejected without touching session or ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Input is not empty and not a single digit of the scale.
    InvalidInput { input: String },
    /// Nothing is presented (empty catalog or end of queue).
    NothingPresented,
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { input } => {
                write!(f, "invalid answer `{input}`, please try again")
            }
            Self::NothingPresented => write!(f, "no image is currently presented"),
        }
    }
}

/// Validates raw input and returns the digit to record.
pub fn parse_submission(raw: &str, scale: &ScoreScale) -> Result<char, RejectReason> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(EMPTY_INPUT_DIGIT),
        (Some(digit), None) if scale.contains(digit) => Ok(digit),
        _ => Err(invalid(raw)),
    }
}

/// Computes the new score string for a record.
///
/// - `back_edit`: replace the last pass.
/// - unscored: start with `digit`.
/// - scored: append `digit` as a new pass.
pub fn apply_submission(existing: Option<&str>, digit: char, back_edit: bool) -> String {
    if back_edit {
        replace_last_pass(existing, digit)
    } else {
        append_pass(existing, digit)
    }
}

fn invalid(raw: &str) -> RejectReason {
    RejectReason::InvalidInput {
        input: sanitize_message(raw, MAX_ECHOED_INPUT_CHARS),
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_submission, parse_submission, RejectReason};
    use crate::config::ScoreScale;

    fn scale() -> ScoreScale {
        ScoreScale::up_to(3).expect("valid scale")
    }

    #[test]
    fn empty_input_records_zero() {
        assert_eq!(parse_submission("", &scale()), Ok('0'));
    }

    #[test]
    fn digits_outside_scale_are_rejected() {
        assert_eq!(parse_submission("3", &scale()), Ok('3'));
        for raw in ["9", "4", "12", "a", " 1", "-1"] {
            assert!(
                matches!(
                    parse_submission(raw, &scale()),
                    Err(RejectReason::InvalidInput { .. })
                ),
                "`{raw}` should be rejected"
            );
        }
    }

    #[test]
    fn empty_input_records_zero_when_scale_lacks_zero() {
        let scale = ScoreScale::from_digits(['1', '2']).expect("valid digits");
        assert_eq!(parse_submission("", &scale), Ok('0'));
        assert!(parse_submission("0", &scale).is_err());
    }

    #[test]
    fn long_rejected_input_is_capped() {
        let raw = "x".repeat(64);
        let Err(RejectReason::InvalidInput { input }) = parse_submission(&raw, &scale()) else {
            panic!("long input must be rejected");
        };
        assert!(input.ends_with("..."));
        assert!(input.len() < raw.len());
    }

    #[test]
    fn apply_submission_follows_pass_rules() {
        assert_eq!(apply_submission(None, '2', false), "2");
        assert_eq!(apply_submission(Some("2"), '1', false), "2.1");
        assert_eq!(apply_submission(Some("2"), '3', true), "3");
        assert_eq!(apply_submission(Some("2.1"), '3', true), "2.3");
        assert_eq!(apply_submission(None, '3', true), "3");
    }
}
