//! Image record and score-string model.
//!
//! # Responsibility
//! - Define the canonical `(identifier, score)` pair persisted in the ledger.
//! - Own the score-string editing rules (first pass, append, replace last).
//!
//! # Invariants
//! - `identifier` never contains the ledger field separator (space) or a line break.
//! - A score is either absent or one or more single digits joined by
//!   `SCORE_SEPARATOR`, each digit being one review pass.
//! - Score edits only append a pass or replace the last pass; history is
//!   never truncated.

use serde::{Deserialize, Serialize};

/// Separator placed between review passes inside one score string.
pub const SCORE_SEPARATOR: char = '.';

/// One catalog entry and its recorded review passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// File name relative to the source directory.
    pub identifier: String,
    /// `None` while unscored, otherwise e.g. `"2"` or `"2.1"`.
    pub score: Option<String>,
}

impl ImageRecord {
    /// Creates an unscored record.
    pub fn unscored(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            score: None,
        }
    }

    /// Creates a record with an existing score string.
    pub fn scored(identifier: impl Into<String>, score: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            score: Some(score.into()),
        }
    }

    /// Returns whether at least one review pass has been recorded.
    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// Returns recorded passes in order, oldest first.
    pub fn passes(&self) -> Vec<char> {
        self.score
            .as_deref()
            .map(|score| {
                score
                    .split(SCORE_SEPARATOR)
                    .filter_map(|pass| pass.chars().next())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Returns whether `identifier` can be stored on one ledger line.
pub fn is_representable_identifier(identifier: &str) -> bool {
    !identifier.is_empty() && !identifier.contains([' ', '\n', '\r'])
}

/// Appends one review pass to an existing score, or starts a new one.
pub fn append_pass(existing: Option<&str>, digit: char) -> String {
    match existing {
        Some(score) if !score.is_empty() => format!("{score}{SCORE_SEPARATOR}{digit}"),
        _ => digit.to_string(),
    }
}

/// Replaces the most recent review pass (everything after the last separator).
///
/// An absent score is treated as a first pass.
pub fn replace_last_pass(existing: Option<&str>, digit: char) -> String {
    let kept = existing
        .and_then(|score| score.rfind(SCORE_SEPARATOR).map(|position| &score[..=position]))
        .unwrap_or("");
    format!("{kept}{digit}")
}

#[cfg(test)]
mod tests {
    use super::{append_pass, is_representable_identifier, replace_last_pass, ImageRecord};

    #[test]
    fn append_pass_starts_and_extends_history() {
        assert_eq!(append_pass(None, '2'), "2");
        assert_eq!(append_pass(Some("2"), '1'), "2.1");
        assert_eq!(append_pass(Some("2.1"), '0'), "2.1.0");
    }

    #[test]
    fn replace_last_pass_keeps_earlier_passes() {
        assert_eq!(replace_last_pass(Some("2"), '3'), "3");
        assert_eq!(replace_last_pass(Some("2.1"), '4'), "2.4");
        assert_eq!(replace_last_pass(Some("0.1.2"), '3'), "0.1.3");
        assert_eq!(replace_last_pass(None, '1'), "1");
    }

    #[test]
    fn passes_lists_digits_in_order() {
        let record = ImageRecord::scored("a.jpg", "3.0.2");
        assert_eq!(record.passes(), vec!['3', '0', '2']);
        assert!(ImageRecord::unscored("b.jpg").passes().is_empty());
    }

    #[test]
    fn identifiers_with_separator_are_not_representable() {
        assert!(is_representable_identifier("lens_001.jpg"));
        assert!(!is_representable_identifier("lens 001.jpg"));
        assert!(!is_representable_identifier("lens\n.jpg"));
        assert!(!is_representable_identifier(""));
    }
}
