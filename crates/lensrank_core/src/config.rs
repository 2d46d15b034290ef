//! Review configuration.
//!
//! # Responsibility
//! - Hold the knobs that shape one review run (paths, score scale, resampling).
//! - Validate configuration before any ledger or session is built.
//!
//! # Invariants
//! - The score scale is a non-empty set of distinct ASCII digits.
//! - `resample_threshold` lies within `[0, 1]`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Default image extension scanned by the catalog builder.
pub const DEFAULT_EXTENSION: &str = "jpg";
/// Default ledger file name.
pub const DEFAULT_LEDGER_FILE: &str = "lensrankings.txt";
/// Default highest ordinal score.
pub const DEFAULT_MAX_SCORE: u8 = 4;
/// Draws at or above this value resample while unscored records remain.
pub const DEFAULT_RESAMPLE_THRESHOLD: f64 = 0.9;

/// Configuration errors reported by `ReviewConfig::validate` and `ScoreScale`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyScale,
    NonDigitScore(char),
    DuplicateScore(char),
    MaxScoreTooLarge(u8),
    EmptyExtension,
    ThresholdOutOfRange(f64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyScale => write!(f, "score scale must contain at least one digit"),
            Self::NonDigitScore(value) => write!(f, "score `{value}` is not an ASCII digit"),
            Self::DuplicateScore(value) => write!(f, "score `{value}` is listed twice"),
            Self::MaxScoreTooLarge(value) => {
                write!(f, "max score {value} does not fit a single digit")
            }
            Self::EmptyExtension => write!(f, "image extension must not be empty"),
            Self::ThresholdOutOfRange(value) => {
                write!(f, "resample threshold {value} is outside [0, 1]")
            }
        }
    }
}

impl Error for ConfigError {}

/// Set of single-digit scores a reviewer may submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreScale {
    digits: Vec<char>,
}

impl ScoreScale {
    /// Builds the contiguous scale `0..=max`.
    pub fn up_to(max: u8) -> Result<Self, ConfigError> {
        if max > 9 {
            return Err(ConfigError::MaxScoreTooLarge(max));
        }
        Ok(Self {
            digits: (0..=max).map(|value| char::from(b'0' + value)).collect(),
        })
    }

    /// Builds a scale from an explicit digit list.
    pub fn from_digits(digits: impl IntoIterator<Item = char>) -> Result<Self, ConfigError> {
        let mut collected = Vec::new();
        for digit in digits {
            if !digit.is_ascii_digit() {
                return Err(ConfigError::NonDigitScore(digit));
            }
            if collected.contains(&digit) {
                return Err(ConfigError::DuplicateScore(digit));
            }
            collected.push(digit);
        }
        if collected.is_empty() {
            return Err(ConfigError::EmptyScale);
        }
        Ok(Self { digits: collected })
    }

    pub fn contains(&self, digit: char) -> bool {
        self.digits.contains(&digit)
    }

    pub fn digits(&self) -> &[char] {
        &self.digits
    }

    /// Returns the scale as a compact prompt hint, e.g. `0-4` or `0,2,5`.
    pub fn hint(&self) -> String {
        let contiguous = self
            .digits
            .windows(2)
            .all(|pair| u32::from(pair[1]) == u32::from(pair[0]) + 1);
        match (self.digits.first(), self.digits.last()) {
            (Some(first), Some(last)) if contiguous && self.digits.len() > 1 => {
                format!("{first}-{last}")
            }
            _ => self
                .digits
                .iter()
                .map(char::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self {
            digits: vec!['0', '1', '2', '3', '4'],
        }
    }
}

/// Resampling probability policy once the whole catalog has been scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplePolicy {
    /// Keep `resample_threshold` even when nothing is left unscored.
    FixedThreshold,
    /// Drop the threshold to 0.0 when nothing is left unscored.
    #[default]
    AlwaysWhenComplete,
}

impl ResamplePolicy {
    /// Returns the threshold a uniform draw must reach to resample.
    pub fn threshold(self, configured: f64, any_unscored: bool) -> f64 {
        match self {
            Self::AlwaysWhenComplete if !any_unscored => 0.0,
            _ => configured,
        }
    }
}

/// Configuration for one review run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Directory holding candidate images.
    pub source_dir: PathBuf,
    /// Extension matched case-sensitively, without the leading dot.
    pub extension: String,
    pub ledger_path: PathBuf,
    pub scale: ScoreScale,
    pub resample_threshold: f64,
    pub resample_policy: ResamplePolicy,
    /// Initial state of the resampling toggle.
    pub resample_enabled: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            scale: ScoreScale::default(),
            resample_threshold: DEFAULT_RESAMPLE_THRESHOLD,
            resample_policy: ResamplePolicy::default(),
            resample_enabled: false,
        }
    }
}

impl ReviewConfig {
    /// Validates cross-field configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        if !(0.0..=1.0).contains(&self.resample_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.resample_threshold));
        }
        // Deserialized scales bypass `from_digits`; re-check every digit.
        ScoreScale::from_digits(self.scale.digits().iter().copied())?;
        Ok(())
    }
}
