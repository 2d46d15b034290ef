//! Ledger storage contracts and text-file implementation.
//!
//! # Responsibility
//! - Encode and decode the human-editable ledger text format.
//! - Provide file-backed and in-memory `LedgerStore` implementations.
//!
//! # Invariants
//! - Line 1 is the `Rank` header; each further line is
//!   `<identifier><space><score-or-empty>`, one per record, in catalog order.
//! - Saves rewrite the whole file through a temp file and rename.
//! - Read paths reject malformed content instead of masking it.

use crate::model::record::{is_representable_identifier, ImageRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Header written on the first ledger line.
pub const LEDGER_HEADER: &str = "Rank";
const FIELD_SEPARATOR: char = ' ';

static SCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9](\.[0-9])*$").expect("valid score regex"));

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised while reading, writing or addressing the ledger.
#[derive(Debug)]
pub enum LedgerError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    MalformedLine {
        line_number: usize,
        line: String,
    },
    DuplicateIdentifier {
        line_number: usize,
        identifier: String,
    },
    IndexOutOfRange {
        index: usize,
        len: usize,
    },
    InvalidIdentifier(String),
    InvalidScore(String),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "ledger io error at `{}`: {source}", path.display())
            }
            Self::MalformedLine { line_number, line } => {
                write!(f, "malformed ledger line {line_number}: `{line}`")
            }
            Self::DuplicateIdentifier {
                line_number,
                identifier,
            } => write!(
                f,
                "duplicate ledger identifier `{identifier}` on line {line_number}"
            ),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "ledger index {index} out of range for {len} records")
            }
            Self::InvalidIdentifier(identifier) => {
                write!(f, "identifier `{identifier}` cannot be stored in the ledger")
            }
            Self::InvalidScore(score) => write!(f, "score `{score}` is not a valid pass list"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Storage interface the ledger persists through.
pub trait LedgerStore {
    /// Reads stored records; `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> LedgerResult<Option<Vec<ImageRecord>>>;
    /// Replaces all stored records.
    fn save(&self, records: &[ImageRecord]) -> LedgerResult<()>;
    /// Human-readable location used in log events.
    fn location(&self) -> String;
}

/// Ledger stored as a text file.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    path: PathBuf,
}

impl FileLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LedgerStore for FileLedgerStore {
    fn load(&self) -> LedgerResult<Option<Vec<ImageRecord>>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => parse_ledger(&text).map(Some),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn save(&self, records: &[ImageRecord]) -> LedgerResult<()> {
        let text = render_ledger(records)?;
        write_atomic(&self.path, text.as_bytes()).map_err(|err| self.io_error(err))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory ledger store holding the rendered text.
///
/// Used by tests and callers that want the full codec without touching disk.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    text: RefCell<Option<String>>,
    saves: Cell<usize>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: RefCell::new(Some(text.into())),
            saves: Cell::new(0),
        }
    }

    /// Returns the last saved (or seeded) ledger text.
    pub fn text(&self) -> Option<String> {
        self.text.borrow().clone()
    }

    /// Returns how many times `save` succeeded.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> LedgerResult<Option<Vec<ImageRecord>>> {
        self.text.borrow().as_deref().map(parse_ledger).transpose()
    }

    fn save(&self, records: &[ImageRecord]) -> LedgerResult<()> {
        let text = render_ledger(records)?;
        *self.text.borrow_mut() = Some(text);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for &S {
    fn load(&self) -> LedgerResult<Option<Vec<ImageRecord>>> {
        (**self).load()
    }

    fn save(&self, records: &[ImageRecord]) -> LedgerResult<()> {
        (**self).save(records)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// Returns whether `score` is one or more digits joined by the pass separator.
pub fn is_valid_score(score: &str) -> bool {
    SCORE_RE.is_match(score)
}

/// Renders records into ledger text.
///
/// # Errors
/// - `InvalidIdentifier` when an identifier contains the field separator.
/// - `InvalidScore` when a stored score is not a pass list.
pub fn render_ledger(records: &[ImageRecord]) -> LedgerResult<String> {
    let mut text = String::with_capacity(LEDGER_HEADER.len() + 1 + records.len() * 24);
    text.push_str(LEDGER_HEADER);
    text.push('\n');
    for record in records {
        if !is_representable_identifier(&record.identifier) {
            return Err(LedgerError::InvalidIdentifier(record.identifier.clone()));
        }
        let score = record.score.as_deref().unwrap_or("");
        if !score.is_empty() && !is_valid_score(score) {
            return Err(LedgerError::InvalidScore(score.to_string()));
        }
        text.push_str(&record.identifier);
        text.push(FIELD_SEPARATOR);
        text.push_str(score);
        text.push('\n');
    }
    Ok(text)
}

/// Parses ledger text into records, preserving line order.
///
/// Files written without the `Rank` header line are accepted as well; the
/// header is restored on the next save.
///
/// # Errors
/// - `MalformedLine` for any line that is not `<identifier> <score-or-empty>`.
/// - `DuplicateIdentifier` when an identifier appears twice.
pub fn parse_ledger(text: &str) -> LedgerResult<Vec<ImageRecord>> {
    let mut lines = text.lines().enumerate().peekable();
    if let Some((_, first)) = lines.peek() {
        if *first == LEDGER_HEADER {
            lines.next();
        }
    }

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    for (offset, line) in lines {
        let line_number = offset + 1;
        let record = parse_line(line).ok_or_else(|| LedgerError::MalformedLine {
            line_number,
            line: line.to_string(),
        })?;
        if !seen.insert(record.identifier.clone()) {
            return Err(LedgerError::DuplicateIdentifier {
                line_number,
                identifier: record.identifier,
            });
        }
        records.push(record);
    }
    Ok(records)
}

fn parse_line(line: &str) -> Option<ImageRecord> {
    let (identifier, score) = line.split_once(FIELD_SEPARATOR)?;
    if !is_representable_identifier(identifier) {
        return None;
    }
    if score.is_empty() {
        return Some(ImageRecord::unscored(identifier));
    }
    is_valid_score(score).then(|| ImageRecord::scored(identifier, score))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("ledger"),
        nanos
    ));
    std::fs::write(&tmp_path, bytes)?;
    if let Err(err) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}
