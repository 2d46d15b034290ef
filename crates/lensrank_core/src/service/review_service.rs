//! Review use-case service.
//!
//! # Responsibility
//! - Expose the calls the display layer drives a review with.
//! - Tie session transitions to ledger updates and persistence.
//!
//! # Invariants
//! - Every accepted submission is persisted before the next record is resolved.
//! - Rejected submissions leave ledger and session untouched.
//! - A failed save rolls the in-memory score back, so memory matches disk.
//! - Re-rendering reads the cached presentation; only navigation re-resolves,
//!   and so does enabling resampling at the end of the queue.

use crate::catalog::build_catalog;
use crate::config::{ConfigError, ReviewConfig, ScoreScale};
use crate::ledger::Ledger;
use crate::model::presentation::{Presentation, Resolution};
use crate::repo::ledger_repo::{FileLedgerStore, LedgerError, LedgerStore};
use crate::session::navigation::{resolve_next, ResampleRule, Session};
use crate::session::submission::{apply_submission, parse_submission, RejectReason};
use log::{info, warn};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ReviewResult<T> = Result<T, ReviewError>;

/// Fatal review errors; invalid input is reported through `SubmitOutcome`.
#[derive(Debug)]
pub enum ReviewError {
    Config(ConfigError),
    Ledger(LedgerError),
}

impl Display for ReviewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid review configuration: {err}"),
            Self::Ledger(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReviewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Ledger(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ReviewError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LedgerError> for ReviewError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Score stored and persisted; `next` is what to show now.
    Accepted {
        identifier: String,
        score: String,
        next: Resolution,
    },
    Rejected(RejectReason),
}

/// Scored/total counters for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub scored: usize,
    pub total: usize,
}

/// Drives one single-reviewer session over a ledger.
pub struct ReviewService<S: LedgerStore, R: Rng> {
    ledger: Ledger<S>,
    session: Session,
    scale: ScoreScale,
    rule: ResampleRule,
    source_dir: PathBuf,
    rng: R,
    resolution: Resolution,
}

impl<R: Rng> ReviewService<FileLedgerStore, R> {
    /// Opens the file ledger named by `config`, creating it from a directory
    /// scan on first run, and resolves the first presentation.
    ///
    /// # Errors
    /// - `Config` when `config` fails validation.
    /// - `Ledger` when the ledger cannot be read, parsed or created.
    pub fn open(config: &ReviewConfig, rng: R) -> ReviewResult<Self> {
        config.validate()?;
        let store = FileLedgerStore::new(config.ledger_path.clone());
        let ledger = Ledger::load_or_create(store, || {
            build_catalog(&config.source_dir, &config.extension)
        })?;
        Ok(Self::new(ledger, config, rng))
    }
}

impl<S: LedgerStore, R: Rng> ReviewService<S, R> {
    /// Creates a service over a loaded ledger and resolves the first presentation.
    ///
    /// The cursor starts at the first unscored record, or 0 when none is left.
    pub fn new(ledger: Ledger<S>, config: &ReviewConfig, rng: R) -> Self {
        let start_index = ledger.first_unscored().unwrap_or(0);
        let mut service = Self {
            ledger,
            session: Session::new(start_index, config.resample_enabled),
            scale: config.scale.clone(),
            rule: ResampleRule {
                threshold: config.resample_threshold,
                policy: config.resample_policy,
            },
            source_dir: config.source_dir.clone(),
            rng,
            resolution: Resolution::EmptyCatalog,
        };
        service.resolve_next();
        service
    }

    /// Navigation event: resolves and caches what to present next.
    pub fn resolve_next(&mut self) -> Resolution {
        self.resolution = resolve_next(
            &mut self.session,
            self.ledger.records(),
            self.rule,
            &mut self.rng,
        );
        match &self.resolution {
            Resolution::Present(presentation) => info!(
                "event=resolve_next module=review status=present index={} identifier={} rotation={} resampled={}",
                presentation.index,
                presentation.identifier,
                presentation.rotation.degrees(),
                presentation.resampled
            ),
            Resolution::EndOfQueue => {
                info!("event=resolve_next module=review status=end_of_queue")
            }
            Resolution::EmptyCatalog => {
                info!("event=resolve_next module=review status=empty_catalog")
            }
        }
        self.resolution.clone()
    }

    /// Returns the last resolution without re-resolving (for redraws).
    pub fn current_resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn current_presentation(&self) -> Option<&Presentation> {
        self.resolution.presentation()
    }

    /// Validates `raw`, records it on the presented record and advances.
    ///
    /// # Errors
    /// - `Ledger` when the updated ledger cannot be saved; the in-memory
    ///   score is restored and the session does not advance.
    pub fn submit(&mut self, raw: &str) -> ReviewResult<SubmitOutcome> {
        let Some(index) = self.current_presentation().map(|presentation| presentation.index)
        else {
            warn!("event=submit_rejected module=review reason=nothing_presented");
            return Ok(SubmitOutcome::Rejected(RejectReason::NothingPresented));
        };

        let digit = match parse_submission(raw, &self.scale) {
            Ok(digit) => digit,
            Err(reason) => {
                warn!(
                    "event=submit_rejected module=review reason=invalid_input index={}",
                    index
                );
                return Ok(SubmitOutcome::Rejected(reason));
            }
        };

        let back_edit = self.session.go_back_one();
        let previous = self.ledger.get(index).map(str::to_string);
        let score = apply_submission(previous.as_deref(), digit, back_edit);
        self.ledger.set(index, score.clone())?;
        if let Err(err) = self.ledger.persist() {
            match previous {
                Some(previous) => self.ledger.set(index, previous)?,
                None => self.ledger.clear(index)?,
            }
            return Err(err.into());
        }

        let identifier = self
            .ledger
            .record(index)
            .map(|record| record.identifier.clone())
            .unwrap_or_default();
        info!(
            "event=submit module=review status=ok index={} identifier={} score={} back_edit={}",
            index, identifier, score, back_edit
        );

        self.session.clear_back_one();
        let next = self.resolve_next();
        Ok(SubmitOutcome::Accepted {
            identifier,
            score,
            next,
        })
    }

    /// Steps back to the previous catalog record for a back-edit.
    ///
    /// Returns `None` (no-op) at position 0.
    pub fn go_back(&mut self) -> Option<Presentation> {
        if !self.session.step_back() {
            return None;
        }
        info!(
            "event=go_back module=review status=ok index={}",
            self.session.current_index()
        );
        self.resolve_next().presentation().cloned()
    }

    /// Abandons any pending back-edit and resolves the next presentation.
    pub fn skip_forward(&mut self) -> Resolution {
        self.session.clear_back_one();
        self.resolve_next()
    }

    /// Flips the resampling toggle and returns the new state.
    pub fn toggle_resample(&mut self) -> bool {
        let enabled = !self.session.resample_enabled();
        self.set_resample(enabled);
        enabled
    }

    /// Sets the resampling toggle.
    ///
    /// Enabling it while nothing is presented (end of queue) resolves the
    /// next presentation right away.
    pub fn set_resample(&mut self, enabled: bool) {
        self.session.set_resample_enabled(enabled);
        info!(
            "event=toggle_resample module=review status=ok enabled={}",
            enabled
        );
        if enabled && self.current_presentation().is_none() && !self.ledger.is_empty() {
            self.resolve_next();
        }
    }

    /// Persists the ledger; the shutdown and interrupt path.
    pub fn close(&self) -> ReviewResult<()> {
        self.ledger.persist()?;
        let progress = self.progress();
        info!(
            "event=session_close module=review status=ok scored={} total={}",
            progress.scored, progress.total
        );
        Ok(())
    }

    pub fn progress(&self) -> Progress {
        Progress {
            scored: self.ledger.scored_count(),
            total: self.ledger.len(),
        }
    }

    /// Formats the position label for the current presentation.
    pub fn position_label(&self) -> Option<String> {
        self.current_presentation()
            .map(|presentation| presentation.position_label(self.ledger.len()))
    }

    /// Resolves a catalog identifier to the image path on disk.
    pub fn image_path(&self, identifier: &str) -> PathBuf {
        self.source_dir.join(identifier)
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn scale(&self) -> &ScoreScale {
        &self.scale
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }
}
