//! Scoring ledger.
//!
//! # Responsibility
//! - Hold the ordered `(identifier, score)` records under review.
//! - Create the ledger from a catalog scan on first run, reload it afterwards.
//! - Persist the full record set through a `LedgerStore`.
//!
//! # Invariants
//! - Record count and order never change after load or creation.
//! - Once a ledger exists its stored order is authoritative; the catalog
//!   directory is not rescanned.

use crate::model::record::ImageRecord;
use crate::repo::ledger_repo::{LedgerError, LedgerResult, LedgerStore};
use log::{error, info};
use std::time::Instant;

/// Source of truth for recorded scores, aligned one-to-one with the catalog.
#[derive(Debug)]
pub struct Ledger<S: LedgerStore> {
    store: S,
    records: Vec<ImageRecord>,
}

impl<S: LedgerStore> Ledger<S> {
    /// Loads the ledger from `store`, or creates it from `catalog_fallback`.
    ///
    /// `catalog_fallback` is only invoked when the store holds nothing yet;
    /// the freshly created ledger is saved before returning.
    ///
    /// # Errors
    /// - Any load error from the store; malformed content is fatal.
    /// - Save errors while creating a new ledger.
    pub fn load_or_create<F>(store: S, catalog_fallback: F) -> LedgerResult<Self>
    where
        F: FnOnce() -> Vec<String>,
    {
        let started_at = Instant::now();
        let location = store.location();

        let loaded = store.load().map_err(|err| {
            error!(
                "event=ledger_load module=ledger status=error location={} duration_ms={} error={}",
                location,
                started_at.elapsed().as_millis(),
                err
            );
            err
        })?;

        if let Some(records) = loaded {
            info!(
                "event=ledger_load module=ledger status=ok location={} records={} scored={} duration_ms={}",
                location,
                records.len(),
                records.iter().filter(|record| record.is_scored()).count(),
                started_at.elapsed().as_millis()
            );
            return Ok(Self { store, records });
        }

        let records: Vec<ImageRecord> = catalog_fallback()
            .into_iter()
            .map(ImageRecord::unscored)
            .collect();
        let ledger = Self { store, records };
        ledger.persist()?;
        info!(
            "event=ledger_create module=ledger status=ok location={} records={} duration_ms={}",
            location,
            ledger.records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(ledger)
    }

    /// Returns the stored score at `index`, `None` when unscored or out of range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.records
            .get(index)
            .and_then(|record| record.score.as_deref())
    }

    /// Replaces the stored score string at `index`.
    ///
    /// Does not persist; callers decide when to call `persist`.
    pub fn set(&mut self, index: usize, score: impl Into<String>) -> LedgerResult<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(LedgerError::IndexOutOfRange { index, len })?;
        record.score = Some(score.into());
        Ok(())
    }

    /// Restores an unscored entry; only used to roll back a failed save.
    pub(crate) fn clear(&mut self, index: usize) -> LedgerResult<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(LedgerError::IndexOutOfRange { index, len })?;
        record.score = None;
        Ok(())
    }

    /// Writes the full ordered record set to the store, replacing old contents.
    pub fn persist(&self) -> LedgerResult<()> {
        let started_at = Instant::now();
        match self.store.save(&self.records) {
            Ok(()) => {
                info!(
                    "event=ledger_persist module=ledger status=ok location={} records={} duration_ms={}",
                    self.store.location(),
                    self.records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=ledger_persist module=ledger status=error location={} duration_ms={} error={}",
                    self.store.location(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the position of the first unscored record, scanning from the start.
    pub fn first_unscored(&self) -> Option<usize> {
        self.records.iter().position(|record| !record.is_scored())
    }

    pub fn scored_count(&self) -> usize {
        self.records.iter().filter(|record| record.is_scored()).count()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
