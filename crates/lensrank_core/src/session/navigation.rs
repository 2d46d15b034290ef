//! Navigation session state machine.
//!
//! # Responsibility
//! - Hold the review cursor and its one-shot/toggle flags as a value object.
//! - Decide which record to present next from ledger state and a random draw.
//!
//! # Invariants
//! - While `go_back_one` is set the record at the cursor is re-shown as is:
//!   no resampling, no skip to the unscored frontier, no rotation.
//! - A resampled index is always strictly below the cursor held before the draw.
//! - Resolution runs a bounded loop of at most `catalog_len + 1` steps.
//! - The cached presentation changes only when `resolve_next` runs.

use crate::config::ResamplePolicy;
use crate::model::presentation::{Presentation, Resolution, Rotation};
use crate::model::record::ImageRecord;
use log::{debug, warn};
use rand::Rng;

/// Resampling probability parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleRule {
    /// A uniform draw in `[0, 1)` at or above this value resamples.
    pub threshold: f64,
    pub policy: ResamplePolicy,
}

/// Review cursor and flags; mutated by every navigation and submission event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    current_index: usize,
    go_back_one: bool,
    resample_enabled: bool,
    current: Option<Presentation>,
}

impl Session {
    pub fn new(start_index: usize, resample_enabled: bool) -> Self {
        Self {
            current_index: start_index,
            go_back_one: false,
            resample_enabled,
            current: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn go_back_one(&self) -> bool {
        self.go_back_one
    }

    pub fn resample_enabled(&self) -> bool {
        self.resample_enabled
    }

    /// Returns the presentation resolved by the last navigation event.
    pub fn current_presentation(&self) -> Option<&Presentation> {
        self.current.as_ref()
    }

    pub fn set_resample_enabled(&mut self, enabled: bool) {
        self.resample_enabled = enabled;
    }

    /// Moves the cursor back by one and arms the back-one flag.
    ///
    /// Returns `false` (no-op) at position 0.
    pub fn step_back(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        self.go_back_one = true;
        true
    }

    pub fn clear_back_one(&mut self) {
        self.go_back_one = false;
    }

    fn present(
        &mut self,
        records: &[ImageRecord],
        rotation: Rotation,
        resampled: bool,
    ) -> Resolution {
        let Some(record) = records.get(self.current_index) else {
            self.current = None;
            return Resolution::EndOfQueue;
        };
        let presentation = Presentation {
            index: self.current_index,
            identifier: record.identifier.clone(),
            rotation,
            resampled,
        };
        self.current = Some(presentation.clone());
        Resolution::Present(presentation)
    }
}

/// Resolves the next record to present and caches it on the session.
///
/// Order of rules:
/// 1. back-one flag set: re-show the record at the cursor, unrotated;
/// 2. draw `r`; when `r >= threshold`, resampling is on and the cursor is
///    past 0, jump to a uniform index below the cursor with a random rotation;
/// 3. record at the cursor already scored: move to the first unscored record
///    (scanning from position 0) and start over;
/// 4. otherwise show the record at the cursor, unrotated.
///
/// When step 3 finds nothing unscored the queue has ended, unless resampling
/// is on and the threshold has dropped to zero; then a cursor resting at
/// position 0 is treated as one past the end so the next draw resamples the
/// whole catalog.
pub fn resolve_next<R: Rng>(
    session: &mut Session,
    records: &[ImageRecord],
    rule: ResampleRule,
    rng: &mut R,
) -> Resolution {
    if records.is_empty() {
        session.current = None;
        return Resolution::EmptyCatalog;
    }

    let first_unscored = records.iter().position(|record| !record.is_scored());
    let threshold = rule.policy.threshold(rule.threshold, first_unscored.is_some());

    for _ in 0..=records.len() {
        if session.go_back_one {
            return session.present(records, Rotation::None, false);
        }

        let draw: f64 = rng.gen();
        if draw >= threshold && session.resample_enabled && session.current_index > 0 {
            let held = session.current_index;
            session.current_index = rng.gen_range(0..held);
            let rotation = Rotation::random(rng);
            debug!(
                "event=resolve_next module=session status=resampled from={} to={} rotation={}",
                held,
                session.current_index,
                rotation.degrees()
            );
            return session.present(records, rotation, true);
        }

        let cursor_scored = records
            .get(session.current_index)
            .map_or(true, ImageRecord::is_scored);
        if !cursor_scored {
            return session.present(records, Rotation::None, false);
        }

        match first_unscored {
            Some(next) => session.current_index = next,
            None if session.resample_enabled
                && threshold <= 0.0
                && session.current_index < records.len() =>
            {
                session.current_index = records.len();
            }
            None => {
                session.current = None;
                return Resolution::EndOfQueue;
            }
        }
    }

    warn!(
        "event=resolve_next module=session status=exhausted cursor={} records={}",
        session.current_index,
        records.len()
    );
    session.current = None;
    Resolution::EndOfQueue
}

#[cfg(test)]
mod tests {
    use super::{resolve_next, ResampleRule, Session};
    use crate::config::ResamplePolicy;
    use crate::model::presentation::{Resolution, Rotation};
    use crate::model::record::ImageRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TEN_PERCENT: ResampleRule = ResampleRule {
        threshold: 0.9,
        policy: ResamplePolicy::FixedThreshold,
    };
    const ALWAYS: ResampleRule = ResampleRule {
        threshold: 0.0,
        policy: ResamplePolicy::FixedThreshold,
    };

    fn records(scores: &[Option<&str>]) -> Vec<ImageRecord> {
        scores
            .iter()
            .enumerate()
            .map(|(index, score)| ImageRecord {
                identifier: format!("img_{index}.jpg"),
                score: score.map(str::to_string),
            })
            .collect()
    }

    fn presented_index(resolution: &Resolution) -> usize {
        resolution
            .presentation()
            .map(|presentation| presentation.index)
            .expect("a presentation should be resolved")
    }

    #[test]
    fn empty_catalog_is_distinct_from_end_of_queue() {
        let mut session = Session::new(0, false);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            resolve_next(&mut session, &[], TEN_PERCENT, &mut rng),
            Resolution::EmptyCatalog
        );
    }

    #[test]
    fn scored_cursor_jumps_to_first_unscored_from_start() {
        let records = records(&[Some("1"), None, Some("2"), None]);
        let mut session = Session::new(2, false);
        let mut rng = StdRng::seed_from_u64(2);

        let resolution = resolve_next(&mut session, &records, TEN_PERCENT, &mut rng);
        assert_eq!(presented_index(&resolution), 1);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn back_one_reshows_scored_record_without_rotation() {
        let records = records(&[Some("3"), None]);
        let mut session = Session::new(1, true);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(session.step_back());

        let resolution = resolve_next(&mut session, &records, ALWAYS, &mut rng);
        let presentation = resolution.presentation().expect("record 0 is re-shown");
        assert_eq!(presentation.index, 0);
        assert_eq!(presentation.rotation, Rotation::None);
        assert!(!presentation.resampled);
        assert!(session.go_back_one());
    }

    #[test]
    fn step_back_at_start_is_noop() {
        let mut session = Session::new(0, false);
        assert!(!session.step_back());
        assert_eq!(session.current_index(), 0);
        assert!(!session.go_back_one());
    }

    #[test]
    fn resampling_always_picks_strictly_earlier_index() {
        let records = records(&[Some("1"), Some("2"), Some("0"), None, None, None]);
        let mut rng = StdRng::seed_from_u64(4);
        for start in 1..records.len() {
            for _ in 0..50 {
                let mut session = Session::new(start, true);
                let resolution = resolve_next(&mut session, &records, ALWAYS, &mut rng);
                let presentation = resolution.presentation().expect("resample presents");
                assert!(presentation.index < start);
                assert!(presentation.resampled);
            }
        }
    }

    #[test]
    fn resampling_never_triggers_at_position_zero() {
        let records = records(&[None, None]);
        let mut session = Session::new(0, true);
        let mut rng = StdRng::seed_from_u64(5);
        let resolution = resolve_next(&mut session, &records, ALWAYS, &mut rng);
        let presentation = resolution.presentation().expect("record 0 is shown");
        assert_eq!(presentation.index, 0);
        assert!(!presentation.resampled);
    }

    #[test]
    fn fully_scored_without_resampling_ends_queue() {
        let records = records(&[Some("1"), Some("2")]);
        let mut session = Session::new(1, false);
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(
            resolve_next(&mut session, &records, TEN_PERCENT, &mut rng),
            Resolution::EndOfQueue
        );
        assert!(session.current_presentation().is_none());
    }

    #[test]
    fn fully_scored_with_resampling_keeps_presenting_from_position_zero() {
        let records = records(&[Some("1"), Some("2"), Some("3")]);
        let rule = ResampleRule {
            threshold: 0.9,
            policy: ResamplePolicy::AlwaysWhenComplete,
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut session = Session::new(0, true);
            let resolution = resolve_next(&mut session, &records, rule, &mut rng);
            let presentation = resolution.presentation().expect("whole catalog resamples");
            assert!(presentation.resampled);
            assert!(presentation.index < records.len());
        }
    }

    #[test]
    fn fixed_threshold_with_nothing_unscored_at_start_ends_queue() {
        let records = records(&[Some("1"), Some("2")]);
        let rule = ResampleRule {
            threshold: 0.9,
            policy: ResamplePolicy::FixedThreshold,
        };
        let mut session = Session::new(0, true);
        let mut rng = StdRng::seed_from_u64(8);
        assert_eq!(
            resolve_next(&mut session, &records, rule, &mut rng),
            Resolution::EndOfQueue
        );
    }
}
