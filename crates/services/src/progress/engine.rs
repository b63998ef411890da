use quiz_core::Clock;
use quiz_core::model::{AnswerRecord, OptionLabel, ProgressStatus, Score, UnitId};
use quiz_core::traversal::{AnswerOutcome, StepOutcome, Traversal};
use tracing::{debug, info};

use super::view::EngineView;
use crate::catalog::UnitCatalog;
use crate::error::ProgressError;

/// Persisted progress through one unit.
///
/// Every successful transition writes a fresh snapshot before returning. If
/// the write fails the in-memory state is rolled back, so memory and store
/// never disagree about a transition that was reported as failed.
///
/// A retry that clears the store but cannot resolve the unit again leaves the
/// engine reset and unresolved; the next transition resolves it before
/// writing anything.
pub struct ProgressEngine {
    unit: UnitId,
    traversal: Traversal,
    catalog: UnitCatalog,
    clock: Clock,
    unresolved: bool,
}

impl ProgressEngine {
    /// Open `unit`, replaying its persisted snapshot if one exists.
    ///
    /// A completed snapshot opens straight into the results view.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the unit cannot be resolved or read.
    pub async fn resume(
        catalog: &UnitCatalog,
        unit: UnitId,
        clock: Clock,
    ) -> Result<Self, ProgressError> {
        let questions = catalog.resolve(unit).await?;
        let snapshot = catalog.store().load_snapshot(unit).await?;
        let traversal = Traversal::restore(questions, snapshot.as_ref())?;
        info!(
            %unit,
            status = %traversal.status(),
            index = traversal.current_index(),
            questions = traversal.len(),
            "unit opened"
        );
        Ok(Self {
            unit,
            traversal,
            catalog: catalog.clone(),
            clock,
            unresolved: false,
        })
    }

    #[must_use]
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    #[must_use]
    pub fn status(&self) -> ProgressStatus {
        self.traversal.status()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.traversal.current_index()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerRecord {
        self.traversal.answers()
    }

    #[must_use]
    pub fn traversal(&self) -> &Traversal {
        &self.traversal
    }

    #[must_use]
    pub fn view(&self) -> EngineView {
        EngineView::build(self.unit, &self.traversal)
    }

    /// Tally of the answers so far.
    #[must_use]
    pub fn compute_score(&self) -> Score {
        self.traversal.compute_score()
    }

    /// Record `label` for the current question and persist.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Traversal` if the unit is completed or the
    /// question is locked, `ProgressError::Redrawn` if an unfinished retry just
    /// drew different questions, and `ProgressError::Storage` if the write fails.
    pub async fn answer_current(
        &mut self,
        label: OptionLabel,
    ) -> Result<AnswerOutcome, ProgressError> {
        if self.ensure_resolved().await? {
            return Err(ProgressError::Redrawn { unit: self.unit });
        }
        let before = self.traversal.clone();
        let outcome = self.traversal.answer(label)?;
        self.persist_or_rollback(before).await?;
        debug!(
            unit = %self.unit,
            serial = %outcome.serial,
            selected = %outcome.selected,
            correct = outcome.is_correct,
            "answer recorded"
        );
        Ok(outcome)
    }

    /// Advance, or finish and score on the last question.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Traversal` after completion and
    /// `ProgressError::Storage` if the write fails.
    pub async fn go_next(&mut self) -> Result<StepOutcome, ProgressError> {
        self.ensure_resolved().await?;
        let before = self.traversal.clone();
        let step = self.traversal.next()?;
        self.persist_or_rollback(before).await?;
        if step.finished {
            let score = self.traversal.compute_score();
            info!(
                unit = %self.unit,
                correct = score.correct(),
                incorrect = score.incorrect(),
                total = score.total(),
                percentage = score.percentage(),
                "unit completed"
            );
        } else {
            debug!(unit = %self.unit, index = step.index, "moved forward");
        }
        Ok(step)
    }

    /// Step back one question. At the first question nothing changes and
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Traversal` after completion and
    /// `ProgressError::Storage` if the write fails.
    pub async fn go_previous(&mut self) -> Result<bool, ProgressError> {
        self.ensure_resolved().await?;
        let before = self.traversal.clone();
        if !self.traversal.previous()? {
            return Ok(false);
        }
        self.persist_or_rollback(before).await?;
        debug!(unit = %self.unit, index = self.traversal.current_index(), "moved back");
        Ok(true)
    }

    /// Erase the unit's stored progress and start over.
    ///
    /// For a test the pinned subset is erased too and a fresh subset is drawn
    /// and pinned in its place.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the store cannot be cleared or the unit
    /// cannot be resolved again. Once the store is cleared the in-memory state
    /// is reset as well, even when resolving fails.
    pub async fn retry(&mut self) -> Result<(), ProgressError> {
        self.catalog.store().remove_unit(self.unit).await?;
        self.traversal.reset();
        self.unresolved = true;
        self.ensure_resolved().await?;
        info!(unit = %self.unit, "unit retried");
        Ok(())
    }

    /// Resolve the unit again after an unfinished retry. Returns `true` when
    /// the questions differ from the ones held before.
    async fn ensure_resolved(&mut self) -> Result<bool, ProgressError> {
        if !self.unresolved {
            return Ok(false);
        }
        let questions = self.catalog.resolve(self.unit).await?;
        let changed = questions.as_slice() != self.traversal.questions();
        self.traversal = Traversal::new(questions)?;
        self.unresolved = false;
        Ok(changed)
    }

    async fn persist_or_rollback(&mut self, before: Traversal) -> Result<(), ProgressError> {
        let snapshot = self.traversal.snapshot(self.clock.now());
        let saved = self.catalog.store().save_snapshot(self.unit, &snapshot).await;
        if let Err(err) = saved {
            self.traversal = before;
            return Err(err.into());
        }
        Ok(())
    }
}
