//! Dashboard aggregation over every unit's snapshot.

use chrono::{DateTime, Utc};
use quiz_core::model::{ProgressStatus, Score, UnitId, percentage};
use storage::{ProgressStore, StorageError};

use crate::catalog::UnitCatalog;
use crate::error::SummaryError;

/// Totals over completed units only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub completed_count: usize,
    pub total_correct: u64,
    pub total_questions: u64,
    /// `round(100 * Σcorrect / Σtotal)`, 0 when nothing is completed.
    pub average_score_percent: u32,
}

impl DashboardStats {
    #[must_use]
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = Score>,
    {
        let mut stats = Self::default();
        for score in scores {
            stats.completed_count += 1;
            stats.total_correct += u64::from(score.correct());
            stats.total_questions += u64::from(score.total());
        }
        stats.average_score_percent = percentage(stats.total_correct, stats.total_questions);
        stats
    }
}

/// Aggregate the snapshots of `units`.
///
/// # Errors
///
/// Returns `StorageError` if a snapshot cannot be read. Corrupt snapshots
/// count as not started.
pub async fn compute_dashboard_stats(
    store: &ProgressStore,
    units: &[UnitId],
) -> Result<DashboardStats, StorageError> {
    let mut scores = Vec::new();
    for &unit in units {
        if let Some(score) = store.load_snapshot(unit).await?.and_then(|s| s.score()) {
            scores.push(score);
        }
    }
    Ok(DashboardStats::from_scores(scores))
}

/// One dashboard entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitCard {
    pub unit: UnitId,
    pub title: String,
    /// `Questions 1801 - 1831` for sets, `100 Questions` for tests.
    pub info: String,
    pub question_count: usize,
    pub status: ProgressStatus,
    pub answered: usize,
    pub score: Option<Score>,
    pub last_updated: Option<DateTime<Utc>>,
    pub badge: String,
}

impl UnitCard {
    fn badge_text(status: ProgressStatus, answered: usize, total: usize, score: Option<Score>) -> String {
        match (status, score) {
            (ProgressStatus::Completed, Some(score)) => {
                format!("{} · {}%", status.label(), score.percentage())
            }
            (ProgressStatus::InProgress, _) => format!("{} ({answered}/{total})", status.label()),
            _ => ProgressStatus::NotStarted.label().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub sets: Vec<UnitCard>,
    pub tests: Vec<UnitCard>,
    pub set_stats: DashboardStats,
    pub test_stats: DashboardStats,
    pub overall: DashboardStats,
}

/// Reads snapshots for the dashboard. Never draws a test.
#[derive(Clone)]
pub struct SummaryService {
    catalog: UnitCatalog,
}

impl SummaryService {
    #[must_use]
    pub fn new(catalog: UnitCatalog) -> Self {
        Self { catalog }
    }

    /// # Errors
    ///
    /// Returns `SummaryError::Storage` if a snapshot cannot be read.
    pub async fn stats(&self) -> Result<DashboardStats, SummaryError> {
        Ok(compute_dashboard_stats(self.catalog.store(), &self.catalog.unit_ids()).await?)
    }

    /// # Errors
    ///
    /// Returns `SummaryError` if `unit` is out of range or the store cannot
    /// be read.
    pub async fn card(&self, unit: UnitId) -> Result<UnitCard, SummaryError> {
        let question_count = self.catalog.question_count(unit).await?;
        let info = match unit {
            UnitId::Set(set) => {
                let (start, end) = self.catalog.settings().set_range(set, self.catalog.bank())?;
                format!("Questions {start} - {end}")
            }
            UnitId::Test(_) => format!("{question_count} Questions"),
        };
        let snapshot = self.catalog.store().load_snapshot(unit).await?;
        let (status, answered, score) = snapshot
            .as_ref()
            .map_or((ProgressStatus::NotStarted, 0, None), |s| {
                (s.status(), s.answered(), s.score())
            });

        Ok(UnitCard {
            unit,
            title: unit.title(),
            info,
            question_count,
            status,
            answered,
            score,
            last_updated: snapshot.map(|s| s.last_updated()),
            badge: UnitCard::badge_text(status, answered, question_count, score),
        })
    }

    /// # Errors
    ///
    /// Returns `SummaryError::Storage` if the store cannot be read.
    pub async fn dashboard(&self) -> Result<DashboardView, SummaryError> {
        let mut sets = Vec::new();
        let mut tests = Vec::new();
        for unit in self.catalog.unit_ids() {
            let card = self.card(unit).await?;
            if unit.is_test() {
                tests.push(card);
            } else {
                sets.push(card);
            }
        }

        let set_stats = DashboardStats::from_scores(sets.iter().filter_map(|c| c.score));
        let test_stats = DashboardStats::from_scores(tests.iter().filter_map(|c| c.score));
        let overall = DashboardStats::from_scores(
            sets.iter().chain(tests.iter()).filter_map(|c| c.score),
        );
        Ok(DashboardView {
            sets,
            tests,
            set_stats,
            test_stats,
            overall,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quiz_core::model::{
        AnswerRecord, OptionLabel, ProgressSnapshot, QuestionBank, QuestionRecord, Serial,
    };
    use quiz_core::partition::PartitionSettings;
    use quiz_core::time::fixed_now;
    use storage::Storage;

    use crate::sampling::Sampler;

    fn completed(correct: u32, total: u32) -> ProgressSnapshot {
        ProgressSnapshot::from_persisted(
            ProgressStatus::Completed,
            0,
            AnswerRecord::new(),
            fixed_now(),
            Some(Score::new(correct, 0, total).unwrap()),
        )
        .unwrap()
    }

    fn in_progress(answered: u32) -> ProgressSnapshot {
        let answers = (1..=answered)
            .map(|sn| (Serial::new(sn), OptionLabel::A))
            .collect();
        ProgressSnapshot::from_persisted(ProgressStatus::InProgress, 1, answers, fixed_now(), None)
            .unwrap()
    }

    fn store() -> ProgressStore {
        ProgressStore::new(Storage::in_memory().kv)
    }

    #[tokio::test]
    async fn no_completed_units_average_zero() {
        let store = store();
        store.save_snapshot(UnitId::set(1), &in_progress(3)).await.unwrap();
        let stats = compute_dashboard_stats(&store, &[UnitId::set(1), UnitId::set(2)])
            .await
            .unwrap();
        assert_eq!(stats, DashboardStats::default());
    }

    #[tokio::test]
    async fn average_is_weighted_by_question_count() {
        let store = store();
        store.save_snapshot(UnitId::set(1), &completed(80, 100)).await.unwrap();
        store.save_snapshot(UnitId::set(19), &completed(25, 31)).await.unwrap();
        store.save_snapshot(UnitId::test(1), &completed(100, 100)).await.unwrap();
        store.save_snapshot(UnitId::set(2), &in_progress(10)).await.unwrap();

        let units = [UnitId::set(1), UnitId::set(2), UnitId::set(19), UnitId::test(1)];
        let stats = compute_dashboard_stats(&store, &units).await.unwrap();
        assert_eq!(stats.completed_count, 3);
        assert_eq!(stats.total_correct, 205);
        assert_eq!(stats.total_questions, 231);
        assert_eq!(stats.average_score_percent, 89);
    }

    #[tokio::test]
    async fn dashboard_cards_carry_badges() {
        let records = (1..=12)
            .map(|sn| {
                QuestionRecord::new(
                    Serial::new(sn),
                    format!("Q{sn}"),
                    ["a".into(), "b".into(), "c".into(), "d".into()],
                    OptionLabel::A,
                )
                .unwrap()
            })
            .collect();
        let bank = Arc::new(QuestionBank::new(records).unwrap());
        let store = store();
        let settings = PartitionSettings::new(5, 4, 1).unwrap();
        let catalog = UnitCatalog::new(bank, settings, Sampler::Entropy, store.clone());

        store.save_snapshot(UnitId::set(2), &in_progress(2)).await.unwrap();
        store.save_snapshot(UnitId::set(3), &completed(1, 2)).await.unwrap();

        let view = SummaryService::new(catalog).dashboard().await.unwrap();
        assert_eq!(view.sets.len(), 3);
        assert_eq!(view.tests.len(), 1);

        assert_eq!(view.sets[0].badge, "Not Started");
        assert_eq!(view.sets[0].last_updated, None);
        assert_eq!(view.sets[1].last_updated, Some(fixed_now()));
        assert_eq!(view.sets[0].info, "Questions 1 - 5");
        assert_eq!(view.sets[1].badge, "In Progress (2/5)");
        assert_eq!(view.sets[2].info, "Questions 11 - 12");
        assert_eq!(view.sets[2].badge, "Completed · 50%");
        assert_eq!(view.tests[0].info, "4 Questions");

        assert_eq!(view.set_stats.completed_count, 1);
        assert_eq!(view.test_stats, DashboardStats::default());
        assert_eq!(view.overall.average_score_percent, 50);
    }
}
