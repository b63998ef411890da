use std::sync::Arc;

use quiz_core::model::{
    AnswerRecord, OptionLabel, ProgressSnapshot, ProgressStatus, QuestionRecord, Score, Serial,
    TestNumber, UnitId,
};
use quiz_core::time::fixed_now;
use storage::ProgressStore;
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteStore;

fn question(sn: u32) -> QuestionRecord {
    QuestionRecord::new(
        Serial::new(sn),
        format!("Q{sn}"),
        ["a".into(), "b".into(), "c".into(), "d".into()],
        OptionLabel::B,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_kv_round_trip() {
    let store = SqliteStore::open("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    assert_eq!(store.get("quiz:set:1:progress").await.unwrap(), None);
    store.set("quiz:set:1:progress", "first").await.unwrap();
    store.set("quiz:set:1:progress", "second").await.unwrap();
    assert_eq!(
        store.get("quiz:set:1:progress").await.unwrap().as_deref(),
        Some("second")
    );

    store.set("quiz:test:1:questions", "[]").await.unwrap();
    store.set("other", "x").await.unwrap();
    let keys = store.keys_with_prefix("quiz:").await.unwrap();
    assert_eq!(keys, vec!["quiz:set:1:progress", "quiz:test:1:questions"]);

    store.remove("quiz:set:1:progress").await.unwrap();
    store.remove("quiz:set:1:progress").await.unwrap();
    assert_eq!(store.get("quiz:set:1:progress").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let store = SqliteStore::open("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("first migrate");
    store.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn progress_store_over_sqlite_persists_snapshots_and_pins() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress_store?mode=memory&cache=shared")
        .await
        .expect("storage");
    let progress = ProgressStore::new(Arc::clone(&storage.kv));

    let mut answers = AnswerRecord::new();
    answers.insert(Serial::new(3), OptionLabel::B);
    let snapshot = ProgressSnapshot::from_persisted(
        ProgressStatus::Completed,
        2,
        answers,
        fixed_now(),
        Some(Score::new(1, 0, 3).unwrap()),
    )
    .unwrap();
    let unit = UnitId::test(2);
    progress.save_snapshot(unit, &snapshot).await.unwrap();

    let pinned = vec![question(3), question(1), question(2)];
    progress
        .save_pinned(TestNumber::new(2), &pinned)
        .await
        .unwrap();

    assert_eq!(progress.load_snapshot(unit).await.unwrap(), Some(snapshot));
    assert_eq!(
        progress.load_pinned(TestNumber::new(2)).await.unwrap(),
        Some(pinned)
    );

    progress.remove_unit(unit).await.unwrap();
    assert!(progress.load_snapshot(unit).await.unwrap().is_none());
    assert!(progress.load_pinned(TestNumber::new(2)).await.unwrap().is_none());
}
