//! Key layout inside the key-value store.
//!
//! ```text
//! quiz:set:<n>:progress     snapshot of set n
//! quiz:test:<n>:progress    snapshot of test n
//! quiz:test:<n>:questions   pinned question list of test n
//! ```
//!
//! Sets and tests live under different segments so `set 1` and `test 1`
//! never collide.

use quiz_core::model::{TestNumber, UnitId};

/// Prefix shared by every key this crate writes.
pub const NAMESPACE: &str = "quiz:";

#[must_use]
pub fn progress_key(unit: UnitId) -> String {
    match unit {
        UnitId::Set(n) => format!("{NAMESPACE}set:{n}:progress"),
        UnitId::Test(n) => format!("{NAMESPACE}test:{n}:progress"),
    }
}

#[must_use]
pub fn pinned_questions_key(test: TestNumber) -> String {
    format!("{NAMESPACE}test:{test}:questions")
}
