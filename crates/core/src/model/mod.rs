mod bank;
mod ids;
mod progress;
mod question;

pub use bank::{BankError, QuestionBank};
pub use ids::{ParseIdError, Serial, SetNumber, TestNumber, UnitId};
pub use progress::{
    AnswerRecord, ProgressSnapshot, ProgressStatus, Score, SnapshotError, percentage,
};
pub use question::{OptionLabel, QuestionError, QuestionRecord};
