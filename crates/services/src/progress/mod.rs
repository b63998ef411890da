mod engine;
mod view;

pub use engine::ProgressEngine;
pub use view::{
    AnswerFeedback, CompletionView, EngineView, OptionMark, OptionView, QuestionView, ReviewItem,
};
