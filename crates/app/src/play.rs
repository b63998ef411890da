//! Interactive loop over one unit, driven by single-word commands on stdin.

use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};

use quiz_core::model::OptionLabel;
use quiz_core::traversal::TraversalError;
use services::{ProgressEngine, ProgressError};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Answer(OptionLabel),
    Next,
    Previous,
    Retry,
    Quit,
}

impl Input {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "n" | "next" | "f" | "finish" => Some(Self::Next),
            "p" | "prev" | "previous" => Some(Self::Previous),
            "r" | "retry" => Some(Self::Retry),
            "q" | "quit" | "exit" => Some(Self::Quit),
            other => other.parse().ok().map(Self::Answer),
        }
    }
}

/// Message for errors the learner can recover from by choosing again.
fn rejected(err: &ProgressError) -> Option<&'static str> {
    match err {
        ProgressError::Traversal(TraversalError::AnswerLocked { .. }) => {
            Some("This question is already answered correctly.")
        }
        ProgressError::Traversal(TraversalError::Completed) => {
            Some("This unit is complete. Retry to start over.")
        }
        ProgressError::Redrawn { .. } => Some("New questions were drawn. Answer again."),
        _ => None,
    }
}

pub async fn run(mut engine: ProgressEngine) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        render::engine(&engine.view());
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let Some(input) = Input::parse(&line) else {
            println!("Unrecognized input: {}", line.trim());
            continue;
        };

        let result = match input {
            Input::Quit => return Ok(()),
            Input::Answer(label) => engine.answer_current(label).await.map(|_| ()),
            Input::Next => engine.go_next().await.map(|_| ()),
            Input::Previous => match engine.go_previous().await {
                Ok(false) => {
                    println!("Already at the first question.");
                    Ok(())
                }
                other => other.map(|_| ()),
            },
            Input::Retry => engine.retry().await,
        };

        if let Err(err) = result {
            match rejected(&err) {
                Some(message) => println!("{message}"),
                None => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_labels() {
        assert_eq!(Input::parse("b"), Some(Input::Answer(OptionLabel::B)));
        assert_eq!(Input::parse(" D\n"), Some(Input::Answer(OptionLabel::D)));
        assert_eq!(Input::parse("next"), Some(Input::Next));
        assert_eq!(Input::parse("P"), Some(Input::Previous));
        assert_eq!(Input::parse("q"), Some(Input::Quit));
        assert_eq!(Input::parse("e"), None);
        assert_eq!(Input::parse(""), None);
    }

    #[test]
    fn redraw_is_recoverable() {
        let err = ProgressError::Redrawn {
            unit: quiz_core::model::UnitId::test(1),
        };
        assert!(rejected(&err).is_some());
        assert!(rejected(&ProgressError::Traversal(TraversalError::Completed)).is_some());
    }

    #[tokio::test]
    async fn reads_lines_from_an_async_reader() {
        let input: &[u8] = b"a\nnext\n";
        let mut lines = BufReader::new(input).lines();
        let first = lines.next_line().await.unwrap().unwrap();
        assert_eq!(Input::parse(&first), Some(Input::Answer(OptionLabel::A)));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("next"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }
}
