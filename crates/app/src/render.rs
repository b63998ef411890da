//! Plain-text rendering of service view-models.

use services::{
    CompletionView, DashboardStats, DashboardView, EngineView, OptionMark, QuestionView, UnitCard,
};

pub fn dashboard(view: &DashboardView) {
    println!("Sets");
    for card in &view.sets {
        unit_card(card);
    }
    stats("Sets", &view.set_stats);
    println!();
    println!("Tests");
    for card in &view.tests {
        unit_card(card);
    }
    stats("Tests", &view.test_stats);
    println!();
    stats("Overall", &view.overall);
}

fn unit_card(card: &UnitCard) {
    let played = card
        .last_updated
        .map(|at| format!("  last played {}", at.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    println!(
        "  {:<8} {:<10} {:<22} {}{played}",
        card.unit.to_string(),
        card.title,
        card.info,
        card.badge
    );
}

fn stats(label: &str, stats: &DashboardStats) {
    println!(
        "{label}: {} completed, {}/{} correct, average {}%",
        stats.completed_count, stats.total_correct, stats.total_questions, stats.average_score_percent
    );
}

pub fn engine(view: &EngineView) {
    match view {
        EngineView::Question(question) => self::question(question),
        EngineView::Completed(completion) => self::completion(completion),
    }
}

fn question(view: &QuestionView) {
    println!();
    println!(
        "{}  question {}/{}  ({}%)  #{}",
        view.title,
        view.position,
        view.total,
        (view.progress * 100.0).round(),
        view.serial
    );
    println!("{}", view.prompt);
    for option in &view.options {
        let marker = match (option.selected, option.mark) {
            (true, OptionMark::Correct) => "✓",
            (true, OptionMark::Incorrect) => "✗",
            _ => " ",
        };
        println!(" {marker} {}) {}", option.label, option.text);
    }
    if let Some(feedback) = &view.feedback {
        if feedback.is_correct {
            println!("Correct!");
        } else {
            println!(
                "Incorrect. The correct answer is {}) {}",
                feedback.correct_label, feedback.correct_text
            );
        }
    }

    let mut keys = vec!["a-d answer"];
    if !view.is_first {
        keys.push("p previous");
    }
    let next = if view.is_last { "n finish" } else { "n next" };
    keys.push(next);
    keys.push("r retry");
    keys.push("q quit");
    println!("[{}]", keys.join(", "));
}

fn completion(view: &CompletionView) {
    println!();
    println!("{} complete", view.title);
    println!(
        "Score: {}/{} ({}%), {} incorrect, {} unanswered",
        view.score.correct(),
        view.score.total(),
        view.percentage,
        view.score.incorrect(),
        view.score.unanswered()
    );
    for item in &view.review {
        let verdict = if item.is_correct { "✓" } else { "✗" };
        let answer = match (&item.user_answer, &item.user_answer_text) {
            (Some(label), Some(text)) => format!("{label}) {text}"),
            _ => "not answered".to_owned(),
        };
        println!("{verdict} {:>3}. {}", item.position, item.prompt);
        if !item.is_correct {
            println!(
                "       yours: {answer}; correct: {}) {}",
                item.correct_answer, item.correct_answer_text
            );
        }
    }
    println!("[r retry, q quit]");
}
