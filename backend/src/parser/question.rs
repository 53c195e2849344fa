//! Survey row → [`Question`].

use super::choices::resolve_choices;
use crate::models::{is_select_type, Constraint, LocalizedText, Question};
use crate::source::{Row, Sheet};

/// Build a question from one survey row.
///
/// - `required` is true only for a case-insensitive `yes`
/// - select-family types get their choices when `list_name` is set
/// - `constraints` and `hint` are attached only when non-empty
pub fn build_question(row: &Row, choices: &Sheet) -> Question {
    let question_type = row
        .text("type")
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    let choices = if is_select_type(&question_type) {
        row.text("list_name")
            .map(|list_name| resolve_choices(&list_name, choices))
    } else {
        None
    };

    let constraints = row.text("constraint").map(|rule| Constraint {
        rule,
        message: LocalizedText::new(row.text("constraint_message").unwrap_or_default()),
    });

    Question {
        name: row.text("name").unwrap_or_default(),
        label: LocalizedText::new(row.text("label").unwrap_or_default()),
        required: is_required(row),
        appearance: row.text("appearance"),
        relevant: row.text("relevant"),
        calculation: row.text("calculation"),
        default: row.get("default").cloned(),
        hint: row.text("hint").map(LocalizedText::new),
        choices,
        constraints,
        question_type,
    }
}

fn is_required(row: &Row) -> bool {
    row.text("required")
        .is_some_and(|value| value.to_lowercase() == "yes")
}
