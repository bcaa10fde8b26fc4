//! Evaluates sift expressions against normalized records.

use regex::Regex;

use super::ast::Expr;
use crate::models::{Field, Paper};

/// Decide whether one record satisfies a sift expression.
///
/// Total by construction: every expression the parser can produce evaluates
/// to a boolean, and the `Expr` enum is closed, so there is no unrecognized
/// node case to fail on.
pub fn matches(expr: &Expr, paper: &Paper) -> bool {
    let view = FieldView::new(paper);
    eval(expr, &view)
}

/// Lowercased field text for one record, plus the space-joined haystack
/// that bare terms match against.
struct FieldView {
    fields: Vec<(Field, String)>,
    haystack: String,
}

impl FieldView {
    fn new(paper: &Paper) -> Self {
        let fields: Vec<(Field, String)> = Field::ALL
            .iter()
            .map(|&field| (field, paper.field(field).to_lowercase()))
            .collect();
        let haystack = fields
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self { fields, haystack }
    }

    fn text(&self, field: Field) -> &str {
        self.fields
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, text)| text.as_str())
            .unwrap_or("")
    }
}

fn eval(expr: &Expr, view: &FieldView) -> bool {
    match expr {
        Expr::And(left, right) => eval(left, view) && eval(right, view),
        Expr::Or(left, right) => eval(left, view) || eval(right, view),
        Expr::Not(inner) => !eval(inner, view),
        Expr::Term { text, phrase } => match_term(text, *phrase, &view.haystack),
        Expr::Field { name, text, phrase } => {
            if name == "any" {
                view.fields
                    .iter()
                    .any(|(_, value)| match_term(text, *phrase, value))
            } else {
                // Unknown field names read as empty text, so the term
                // (unless itself empty) fails to match.
                let value = Field::parse(name).map(|f| view.text(f)).unwrap_or("");
                match_term(text, *phrase, value)
            }
        }
    }
}

/// Match one literal term against one lowercased text value.
///
/// Quoted phrases match as plain substrings with no word-boundary
/// requirement. Terms containing `*` or `?` match anywhere, with `*`
/// standing for any run of characters and `?` for exactly one. Everything
/// else must appear as a whole word. All three rules ignore case. The
/// empty term matches everything.
fn match_term(term: &str, phrase: bool, text: &str) -> bool {
    if term.is_empty() {
        return true;
    }

    if phrase {
        return text.contains(&term.to_lowercase());
    }

    if term.contains(['*', '?']) {
        return Regex::new(&format!("(?i){}", wildcard_pattern(term)))
            .map(|re| re.is_match(text))
            .unwrap_or(false);
    }

    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term)))
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// Translate a wildcard term into a regex, escaping everything except the
/// two wildcard characters.
fn wildcard_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() * 2);
    for c in term.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern
}
