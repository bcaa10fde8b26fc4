//! Boolean expression tree for sift expressions.

/// A parsed sift expression.
///
/// Trees are immutable; the parser builds a fresh one on every filter-string
/// change. Leaves carry whether their text was quoted as a phrase, which
/// selects substring matching in the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A literal term matched against the whole record.
    Term { text: String, phrase: bool },

    /// A term scoped to one named field, or to `any`.
    Field {
        name: String,
        text: String,
        phrase: bool,
    },

    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    /// The trivially-true expression: an empty term matches every record.
    pub fn match_all() -> Self {
        Expr::Term {
            text: String::new(),
            phrase: false,
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn negate(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }
}
