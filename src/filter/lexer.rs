//! Tokenizer for sift expressions.

use regex::Regex;
use std::sync::LazyLock;

/// A token in a sift expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A field-scoped term, e.g. `title:discourse` or
    /// `abstract:"critical discourse"`.
    Field {
        /// Field name, lowercased.
        name: String,
        /// Term text with surrounding quotes stripped.
        text: String,
        /// Whether the term was double-quoted.
        phrase: bool,
    },

    /// A bare word or quoted phrase.
    Term { text: String, phrase: bool },

    /// The `AND` keyword.
    And,

    /// The `OR` keyword.
    Or,

    /// The `NOT` keyword.
    Not,

    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,
}

/// `word:value` where the value is a double-quoted phrase (escaped quotes
/// allowed) or a run of non-space, non-paren characters.
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\w+):("(?:[^"\\]|\\.)*"|[^\s()]+)"#).expect("field pattern is valid")
});

/// A double-quoted phrase or a bare non-space run.
static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(?:"([^"]*)"|\S+)"#).expect("term pattern is valid"));

/// Lex a filter string into tokens.
///
/// At each position the first matching form wins: a field-scoped term, a
/// single parenthesis, then a quoted phrase or bare run. Characters that
/// match nothing are skipped. Never fails; empty input yields no tokens.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut rest = input.trim_start();
    let mut tokens = Vec::new();

    while !rest.is_empty() {
        if let Some(caps) = FIELD_RE.captures(rest) {
            let name = caps[1].to_lowercase();
            let (text, phrase) = strip_quotes(&caps[2]);
            tokens.push(Token::Field { name, text, phrase });
            rest = rest[caps[0].len()..].trim_start();
        } else if let Some(after) = rest.strip_prefix('(') {
            tokens.push(Token::OpenParen);
            rest = after.trim_start();
        } else if let Some(after) = rest.strip_prefix(')') {
            tokens.push(Token::CloseParen);
            rest = after.trim_start();
        } else if let Some(caps) = TERM_RE.captures(rest) {
            let token = match caps.get(1) {
                // Quoted phrases are never operator keywords.
                Some(inner) => Token::Term {
                    text: inner.as_str().to_string(),
                    phrase: true,
                },
                None => keyword_or_term(&caps[0]),
            };
            tokens.push(token);
            rest = rest[caps[0].len()..].trim_start();
        } else {
            let mut chars = rest.chars();
            chars.next();
            rest = chars.as_str().trim_start();
        }
    }

    tokens
}

fn strip_quotes(value: &str) -> (String, bool) {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        (value[1..value.len() - 1].to_string(), true)
    } else {
        (value.to_string(), false)
    }
}

fn keyword_or_term(word: &str) -> Token {
    if word.eq_ignore_ascii_case("and") {
        Token::And
    } else if word.eq_ignore_ascii_case("or") {
        Token::Or
    } else if word.eq_ignore_ascii_case("not") {
        Token::Not
    } else {
        Token::Term {
            text: word.to_string(),
            phrase: false,
        }
    }
}
