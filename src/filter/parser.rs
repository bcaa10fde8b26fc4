//! Recursive descent parser for sift expressions.

use super::ast::Expr;
use super::lexer::{tokenize, Token};

/// Parser for sift expressions.
///
/// # Grammar
///
/// ```text
/// expression ::= term ((AND | OR) term)*
/// term       ::= NOT term | "(" expression ")" | FIELD | TERM
/// ```
///
/// `AND` and `OR` share a single precedence level and associate left to
/// right: `a OR b AND c` parses as `(a OR b) AND c`. This flat precedence
/// differs from conventional boolean grammars and is a defining behavior of
/// the sift language, kept deliberately. `NOT` binds only the single term
/// that follows it.
///
/// Parsing never fails. Empty input parses to the match-all term, a group
/// whose `)` is missing degrades to match-all, and tokens left over after
/// the top-level expression are ignored.
pub struct FilterParser {
    tokens: Vec<Token>,
    position: usize,
}

impl FilterParser {
    /// Parse a filter string into an expression tree.
    pub fn parse(input: &str) -> Expr {
        let tokens = tokenize(input);
        if tokens.is_empty() {
            return Expr::match_all();
        }

        let mut parser = Self {
            tokens,
            position: 0,
        };
        parser.parse_expression()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// `term ((AND | OR) term)*`, folded left.
    fn parse_expression(&mut self) -> Expr {
        let mut expr = self.parse_term();

        loop {
            let is_and = match self.peek() {
                Some(Token::And) => true,
                Some(Token::Or) => false,
                _ => break,
            };
            self.advance();
            let right = self.parse_term();
            expr = if is_and {
                Expr::and(expr, right)
            } else {
                Expr::or(expr, right)
            };
        }

        expr
    }

    /// `NOT term | "(" expression ")" | FIELD | TERM`
    fn parse_term(&mut self) -> Expr {
        let Some(token) = self.advance() else {
            return Expr::match_all();
        };

        match token {
            Token::Not => Expr::negate(self.parse_term()),

            Token::OpenParen => {
                let inner = self.parse_expression();
                if matches!(self.peek(), Some(Token::CloseParen)) {
                    self.advance();
                    inner
                } else {
                    // Unbalanced group: keep every record visible rather
                    // than fail the whole filter.
                    Expr::match_all()
                }
            }

            Token::Field { name, text, phrase } => Expr::Field { name, text, phrase },
            Token::Term { text, phrase } => Expr::Term { text, phrase },

            // An operator keyword where a term was expected reads as a
            // literal word; a stray close paren as an empty group.
            Token::And => Expr::Term {
                text: "and".to_string(),
                phrase: false,
            },
            Token::Or => Expr::Term {
                text: "or".to_string(),
                phrase: false,
            },
            Token::CloseParen => Expr::match_all(),
        }
    }
}
