//! Experimental boolean query grammar.
//!
//! Extends the prefix mini-language with `AND`/`OR`/`NOT`, parentheses, and
//! quoted values:
//!
//! ```text
//! d:water AND NOT h:火
//! (p:shui3 OR p:huo3) d:"running water"
//! ```
//!
//! Adjacent clauses are an implicit `AND`. Clauses use the same field
//! prefixes and per-field predicates as the simple lexer, but unlike it this
//! parser rejects malformed input. Gated behind the `advanced-query` feature
//! and not wired into the interactive search path.

use crate::lexer::leading_prefix;
use crate::matcher::matches_token;
use crate::types::{DictionaryEntry, SearchToken, TokenType};
use thiserror::Error;

/// Errors from the boolean grammar parser.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("empty query expression")]
    EmptyExpression,

    #[error("unbalanced parenthesis")]
    UnbalancedParen,

    #[error("operator `{0}` is missing an operand")]
    DanglingOperator(String),

    #[error("unterminated quoted value")]
    UnterminatedQuote,

    #[error("unexpected `{0}`")]
    UnexpectedToken(String),
}

/// Parsed boolean query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpr {
    Clause(SearchToken),
    And(Vec<QueryExpr>),
    Or(Vec<QueryExpr>),
    Not(Box<QueryExpr>),
}

impl QueryExpr {
    /// Evaluate the expression against a dictionary entry.
    pub fn evaluate(&self, entry: &DictionaryEntry) -> bool {
        match self {
            Self::Clause(token) => matches_token(entry, token),
            Self::And(children) => children.iter().all(|c| c.evaluate(entry)),
            Self::Or(children) => children.iter().any(|c| c.evaluate(entry)),
            Self::Not(child) => !child.evaluate(entry),
        }
    }
}

/// Parse a boolean query string.
pub fn parse_query(input: &str) -> Result<QueryExpr, QueryError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(QueryError::EmptyExpression);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(RawToken::RParen) => Err(QueryError::UnbalancedParen),
        Some(other) => Err(QueryError::UnexpectedToken(other.display())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RawToken {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Clause(SearchToken),
}

impl RawToken {
    fn display(&self) -> String {
        match self {
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::And => "AND".to_string(),
            Self::Or => "OR".to_string(),
            Self::Not => "NOT".to_string(),
            Self::Clause(token) => token.value.clone(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<RawToken>, QueryError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '(' => {
                chars.next();
                tokens.push(RawToken::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(RawToken::RParen);
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' {
                        break;
                    }
                    chars.next();
                    word.push(c);
                    // A quote right after the prefix colon starts a quoted
                    // value that may span whitespace and parens.
                    if c == ':' && chars.peek() == Some(&'"') {
                        chars.next();
                        let mut closed = false;
                        for q in chars.by_ref() {
                            if q == '"' {
                                closed = true;
                                break;
                            }
                            word.push(q);
                        }
                        if !closed {
                            return Err(QueryError::UnterminatedQuote);
                        }
                        break;
                    }
                }
                tokens.push(classify_word(word));
            }
        }
    }

    Ok(tokens)
}

fn classify_word(word: String) -> RawToken {
    match word.to_ascii_uppercase().as_str() {
        "AND" => RawToken::And,
        "OR" => RawToken::Or,
        "NOT" => RawToken::Not,
        _ => {
            let token = match leading_prefix(&word) {
                Some((token_type, prefix_len)) => {
                    SearchToken::new(token_type, word[prefix_len..].to_string())
                }
                None => SearchToken::new(TokenType::General, word),
            };
            RawToken::Clause(token)
        }
    }
}

struct Parser {
    tokens: Vec<RawToken>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&RawToken> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<RawToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<QueryExpr, QueryError> {
        let mut children = vec![self.parse_and()?];
        while self.peek() == Some(&RawToken::Or) {
            self.next();
            if self.peek().is_none() {
                return Err(QueryError::DanglingOperator("OR".to_string()));
            }
            children.push(self.parse_and()?);
        }
        Ok(flatten(children, QueryExpr::Or))
    }

    fn parse_and(&mut self) -> Result<QueryExpr, QueryError> {
        let mut children = vec![self.parse_unary()?];
        loop {
            match self.peek() {
                Some(RawToken::And) => {
                    self.next();
                    if self.peek().is_none() {
                        return Err(QueryError::DanglingOperator("AND".to_string()));
                    }
                    children.push(self.parse_unary()?);
                }
                // Adjacency is an implicit AND.
                Some(RawToken::Not) | Some(RawToken::LParen) | Some(RawToken::Clause(_)) => {
                    children.push(self.parse_unary()?);
                }
                _ => break,
            }
        }
        Ok(flatten(children, QueryExpr::And))
    }

    fn parse_unary(&mut self) -> Result<QueryExpr, QueryError> {
        match self.next() {
            Some(RawToken::Not) => {
                if self.peek().is_none() {
                    return Err(QueryError::DanglingOperator("NOT".to_string()));
                }
                Ok(QueryExpr::Not(Box::new(self.parse_unary()?)))
            }
            Some(RawToken::LParen) => {
                let expr = self.parse_or()?;
                match self.next() {
                    Some(RawToken::RParen) => Ok(expr),
                    _ => Err(QueryError::UnbalancedParen),
                }
            }
            Some(RawToken::Clause(token)) => Ok(QueryExpr::Clause(token)),
            Some(RawToken::And) => Err(QueryError::DanglingOperator("AND".to_string())),
            Some(RawToken::Or) => Err(QueryError::DanglingOperator("OR".to_string())),
            Some(RawToken::RParen) => Err(QueryError::UnbalancedParen),
            None => Err(QueryError::EmptyExpression),
        }
    }
}

fn flatten(mut children: Vec<QueryExpr>, combine: fn(Vec<QueryExpr>) -> QueryExpr) -> QueryExpr {
    if children.len() == 1 {
        children.remove(0)
    } else {
        combine(children)
    }
}
