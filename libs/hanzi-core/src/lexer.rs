//! Search query lexer.
//!
//! Splits a free-text query into typed tokens by scanning for field
//! prefixes:
//!
//! ```text
//! p:shui3 d:water h:水     =>  (pinyin, "shui3") (definition, "water") (hanzi, "水")
//! hello world              =>  (general, "hello world")
//! ```
//!
//! The lexer never fails. Text before the first prefix becomes a general
//! token, a prefix with an empty value is dropped, and input with no prefix
//! at all is one general token. Search-as-you-type callers rely on this:
//! there is no parse error to surface.

use crate::types::{SearchToken, TokenType};

/// Recognized field prefixes, long forms first.
const PREFIXES: [(&str, TokenType); 6] = [
    ("pinyin:", TokenType::Pinyin),
    ("definition:", TokenType::Definition),
    ("hanzi:", TokenType::Hanzi),
    ("p:", TokenType::Pinyin),
    ("d:", TokenType::Definition),
    ("h:", TokenType::Hanzi),
];

#[derive(Debug, Clone, Copy)]
struct PrefixMatch {
    /// Byte offset of the prefix itself.
    start: usize,
    /// Byte offset just after the colon.
    value_start: usize,
    token_type: TokenType,
}

/// Lex a raw query string into an ordered token list.
pub fn lex(query: &str) -> Vec<SearchToken> {
    let matches = find_prefixes(query);

    if matches.is_empty() {
        let value = collapse_whitespace(query);
        if value.is_empty() {
            return Vec::new();
        }
        return vec![SearchToken::new(TokenType::General, value)];
    }

    let mut tokens = Vec::with_capacity(matches.len() + 1);

    let head = collapse_whitespace(&query[..matches[0].start]);
    if !head.is_empty() {
        tokens.push(SearchToken::new(TokenType::General, head));
    }

    for (idx, m) in matches.iter().enumerate() {
        let end = matches
            .get(idx + 1)
            .map(|next| next.start)
            .unwrap_or(query.len());
        let value = collapse_whitespace(&query[m.value_start..end]);
        if !value.is_empty() {
            tokens.push(SearchToken::new(m.token_type, value));
        }
    }

    tokens
}

/// Find all word-boundary-anchored prefix occurrences, left to right.
fn find_prefixes(query: &str) -> Vec<PrefixMatch> {
    let bytes = query.as_bytes();
    let mut matches = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !query.is_char_boundary(i) {
            i += 1;
            continue;
        }
        if at_word_boundary(query, i) {
            if let Some(m) = match_prefix_at(bytes, i) {
                i = m.value_start;
                matches.push(m);
                continue;
            }
        }
        i += 1;
    }

    matches
}

fn at_word_boundary(query: &str, i: usize) -> bool {
    i == 0
        || query[..i]
            .chars()
            .next_back()
            .map(char::is_whitespace)
            .unwrap_or(true)
}

fn match_prefix_at(bytes: &[u8], i: usize) -> Option<PrefixMatch> {
    for (prefix, token_type) in PREFIXES {
        let end = i + prefix.len();
        if end <= bytes.len() && bytes[i..end].eq_ignore_ascii_case(prefix.as_bytes()) {
            return Some(PrefixMatch {
                start: i,
                value_start: end,
                token_type,
            });
        }
    }
    None
}

/// Field prefix at the start of `s`, with the byte length of the prefix.
#[cfg(feature = "advanced-query")]
pub(crate) fn leading_prefix(s: &str) -> Option<(TokenType, usize)> {
    match_prefix_at(s.as_bytes(), 0).map(|m| (m.token_type, m.value_start))
}

/// Trim and collapse internal whitespace runs to single spaces.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(token_type: TokenType, value: &str) -> SearchToken {
        SearchToken::new(token_type, value)
    }

    #[test]
    fn lex_all_three_prefixes() {
        let tokens = lex("p:ni hao d:water h:你 好");
        assert_eq!(
            tokens,
            vec![
                token(TokenType::Pinyin, "ni hao"),
                token(TokenType::Definition, "water"),
                token(TokenType::Hanzi, "你 好"),
            ]
        );
    }

    #[test]
    fn lex_long_prefix_forms() {
        let tokens = lex("pinyin:shui3 definition:water hanzi:水");
        assert_eq!(
            tokens,
            vec![
                token(TokenType::Pinyin, "shui3"),
                token(TokenType::Definition, "water"),
                token(TokenType::Hanzi, "水"),
            ]
        );
    }

    #[test]
    fn lex_is_case_insensitive() {
        let tokens = lex("P:shui3 DEFINITION:water");
        assert_eq!(
            tokens,
            vec![
                token(TokenType::Pinyin, "shui3"),
                token(TokenType::Definition, "water"),
            ]
        );
    }

    #[test]
    fn lex_no_prefix_is_general() {
        let tokens = lex("hello world");
        assert_eq!(tokens, vec![token(TokenType::General, "hello world")]);
    }

    #[test]
    fn lex_text_before_first_prefix_is_general() {
        let tokens = lex("water radical p:shui3");
        assert_eq!(
            tokens,
            vec![
                token(TokenType::General, "water radical"),
                token(TokenType::Pinyin, "shui3"),
            ]
        );
    }

    #[test]
    fn lex_empty_and_blank_input() {
        assert!(lex("").is_empty());
        assert!(lex("   \t ").is_empty());
    }

    #[test]
    fn lex_drops_empty_clause() {
        let tokens = lex("p: d:water");
        assert_eq!(tokens, vec![token(TokenType::Definition, "water")]);
    }

    #[test]
    fn lex_collapses_internal_whitespace() {
        let tokens = lex("d:   running   water  ");
        assert_eq!(tokens, vec![token(TokenType::Definition, "running water")]);
    }

    #[test]
    fn lex_prefix_requires_word_boundary() {
        // "ad:" is ordinary text, not a definition clause.
        let tokens = lex("ad:hoc");
        assert_eq!(tokens, vec![token(TokenType::General, "ad:hoc")]);
    }

    #[test]
    fn lex_prefix_after_cjk_text() {
        let tokens = lex("水 d:water");
        assert_eq!(
            tokens,
            vec![
                token(TokenType::General, "水"),
                token(TokenType::Definition, "water"),
            ]
        );
    }
}
