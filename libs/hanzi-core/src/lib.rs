//! Core search and study types for the hanzi study application.
//!
//! Provides:
//! - Pinyin syllable validator (initial + final + tone grammar)
//! - Search query lexer (field-prefix mini-language)
//! - Token matcher with per-kind LRU result caches
//! - Shared types (SearchToken, DictionaryEntry, StudyItem, etc.)
//!
//! The experimental boolean grammar lives behind the `advanced-query`
//! feature and is not part of the interactive search path.

#[cfg(feature = "advanced-query")]
pub mod advanced;
pub mod lexer;
pub mod matcher;
pub mod pinyin;
pub mod types;

pub use lexer::lex;
pub use matcher::{filter_entries, matches_all, matches_token, strip_tones, SearchCache};
pub use pinyin::{is_valid_syllable, normalize, parse, validate_token};
pub use types::{
    CharacterEntry, DictionaryEntry, EntryKind, PinyinSyllable, ReviewPair, SearchToken,
    StudyItem, TokenType, WordEntry,
};
