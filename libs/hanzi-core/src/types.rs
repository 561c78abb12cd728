//! Core types for the hanzi study application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of search token produced by the query lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Pinyin,
    Definition,
    Hanzi,
    General,
}

impl TokenType {
    /// Stable identifier used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pinyin => "pinyin",
            Self::Definition => "definition",
            Self::Hanzi => "hanzi",
            Self::General => "general",
        }
    }
}

/// A typed clause of a search query.
///
/// Tokens are produced fresh on every lexing call. List order records
/// left-to-right appearance in the input; matching treats the list as an
/// unordered conjunction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchToken {
    pub token_type: TokenType,
    pub value: String,
}

impl SearchToken {
    pub fn new(token_type: TokenType, value: impl Into<String>) -> Self {
        Self {
            token_type,
            value: value.into(),
        }
    }
}

/// A successfully parsed pinyin syllable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinyinSyllable {
    /// Leading consonant cluster, absent for vowel-initial syllables.
    pub initial: Option<String>,
    /// Vowel cluster, always present.
    pub final_part: String,
    /// Tone number, 1-5 (5 = neutral).
    pub tone: u8,
}

/// Which dictionary table an entry or study item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Character,
    Word,
}

/// A single-character dictionary record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub id: i64,
    pub simplified: String,
    pub traditional: String,
    /// One syllable with a trailing tone digit, e.g. "shui3".
    pub pinyin: String,
    pub definition: String,
}

/// A multi-character dictionary record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub id: i64,
    pub simplified: String,
    pub traditional: String,
    /// Space-separated syllables, each with a trailing tone digit.
    pub pinyin: String,
    pub definition: String,
}

/// A dictionary entry, either a character or a word.
///
/// Ids are unique per variant, not across variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DictionaryEntry {
    Character(CharacterEntry),
    Word(WordEntry),
}

impl DictionaryEntry {
    pub fn id(&self) -> i64 {
        match self {
            Self::Character(c) => c.id,
            Self::Word(w) => w.id,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Character(_) => EntryKind::Character,
            Self::Word(_) => EntryKind::Word,
        }
    }

    pub fn simplified(&self) -> &str {
        match self {
            Self::Character(c) => &c.simplified,
            Self::Word(w) => &w.simplified,
        }
    }

    pub fn traditional(&self) -> &str {
        match self {
            Self::Character(c) => &c.traditional,
            Self::Word(w) => &w.traditional,
        }
    }

    pub fn pinyin(&self) -> &str {
        match self {
            Self::Character(c) => &c.pinyin,
            Self::Word(w) => &w.pinyin,
        }
    }

    pub fn definition(&self) -> &str {
        match self {
            Self::Character(c) => &c.definition,
            Self::Word(w) => &w.definition,
        }
    }
}

/// An entry the user has added to their study list.
///
/// `current_priority` is a countdown: the item surfaces in review only once
/// it has decayed to 1. `max_priority` is a high-water mark of how far the
/// countdown has been wound up; a "forgot" event lowers it, so it may lag
/// `current_priority`. Both are always >= 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyItem {
    pub id: i64,
    /// Id of the referenced dictionary entry (unique within `item_type`).
    pub item_id: i64,
    pub item_type: EntryKind,
    pub current_priority: u32,
    pub max_priority: u32,
    pub learned: bool,
    pub added_at: DateTime<Utc>,
}

impl StudyItem {
    /// Fresh item as created when an entry joins the study list.
    pub fn new(id: i64, item_id: i64, item_type: EntryKind) -> Self {
        Self {
            id,
            item_id,
            item_type,
            current_priority: 1,
            max_priority: 1,
            learned: false,
            added_at: Utc::now(),
        }
    }
}

/// A study item joined with its resolved dictionary entry.
///
/// Built for deck construction, never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPair {
    pub item: StudyItem,
    pub entry: DictionaryEntry,
}
