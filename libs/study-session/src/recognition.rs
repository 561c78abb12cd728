//! Recognition collaborator boundary.
//!
//! OCR itself is out of scope; the core consumes recognized text through
//! [`TextRecognizer`] and resolves it against the dictionary with
//! [`HanziIndex`] — an exact-form lookup, deliberately stricter than the
//! general search predicate.

use hanzi_core::DictionaryEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Image handed to the recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A piece of text recognized in an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Error)]
#[error("recognition failed: {0}")]
pub struct RecognizeError(pub String);

/// Interface of the OCR/ML recognition service.
pub trait TextRecognizer {
    async fn recognize(&self, image: &ImageSource) -> Result<Vec<RecognizedText>, RecognizeError>;
}

/// Precomputed exact lookup from simplified and traditional forms to
/// dictionary entries.
pub struct HanziIndex {
    by_form: HashMap<String, Vec<DictionaryEntry>>,
}

impl HanziIndex {
    pub fn build(entries: &[DictionaryEntry]) -> Self {
        let mut by_form: HashMap<String, Vec<DictionaryEntry>> = HashMap::new();
        for entry in entries {
            by_form
                .entry(entry.simplified().to_string())
                .or_default()
                .push(entry.clone());
            if entry.traditional() != entry.simplified() {
                by_form
                    .entry(entry.traditional().to_string())
                    .or_default()
                    .push(entry.clone());
            }
        }
        Self { by_form }
    }

    /// Entries whose simplified or traditional form equals `text` exactly.
    pub fn lookup(&self, text: &str) -> &[DictionaryEntry] {
        self.by_form
            .get(text.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pair each recognized text with its exact dictionary matches.
    /// Unmatched recognitions are kept with an empty match list so the
    /// caller can still show what was read.
    pub fn match_recognized(
        &self,
        results: &[RecognizedText],
    ) -> Vec<(RecognizedText, Vec<DictionaryEntry>)> {
        results
            .iter()
            .map(|r| (r.clone(), self.lookup(&r.text).to_vec()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanzi_core::CharacterEntry;
    use pretty_assertions::assert_eq;

    fn entry(id: i64, simplified: &str, traditional: &str) -> DictionaryEntry {
        DictionaryEntry::Character(CharacterEntry {
            id,
            simplified: simplified.to_string(),
            traditional: traditional.to_string(),
            pinyin: "ma3".to_string(),
            definition: "horse".to_string(),
        })
    }

    #[test]
    fn lookup_matches_both_forms() {
        let index = HanziIndex::build(&[entry(1, "马", "馬")]);
        assert_eq!(index.lookup("马").len(), 1);
        assert_eq!(index.lookup("馬").len(), 1);
    }

    #[test]
    fn lookup_is_exact_not_substring() {
        let index = HanziIndex::build(&[entry(1, "水果", "水果")]);
        assert!(index.lookup("水").is_empty());
        assert_eq!(index.lookup("水果").len(), 1);
    }

    #[test]
    fn lookup_trims_recognized_whitespace() {
        let index = HanziIndex::build(&[entry(1, "马", "馬")]);
        assert_eq!(index.lookup(" 马 ").len(), 1);
    }

    #[test]
    fn identical_forms_indexed_once() {
        let index = HanziIndex::build(&[entry(1, "水", "水")]);
        assert_eq!(index.lookup("水").len(), 1);
    }

    struct StubRecognizer(Vec<RecognizedText>);

    impl TextRecognizer for StubRecognizer {
        async fn recognize(
            &self,
            _image: &ImageSource,
        ) -> Result<Vec<RecognizedText>, RecognizeError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn recognized_text_resolves_through_index() {
        let index = HanziIndex::build(&[entry(1, "马", "馬")]);
        let recognizer = StubRecognizer(vec![RecognizedText {
            text: "馬".to_string(),
            confidence: 0.88,
        }]);

        let recognized = recognizer
            .recognize(&ImageSource::Bytes(vec![0u8; 4]))
            .await
            .unwrap();
        let matched = index.match_recognized(&recognized);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].1[0].simplified(), "马");
    }

    #[test]
    fn match_recognized_keeps_unmatched_text() {
        let index = HanziIndex::build(&[entry(1, "马", "馬")]);
        let recognized = vec![
            RecognizedText {
                text: "马".to_string(),
                confidence: 0.93,
            },
            RecognizedText {
                text: "??".to_string(),
                confidence: 0.12,
            },
        ];

        let matched = index.match_recognized(&recognized);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].1.len(), 1);
        assert!(matched[1].1.is_empty());
    }
}
