//! Pinyin syllable validation.
//!
//! A syllable is an optional initial consonant cluster, a final vowel
//! cluster, and a trailing tone digit 1-5, e.g. "zhong1", "e4", "lü4".
//! Validation is data-driven: initials are matched greedily against a fixed
//! ordered table and finals against a fixed membership set. This is not a
//! phonological parser; it only answers "could this be a syllable".

use crate::types::PinyinSyllable;

/// Initial consonant clusters, longest first so "zh" is never read as
/// "z" + "h".
const INITIALS: [&str; 23] = [
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h",
    "j", "q", "x", "r", "z", "c", "s", "y", "w",
];

/// Final vowel clusters. "ue" is the bare spelling of "üe" used after
/// j/q/x/y, as in "xue2" or "yue4".
const FINALS: [&str; 37] = [
    "a", "o", "e", "i", "u", "ü", "er", "ai", "ei", "ao", "ou", "an", "en",
    "ang", "eng", "ong", "ia", "ie", "iao", "iu", "ian", "in", "iang", "ing",
    "iong", "ua", "uo", "uai", "ui", "uan", "un", "uang", "ue", "ueng", "üe",
    "üan", "ün",
];

/// Normalize a raw syllable: trim, lowercase, and map the reduced-keyboard
/// umlaut encodings "u:" and "v" to "ü". The "u:" form is only meaningful
/// at the syllable tail, just before the optional tone digit.
pub fn normalize(s: &str) -> String {
    let mut out = s.trim().to_lowercase().replace('v', "ü");
    let body_len = out
        .strip_suffix(|c: char| c.is_ascii_digit())
        .map_or(out.len(), str::len);
    if out[..body_len].ends_with("u:") {
        out.replace_range(body_len - 2..body_len, "ü");
    }
    out
}

fn is_final(s: &str) -> bool {
    FINALS.contains(&s)
}

/// Parse a single syllable, returning `None` if it is not well-formed.
pub fn parse(syllable: &str) -> Option<PinyinSyllable> {
    let normalized = normalize(syllable);
    if normalized.is_empty() {
        return None;
    }

    let mut chars = normalized.chars();
    let tone_char = chars.next_back()?;
    let tone = tone_char.to_digit(10)?;
    if !(1..=5).contains(&tone) {
        return None;
    }

    let body = chars.as_str();
    if body.is_empty() {
        return None;
    }
    // The tone digit is the only digit allowed anywhere in the syllable.
    if !body.chars().all(|c| c.is_ascii_lowercase() || c == 'ü') {
        return None;
    }

    let (initial, final_part) = split_body(body)?;

    Some(PinyinSyllable {
        initial: initial.map(str::to_string),
        final_part: final_part.to_string(),
        tone: tone as u8,
    })
}

/// Split a tone-less body into optional initial + final.
fn split_body(body: &str) -> Option<(Option<&str>, &str)> {
    if is_final(body) {
        return Some((None, body));
    }
    for initial in INITIALS {
        if let Some(rest) = body.strip_prefix(initial) {
            if is_final(rest) {
                return Some((Some(initial), rest));
            }
        }
    }
    None
}

/// Whether a string is a well-formed pinyin syllable.
pub fn is_valid_syllable(syllable: &str) -> bool {
    parse(syllable).is_some()
}

/// Whether every whitespace-separated part of `value` is a valid syllable.
///
/// A value that is empty or all whitespace yields no parts and is vacuously
/// valid; callers that need "non-empty and valid" should check for emptiness
/// themselves.
pub fn validate_token(value: &str) -> bool {
    value.split_whitespace().all(is_valid_syllable)
}
