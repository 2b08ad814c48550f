//! Text canonicalization applied before and after duration matching.

use std::collections::BTreeMap;

/// Leading discourse markers and duration adverbs. Longer markers come first.
const LEADING_MARKERS: [&str; 9] = ["主诉", "持续", "反复", "诉", "因", "以", "近", "约", "已"];

/// Collapse whitespace, trim and fold full-width digits to ASCII.
pub fn normalize(raw: &str) -> String {
    let folded: String = raw.chars().map(fold_fullwidth_digit).collect();
    collapse_whitespace(&folded)
}

/// Canonicalize the symptom part of a complaint.
pub fn normalize_complaint_text(text: &str, synonyms: &BTreeMap<String, String>) -> String {
    let substituted = substitute_synonyms(text, synonyms);
    let expanded = expand_pain_abbreviation(&substituted);
    collapse_whitespace(strip_leading_markers(&expanded))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace sentence punctuation by spaces and re-collapse. A `.` between two
/// ASCII digits is a decimal point and stays.
pub fn blank_punctuation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let blanked: String = chars
        .iter()
        .enumerate()
        .map(|(i, &ch)| {
            let decimal_point = ch == '.'
                && i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(char::is_ascii_digit);
            if is_sentence_punctuation(ch) && !decimal_point {
                ' '
            } else {
                ch
            }
        })
        .collect();
    collapse_whitespace(&blanked)
}

fn is_sentence_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '，' | ',' | '。' | '.' | '；' | ';' | '：' | ':' | '（' | '）' | '(' | ')' | '【' | '】'
            | '[' | ']'
    )
}

fn fold_fullwidth_digit(ch: char) -> char {
    match ch {
        '０'..='９' => char::from_u32(ch as u32 - '０' as u32 + '0' as u32).unwrap_or(ch),
        _ => ch,
    }
}

/// Longest keys are replaced first so a shorter key never splits a longer phrase.
fn substitute_synonyms(text: &str, synonyms: &BTreeMap<String, String>) -> String {
    let mut keys: Vec<(&String, &String)> = synonyms
        .iter()
        .filter(|(phrase, _)| !phrase.is_empty())
        .collect();
    keys.sort_by(|(a, _), (b, _)| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });

    keys.into_iter()
        .fold(text.to_string(), |acc, (phrase, canonical)| {
            if acc.contains(phrase.as_str()) {
                acc.replace(phrase.as_str(), canonical)
            } else {
                acc
            }
        })
}

/// "疼" is shorthand for "疼痛" unless "痛" already follows.
fn expand_pain_abbreviation(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 6);
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == '疼' && chars.peek() != Some(&'痛') {
            out.push('痛');
        }
    }
    out
}

fn strip_leading_markers(text: &str) -> &str {
    let mut rest = text.trim_start();
    while let Some(stripped) = LEADING_MARKERS
        .iter()
        .find_map(|marker| rest.strip_prefix(marker))
    {
        rest = stripped.trim_start_matches(|ch: char| ch.is_whitespace() || ch == ':' || ch == '：');
    }
    rest
}
