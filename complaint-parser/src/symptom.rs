//! Core-symptom extraction from the text left after the duration is removed.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::blank_punctuation;

/// Keyword-cluster rules tried when the dictionaries do not cover the text.
/// Body cue and descriptor may be separated by up to three characters.
const FALLBACK_RULES: [(&str, &str); 10] = [
    (
        r"(?:胸|心前区).{0,3}?(?:疼痛|压榨|刺痛|绞痛|闷痛|疼|痛|闷)",
        "胸痛",
    ),
    (r"头.{0,3}?(?:疼痛|疼|痛)", "头痛"),
    (r"(?:腹|肚|胃).{0,3}?(?:疼痛|绞痛|胀痛|隐痛|刺痛|疼|痛)", "腹痛"),
    (
        r"(?:呼吸|气).{0,3}?(?:困难|急促|费力|短|促|急)|喘憋|气喘|憋气",
        "呼吸困难",
    ),
    (r"心.{0,3}?(?:悸|慌)", "心悸"),
    (r"咳.{0,3}?(?:嗽|痰)|干咳|咳", "咳嗽"),
    (r"发热|发烧|高热|低热|体温.{0,3}?(?:升高|增高)", "发热"),
    (r"头.{0,3}?(?:晕|昏)|眩晕|晕眩", "眩晕"),
    (r"腹泻|拉肚子|稀便|大便.{0,3}?(?:稀|次数增多)", "腹泻"),
    (r"恶心.{0,3}?呕吐|呕吐.{0,3}?恶心|恶心|呕吐", "恶心呕吐"),
];

struct FallbackRule {
    pattern: Regex,
    canonical: &'static str,
}

static RULES: Lazy<Vec<FallbackRule>> = Lazy::new(|| {
    FALLBACK_RULES
        .iter()
        .map(|(pattern, canonical)| FallbackRule {
            pattern: Regex::new(pattern).expect("symptom rule must compile"),
            canonical,
        })
        .collect()
});

/// Where the extracted complaint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymptomSource {
    Dictionary,
    Synonym,
    Rule,
    /// Nothing matched; the cleaned text is echoed back.
    Residual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomMatch {
    pub text: String,
    pub source: SymptomSource,
}

#[derive(Debug)]
enum SymptomCandidate<'a> {
    Known {
        index: usize,
        name: &'a str,
    },
    Synonym {
        index: usize,
        phrase: &'a str,
        canonical: &'a str,
    },
    Rule {
        index: usize,
        len: usize,
        canonical: &'static str,
    },
}

impl SymptomCandidate<'_> {
    fn index(&self) -> usize {
        match self {
            SymptomCandidate::Known { index, .. }
            | SymptomCandidate::Synonym { index, .. }
            | SymptomCandidate::Rule { index, .. } => *index,
        }
    }

    fn len(&self) -> usize {
        match self {
            SymptomCandidate::Known { name, .. } => name.chars().count(),
            SymptomCandidate::Synonym { phrase, .. } => phrase.chars().count(),
            SymptomCandidate::Rule { len, .. } => *len,
        }
    }

    fn into_match(self) -> SymptomMatch {
        let (text, source) = match self {
            SymptomCandidate::Known { name, .. } => (name, SymptomSource::Dictionary),
            SymptomCandidate::Synonym { canonical, .. } => (canonical, SymptomSource::Synonym),
            SymptomCandidate::Rule { canonical, .. } => (canonical, SymptomSource::Rule),
        };
        SymptomMatch {
            text: text.to_string(),
            source,
        }
    }
}

/// Replace the char span `start..end` with a space and blank sentence punctuation.
pub fn remove_span(text: &str, start: usize, end: usize) -> String {
    let before: String = text.chars().take(start).collect();
    let after: String = text.chars().skip(end).collect();
    blank_punctuation(&format!("{before} {after}"))
}

/// Canonical symptom named in `text`, or `text` itself when nothing matches.
pub fn extract_core_symptom(
    text: &str,
    known_symptoms: &BTreeSet<String>,
    synonyms: &BTreeMap<String, String>,
) -> String {
    match_core_symptom(text, known_symptoms, synonyms).text
}

/// Like [`extract_core_symptom`] but also reports which strategy matched.
pub fn match_core_symptom(
    text: &str,
    known_symptoms: &BTreeSet<String>,
    synonyms: &BTreeMap<String, String>,
) -> SymptomMatch {
    let mut pool: Vec<SymptomCandidate<'_>> = Vec::new();

    pool.extend(
        known_symptoms
            .iter()
            .filter(|name| !name.is_empty())
            .filter_map(|name| {
                char_index(text, name).map(|index| SymptomCandidate::Known { index, name })
            }),
    );

    pool.extend(
        synonyms
            .iter()
            .filter(|(phrase, _)| !phrase.is_empty())
            .filter_map(|(phrase, canonical)| {
                char_index(text, phrase).map(|index| SymptomCandidate::Synonym {
                    index,
                    phrase,
                    canonical,
                })
            }),
    );

    pool.extend(RULES.iter().filter_map(|rule| {
        rule.pattern.find(text).map(|found| SymptomCandidate::Rule {
            index: text[..found.start()].chars().count(),
            len: found.as_str().chars().count(),
            canonical: rule.canonical,
        })
    }));

    // Stable: equal positions keep dictionary, synonym, rule order.
    pool.sort_by(|a, b| a.index().cmp(&b.index()).then_with(|| b.len().cmp(&a.len())));

    match pool.into_iter().next() {
        Some(candidate) => {
            tracing::debug!(?candidate, "core symptom candidate selected");
            candidate.into_match()
        }
        None => SymptomMatch {
            text: text.to_string(),
            source: SymptomSource::Residual,
        },
    }
}

fn char_index(text: &str, needle: &str) -> Option<usize> {
    text.find(needle).map(|byte| text[..byte].chars().count())
}
