//! Rule-based chief-complaint parser.
//!
//! [`parse`] turns a free-text complaint such as `反复头晕头痛3年，加重2天` into a
//! [`ParseResult`]: the canonical symptom, the duration of the complaint and a
//! confidence score. The pipeline runs in a single pass:
//!
//! 1. [`normalize`] the raw text,
//! 2. extract and score duration spans, keeping the best one,
//! 3. remove that span and extract the core symptom from what is left,
//! 4. compute the confidence and assemble the result.
//!
//! Parsing never fails: incomplete input yields a lower confidence and a
//! [`FailureReason`].

pub mod confidence;
pub mod duration;
pub mod normalize;
pub mod numeral;
pub mod request;
pub mod symptom;

use complaint_core::{ExtractedDuration, FailureReason, ParseOptions, ParseResult};

pub use duration::{choose_best_candidate, extract_candidates, DurationCandidate};
pub use normalize::{normalize, normalize_complaint_text};
pub use numeral::parse_number_token;
pub use request::{handle_request, ApiResponse, HostReply, ParseRequest};
pub use symptom::{extract_core_symptom, match_core_symptom, SymptomMatch, SymptomSource};

/// Parse a complaint sentence using the caller's dictionaries.
pub fn parse(text: &str, options: &ParseOptions) -> ParseResult {
    let normalized = normalize(text);
    if normalized.is_empty() {
        tracing::debug!("empty complaint text");
        return ParseResult::empty();
    }

    let candidates = extract_candidates(&normalized);
    tracing::debug!(candidates = candidates.len(), "duration candidates extracted");

    match choose_best_candidate(candidates) {
        Some(best) => parse_with_duration(&normalized, best, options),
        None => parse_without_duration(&normalized, options),
    }
}

fn parse_without_duration(normalized: &str, options: &ParseOptions) -> ParseResult {
    let cleaned = normalize::blank_punctuation(normalized);
    let symptom = core_symptom(&cleaned, options);
    let has_symptom = !symptom.text.is_empty();

    ParseResult {
        normalized_text: symptom.text.clone(),
        confidence: confidence::without_duration(has_symptom),
        complaint_text: symptom.text,
        duration: None,
        failure_reason: Some(FailureReason::NoDuration),
    }
}

fn parse_with_duration(
    normalized: &str,
    best: DurationCandidate,
    options: &ParseOptions,
) -> ParseResult {
    tracing::debug!(
        raw = %best.raw,
        unit = %best.unit,
        score = best.score,
        "duration span selected"
    );

    let remainder = symptom::remove_span(normalized, best.start, best.end);
    let symptom = core_symptom(&remainder, options);
    let has_symptom = !symptom.text.is_empty();

    let duration = ExtractedDuration {
        value: best.value,
        unit: best.unit,
        raw: best.raw,
    };
    let normalized_text =
        normalize::collapse_whitespace(&format!("{} {}", symptom.text, duration.display_text()));

    ParseResult {
        confidence: confidence::with_duration(has_symptom, &duration.value, duration.unit),
        failure_reason: (!has_symptom).then_some(FailureReason::EmptyComplaint),
        complaint_text: symptom.text,
        duration: Some(duration),
        normalized_text,
    }
}

fn core_symptom(text: &str, options: &ParseOptions) -> SymptomMatch {
    let canonical = normalize_complaint_text(text, &options.synonyms);
    let found = match_core_symptom(&canonical, &options.known_symptoms, &options.synonyms);
    tracing::debug!(source = ?found.source, complaint = %found.text, "core symptom extracted");
    found
}
