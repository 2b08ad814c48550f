//! Duration span extraction and ranking.
//!
//! A duration span is `<number>(<separator><number>)? <unit>`, optionally with
//! the measure word 个 and an approximation marker (余/多) before the unit.
//! A trailing 半, either after 个 (`一个半小时`) or after the unit (`三天半`),
//! adds half a unit. Latin units swallow the rest of their word (`3 days`).
//! Every non-overlapping match becomes a [`DurationCandidate`] scored by where
//! it sits in the sentence and what precedes it.

use complaint_core::{DurationUnit, DurationValue};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::numeral::parse_number_token;

pub const BASE_SCORE: i32 = 60;
/// Location score for a span that ends the text; decays by one every two chars.
pub const LOCATION_SCORE_MAX: i32 = 30;
pub const RANGE_BONUS: i32 = 10;
pub const KEYWORD_BOOST: i32 = 12;
pub const WORSENING_PENALTY: i32 = 28;
pub const INTERMITTENT_PENALTY: i32 = 10;
/// Characters inspected to the left of a span for markers.
pub const CONTEXT_WINDOW: usize = 6;

const DURATION_MARKERS: [&str; 8] = ["持续", "已", "近", "约", "病程", "反复", "余", "多"];
const WORSENING_MARKERS: [&str; 5] = ["加重", "加剧", "恶化", "加深", "再发"];
const INTERMITTENT_MARKERS: [&str; 2] = ["间断", "反复"];

/// Raw unit forms per unit, in resolution priority order.
const UNIT_FORMS: [(DurationUnit, &[&str]); 6] = [
    (DurationUnit::Minute, &["分钟", "min", "分"]),
    (DurationUnit::Hour, &["小时", "hr", "h", "时"]),
    (DurationUnit::Day, &["天", "日", "d"]),
    (DurationUnit::Week, &["星期", "周", "w"]),
    (DurationUnit::Month, &["月", "m"]),
    (DurationUnit::Year, &["年", "y"]),
];

// Lowercase d and m are unit forms, so only the other Roman letters fold.
const NUMBER: &str =
    r"[0-9]+(?:\.[0-9]+)?|[IVXLCDM]+|[ivxlc]+|[零〇一二两三四五六七八九十百千半]+";
const SEPARATOR: &str = r"-|~|～|—|至|到";
// Multi-character forms precede their single-character prefixes.
const CJK_UNIT: &str = r"分钟|小时|星期|分|时|天|日|周|月|年";
const LATIN_UNIT: &str = r"min|hr|h|d|w|m|y";
const ROMAN_LETTERS: &str = "IVXLCDMivxlc";

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?P<lo>{NUMBER})(?:\s*(?:{SEPARATOR})\s*(?P<hi>{NUMBER}))?\s*[余多]?\s*个?\s*(?P<half>半)?\s*[余多]?\s*(?:(?P<unit>{CJK_UNIT})(?P<tail_half>半)?|(?P<latin_unit>{LATIN_UNIT})[A-Za-z]*)"
    );
    Regex::new(&pattern).expect("duration pattern must compile")
});

/// Located, parsed and scored duration span. Offsets count chars.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationCandidate {
    pub start: usize,
    pub end: usize,
    pub raw: String,
    pub value: DurationValue,
    pub unit: DurationUnit,
    pub score: i32,
}

/// Resolve a raw unit token through the unit table.
pub fn resolve_unit(raw: &str) -> Option<DurationUnit> {
    UNIT_FORMS
        .iter()
        .find(|(_, forms)| forms.contains(&raw))
        .map(|(unit, _)| *unit)
}

/// Locate every duration span in `text`, already normalized.
pub fn extract_candidates(text: &str) -> Vec<DurationCandidate> {
    let total_chars = text.chars().count();

    DURATION_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let lo = caps.name("lo")?.as_str();
            let hi = caps.name("hi").map(|hi| hi.as_str());
            let latin_unit = caps.name("latin_unit");
            let prefix = &text[..whole.start()];

            // "Chest", "child" or "I had" would otherwise read as Roman numbers.
            let roman = is_roman_token(lo) || hi.is_some_and(is_roman_token);
            let glued_to_word = prefix
                .chars()
                .next_back()
                .is_some_and(|ch| ch.is_ascii_alphabetic());
            if roman && (latin_unit.is_some() || glued_to_word) {
                return None;
            }

            let half = caps.name("half").is_some() || caps.name("tail_half").is_some();
            let value = parse_value(lo, hi, half)?;
            let unit = resolve_unit(caps.name("unit").or(latin_unit)?.as_str())?;

            let start = prefix.chars().count();
            let end = start + whole.as_str().chars().count();
            let window = left_window(prefix, CONTEXT_WINDOW);
            let score = score_candidate(total_chars - end, value.is_range(), &window);

            tracing::trace!(raw = whole.as_str(), start, score, "duration candidate");

            Some(DurationCandidate {
                start,
                end,
                raw: whole.as_str().to_string(),
                value,
                unit,
                score,
            })
        })
        .collect()
}

/// Highest score wins; on a tie the later span wins.
pub fn choose_best_candidate(candidates: Vec<DurationCandidate>) -> Option<DurationCandidate> {
    debug_assert!(
        candidates
            .windows(2)
            .all(|pair| pair[0].start != pair[1].start),
        "duration candidates must not share a start offset"
    );

    candidates.into_iter().reduce(|best, next| {
        let later_tie = next.score == best.score && next.start > best.start;
        if next.score > best.score || later_tie {
            next
        } else {
            best
        }
    })
}

/// Score a span from its distance to the end of the text and its left context.
pub fn score_candidate(distance_to_end: usize, is_range: bool, left_context: &str) -> i32 {
    let decay = i32::try_from(distance_to_end / 2).unwrap_or(i32::MAX);
    let location = LOCATION_SCORE_MAX.saturating_sub(decay).max(0);

    let mut score = BASE_SCORE + location;
    if is_range {
        score += RANGE_BONUS;
    }
    if contains_any(left_context, &DURATION_MARKERS) {
        score += KEYWORD_BOOST;
    }
    if contains_any(left_context, &WORSENING_MARKERS) {
        score -= WORSENING_PENALTY;
    } else if contains_any(left_context, &INTERMITTENT_MARKERS) {
        score -= INTERMITTENT_PENALTY;
    }
    score
}

fn parse_value(lo: &str, hi: Option<&str>, half: bool) -> Option<DurationValue> {
    let value = match hi {
        Some(hi) => DurationValue::range(parse_number_token(lo)?, parse_number_token(hi)?),
        None => adjacent_digit_range(lo)
            .or_else(|| parse_number_token(lo).map(DurationValue::Single))?,
    };
    if !half {
        return Some(value);
    }
    Some(match value {
        DurationValue::Single(v) => DurationValue::Single(v + 0.5),
        DurationValue::Range(range) => DurationValue::range(range.min() + 0.5, range.max() + 0.5),
    })
}

fn is_roman_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|ch| ROMAN_LETTERS.contains(ch))
}

/// "三四天" reads as three to four days rather than thirty-four.
fn adjacent_digit_range(token: &str) -> Option<DurationValue> {
    let mut chars = token.chars();
    let (first, second) = (chars.next()?, chars.next()?);
    if chars.next().is_some() {
        return None;
    }
    let lo = parse_number_token(&first.to_string())?;
    let hi = parse_number_token(&second.to_string())?;
    let single_digits = !first.is_ascii() && lo >= 1.0 && hi <= 9.0 && lo.fract() == 0.0;
    (single_digits && hi - lo == 1.0).then(|| DurationValue::range(lo, hi))
}

fn left_window(prefix: &str, width: usize) -> String {
    let mut window: Vec<char> = prefix.chars().rev().take(width).collect();
    window.reverse();
    window.into_iter().collect()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(text: &str) -> DurationCandidate {
        let mut candidates = extract_candidates(text);
        assert_eq!(candidates.len(), 1, "expected one candidate in {text}");
        candidates.remove(0)
    }

    #[test]
    fn resolves_units_by_priority() {
        assert_eq!(resolve_unit("分钟"), Some(DurationUnit::Minute));
        assert_eq!(resolve_unit("min"), Some(DurationUnit::Minute));
        assert_eq!(resolve_unit("h"), Some(DurationUnit::Hour));
        assert_eq!(resolve_unit("时"), Some(DurationUnit::Hour));
        assert_eq!(resolve_unit("日"), Some(DurationUnit::Day));
        assert_eq!(resolve_unit("星期"), Some(DurationUnit::Week));
        assert_eq!(resolve_unit("m"), Some(DurationUnit::Month));
        assert_eq!(resolve_unit("y"), Some(DurationUnit::Year));
        assert_eq!(resolve_unit("秒"), None);
    }

    #[test]
    fn extracts_scalar_spans_in_every_notation() {
        for text in ["头痛3天", "头痛三天", "头痛III天"] {
            let candidate = single(text);
            assert_eq!(candidate.value, DurationValue::Single(3.0), "{text}");
            assert_eq!(candidate.unit, DurationUnit::Day);
            assert_eq!(candidate.start, 2);
        }
    }

    #[test]
    fn extracts_ranges() {
        let candidate = single("头痛二至III天");
        assert_eq!(candidate.value, DurationValue::range(2.0, 3.0));
        assert_eq!(candidate.raw, "二至III天");

        let candidate = single("发热5~3 天");
        assert_eq!(candidate.value, DurationValue::range(3.0, 5.0));
    }

    #[test]
    fn measure_word_and_approximation_markers() {
        let candidate = single("腹痛两个多月");
        assert_eq!(candidate.value, DurationValue::Single(2.0));
        assert_eq!(candidate.unit, DurationUnit::Month);

        let candidate = single("咳嗽10余年");
        assert_eq!(candidate.value, DurationValue::Single(10.0));
        assert_eq!(candidate.unit, DurationUnit::Year);

        let candidate = single("胸痛半小时");
        assert_eq!(candidate.value, DurationValue::Single(0.5));
        assert_eq!(candidate.unit, DurationUnit::Hour);
    }

    #[test]
    fn adjacent_chinese_digits_form_a_range() {
        let candidate = single("咳嗽三四天");
        assert_eq!(candidate.value, DurationValue::range(3.0, 4.0));

        let candidate = single("咳嗽二十天");
        assert_eq!(candidate.value, DurationValue::Single(20.0));
    }

    #[test]
    fn latin_units() {
        let candidate = single("fever 3 days");
        assert_eq!(candidate.unit, DurationUnit::Day);
        assert_eq!(candidate.raw, "3 days");
        assert_eq!((candidate.start, candidate.end), (6, 12));

        let candidate = single("cough 2 weeks");
        assert_eq!(candidate.unit, DurationUnit::Week);
        assert_eq!(candidate.raw, "2 weeks");

        let candidate = single("headache 5 hours");
        assert_eq!(candidate.unit, DurationUnit::Hour);
        assert_eq!(candidate.raw, "5 hours");

        let candidate = single("pain 45min");
        assert_eq!(candidate.unit, DurationUnit::Minute);
        assert_eq!(candidate.value, DurationValue::Single(45.0));
        assert_eq!(candidate.raw, "45min");

        let candidate = single("rash 2 months");
        assert_eq!(candidate.unit, DurationUnit::Month);
    }

    #[test]
    fn english_words_are_not_roman_numbers() {
        let candidate = single("Chest pain 3 days");
        assert_eq!(candidate.value, DurationValue::Single(3.0));
        assert_eq!(candidate.raw, "3 days");

        let candidate = single("I had chills 2 d");
        assert_eq!(candidate.value, DurationValue::Single(2.0));
        assert_eq!(candidate.unit, DurationUnit::Day);
    }

    #[test]
    fn lowercase_roman_numbers() {
        let candidate = single("咳嗽iii天");
        assert_eq!(candidate.value, DurationValue::Single(3.0));
        assert_eq!(candidate.unit, DurationUnit::Day);
        assert_eq!(candidate.raw, "iii天");

        let candidate = single("头痛ii-iv周");
        assert_eq!(candidate.value, DurationValue::range(2.0, 4.0));
    }

    #[test]
    fn trailing_half_adds_half_a_unit() {
        let candidate = single("头痛一个半小时");
        assert_eq!(candidate.value, DurationValue::Single(1.5));
        assert_eq!(candidate.unit, DurationUnit::Hour);
        assert_eq!(candidate.raw, "一个半小时");
        assert_eq!(candidate.start, 2);

        let candidate = single("腹痛三天半");
        assert_eq!(candidate.value, DurationValue::Single(3.5));
        assert_eq!(candidate.raw, "三天半");

        let candidate = single("咳嗽1年半");
        assert_eq!(candidate.value, DurationValue::Single(1.5));
        assert_eq!(candidate.unit, DurationUnit::Year);

        let candidate = single("腹泻半个月");
        assert_eq!(candidate.value, DurationValue::Single(0.5));
        assert_eq!(candidate.unit, DurationUnit::Month);
    }

    #[test]
    fn worsening_marker_penalizes_the_later_span() {
        let candidates = extract_candidates("反复头晕头痛3年，加重2天");
        assert_eq!(candidates.len(), 2);
        let (years, days) = (&candidates[0], &candidates[1]);
        assert_eq!(years.raw, "3年");
        assert_eq!(years.score, BASE_SCORE + 28 + KEYWORD_BOOST - INTERMITTENT_PENALTY);
        assert_eq!(days.score, BASE_SCORE + 30 - WORSENING_PENALTY);

        let best = choose_best_candidate(candidates).unwrap();
        assert_eq!(best.unit, DurationUnit::Year);
    }

    #[test]
    fn location_score_decays_and_floors_at_zero() {
        assert_eq!(score_candidate(0, false, ""), BASE_SCORE + LOCATION_SCORE_MAX);
        assert_eq!(score_candidate(5, false, ""), BASE_SCORE + 28);
        assert_eq!(score_candidate(500, false, ""), BASE_SCORE);
        assert_eq!(score_candidate(usize::MAX, true, ""), BASE_SCORE + RANGE_BONUS);
    }

    #[test]
    fn keyword_boost_and_penalties() {
        assert_eq!(score_candidate(0, false, "病程"), BASE_SCORE + 30 + KEYWORD_BOOST);
        assert_eq!(score_candidate(0, false, "间断"), BASE_SCORE + 30 - INTERMITTENT_PENALTY);
        assert_eq!(
            score_candidate(0, false, "反复加剧"),
            BASE_SCORE + 30 + KEYWORD_BOOST - WORSENING_PENALTY
        );
    }

    #[test]
    fn ties_prefer_the_later_span() {
        let make = |start: usize| DurationCandidate {
            start,
            end: start + 2,
            raw: "3天".to_string(),
            value: DurationValue::Single(3.0),
            unit: DurationUnit::Day,
            score: 80,
        };
        let best = choose_best_candidate(vec![make(1), make(9), make(4)]).unwrap();
        assert_eq!(best.start, 9);
        assert!(choose_best_candidate(Vec::new()).is_none());
    }

    #[test]
    fn text_without_numbers_yields_nothing() {
        assert!(extract_candidates("胸闷气短").is_empty());
        assert!(extract_candidates("").is_empty());
    }

    #[test]
    fn unparseable_long_digit_runs_are_dropped() {
        let text = format!("头痛{}天", "9".repeat(500));
        assert!(extract_candidates(&text).is_empty());
    }
}
