use complaint_core::{DurationValue, ParseOptions};
use complaint_parser::{extract_candidates, parse};
use proptest::prelude::*;

const COMPLAINT_ALPHABET: &str =
    "[0-9０-９一二两三十百半IVXLCM头痛胸闷腹咳嗽发热恶心呕吐天日周月年小时分钟至到~，。加重反复持续近约余多个 -]{0,40}";

fn dictionaries() -> ParseOptions {
    ParseOptions::new()
        .with_known_symptoms(["胸闷", "头晕"])
        .with_synonym("心口疼", "胸痛")
}

fn check_invariants(text: &str) -> Result<(), TestCaseError> {
    let result = parse(text, &dictionaries());

    prop_assert!((0.0..=1.0).contains(&result.confidence));
    if let Some(DurationValue::Range(range)) = result.duration_value() {
        prop_assert!(range.min() <= range.max());
    }

    let json = serde_json::to_value(&result).expect("result should serialize");
    let present = ["duration_value", "duration_unit", "duration_raw"]
        .iter()
        .filter(|field| !json[**field].is_null())
        .count();
    prop_assert!(present == 0 || present == 3, "partial duration in {json}");
    Ok(())
}

proptest! {
    #[test]
    fn parse_is_deterministic(text in COMPLAINT_ALPHABET) {
        let options = dictionaries();
        let first = serde_json::to_string(&parse(&text, &options)).unwrap();
        let second = serde_json::to_string(&parse(&text, &options)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn invariants_hold_for_complaint_like_text(text in COMPLAINT_ALPHABET) {
        check_invariants(&text)?;
    }

    #[test]
    fn invariants_hold_for_arbitrary_text(text in any::<String>()) {
        check_invariants(&text)?;
    }

    #[test]
    fn scalar_durations_survive_arabic_digits(days in 1u32..1000) {
        let result = parse(&format!("咳嗽{days}天"), &ParseOptions::default());
        prop_assert_eq!(result.duration_value(), Some(DurationValue::Single(f64::from(days))));
        prop_assert_eq!(result.complaint_text.as_str(), "咳嗽");
    }
}

#[test]
fn long_digit_runs_terminate() {
    let text = format!("头痛{}天", "1".repeat(20_000));
    let result = parse(&text, &ParseOptions::default());
    assert!(result.duration.is_none());
    assert!((0.0..=1.0).contains(&result.confidence));

    let mixed = "3".repeat(5_000) + &"三".repeat(5_000) + &"I".repeat(5_000);
    let _ = extract_candidates(&mixed);
    let _ = parse(&mixed, &ParseOptions::default());
}
