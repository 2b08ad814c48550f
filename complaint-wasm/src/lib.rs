//! WASM <-> JavaScript bridge for the complaint parser.

use std::collections::BTreeMap;

use complaint_core::ParseOptions;
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsParseOptions {
    #[serde(default)]
    synonyms: Option<BTreeMap<String, String>>,
    #[serde(default, alias = "knownSymptoms")]
    known_symptoms: Option<Vec<String>>,
}

impl From<JsParseOptions> for ParseOptions {
    fn from(opts: JsParseOptions) -> Self {
        let mut base = ParseOptions::default();
        if let Some(synonyms) = opts.synonyms {
            base.synonyms = synonyms;
        }
        if let Some(symptoms) = opts.known_symptoms {
            base = base.with_known_symptoms(symptoms);
        }
        base
    }
}

/// Parse one complaint. `options` may carry `synonyms` and `knownSymptoms`.
#[wasm_bindgen(js_name = parseComplaint)]
pub fn parse_complaint(text: &str, options: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let options = match options {
        Some(js_opts) if !js_opts.is_undefined() && !js_opts.is_null() => {
            let opts: JsParseOptions = from_value(js_opts)
                .map_err(|err| JsValue::from_str(&format!("Invalid parse options: {err}")))?;
            ParseOptions::from(opts)
        }
        _ => ParseOptions::default(),
    };

    let result = complaint_parser::parse(text, &options);
    to_value(&result).map_err(|err| JsValue::from_str(&format!("Could not serialize result: {err}")))
}

/// Handle a request body the way the HTTP endpoint does: returns `{ status, body }`.
#[wasm_bindgen(js_name = handleRequest)]
pub fn handle_request(body: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let body_value = from_value::<serde_json::Value>(body)
        .map_err(|err| JsValue::from_str(&format!("Could not read request body: {err}")))?;

    let reply = complaint_parser::handle_request(&body_value);
    to_value(&reply).map_err(|err| JsValue::from_str(&format!("Could not serialize reply: {err}")))
}
