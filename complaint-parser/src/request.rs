//! JSON request/response envelope used by host layers (HTTP, WASM).

use complaint_core::{ComplaintError, FailureReason, ParseOptions, ParseResult};
use serde::Serialize;
use serde_json::Value;

use crate::parse;

/// Fields accepted as the complaint text, in lookup order.
const TEXT_FIELDS: [&str; 2] = ["text", "complaint"];

/// Validated request body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseRequest {
    pub text: String,
    pub options: ParseOptions,
}

impl ParseRequest {
    /// Validate a JSON body of the form `{ "text": ..., "synonyms": ..., "knownSymptoms": ... }`.
    pub fn from_value(body: &Value) -> Result<Self, ComplaintError> {
        if !body.is_object() {
            return Err(ComplaintError::Parse("request body must be a JSON object".to_string()));
        }

        let text = TEXT_FIELDS
            .iter()
            .find_map(|field| body.get(*field).and_then(Value::as_str))
            .ok_or(ComplaintError::MissingText)?;

        if text.trim().is_empty() {
            return Err(ComplaintError::EmptyText);
        }

        let options = serde_json::from_value::<ParseOptions>(body.clone())
            .map_err(|err| ComplaintError::Dictionary(err.to_string()))?;

        Ok(Self {
            text: text.to_string(),
            options,
        })
    }
}

/// `success`/`data` envelope returned to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ParseResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Envelope plus the HTTP status the host should answer with.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HostReply {
    pub status: u16,
    pub body: ApiResponse,
}

impl HostReply {
    fn ok(result: ParseResult) -> Self {
        Self {
            status: 200,
            body: ApiResponse {
                success: true,
                data: Some(result),
                error: None,
            },
        }
    }

    fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiResponse {
                success: false,
                data: None,
                error: Some(message.into()),
            },
        }
    }
}

/// Validate a request body, parse it and wrap the result.
pub fn handle_request(body: &Value) -> HostReply {
    let request = match ParseRequest::from_value(body) {
        Ok(request) => request,
        Err(ComplaintError::EmptyText) => {
            let reason = FailureReason::EmptyText;
            return HostReply::rejected(reason.status_code(), reason.as_str());
        }
        Err(err) => {
            tracing::warn!(error = %err, "rejected complaint request");
            return HostReply::rejected(400, err.to_string());
        }
    };

    let result = parse(&request.text, &request.options);
    match result.failure_reason {
        Some(reason) if reason.status_code() >= 400 => {
            HostReply::rejected(reason.status_code(), reason.as_str())
        }
        _ => HostReply::ok(result),
    }
}
