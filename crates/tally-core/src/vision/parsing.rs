//! JSON parsing helpers for vision responses
//!
//! Even with a response schema, model output sometimes arrives wrapped in
//! markdown code fences or with prose around the JSON payload. These helpers
//! strip that noise before deserializing.

use crate::error::{Error, Result};
use crate::models::RawBill;

/// Parse a raw bill from a vision model response
///
/// Strips ```json fences, locates the outermost JSON object, and
/// deserializes it. A response with no parseable object is a failed scan.
pub fn parse_bill_response(response: &str) -> Result<RawBill> {
    let cleaned = response.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let start = cleaned.find('{');
    let end = cleaned.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &cleaned[s..=e];
            serde_json::from_str(json_str).map_err(|err| {
                Error::Vision(format!(
                    "Invalid bill JSON from vision model: {} | Raw: {}",
                    err,
                    preview(json_str)
                ))
            })
        }
        _ => Err(Error::Vision(format!(
            "No JSON found in vision response | Raw: {}",
            preview(cleaned)
        ))),
    }
}

/// The first ~200 bytes of a response for error context, cut on a char
/// boundary so multibyte content cannot panic the error path
fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    if text.len() <= LIMIT {
        return text.to_string();
    }
    let mut end = LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
