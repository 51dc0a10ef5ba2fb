//! Lenient JSON extraction from model output
//!
//! Models asked for "JSON only" still wrap it in prose or code fences often
//! enough that a direct parse cannot be the only path. The fallback grabs
//! the outermost brace block and retries; anything that still fails, or
//! parses to a non-object, is a hard failure for that call.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use lead_desk_core::AiBrief;

use crate::LlmError;

static BRACE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("brace-block regex"));

/// Parse a JSON value out of raw model text.
pub fn extract_json(text: &str) -> Result<Value, LlmError> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let Some(block) = BRACE_BLOCK.find(text) else {
                return Err(LlmError::InvalidResponse(format!(
                    "json_parse_failed: {}",
                    first_err
                )));
            };
            serde_json::from_str(block.as_str()).map_err(|inner_err| {
                LlmError::InvalidResponse(format!("json_parse_failed: {}", inner_err))
            })
        }
    }
}

/// Parse a structured brief out of raw model text. A response that is not a
/// JSON object is rejected, never partially trusted.
pub fn parse_brief(text: &str) -> Result<AiBrief, LlmError> {
    let value = extract_json(text)?;
    AiBrief::from_json(&value).ok_or_else(|| {
        LlmError::InvalidResponse("invalid_ai_response_type".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_json() {
        let value = extract_json(r#"{"brief_summary": ["ok"]}"#).unwrap();
        assert!(value.is_object());
    }

    #[test]
    fn test_json_wrapped_in_prose() {
        let text = "Here is the brief:\n```json\n{\"quality_score\": 80}\n```\nDone.";
        let brief = parse_brief(text).unwrap();
        assert_eq!(brief.quality_score.unwrap().clamped(), 80);
    }

    #[test]
    fn test_no_json_at_all() {
        let err = extract_json("je ne sais pas").err().unwrap();
        assert!(err.to_string().contains("json_parse_failed"));
    }

    #[test]
    fn test_non_object_is_invalid_type() {
        let err = parse_brief("[1, 2, 3]").err().unwrap();
        assert!(err.to_string().contains("invalid_ai_response_type"));
    }
}
