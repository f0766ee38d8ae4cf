//! Stage B: convert stage-A text into schema-shaped JSON.
//!
//! The structuring model is asked for JSON only; surrounding code-fence
//! markup is stripped before parsing anyway, since models add it despite
//! instructions.

use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::client::{ChatClient, ChatMessage};
use crate::error::{AnalyzerError, AnalyzerResult};

const SCHEMA: &str = r#"{
  "scenes": [
    {
      "start_time": float,
      "end_time": float,
      "summary": string,
      "physics": {
        "objects": [
          {
            "name": string,
            "approx_velocity_m_s": float | null,
            "direction": string | null,
            "collisions": boolean,
            "notes": string | null
          }
        ],
        "notes": string | null
      }
    }
  ]
}"#;

/// Run stage B: structure free-text analysis into the scene schema.
///
/// Returns the parsed JSON object with a non-empty `scenes` array; the
/// scenes themselves are still unvalidated model output.
pub async fn structure_analysis(
    client: &ChatClient,
    model: &str,
    analysis_text: &str,
    timeout: Duration,
) -> AnalyzerResult<Value> {
    info!("Structuring analysis text ({} chars) with model {}", analysis_text.len(), model);

    let system = format!(
        "Convert the following analysis into strict JSON matching this schema:\n{}\n\n\
         Requirements:\n\
         - Return ONLY valid JSON, no other text or markdown\n\
         - Extract all scenes mentioned in the analysis\n\
         - Use exact start_time and end_time values from the analysis\n\
         - Include all objects and their physics properties\n\
         - Convert velocity descriptions to numeric m/s values where possible\n\
         - Set collisions to true only if explicitly mentioned",
        SCHEMA
    );

    let user = format!(
        "Convert this detailed video analysis to the required JSON format:\n\n{}\n\n\
         Extract all scenes with their exact timing and physics information.",
        analysis_text
    );

    let messages = [ChatMessage::system(system), ChatMessage::user(user)];

    // RequestFailed passes through untouched: a failed call is not
    // schema-violating output.
    let text = tokio::time::timeout(timeout, client.complete(model, &messages))
        .await
        .map_err(|_| AnalyzerError::StructuringTimeout(timeout.as_secs()))??;

    let parsed: Value = serde_json::from_str(strip_code_fences(&text))
        .map_err(AnalyzerError::StructuringParseFailed)?;

    check_schema(&parsed)?;

    Ok(parsed)
}

/// Strip surrounding markdown code-fence markup, if present.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Minimal schema check: an object with a non-empty `scenes` array.
fn check_schema(parsed: &Value) -> AnalyzerResult<()> {
    let obj = parsed
        .as_object()
        .ok_or_else(|| AnalyzerError::schema_failed("model returned non-object JSON"))?;

    let scenes = obj
        .get("scenes")
        .ok_or_else(|| AnalyzerError::schema_failed("response missing 'scenes' key"))?;

    match scenes.as_array() {
        Some(arr) if !arr.is_empty() => Ok(()),
        Some(_) => Err(AnalyzerError::schema_failed("'scenes' array is empty")),
        None => Err(AnalyzerError::schema_failed("'scenes' is not an array")),
    }
}
