//! Use-case functions — prompt templates plus deterministic defaults.
//!
//! Every structured use case follows the same shape: build a prompt, ask
//! once, and if the reply cannot be recovered as schema-valid JSON, ask a
//! second time with a stronger "return ONLY JSON" instruction before
//! falling back to a deterministic template. Provider-level failures
//! (no credentials, quota, auth, full exhaustion) still propagate; only
//! "the model replied with something that isn't quite JSON" is absorbed.

pub mod analysis;
pub mod blog;
pub mod chat;
pub mod explain;
pub mod seo;

pub use analysis::RequirementAnalysis;
pub use blog::BlogPost;
pub use explain::FeatureExplanation;
pub use seo::SeoFields;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RelayError, RelayResult};
use crate::extract;
use crate::orchestrator::{InvocationRequest, Orchestrator};

/// Where a structured result came from. Fallbacks are always
/// distinguishable from genuine AI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// Authored by the model and schema-validated.
    Generated,
    /// Deterministic template applied after extraction failed.
    Fallback,
}

/// Appended to the system instruction on the second attempt.
const STRICT_JSON_SUFFIX: &str = "Respond with ONLY a valid JSON object. \
No prose, no Markdown fences, no explanations — the first character of \
your reply must be '{'.";

/// Two-attempt structured generation.
///
/// Returns `Ok(Some(map))` when an attempt produced a JSON object carrying
/// every required field, `Ok(None)` when both attempts failed to parse or
/// validate (the caller applies its default), and `Err` for provider-level
/// failures that must stay visible.
pub(crate) async fn generate_object(
    relay: &Orchestrator,
    request: InvocationRequest,
    required_fields: &[&str],
) -> RelayResult<Option<Map<String, Value>>> {
    let strict = {
        let mut r = request.clone();
        r.system_instruction = Some(match &r.system_instruction {
            Some(s) => format!("{s} {STRICT_JSON_SUFFIX}"),
            None => STRICT_JSON_SUFFIX.to_string(),
        });
        r
    };

    for (attempt, req) in [request, strict].into_iter().enumerate() {
        match relay.generate_json(req).await {
            Ok(map) => {
                if extract::validate_required_fields(&map, required_fields) {
                    return Ok(Some(map));
                }
                // Partial-but-invalid output is discarded wholesale; the
                // deterministic default replaces it entirely.
                tracing::warn!(attempt, ?required_fields, "Parsed object missing required fields");
            }
            Err(RelayError::Unparsable { raw }) => {
                tracing::warn!(
                    attempt,
                    raw_len = raw.len(),
                    "Reply was not recoverable JSON"
                );
            }
            Err(err) => return Err(err),
        }
    }

    Ok(None)
}

/// Pull a string field out of a parsed object.
pub(crate) fn str_field(map: &Map<String, Value>, field: &str) -> String {
    map.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Pull a string-array field out of a parsed object, tolerating scalars.
pub(crate) fn str_list_field(map: &Map<String, Value>, field: &str) -> Vec<String> {
    match map.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
