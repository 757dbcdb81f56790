//! Requirement analysis for buyer-submitted project descriptions.

use serde::{Deserialize, Serialize};

use super::{generate_object, str_field, str_list_field, ContentSource};
use crate::error::RelayResult;
use crate::orchestrator::{InvocationRequest, Orchestrator};

const REQUIRED_FIELDS: &[&str] = &["summary", "complexity"];

const SYSTEM_INSTRUCTION: &str = "You are a software consultant estimating \
scope for custom project requests on a source-code marketplace. Be \
realistic; do not undersell complexity.";

/// Structured breakdown of a free-text project description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementAnalysis {
    /// One-paragraph restatement of what the requester wants.
    pub summary: String,
    /// Discrete features pulled out of the description.
    pub features: Vec<String>,
    /// "low", "medium", or "high".
    pub complexity: String,
    /// Rough effort estimate.
    pub estimated_hours: u32,
    /// Generated vs fallback marker.
    pub source: ContentSource,
}

/// Analyze a free-text requirement description.
pub async fn analyze_requirements(
    relay: &Orchestrator,
    description: &str,
) -> RelayResult<RequirementAnalysis> {
    let prompt = format!(
        "Analyze this project request:\n\n{description}\n\n\
         Reply as a JSON object with:\n\
         - \"summary\": one paragraph restating the request\n\
         - \"features\": list of discrete features\n\
         - \"complexity\": \"low\", \"medium\", or \"high\"\n\
         - \"estimated_hours\": integer effort estimate"
    );
    let request = InvocationRequest::new(prompt).system(SYSTEM_INSTRUCTION);

    match generate_object(relay, request, REQUIRED_FIELDS).await? {
        Some(map) => Ok(RequirementAnalysis {
            summary: str_field(&map, "summary"),
            features: str_list_field(&map, "features"),
            complexity: normalize_complexity(&str_field(&map, "complexity")),
            estimated_hours: map
                .get("estimated_hours")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0) as u32,
            source: ContentSource::Generated,
        }),
        None => Ok(fallback_analysis(description)),
    }
}

/// Clamp free-form complexity labels to the three canonical values.
fn normalize_complexity(raw: &str) -> String {
    match raw.trim().to_lowercase().as_str() {
        "low" | "simple" | "easy" => "low".to_string(),
        "high" | "complex" | "hard" => "high".to_string(),
        _ => "medium".to_string(),
    }
}

fn fallback_analysis(description: &str) -> RequirementAnalysis {
    let summary = if description.chars().count() > 240 {
        let cut: String = description.chars().take(240).collect();
        format!("{cut}…")
    } else {
        description.to_string()
    };
    RequirementAnalysis {
        summary,
        features: Vec::new(),
        complexity: "medium".to_string(),
        estimated_hours: 0,
        source: ContentSource::Fallback,
    }
}
