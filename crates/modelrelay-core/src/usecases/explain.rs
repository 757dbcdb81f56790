//! Functionality explanations for product detail pages.

use serde::{Deserialize, Serialize};

use super::{generate_object, str_field, str_list_field, ContentSource};
use crate::error::RelayResult;
use crate::orchestrator::{InvocationRequest, Orchestrator};

const REQUIRED_FIELDS: &[&str] = &["overview"];

const SYSTEM_INSTRUCTION: &str = "You explain what a piece of software does \
to non-technical buyers. Plain language, no marketing fluff.";

/// Buyer-facing explanation of what a product does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureExplanation {
    /// Short plain-language overview.
    pub overview: String,
    /// Bullet-point capabilities.
    pub key_features: Vec<String>,
    /// Generated vs fallback marker.
    pub source: ContentSource,
}

/// Explain what the product `name` does, given its technical `description`.
pub async fn explain_functionality(
    relay: &Orchestrator,
    name: &str,
    description: &str,
) -> RelayResult<FeatureExplanation> {
    let prompt = format!(
        "Product: {name}\nTechnical description:\n{description}\n\n\
         Reply as a JSON object with:\n\
         - \"overview\": 2-3 plain-language sentences on what it does\n\
         - \"key_features\": up to 6 bullet points, buyer-facing wording"
    );
    let request = InvocationRequest::new(prompt).system(SYSTEM_INSTRUCTION);

    match generate_object(relay, request, REQUIRED_FIELDS).await? {
        Some(map) => Ok(FeatureExplanation {
            overview: str_field(&map, "overview"),
            key_features: str_list_field(&map, "key_features"),
            source: ContentSource::Generated,
        }),
        None => Ok(FeatureExplanation {
            overview: format!("{name} is a ready-made software package. {description}"),
            key_features: Vec::new(),
            source: ContentSource::Fallback,
        }),
    }
}
