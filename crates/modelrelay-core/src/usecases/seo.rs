//! SEO field generation for product listings.

use serde::{Deserialize, Serialize};

use super::{generate_object, str_field, str_list_field, ContentSource};
use crate::error::RelayResult;
use crate::orchestrator::{InvocationRequest, Orchestrator};

const REQUIRED_FIELDS: &[&str] = &["meta_title", "meta_description"];

const SYSTEM_INSTRUCTION: &str = "You write search-engine metadata for \
product listings on a source-code marketplace. Be specific and avoid \
keyword stuffing.";

/// Conventional length caps applied to fallback metadata.
const META_TITLE_MAX: usize = 60;
const META_DESCRIPTION_MAX: usize = 155;

/// Search-engine metadata for one listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoFields {
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    /// Generated vs fallback marker.
    pub source: ContentSource,
}

/// Generate SEO fields for a product `name` with a short `summary`.
pub async fn generate_seo(relay: &Orchestrator, name: &str, summary: &str) -> RelayResult<SeoFields> {
    let prompt = format!(
        "Product: {name}\nSummary: {summary}\n\n\
         Reply as a JSON object with:\n\
         - \"meta_title\": up to {META_TITLE_MAX} characters\n\
         - \"meta_description\": up to {META_DESCRIPTION_MAX} characters\n\
         - \"keywords\": 5-8 search phrases"
    );
    let request = InvocationRequest::new(prompt).system(SYSTEM_INSTRUCTION);

    match generate_object(relay, request, REQUIRED_FIELDS).await? {
        Some(map) => Ok(SeoFields {
            meta_title: str_field(&map, "meta_title"),
            meta_description: str_field(&map, "meta_description"),
            keywords: str_list_field(&map, "keywords"),
            source: ContentSource::Generated,
        }),
        None => Ok(fallback_seo(name, summary)),
    }
}

fn fallback_seo(name: &str, summary: &str) -> SeoFields {
    SeoFields {
        meta_title: clamp(&format!("{name} — Source Code"), META_TITLE_MAX),
        meta_description: clamp(summary, META_DESCRIPTION_MAX),
        keywords: vec![
            name.to_lowercase(),
            format!("{} source code", name.to_lowercase()),
            "buy project source code".to_string(),
        ],
        source: ContentSource::Fallback,
    }
}

/// Truncate on a character boundary without splitting words mid-way where
/// possible.
fn clamp(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(idx) if idx > max_chars / 2 => format!("{}…", &cut[..idx]),
        _ => format!("{cut}…"),
    }
}
