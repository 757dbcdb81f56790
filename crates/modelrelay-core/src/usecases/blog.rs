//! Blog-post generation with a deterministic fallback template.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{generate_object, str_field, str_list_field, ContentSource};
use crate::error::RelayResult;
use crate::orchestrator::{InvocationRequest, Orchestrator};

const REQUIRED_FIELDS: &[&str] = &["title", "excerpt", "content"];

const SYSTEM_INSTRUCTION: &str = "You are a technical content writer for a \
marketplace of ready-made software project source code. Write accurate, \
practical articles for developers and small businesses.";

/// A generated (or fallback) blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    /// URL-safe identifier derived from the title.
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub tags: Vec<String>,
    pub category: String,
    pub generated_at: DateTime<Utc>,
    /// Generated vs fallback marker.
    pub source: ContentSource,
}

/// Generate a blog post about `topic` in `category`.
///
/// Never fails for malformed model output: after two parse attempts the
/// deterministic template below is returned with
/// [`ContentSource::Fallback`]. Provider-level errors still propagate.
pub async fn generate_blog_post(
    relay: &Orchestrator,
    topic: &str,
    category: &str,
) -> RelayResult<BlogPost> {
    let prompt = format!(
        "Write a blog post about \"{topic}\" for the \"{category}\" category.\n\
         Reply as a JSON object with these fields:\n\
         - \"title\": a compelling headline (under 70 characters)\n\
         - \"excerpt\": a 1-2 sentence teaser\n\
         - \"content\": the full article body in Markdown, 600-900 words\n\
         - \"tags\": 3-6 short lowercase tags"
    );
    let request = InvocationRequest::new(prompt).system(SYSTEM_INSTRUCTION);

    match generate_object(relay, request, REQUIRED_FIELDS).await? {
        Some(map) => {
            let title = str_field(&map, "title");
            Ok(BlogPost {
                slug: slugify(&title),
                title,
                excerpt: str_field(&map, "excerpt"),
                content: str_field(&map, "content"),
                tags: str_list_field(&map, "tags"),
                category: category.to_string(),
                generated_at: Utc::now(),
                source: ContentSource::Generated,
            })
        }
        None => Ok(fallback_post(topic, category)),
    }
}

/// Deterministic placeholder built from the caller's topic and category, so
/// the publishing pipeline always receives a valid post.
fn fallback_post(topic: &str, category: &str) -> BlogPost {
    let title = format!("{topic}: An Overview");
    BlogPost {
        slug: slugify(&title),
        title,
        excerpt: format!("An introduction to {topic} for the {category} space."),
        content: format!(
            "## {topic}\n\n\
             This article covers {topic} in the context of {category}. \
             It outlines what {topic} is, why it matters, and how teams \
             typically adopt it.\n\n\
             ### Why {topic} matters\n\n\
             Projects in the {category} space increasingly rely on {topic} \
             to ship faster and reduce maintenance cost.\n\n\
             ### Getting started\n\n\
             Start small: evaluate {topic} against your current stack, \
             prototype with a narrow scope, and expand once the approach \
             proves itself."
        ),
        tags: vec![slugify(topic), slugify(category)],
        category: category.to_string(),
        generated_at: Utc::now(),
        source: ContentSource::Fallback,
    }
}

/// Lowercase, hyphen-separated, ASCII-alphanumeric slug.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_was_hyphen = true;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}
