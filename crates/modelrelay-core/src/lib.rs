//! # modelrelay-core
//!
//! Provider orchestration for LLM-backed content generation: turn a prompt
//! into a reliable, structured result despite flaky, rate-limited,
//! multi-model third-party APIs.
//!
//! The layers compose as: use-case function → [`Orchestrator`] →
//! fallback executor (across candidate models) → retry policy (within one
//! model) → provider adapter → raw text → JSON extractor → validated
//! object or deterministic fallback.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use modelrelay_core::{usecases, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY / OPENAI_API_KEY.
//!     let relay = Orchestrator::from_env()?;
//!
//!     let post = usecases::blog::generate_blog_post(
//!         &relay,
//!         "migrating a monolith to microservices",
//!         "architecture",
//!     )
//!     .await?;
//!
//!     println!("{} ({:?})", post.title, post.source);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod extract;
pub mod history;
pub mod orchestrator;
pub mod registry;
pub mod retry;
pub mod telemetry;
pub mod usecases;

// Re-exports
pub use config::{RelayConfig, TelemetryConfig};
pub use error::{FailureClass, RelayError, RelayResult};
pub use orchestrator::{InvocationRequest, Orchestrator};
pub use registry::{ProviderConfig, ProviderId, ProviderPreference, ProviderRegistry};
pub use usecases::ContentSource;

// Re-export provider types for convenience
pub use modelrelay_providers::{ChatMessage, ProviderClient, ProviderError, Role};
