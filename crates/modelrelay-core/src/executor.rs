//! Model Fallback Executor — try candidate models in order until one
//! answers.
//!
//! Composes with the retry policy: retries happen within a model, fallback
//! happens across models. Attempts for model *i* always resolve before
//! model *i+1* starts; there is no parallel fan-out, so a degraded provider
//! never burns quota on speculative calls.

use std::future::Future;
use std::time::Duration;

use modelrelay_providers::ProviderError;

use crate::error::{FailureClass, RelayError};
use crate::retry::invoke_with_retry;

/// Cooldown unit between models after an overload-class exhaustion; the
/// actual sleep is `(index + 1) * 500ms`.
const COOLDOWN_STEP: Duration = Duration::from_millis(500);

/// Try each candidate model in order, returning the first successful reply.
///
/// Failure handling per candidate:
/// - `ModelNotFound`: log and advance immediately.
/// - `Overloaded` (retry budget already spent): sleep the cooldown, advance.
/// - `QuotaExceeded` / `InvalidCredentials`: abort — account-level problems
///   are not fixed by another model and must not be masked.
/// - anything else: abort with the adapter error.
///
/// When every candidate fails, the last failure collapses into a single
/// classified [`RelayError::AllModelsExhausted`].
pub async fn execute<F, Fut>(
    models: &[String],
    max_retries: u32,
    mut invoke: F,
) -> Result<String, RelayError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, ProviderError>>,
{
    if models.is_empty() {
        return Err(RelayError::AllModelsExhausted {
            class: FailureClass::Unknown,
            detail: "no candidate models configured".into(),
        });
    }

    let mut last_failure: Option<ProviderError> = None;

    for (index, model) in models.iter().enumerate() {
        let result = invoke_with_retry(model, max_retries, || invoke(model.clone())).await;

        match result {
            Ok(text) => {
                tracing::debug!(model = %model, index, "Model answered");
                return Ok(text);
            }
            Err(ProviderError::ModelNotFound(reason)) => {
                tracing::warn!(model = %model, %reason, "Model unavailable on this account, trying next candidate");
                last_failure = Some(ProviderError::ModelNotFound(reason));
            }
            Err(err @ ProviderError::Overloaded(_)) => {
                let cooldown = COOLDOWN_STEP * (index as u32 + 1);
                tracing::warn!(
                    model = %model,
                    cooldown_ms = cooldown.as_millis() as u64,
                    "Model overloaded after retries, cooling down before next candidate"
                );
                last_failure = Some(err);
                if index + 1 < models.len() {
                    tokio::time::sleep(cooldown).await;
                }
            }
            Err(ProviderError::QuotaExceeded(detail)) => {
                return Err(RelayError::QuotaExceeded {
                    provider: model.clone(),
                    detail,
                });
            }
            Err(ProviderError::InvalidCredentials(detail)) => {
                return Err(RelayError::InvalidCredentials {
                    provider: model.clone(),
                    detail,
                });
            }
            Err(err) => return Err(RelayError::Provider(err)),
        }
    }

    let (class, detail) = classify_exhaustion(last_failure);
    Err(RelayError::AllModelsExhausted { class, detail })
}

/// Collapse the last per-model failure into one human-readable class.
fn classify_exhaustion(last: Option<ProviderError>) -> (FailureClass, String) {
    match last {
        Some(ProviderError::Overloaded(detail)) => (FailureClass::Overloaded, detail),
        Some(ProviderError::InvalidCredentials(detail)) => {
            (FailureClass::InvalidCredentials, detail)
        }
        Some(ProviderError::QuotaExceeded(detail)) => (FailureClass::QuotaExceeded, detail),
        Some(other) => (FailureClass::Unknown, other.to_string()),
        None => (FailureClass::Unknown, "no models attempted".into()),
    }
}
