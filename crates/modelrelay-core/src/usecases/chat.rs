//! Assistant chat replies — the one plain-text use case.
//!
//! No JSON stage here; the raw reply is the product. History is normalized
//! by the orchestrator, and an entirely-invalid history degrades to a
//! single-shot prompt rather than a chat-style call.

use modelrelay_providers::ChatMessage;

use crate::error::RelayResult;
use crate::orchestrator::{InvocationRequest, Orchestrator};

const SYSTEM_INSTRUCTION: &str = "You are the support assistant for a \
marketplace selling ready-made software project source code. Answer \
questions about products, licensing, delivery, and customization. Keep \
replies under 150 words and stay on topic.";

/// Produce an assistant reply to `message` given prior conversation turns.
pub async fn chat_reply(
    relay: &Orchestrator,
    message: &str,
    history: Vec<ChatMessage>,
) -> RelayResult<String> {
    let request = InvocationRequest::new(message)
        .system(SYSTEM_INSTRUCTION)
        .history(history);
    let reply = relay.generate(request).await?;
    Ok(reply.trim().to_string())
}
