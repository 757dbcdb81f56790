//! Conversation Normalizer — reshape caller histories into the strict
//! alternating user/model form some providers require.
//!
//! Rules, applied in order:
//! 1. drop turns whose content is empty or whitespace;
//! 2. merge consecutive user turns (space-joined);
//! 3. collapse consecutive assistant turns to the most recent one;
//! 4. drop leading turns until the first remaining turn is a user turn.
//!
//! The result may be empty; callers treat that as "no prior context" and
//! issue a single-shot prompt instead of a chat-style call.

use modelrelay_providers::{ChatMessage, Role};

/// Normalize a conversation history for strict-alternation providers.
pub fn normalize(history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut out: Vec<ChatMessage> = Vec::with_capacity(history.len());

    for turn in history {
        let content = turn.content.trim();
        if content.is_empty() {
            continue;
        }

        match out.last_mut() {
            Some(prev) if prev.role == turn.role => match turn.role {
                Role::User => {
                    prev.content.push(' ');
                    prev.content.push_str(content);
                }
                // Later assistant turns supersede earlier duplicates.
                Role::Assistant => prev.content = content.to_string(),
            },
            _ => out.push(ChatMessage {
                role: turn.role,
                content: content.to_string(),
            }),
        }
    }

    // Providers reject histories that open with an assistant turn.
    let first_user = out.iter().position(|m| m.role == Role::User);
    match first_user {
        Some(0) => out,
        Some(n) => out.split_off(n),
        None => Vec::new(),
    }
}
