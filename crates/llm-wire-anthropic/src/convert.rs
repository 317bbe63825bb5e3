//! Conversion from core conversation types to the Messages-API request
//! shape.
//!
//! The leading contiguous run of system messages moves out of the
//! message list into the dedicated `system` array, one entry per
//! message and in order, with cache-control annotations preserved.
//! A conversation without system messages omits the field entirely.

use llm_wire::chat::{Message as CoreMessage, Role};
use llm_wire::session::SessionFlags;
use serde_json::{Map, Value};

use crate::types::{ContentBlock, Message, MessageContent, Request, ServerTool, SystemBlock};

/// The provider-hosted tools offered when the session flag is on.
fn server_tools() -> Vec<ServerTool> {
    vec![
        ServerTool {
            tool_type: "web_search_20250305",
            name: "web_search",
        },
        ServerTool {
            tool_type: "code_execution_20250522",
            name: "code_execution",
        },
    ]
}

/// Builds a Messages-API request body.
pub fn build_request<'a>(
    model: &'a str,
    messages: &'a [CoreMessage],
    resolved: &Map<String, Value>,
    flags: &SessionFlags,
) -> Request<'a> {
    let split = messages
        .iter()
        .position(|m| m.role != Role::System)
        .unwrap_or(messages.len());

    let system = if split == 0 {
        None
    } else {
        Some(
            messages[..split]
                .iter()
                .map(|m| SystemBlock {
                    block_type: "text",
                    text: &m.content,
                    cache_control: m.cache_control,
                })
                .collect(),
        )
    };

    let messages = messages[split..]
        .iter()
        .map(|m| Message {
            role: match m.role {
                Role::Assistant => "assistant",
                // A system message past the leading run cannot use the
                // dedicated channel; its content still reaches the
                // model as a user turn.
                _ => "user",
            },
            content: match m.cache_control {
                Some(cache_control) => MessageContent::Blocks(vec![ContentBlock {
                    block_type: "text",
                    text: &m.content,
                    cache_control: Some(cache_control),
                }]),
                None => MessageContent::Text(&m.content),
            },
        })
        .collect();

    Request {
        model,
        messages,
        stream: true,
        system,
        tools: flags.server_tools().then(server_tools),
        params: resolved.clone(),
    }
}
