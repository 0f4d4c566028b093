//! Property-based tests for the `OpenAI` translation layer
//!
//! These tests verify that translation between our internal types and the
//! wire format preserves key invariants:
//! - Message translation never produces empty output
//! - Tool-call argument text survives the round trip byte for byte
//! - Every named tool call is surfaced, in order
//! - Text content is preserved

#![allow(clippy::redundant_closure_for_method_calls)]

use super::openai::{
    self, OpenAIChoice, OpenAIFunctionCall, OpenAIMessage, OpenAIResponse, OpenAIToolCall,
    OpenAIUsage,
};
use super::types::{ContentBlock, LlmMessage, MessageRole};
use proptest::prelude::*;
use serde_json::Value;

// ============================================================================
// Strategies
// ============================================================================

fn arb_text_block() -> impl Strategy<Value = ContentBlock> {
    "[a-zA-Z0-9 _.!?,]{1,100}".prop_map(|text| ContentBlock::Text { text })
}

/// Argument payloads as a provider might send them, including broken JSON
fn arb_arguments() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("{}".to_string()),
        "[a-zA-Z0-9 {}\":,]{0,60}",
        ("[a-z_]{1,10}", "[a-zA-Z0-9 @.]{0,30}")
            .prop_map(|(k, v)| format!("{{\"{k}\": \"{v}\"}}")),
    ]
}

fn arb_tool_use_block() -> impl Strategy<Value = ContentBlock> {
    ("[a-z0-9_]{5,20}", "[a-z_]{3,20}", arb_arguments()).prop_map(|(id, name, args)| {
        ContentBlock::ToolUse {
            id,
            name,
            input: Value::String(args),
        }
    })
}

fn arb_tool_result_block() -> impl Strategy<Value = ContentBlock> {
    (
        "[a-z0-9_]{5,20}",
        "[a-z_]{3,20}",
        "[a-zA-Z0-9 _.!?,]{0,100}",
        any::<bool>(),
    )
        .prop_map(|(tool_use_id, name, content, is_error)| ContentBlock::ToolResult {
            tool_use_id,
            name,
            content,
            is_error,
        })
}

fn arb_user_message() -> impl Strategy<Value = LlmMessage> {
    proptest::collection::vec(
        prop_oneof![
            3 => arb_text_block(),
            2 => arb_tool_result_block(),
        ],
        0..6,
    )
    .prop_map(|content| LlmMessage {
        role: MessageRole::User,
        content,
    })
}

fn arb_assistant_message() -> impl Strategy<Value = LlmMessage> {
    proptest::collection::vec(
        prop_oneof![
            3 => arb_text_block(),
            3 => arb_tool_use_block(),
        ],
        0..6,
    )
    .prop_map(|content| LlmMessage {
        role: MessageRole::Assistant,
        content,
    })
}

fn arb_message() -> impl Strategy<Value = LlmMessage> {
    prop_oneof![arb_user_message(), arb_assistant_message()]
}

fn make_openai_response(
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
) -> OpenAIResponse {
    OpenAIResponse {
        choices: vec![OpenAIChoice {
            message: OpenAIMessage {
                role: "assistant".to_string(),
                content,
                name: None,
                tool_calls,
                tool_call_id: None,
            },
        }],
        usage: Some(OpenAIUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
        }),
    }
}

fn make_openai_tool_call(id: &str, name: &str, arguments: &str) -> OpenAIToolCall {
    OpenAIToolCall {
        id: id.to_string(),
        r#type: "function".to_string(),
        function: OpenAIFunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

// ============================================================================
// Response normalization
// ============================================================================

proptest! {
    /// N tool calls with non-empty names → exactly N `ToolUse` blocks, same order
    #[test]
    fn prop_normalize_preserves_named_tools(
        calls in proptest::collection::vec(
            ("[a-z0-9]{5,15}", "[a-z_]{3,15}", arb_arguments()),
            1..5,
        ),
    ) {
        let tool_calls = calls
            .iter()
            .map(|(id, name, args)| make_openai_tool_call(id, name, args))
            .collect();
        let resp = make_openai_response(None, Some(tool_calls));
        let normalized = openai::test_helpers::normalize_response(resp).unwrap();

        let uses = normalized.tool_uses();
        prop_assert_eq!(uses.len(), calls.len());
        for (got, (id, name, args)) in uses.iter().zip(&calls) {
            prop_assert_eq!(got.id, id.as_str());
            prop_assert_eq!(got.name, name.as_str());
            prop_assert_eq!(got.input, &Value::String(args.clone()));
        }
    }

    /// Tool calls with empty names are kept for the dispatcher to reject
    #[test]
    fn prop_normalize_keeps_unnamed_tools(args in arb_arguments()) {
        let resp = make_openai_response(
            Some("hello".to_string()),
            Some(vec![make_openai_tool_call("call_1", "", &args)]),
        );
        let normalized = openai::test_helpers::normalize_response(resp).unwrap();
        let uses = normalized.tool_uses();
        prop_assert_eq!(uses.len(), 1);
        prop_assert_eq!(uses[0].name, "");
        prop_assert_eq!(normalized.text(), "hello");
    }

    /// Text content survives normalization
    #[test]
    fn prop_normalize_preserves_text(text in "[a-zA-Z0-9 .,!?']{1,200}") {
        let resp = make_openai_response(Some(text.clone()), None);
        let normalized = openai::test_helpers::normalize_response(resp).unwrap();
        prop_assert_eq!(normalized.text(), text);
    }
}

// ============================================================================
// Message translation
// ============================================================================

proptest! {
    /// Translation never produces an empty message list
    #[test]
    fn prop_translate_never_empty(msg in arb_message()) {
        let out = openai::test_helpers::translate_message(&msg);
        prop_assert!(!out.is_empty());
    }

    /// Argument text is re-sent exactly as the provider produced it
    #[test]
    fn prop_translate_resends_arguments_verbatim(msg in arb_assistant_message()) {
        let expected: Vec<String> = msg
            .content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { input: Value::String(s), .. } => Some(s.clone()),
                _ => None,
            })
            .collect();

        let out = openai::test_helpers::translate_message(&msg);
        let actual: Vec<String> = out
            .iter()
            .filter_map(|m| m.tool_calls.as_ref())
            .flatten()
            .map(|tc| tc.function.arguments.clone())
            .collect();

        prop_assert_eq!(actual, expected);
    }

    /// Each tool result becomes exactly one "tool" message with its call id
    #[test]
    fn prop_translate_one_tool_message_per_result(msg in arb_user_message()) {
        let result_ids: Vec<String> = msg
            .content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.clone()),
                _ => None,
            })
            .collect();

        let out = openai::test_helpers::translate_message(&msg);
        let tool_ids: Vec<String> = out
            .iter()
            .filter(|m| m.role == "tool")
            .filter_map(|m| m.tool_call_id.clone())
            .collect();

        prop_assert_eq!(tool_ids, result_ids);
    }
}
