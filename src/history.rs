//! Prior-conversation input accepted by a turn
//!
//! Callers send either `[user, assistant]` pairs or role-tagged messages;
//! both normalize to an ordered list of [`TurnPair`]s.

use serde::{Deserialize, Serialize};

/// History as received from a caller
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum History {
    Pairs(Vec<(Option<String>, Option<String>)>),
    Messages(Vec<RoleMessage>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMessage {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// System, tool, or anything unrecognized; ignored
    #[default]
    #[serde(other)]
    Other,
}

/// One completed exchange. Either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnPair {
    pub user: String,
    pub assistant: String,
}

/// Normalize any accepted history shape into pairs.
///
/// For role-tagged input, a user message waits for the next assistant
/// message; an assistant message with nothing pending pairs with an empty
/// user side, and a trailing unanswered user message is dropped.
pub fn normalize(history: Option<&History>) -> Vec<TurnPair> {
    match history {
        None => Vec::new(),
        Some(History::Pairs(pairs)) => pairs
            .iter()
            .map(|(user, assistant)| TurnPair {
                user: user.clone().unwrap_or_default(),
                assistant: assistant.clone().unwrap_or_default(),
            })
            .collect(),
        Some(History::Messages(messages)) => {
            let mut pairs = Vec::new();
            let mut pending_user: Option<String> = None;
            for message in messages {
                let content = message.content.clone().unwrap_or_default();
                match message.role {
                    Role::User => pending_user = Some(content),
                    Role::Assistant => pairs.push(TurnPair {
                        user: pending_user.take().unwrap_or_default(),
                        assistant: content,
                    }),
                    Role::Other => {}
                }
            }
            pairs
        }
    }
}
