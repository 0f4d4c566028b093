//! Concierge - a business assistant that answers from a fixed knowledge
//! document, captures leads and logs questions it cannot answer.

pub mod agent;
pub mod api;
pub mod config;
pub mod history;
pub mod knowledge;
pub mod llm;
pub mod readiness;
pub mod sanitize;
pub mod store;
pub mod system_prompt;
pub mod tools;

pub use agent::{Agent, AgentReply, TurnError};
pub use config::Config;
pub use history::History;
pub use store::LogStore;
