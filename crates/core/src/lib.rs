//! # Wayfarer Core
//!
//! Domain types, traits, and error definitions for the Wayfarer agent
//! runtime. This crate has **no transport dependencies**: it defines the
//! domain model that all other crates implement against.
//!
//! Every seam is a trait here (`Provider`, `Tool`); implementations live in
//! their respective crates so tests can swap in scripted stand-ins.

pub mod error;
pub mod event;
pub mod memory;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use memory::ConversationMemory;
pub use message::{ContentBlock, Role, ToolCall, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StopReason, ToolChoice, ToolDefinition};
pub use tool::{Tool, ToolRegistry};
