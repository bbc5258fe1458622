//! Language-model provider implementations for Wayfarer.
//!
//! All providers implement the `wayfarer_core::Provider` trait.

pub mod anthropic;

pub use anthropic::AnthropicProvider;
