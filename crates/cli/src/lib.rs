//! Wiring for the `wayfarer` binary.
//!
//! Everything the binary runs is assembled here, in one place, so the
//! end-to-end tests can build the same agent graph with scripted transports.

pub mod graph;

pub use graph::{AgentGraph, build_agent_graph, default_prompt_vars};
