//! Error types for the Wayfarer domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Wayfarer operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Engine errors ---
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    // --- Search errors ---
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("Invalid range: requested {requested} turns but memory holds {available}")]
    InvalidRange { requested: usize, available: usize },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Delegation to {agent} failed: {source}")]
    Delegation {
        agent: String,
        #[source]
        source: Box<Error>,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Turn limit exceeded: {agent} made {max_turns} model calls without finishing")]
    TurnLimitExceeded { agent: String, max_turns: u32 },
}

/// Failures of the itinerary search and its disambiguation passes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("Candidate has no station code, coordinates or stop id: {0}")]
    UnresolvableCandidate(String),

    #[error("Unknown match status '{status}' for {slot} location")]
    UnknownMatchStatus { slot: String, status: String },

    #[error("Locations still ambiguous after {passes} disambiguation pass(es): {from} -> {to}")]
    DisambiguationExhausted {
        from: String,
        to: String,
        passes: u32,
    },

    #[error("Unexpected search status {status} for {from} -> {to}")]
    UnexpectedStatus {
        status: u16,
        from: String,
        to: String,
    },

    #[error("Malformed search payload: {0}")]
    MalformedPayload(String),

    #[error("Search transport error: {0}")]
    Transport(String),

    #[error("Invalid search parameter: {0}")]
    InvalidParameter(String),
}
