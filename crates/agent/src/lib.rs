//! The tool-use orchestration engine.
//!
//! An engine follows a **Call → Dispatch → Respond** cycle:
//!
//! 1. **Receive** an input (from the principal, or from a parent engine)
//! 2. **Send** the whole conversation plus tool descriptors to the model
//! 3. **If tool calls**: dispatch them, append the results, and either loop
//!    back to step 2 or return the raw results, depending on the policy
//! 4. **If text response**: return it
//!
//! Engines nest: a [`SubAgentTool`] wraps a child engine so a parent can
//! call it like any other tool.

pub mod delegate;
pub mod engine;
pub mod policy;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use delegate::{SubAgentDelegate, SubAgentTool};
pub use engine::OrchestrationEngine;
pub use policy::ToolInvocationPolicy;
