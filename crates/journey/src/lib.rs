//! # Wayfarer Journey
//!
//! Journey search for the Wayfarer agents: search parameters, the search
//! transport, recursive location disambiguation, plan assembly, and the
//! tools that expose all of it to the model.

pub mod book;
pub mod client;
pub mod disambiguation;
pub mod params;
pub mod plan;
pub mod planner;
pub mod tools;

pub use book::JourneyBook;
pub use client::{JourneySearch, SearchResponse, TflClient};
pub use disambiguation::{AmbiguityResolver, LocationId, MatchStatus, Requery, ResolutionSet, Slot, SlotResolution};
pub use params::JourneySearchParams;
pub use plan::{Journey, Leg, Plan, Step};
pub use planner::JourneyPlanner;
pub use tools::journey_tools;
