//! Journeys and plans assembled from resolved search payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wayfarer_core::error::SearchError;

use crate::disambiguation::Requery;

/// The plans found for one concrete from/to(/via) search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub starting_point: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    pub plans: Vec<Plan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub start_date_time: String,
    pub end_date_time: String,
    /// Minutes
    pub duration: u32,
    pub legs: Vec<Leg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub mode: String,
    pub departure_point: String,
    pub arrival_point: String,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub summary: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub description: String,
    pub description_heading: String,
}

impl Plan {
    /// What each field of a serialized plan means, keyed by field name.
    pub fn field_descriptions() -> Value {
        serde_json::json!({
            "start_date_time": "When the first leg departs (ISO 8601, local time)",
            "end_date_time": "When the last leg arrives (ISO 8601, local time)",
            "duration": "Total travel time in minutes",
            "legs": {
                "description": "Consecutive parts of the plan, each on a single mode",
                "fields": {
                    "mode": "Mode of transport, e.g. tube, bus, walking",
                    "departure_point": "Name of the stop or place the leg starts from",
                    "arrival_point": "Name of the stop or place the leg ends at",
                    "departure_time": "When the leg departs, if known",
                    "arrival_time": "When the leg arrives, if known",
                    "summary": "One-line summary of the leg",
                    "steps": {
                        "description": "Turn-by-turn instructions for the leg",
                        "fields": {
                            "description": "The instruction itself",
                            "description_heading": "Short heading for the instruction"
                        }
                    }
                }
            }
        })
    }
}

impl Journey {
    /// Assemble from a status-200 payload.
    ///
    /// Place names come from the first leg when the payload provides them,
    /// otherwise from the query itself.
    pub fn from_payload(query: &Requery, payload: &Value) -> Result<Self, SearchError> {
        let raw = payload
            .get("journeys")
            .cloned()
            .ok_or_else(|| SearchError::MalformedPayload("resolved payload has no journeys".into()))?;
        let wire: Vec<WireJourney> = serde_json::from_value(raw)
            .map_err(|e| SearchError::MalformedPayload(format!("journeys: {e}")))?;

        let plans: Vec<Plan> = wire.into_iter().map(Plan::from).collect();

        let first_leg = plans.first().and_then(|p| p.legs.first());
        let last_leg = plans.first().and_then(|p| p.legs.last());
        let named = |name: Option<&String>, fallback: &str| match name {
            Some(n) if !n.is_empty() => n.clone(),
            _ => fallback.to_string(),
        };

        Ok(Self {
            starting_point: named(first_leg.map(|l| &l.departure_point), &query.from),
            destination: named(last_leg.map(|l| &l.arrival_point), &query.to),
            via: query.via.clone(),
            plans,
        })
    }

    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }
}

// --- Search API wire shapes ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireJourney {
    start_date_time: String,
    arrival_date_time: Option<String>,
    end_date_time: Option<String>,
    duration: u32,
    #[serde(default)]
    legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLeg {
    #[serde(default)]
    departure_time: Option<String>,
    #[serde(default)]
    arrival_time: Option<String>,
    #[serde(default)]
    mode: WireNamed,
    #[serde(default)]
    departure_point: WirePoint,
    #[serde(default)]
    arrival_point: WirePoint,
    #[serde(default)]
    instruction: WireInstruction,
}

#[derive(Debug, Default, Deserialize)]
struct WireNamed {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePoint {
    #[serde(default)]
    common_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInstruction {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStep {
    #[serde(default)]
    description: String,
    #[serde(default)]
    description_heading: String,
}

impl From<WireJourney> for Plan {
    fn from(wire: WireJourney) -> Self {
        // the live API reports the end as arrivalDateTime
        let end_date_time = wire
            .end_date_time
            .or(wire.arrival_date_time)
            .unwrap_or_default();

        Self {
            start_date_time: wire.start_date_time,
            end_date_time,
            duration: wire.duration,
            legs: wire.legs.into_iter().map(Leg::from).collect(),
        }
    }
}

impl From<WireLeg> for Leg {
    fn from(wire: WireLeg) -> Self {
        Self {
            mode: wire.mode.name,
            departure_point: wire.departure_point.common_name,
            arrival_point: wire.arrival_point.common_name,
            departure_time: wire.departure_time,
            arrival_time: wire.arrival_time,
            summary: wire.instruction.summary,
            steps: wire
                .instruction
                .steps
                .into_iter()
                .map(|s| Step {
                    description: s.description,
                    description_heading: s.description_heading,
                })
                .collect(),
        }
    }
}
