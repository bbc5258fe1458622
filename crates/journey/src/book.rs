//! Shared journey state behind the journey tools.

use tokio::sync::RwLock;
use tracing::info;
use wayfarer_core::error::SearchError;

use crate::params::JourneySearchParams;
use crate::plan::{Journey, Plan};
use crate::planner::JourneyPlanner;

/// Default search parameters plus the journeys of the latest request.
///
/// Both the preferences tools and the planning tools hold the same book, so
/// defaults set through one agent apply to searches made by the other.
pub struct JourneyBook {
    planner: JourneyPlanner,
    defaults: RwLock<JourneySearchParams>,
    journeys: RwLock<Vec<Journey>>,
}

impl JourneyBook {
    pub fn new(planner: JourneyPlanner, defaults: JourneySearchParams) -> Self {
        Self {
            planner,
            defaults: RwLock::new(defaults),
            journeys: RwLock::new(Vec::new()),
        }
    }

    pub async fn defaults(&self) -> JourneySearchParams {
        self.defaults.read().await.clone()
    }

    pub async fn set_defaults(&self, params: JourneySearchParams) {
        *self.defaults.write().await = params;
    }

    /// Plan with defaults overlaid by `overrides`, replacing the stored journeys.
    ///
    /// On failure the previously computed journeys are kept.
    pub async fn compute(
        &self,
        from: &str,
        to: &str,
        overrides: &JourneySearchParams,
    ) -> Result<Vec<Journey>, SearchError> {
        let params = self.defaults().await.overlay(overrides);
        params.validate()?;

        let journeys = self.planner.plan(from, to, &params).await?;
        info!(count = journeys.len(), "Stored computed journeys");
        *self.journeys.write().await = journeys.clone();
        Ok(journeys)
    }

    pub async fn journey(&self, index: usize) -> Option<Journey> {
        self.journeys.read().await.get(index).cloned()
    }

    pub async fn plan(&self, journey_index: usize, plan_index: usize) -> Option<Plan> {
        self.journeys
            .read()
            .await
            .get(journey_index)
            .and_then(|j| j.plans.get(plan_index))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.journeys.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.journeys.read().await.is_empty()
    }
}
