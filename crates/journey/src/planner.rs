//! Journey planner: search, disambiguate, re-query, assemble.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, warn};
use wayfarer_core::error::SearchError;

use crate::client::{JourneySearch, SearchResponse};
use crate::disambiguation::{AmbiguityResolver, Requery};
use crate::params::JourneySearchParams;
use crate::plan::Journey;

const STATUS_RESOLVED: u16 = 200;
const STATUS_AMBIGUOUS: u16 = 300;

/// Plans journeys between two locations.
///
/// Ambiguous searches are resolved level by level: every surviving
/// combination of one level is re-queried concurrently, and answers that are
/// ambiguous again form the next level, up to `max_passes` levels.
pub struct JourneyPlanner {
    search: Arc<dyn JourneySearch>,
    resolver: AmbiguityResolver,
    max_passes: u32,
}

impl JourneyPlanner {
    pub fn new(search: Arc<dyn JourneySearch>, resolver: AmbiguityResolver, max_passes: u32) -> Self {
        Self {
            search,
            resolver,
            max_passes,
        }
    }

    pub fn from_config(search: Arc<dyn JourneySearch>, config: &wayfarer_config::SearchConfig) -> Self {
        Self::new(
            search,
            AmbiguityResolver::new(config.match_threshold),
            config.max_disambiguation_passes,
        )
    }

    /// Every journey found, one per resolved search, in branch order.
    ///
    /// An empty result means the ambiguity left no viable combination.
    pub async fn plan(
        &self,
        from: &str,
        to: &str,
        params: &JourneySearchParams,
    ) -> Result<Vec<Journey>, SearchError> {
        info!(%from, %to, via = ?params.via, "Planning journey");

        let mut level = vec![Requery {
            from: from.to_string(),
            to: to.to_string(),
            via: params.via.clone(),
        }];
        let mut passes = 0u32;
        let mut journeys = Vec::new();

        while !level.is_empty() {
            let responses = try_join_all(level.iter().map(|query| self.search_one(query, params))).await?;

            let mut next = Vec::new();
            for (query, response) in level.iter().zip(responses) {
                match response.status {
                    STATUS_RESOLVED => journeys.push(Journey::from_payload(query, &response.payload)?),
                    STATUS_AMBIGUOUS if passes < self.max_passes => {
                        let requeries = self.resolver.resolve(&response.payload)?.requeries(query);
                        if requeries.is_empty() {
                            warn!(from = %query.from, to = %query.to, "No viable location combination");
                        }
                        next.extend(requeries);
                    }
                    STATUS_AMBIGUOUS => {
                        return Err(SearchError::DisambiguationExhausted {
                            from: query.from.clone(),
                            to: query.to.clone(),
                            passes: self.max_passes,
                        });
                    }
                    status => {
                        return Err(SearchError::UnexpectedStatus {
                            status,
                            from: query.from.clone(),
                            to: query.to.clone(),
                        });
                    }
                }
            }

            if !next.is_empty() {
                passes += 1;
                debug!(pass = passes, branches = next.len(), "Re-querying disambiguated locations");
            }
            level = next;
        }

        info!(journeys = journeys.len(), "Journey planning complete");
        Ok(journeys)
    }

    async fn search_one(
        &self,
        query: &Requery,
        params: &JourneySearchParams,
    ) -> Result<SearchResponse, SearchError> {
        let params = JourneySearchParams {
            via: query.via.clone(),
            ..params.clone()
        };
        self.search.search(&query.from, &query.to, &params).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;

    /// Replays canned responses in order and records every query it receives.
    pub struct ScriptedSearch {
        responses: Mutex<VecDeque<SearchResponse>>,
        pub calls: Mutex<Vec<Requery>>,
    }

    impl ScriptedSearch {
        pub fn new(responses: Vec<(u16, Value)>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(status, payload)| SearchResponse { status, payload })
                        .collect(),
                ),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl JourneySearch for ScriptedSearch {
        async fn search(
            &self,
            from: &str,
            to: &str,
            params: &JourneySearchParams,
        ) -> Result<SearchResponse, SearchError> {
            self.calls.lock().unwrap().push(Requery {
                from: from.into(),
                to: to.into(),
                via: params.via.clone(),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| SearchError::Transport("no scripted response left".into()))
        }
    }

    pub fn resolved(leg_from: &str, leg_to: &str) -> (u16, Value) {
        (
            200,
            json!({
                "journeys": [{
                    "startDateTime": "2024-11-05T09:00:00",
                    "arrivalDateTime": "2024-11-05T09:25:00",
                    "duration": 25,
                    "legs": [{
                        "mode": {"name": "tube"},
                        "departurePoint": {"commonName": leg_from},
                        "arrivalPoint": {"commonName": leg_to},
                        "instruction": {"summary": format!("{leg_from} to {leg_to}"), "steps": []}
                    }]
                }]
            }),
        )
    }

    pub fn ambiguous_to(codes: &[&str]) -> (u16, Value) {
        let options: Vec<Value> = codes
            .iter()
            .map(|code| json!({"matchQuality": 995, "place": {"icsCode": code}}))
            .collect();
        (
            300,
            json!({
                "fromLocationDisambiguation": {"matchStatus": "identified"},
                "toLocationDisambiguation": {"matchStatus": "list", "disambiguationOptions": options}
            }),
        )
    }
}
