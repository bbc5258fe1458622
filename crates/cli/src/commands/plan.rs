//! `wayfarer plan`: run the journey planner directly.

use std::sync::Arc;

use wayfarer_config::AppConfig;
use wayfarer_journey::{JourneyBook, JourneyPlanner, JourneySearchParams, TflClient};

pub struct PlanArgs {
    pub from: String,
    pub to: String,
    pub via: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

pub async fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let search = Arc::new(TflClient::from_config(&config.search)?);
    let planner = JourneyPlanner::from_config(search, &config.search);
    let defaults = JourneySearchParams::from_value(config.search.default_params.clone())?;
    let book = JourneyBook::new(planner, defaults);

    let overrides = JourneySearchParams {
        via: args.via,
        date: args.date,
        time: args.time,
        ..Default::default()
    };
    let journeys = book.compute(&args.from, &args.to, &overrides).await?;

    if journeys.is_empty() {
        eprintln!("  No journey found: no unambiguous match for the given locations.");
    }
    println!("{}", serde_json::to_string_pretty(&journeys)?);
    Ok(())
}
