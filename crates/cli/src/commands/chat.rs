//! `wayfarer chat`: interactive or single-message conversation with the router.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use wayfarer::{build_agent_graph, default_prompt_vars};
use wayfarer_agent::{OrchestrationEngine, ToolInvocationPolicy};
use wayfarer_config::AppConfig;
use wayfarer_core::EventBus;
use wayfarer_journey::TflClient;
use wayfarer_providers::AnthropicProvider;

pub async fn run(message: Option<String>, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for the API key early and give a clear error
    if config.model.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No model API key configured!");
        eprintln!();
        eprintln!("  Set the environment variable {}", config.model.api_key_env);
        eprintln!("  or add model.api_key to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }
    if config.search.app_key.is_none() {
        warn!(
            env = %config.search.app_key_env,
            "No journey search app key; requests will be anonymous and rate limited"
        );
    }

    let provider = Arc::new(AnthropicProvider::from_config(&config.model)?);
    let search = Arc::new(TflClient::from_config(&config.search)?);
    let event_bus = Arc::new(EventBus::default());

    if verbose {
        let mut events = event_bus.subscribe();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                debug!(?event, "Domain event");
            }
        });
    }

    let graph = build_agent_graph(&config, provider, search, &default_prompt_vars(), event_bus)?;
    let mut router = graph.router;

    if let Some(msg) = message {
        let response = respond(&mut router, &msg).await?;
        println!("{response}");
        return Ok(());
    }

    println!();
    println!("  Wayfarer, interactive mode");
    println!();
    println!("  Router model:  {}", config.agents.router.model);
    println!("  Sub-agents:    {}", router.tools().names().join(", "));
    println!();
    println!("  Ask for a journey, or tell me how you like to travel.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        match respond(&mut router, input).await {
            Ok(response) => {
                println!();
                for line in response.lines() {
                    println!("  Wayfarer > {line}");
                }
                println!();
            }
            Err(e) => {
                eprintln!("\n  Error: {e}\n");
            }
        }
    }

    println!("  Goodbye!");
    Ok(())
}

/// One conversational exchange; a failed exchange is removed from memory so
/// the next request does not carry an unanswered tool call.
async fn respond(router: &mut OrchestrationEngine, input: &str) -> wayfarer_core::Result<String> {
    let before = router.memory().len();
    let result = router
        .process(input, None, &ToolInvocationPolicy::default())
        .await;

    if result.is_err() {
        let added = router.memory().len().saturating_sub(before);
        router.discard_last(added)?;
    }
    result
}
