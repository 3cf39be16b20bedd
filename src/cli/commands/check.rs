//! Validate configuration and service connectivity.

use std::sync::Arc;

use console::style;

use textenrich::api::ApiClient;
use textenrich::config::Config;
use textenrich::enrich::Pipeline;

pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    match &config.source_path {
        Some(path) => println!("{} Config: {}", style("→").cyan(), path.display()),
        None => println!(
            "{} No config file found, using defaults",
            style("!").yellow()
        ),
    }

    let client = Arc::new(ApiClient::new(config.api.clone())?);
    println!("  {} Endpoint: {}", style("→").dim(), client.base_url());
    println!(
        "  {} Authentication: {}",
        style("→").dim(),
        if config.api.api_key().is_some() {
            "API key"
        } else {
            "none (self-hosted)"
        }
    );

    if config.stages.is_empty() {
        println!("{} No stages configured", style("!").yellow());
    } else {
        let pipeline = Pipeline::from_config(&config.stages, client.clone())?;
        println!("{} Stages:", style("→").cyan());
        for stage in pipeline.stages() {
            println!(
                "  {} {}: {} → {}",
                style("•").dim(),
                style(stage.stage_type()).bold(),
                stage.input_field(),
                stage.target_field()
            );
        }
    }

    let result = client.ping().await;
    client.close().await;

    match result {
        Ok(()) => {
            println!("{} Service reachable", style("✓").green());
            Ok(())
        }
        Err(e) => {
            println!("{} Service check failed: {}", style("✗").red(), e);
            Err(e.into())
        }
    }
}
