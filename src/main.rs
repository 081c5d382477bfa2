use anyhow::Result;
use clap::Parser;
use triage::{
    cli::{Cli, Commands, handle_classify, handle_config, handle_health, handle_route},
    config::AppConfig,
    console::{Console, init_console},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config to get configured verbosity level
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            // The global console is not initialised yet
            Console::default().warning(&format!("Failed to load config, using defaults: {:#}", e));
            AppConfig::default()
        }
    };

    // Initialize console with effective verbosity (CLI takes precedence over config)
    let effective_verbosity = cli.get_effective_verbosity(config.console_verbosity());
    init_console(effective_verbosity);

    match cli.command {
        Commands::Classify {
            prompt,
            legacy,
            json,
        } => handle_classify(&prompt, legacy, json, &config)?,
        Commands::Route {
            prompt,
            legacy,
            json,
        } => handle_route(&prompt, legacy, json, &config).await?,
        Commands::Health => handle_health(&config).await?,
        Commands::Config { action } => handle_config(action)?,
    }

    Ok(())
}
