use crate::console::VerbosityLevel;
use clap::{Parser, Subcommand};

mod config;
mod route;

pub use config::handle_config;
pub use route::{handle_classify, handle_health, handle_route};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Increase verbosity (-v verbose, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode - only show errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose", global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show which tier a prompt would go to, without calling any backend
    Classify {
        prompt: String,
        /// Use the two-tier (local/cloud) classifier
        #[arg(long)]
        legacy: bool,
        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify a prompt and run it on the cheapest tier that answers
    Route {
        prompt: String,
        /// Use the two-tier (local/cloud) router
        #[arg(long)]
        legacy: bool,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Probe the local and cheap backends
    Health,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Set { key: String, value: String },
}

impl Cli {
    pub fn get_verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else {
            match self.verbose {
                0 => VerbosityLevel::Normal,
                1 => VerbosityLevel::Verbose,
                _ => VerbosityLevel::Debug,
            }
        }
    }

    pub fn get_effective_verbosity(&self, config_verbosity: VerbosityLevel) -> VerbosityLevel {
        if self.quiet || self.verbose > 0 {
            // CLI verbosity specified, use it
            self.get_verbosity()
        } else {
            // No CLI verbosity specified, use config
            config_verbosity
        }
    }
}
