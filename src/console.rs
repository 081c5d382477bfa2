use colored::Colorize;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::cascades::{Confidence, Tier};

/// Verbosity levels for console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only show errors
    Quiet = 0,
    /// Normal output (default)
    #[default]
    Normal = 1,
    /// Verbose output with additional info
    Verbose = 2,
    /// Debug output with detailed information
    Debug = 3,
}

impl fmt::Display for VerbosityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerbosityLevel::Quiet => write!(f, "quiet"),
            VerbosityLevel::Normal => write!(f, "normal"),
            VerbosityLevel::Verbose => write!(f, "verbose"),
            VerbosityLevel::Debug => write!(f, "debug"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Console {
    verbosity: VerbosityLevel,
}

impl Console {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self { verbosity }
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    fn should_show(&self, level: VerbosityLevel) -> bool {
        self.verbosity >= level
    }

    pub fn error(&self, message: &str) {
        if self.verbosity > VerbosityLevel::Quiet {
            eprintln!("❌ {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("⚠️  {}", message);
        }
    }

    pub fn success(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("✅ {}", message);
        }
    }

    pub fn verbose(&self, message: &str) {
        if self.should_show(VerbosityLevel::Verbose) {
            println!("{}", message);
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show(VerbosityLevel::Debug) {
            println!("🐛 DEBUG: {}", message);
        }
    }

    pub fn plain(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("{}", message);
        }
    }

    /// One-line routing decision, e.g. `⏺ local (high) Simple transform: translate`.
    pub fn decision(&self, tier: &str, confidence: Confidence, reason: &str) {
        if !self.should_show(VerbosityLevel::Normal) {
            return;
        }
        println!(
            "{} {} {} {}",
            "⏺".dimmed(),
            tier.green(),
            format!("({})", confidence).dimmed(),
            reason
        );
    }

    pub fn fallback(&self, tier: Tier, failure: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("  {} {} {}", "⎿".dimmed(), tier.to_string().yellow(), failure.dimmed());
        }
    }

    pub fn defer_to_quality(&self) {
        if self.should_show(VerbosityLevel::Normal) {
            println!(
                "{}",
                "↗ Not handled locally, send this prompt to the quality tier".dimmed()
            );
        }
    }

    pub fn health(&self, name: &str, model: &str, available: bool) {
        if !self.should_show(VerbosityLevel::Normal) {
            return;
        }
        let status = if available {
            "available".green()
        } else {
            "unavailable".red()
        };
        println!("{} {} {}", name.cyan(), format!("[{}]", model).dimmed(), status);
    }
}

static GLOBAL_CONSOLE: OnceLock<Arc<Console>> = OnceLock::new();

pub fn init_console(verbosity: VerbosityLevel) {
    let _ = GLOBAL_CONSOLE.set(Arc::new(Console::new(verbosity)));
}

/// The global console, or a `Normal` one when `init_console` was never called.
pub fn console() -> Arc<Console> {
    GLOBAL_CONSOLE
        .get_or_init(|| Arc::new(Console::default()))
        .clone()
}

impl Default for Console {
    fn default() -> Self {
        Self {
            verbosity: VerbosityLevel::Normal,
        }
    }
}
