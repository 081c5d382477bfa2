pub mod backends;
pub mod cascades;
pub mod cli;
pub mod config;
pub mod console;
pub mod costs;

pub use backends::{GenerationRequest, GenerationResult, LlmError, TierBackend};
pub use cascades::{
    Decision, RouteResult, RouterConfig, RoutingPolicy, ThreeTierRouteResult, Tier, TierRouter,
    classify, classify_task,
};
pub use config::AppConfig;
pub use console::{Console, VerbosityLevel, console, init_console};
pub use costs::{CostEntry, CostLedger, calculate_cost};
