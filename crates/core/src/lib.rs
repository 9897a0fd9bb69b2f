pub mod config;
pub mod cost;
pub mod engine;
pub mod metrics;
pub mod offload;
pub mod selection;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, DatabaseConfig, OffloadConfig, ServerConfig,
};
pub use cost::{system_cost, ticket_cost, CostBreakdown, StakeAmounts};
pub use engine::{
    audit_cover, CancellationToken, CoverageReport, Element, Engine, EngineConfig, EngineError,
    Plan, ProgressCallback, Solution, SolveRequest, SolveStats, Ticket,
};
pub use offload::{
    DispatchError, DispatchOutcome, HttpRemoteSolver, OffloadError, RemoteSolveResponse,
    RemoteSolver, SolveDispatcher, SolveLocation,
};
pub use selection::{SavedSelection, SelectionStore, SqliteSelectionStore, StoreError, STATE_KEY};
