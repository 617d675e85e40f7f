//! Checks Substrate system parachains' `CollatorSelection` sets for tracked
//! operators and reports missing placements and chain failures.

pub mod aggregator;
pub mod alert;
pub mod chain;
pub mod checks;
pub mod cli;
pub mod config;
pub mod console;
pub mod registry;
pub mod report;
mod utils;

pub use aggregator::{Aggregator, ErrorRecord, FoundRecord, MissingRecord, RunReport};
pub use alert::{AlertDispatcher, AlertOutcome, WebhookMessage};
pub use chain::{ChainError, CollatorSnapshot, CollatorSource, SubstrateRpcClient};
pub use cli::Cli;
pub use config::{ChainDescriptor, ChainNetwork, ChainsConfig, ConfigError};
pub use registry::{AddressRegistry, RegistryError};
pub use utils::logging::setup_logging;
