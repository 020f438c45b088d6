// src/lib.rs
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pool;
pub mod probe;
pub mod records;
pub mod resolver;
pub mod reverse;
pub mod session;
pub mod types;
pub mod utils;

pub use cli::Args;
pub use engine::{Choices, DnscopeEngine, Prompter, RunSummary};
pub use resolver::{DnsClient, ResolutionOutcome, TrustDnsClient};
pub use types::{Config, DnscopeError, DnsRecordEntry, DumpOutcome, ReverseLookupResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
