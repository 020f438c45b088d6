// src/types.rs
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeConfig,
    pub reverse: ReverseConfig,
    pub resolver: ResolverConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Concurrent probe tasks.
    pub workers: usize,
    pub wordlist: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            wordlist: PathBuf::from("wordlist.txt"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverseConfig {
    /// `None` falls back to the platform default pool size.
    pub workers: Option<usize>,
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for ReverseConfig {
    fn default() -> Self {
        Self {
            workers: None,
            attempts: 3,
            backoff_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub timeout_secs: u64,
    pub attempts: usize,
    pub nameservers: Vec<String>,
    pub use_system_resolver: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            attempts: 2,
            nameservers: Vec::new(),
            use_system_resolver: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub json: bool,
    pub verbose: bool,
    pub silent: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            json: false,
            verbose: false,
            silent: false,
        }
    }
}

/// Outcome of probing one candidate name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseLookupResult {
    pub subdomain: String,
    pub ip: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordEntry {
    pub record_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpOutcome {
    Found(Vec<DnsRecordEntry>),
    NoRecords,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainReport {
    pub domain: String,
    pub timestamp: String,
    pub subdomains: Vec<String>,
    pub reverse_lookups: Vec<ReverseLookupResult>,
    pub records: Vec<DnsRecordEntry>,
}

#[derive(Debug, Error)]
pub enum DnscopeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Resolution error: {0}")]
    ResolutionError(String),

    #[error("Wordlist not found: {}", .path.display())]
    MissingInput { path: PathBuf },

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("Cancelled by user")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
