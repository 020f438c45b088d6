// src/resolver.rs
use crate::types::{DnscopeError, ResolverConfig};
use async_trait::async_trait;
use log::debug;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use trust_dns_resolver::config::{NameServerConfig, Protocol, ResolverConfig as DnsResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::rr::RecordType;
use trust_dns_resolver::TokioAsyncResolver;

/// Result of a single DNS query. `Answers` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome<T = String> {
    Answers(Vec<T>),
    NotFound,
    Transient(String),
}

impl<T> ResolutionOutcome<T> {
    pub fn from_answers(answers: Vec<T>) -> Self {
        if answers.is_empty() {
            Self::NotFound
        } else {
            Self::Answers(answers)
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Answers(_))
    }
}

/// A DNS resolution backend shared by every concurrent task.
///
/// Implementations must be safe to call from many tasks at once and must not
/// retry on their own; callers own the retry policy.
#[async_trait]
pub trait DnsClient: Send + Sync {
    async fn resolve(&self, name: &str, record_type: RecordType) -> ResolutionOutcome;

    /// Forward address lookup used by the reverse phase.
    async fn lookup_address(&self, name: &str) -> ResolutionOutcome<IpAddr> {
        match self.resolve(name, RecordType::A).await {
            ResolutionOutcome::Answers(values) => {
                let ips = values
                    .iter()
                    .filter_map(|v| IpAddr::from_str(v).ok())
                    .collect::<Vec<_>>();
                if ips.is_empty() {
                    ResolutionOutcome::Transient(format!("unparseable address answer for {}", name))
                } else {
                    ResolutionOutcome::Answers(ips)
                }
            }
            ResolutionOutcome::NotFound => ResolutionOutcome::NotFound,
            ResolutionOutcome::Transient(reason) => ResolutionOutcome::Transient(reason),
        }
    }
}

pub struct TrustDnsClient {
    resolver: TokioAsyncResolver,
}

impl TrustDnsClient {
    pub fn new(config: &ResolverConfig) -> Result<Self, DnscopeError> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let resolver = if config.use_system_resolver && config.nameservers.is_empty() {
            let (resolver_config, mut opts) = trust_dns_resolver::system_conf::read_system_conf()
                .map_err(|e| DnscopeError::ResolutionError(format!("Failed to read system resolver configuration: {}", e)))?;
            opts.timeout = timeout;
            opts.attempts = config.attempts;
            TokioAsyncResolver::tokio(resolver_config, opts)
        } else {
            let mut resolver_config = DnsResolverConfig::new();

            for ns in &config.nameservers {
                let socket_addr = SocketAddr::from_str(ns)
                    .map_err(|e| DnscopeError::ConfigError(format!("Invalid nameserver address {}: {}", ns, e)))?;
                resolver_config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Udp));
            }

            let mut opts = ResolverOpts::default();
            opts.timeout = timeout;
            opts.attempts = config.attempts;

            TokioAsyncResolver::tokio(resolver_config, opts)
        };

        Ok(Self { resolver })
    }

    fn classify<T>(name: &str, record_type: RecordType, error: ResolveError) -> ResolutionOutcome<T> {
        match error.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => ResolutionOutcome::NotFound,
            _ => {
                debug!("{} {} query failed: {}", name, record_type, error);
                ResolutionOutcome::Transient(error.to_string())
            }
        }
    }
}

#[async_trait]
impl DnsClient for TrustDnsClient {
    async fn resolve(&self, name: &str, record_type: RecordType) -> ResolutionOutcome {
        match self.resolver.lookup(name, record_type).await {
            Ok(lookup) => ResolutionOutcome::from_answers(
                lookup
                    .iter()
                    .filter(|rdata| rdata.record_type() == record_type)
                    .map(|rdata| rdata.to_string())
                    .collect(),
            ),
            Err(e) => Self::classify(name, record_type, e),
        }
    }

    async fn lookup_address(&self, name: &str) -> ResolutionOutcome<IpAddr> {
        match self.resolver.lookup_ip(name).await {
            Ok(lookup) => ResolutionOutcome::from_answers(lookup.iter().collect()),
            Err(e) => Self::classify(name, RecordType::A, e),
        }
    }
}
