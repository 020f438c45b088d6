// src/reverse.rs
use crate::pool::{run_bounded, TaskOutcome};
use crate::resolver::{DnsClient, ResolutionOutcome};
use crate::types::{DnscopeError, ReverseLookupResult};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Resolves `name` to an address, retrying up to `max_attempts` times with a
/// fixed pause between attempts. Exhaustion yields `ip: None`.
pub async fn reverse_lookup(
    client: &dyn DnsClient,
    name: &str,
    max_attempts: u32,
    backoff: Duration,
) -> ReverseLookupResult {
    for attempt in 1..=max_attempts {
        match client.lookup_address(name).await {
            ResolutionOutcome::Answers(ips) => {
                return ReverseLookupResult {
                    subdomain: name.to_string(),
                    ip: ips.into_iter().next(),
                };
            }
            ResolutionOutcome::NotFound => {
                debug!("{}: no address (attempt {}/{})", name, attempt, max_attempts);
            }
            ResolutionOutcome::Transient(reason) => {
                debug!("{}: {} (attempt {}/{})", name, reason, attempt, max_attempts);
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(backoff).await;
        }
    }

    ReverseLookupResult {
        subdomain: name.to_string(),
        ip: None,
    }
}

pub struct ReverseResolver {
    client: Arc<dyn DnsClient>,
    workers: usize,
    max_attempts: u32,
    backoff: Duration,
}

impl ReverseResolver {
    pub fn new(client: Arc<dyn DnsClient>, workers: usize, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            client,
            workers,
            max_attempts,
            backoff,
        }
    }

    /// Looks up every subdomain. Rows come back sorted by subdomain.
    pub async fn resolve_all(
        &self,
        subdomains: &[String],
        progress: &ProgressBar,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReverseLookupResult>, DnscopeError> {
        info!("Resolving {} subdomains with {} workers", subdomains.len(), self.workers);

        let outcomes = run_bounded(subdomains.to_vec(), self.workers, progress, cancel, |name| {
            let client = self.client.clone();
            let (max_attempts, backoff) = (self.max_attempts, self.backoff);
            async move { reverse_lookup(client.as_ref(), &name, max_attempts, backoff).await }
        })
        .await?;

        let mut results: Vec<ReverseLookupResult> = outcomes
            .into_iter()
            .map(|outcome| match outcome {
                TaskOutcome::Completed(result) => result,
                TaskOutcome::Failed { item, reason } => {
                    warn!("Reverse lookup for {} did not complete: {}", item, reason);
                    ReverseLookupResult {
                        subdomain: item,
                        ip: None,
                    }
                }
            })
            .collect();

        results.sort_by(|a, b| a.subdomain.cmp(&b.subdomain));

        let resolved = results.iter().filter(|r| r.ip.is_some()).count();
        info!("Resolved {}/{} subdomains", resolved, results.len());

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use trust_dns_resolver::proto::rr::RecordType;

    /// Fails until `succeed_on`, then answers with an address derived from the attempt.
    struct FlakyClient {
        succeed_on: Option<u32>,
        calls: AtomicU32,
    }

    impl FlakyClient {
        fn new(succeed_on: Option<u32>) -> Self {
            Self {
                succeed_on,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl DnsClient for FlakyClient {
        async fn resolve(&self, _name: &str, _record_type: RecordType) -> ResolutionOutcome {
            let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.succeed_on {
                Some(n) if attempt >= n => {
                    ResolutionOutcome::Answers(vec![format!("10.0.0.{}", attempt)])
                }
                _ => ResolutionOutcome::Transient("timed out".to_string()),
            }
        }
    }

    const BACKOFF: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_exhaustion_uses_every_attempt() {
        let client = FlakyClient::new(None);
        let result = reverse_lookup(&client, "www.example.com", 3, BACKOFF).await;

        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.subdomain, "www.example.com");
        assert_eq!(result.ip, None);
    }

    #[tokio::test]
    async fn test_success_stops_retrying() {
        let client = FlakyClient::new(Some(2));
        let result = reverse_lookup(&client, "www.example.com", 3, BACKOFF).await;

        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.ip, Some("10.0.0.2".parse::<IpAddr>().unwrap()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_final_attempt() {
        let client = FlakyClient::new(None);
        let started = tokio::time::Instant::now();

        reverse_lookup(&client, "www.example.com", 3, Duration::from_secs(1)).await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_resolve_all_sorted_with_not_found_rows() {
        let client = crate::probe::tests::StubClient::default()
            .with("www.example.com", RecordType::A, "93.184.216.34")
            .with("api.example.com", RecordType::A, "93.184.216.35");
        let resolver = ReverseResolver::new(Arc::new(client), 4, 2, BACKOFF);
        let progress = ProgressBar::hidden();
        let cancel = CancellationToken::new();
        let names = vec![
            "www.example.com".to_string(),
            "mail.example.com".to_string(),
            "api.example.com".to_string(),
        ];

        let results = resolver.resolve_all(&names, &progress, &cancel).await.unwrap();

        let order: Vec<&str> = results.iter().map(|r| r.subdomain.as_str()).collect();
        assert_eq!(order, vec!["api.example.com", "mail.example.com", "www.example.com"]);
        assert!(results[0].ip.is_some());
        assert_eq!(results[1].ip, None);
        assert_eq!(progress.position(), 3);
    }
}
