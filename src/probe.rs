// src/probe.rs
use crate::pool::{run_bounded, TaskOutcome};
use crate::resolver::{DnsClient, ResolutionOutcome};
use crate::types::{DnscopeError, Verdict};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use trust_dns_resolver::proto::rr::RecordType;

/// Joins a wordlist label with the target domain.
pub fn candidate_name(label: &str, domain: &str) -> String {
    format!("{}.{}", label, domain)
}

/// Resolves one candidate for A and CNAME records. Either answer is enough
/// for the name to count as present.
pub async fn probe_candidate(client: &dyn DnsClient, name: &str) -> Verdict {
    let mut verdict = Verdict::Absent;

    for record_type in [RecordType::A, RecordType::CNAME] {
        match client.resolve(name, record_type).await {
            ResolutionOutcome::Answers(_) => verdict = Verdict::Present,
            ResolutionOutcome::NotFound => {}
            ResolutionOutcome::Transient(reason) => {
                debug!("{} lookup for {} failed: {}", record_type, name, reason);
            }
        }
    }

    verdict
}

#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    /// Present names, deduplicated and sorted.
    pub subdomains: BTreeSet<String>,
    pub probed: usize,
    pub failed: usize,
}

impl ProbeReport {
    pub fn sorted(&self) -> Vec<String> {
        self.subdomains.iter().cloned().collect()
    }
}

pub struct Prober {
    client: Arc<dyn DnsClient>,
    workers: usize,
}

impl Prober {
    pub fn new(client: Arc<dyn DnsClient>, workers: usize) -> Self {
        Self { client, workers }
    }

    pub async fn probe(
        &self,
        domain: &str,
        wordlist: &[String],
        progress: &ProgressBar,
        cancel: &CancellationToken,
    ) -> Result<ProbeReport, DnscopeError> {
        info!(
            "Probing {} candidates for {} with {} workers",
            wordlist.len(),
            domain,
            self.workers
        );

        let candidates: Vec<String> = wordlist
            .iter()
            .map(|label| candidate_name(label, domain))
            .collect();

        let outcomes = run_bounded(candidates, self.workers, progress, cancel, |name| {
            let client = self.client.clone();
            async move {
                let verdict = probe_candidate(client.as_ref(), &name).await;
                (name, verdict)
            }
        })
        .await?;

        let mut report = ProbeReport {
            probed: outcomes.len(),
            ..ProbeReport::default()
        };

        for outcome in outcomes {
            match outcome {
                TaskOutcome::Completed((name, Verdict::Present)) => {
                    report.subdomains.insert(name);
                }
                TaskOutcome::Completed((_, Verdict::Absent)) => {}
                TaskOutcome::Failed { item, reason } => {
                    warn!("Probe for {} did not complete: {}", item, reason);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Probing finished: {}/{} present, {} failed tasks",
            report.subdomains.len(),
            report.probed,
            report.failed
        );

        Ok(report)
    }
}
