// src/session.rs
use crate::error::ErrorContext;
use crate::types::{DnscopeError, OutputConfig};
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Per-run state: the target, the timestamp that prefixes every artifact,
/// where artifacts go, and the token that aborts the run.
#[derive(Clone)]
pub struct Session {
    pub domain: String,
    pub stamp: String,
    output_dir: PathBuf,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(domain: &str, output: &OutputConfig) -> Result<Self, DnscopeError> {
        std::fs::create_dir_all(&output.directory)
            .with_context(|| format!("Failed to create output directory {}", output.directory.display()))?;

        Ok(Self {
            domain: domain.to_string(),
            stamp: Local::now().format("%Y-%m-%d_%H-%M-%S").to_string(),
            output_dir: output.directory.clone(),
            cancel: CancellationToken::new(),
        })
    }

    /// Ties this run to an externally owned token, e.g. one cancelled on Ctrl-C.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// `{stamp}_{kind}_{domain}.{ext}` inside the output directory.
    pub fn artifact_path(&self, kind: &str, ext: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}_{}.{}", self.stamp, kind, self.domain, ext))
    }

    pub fn subdomains_path(&self) -> PathBuf {
        self.artifact_path("subdomains", "txt")
    }

    pub fn reverse_lookup_path(&self) -> PathBuf {
        self.artifact_path("reverselookup", "txt")
    }

    pub fn dns_records_path(&self) -> PathBuf {
        self.artifact_path("dns_records", "txt")
    }

    pub fn report_path(&self) -> PathBuf {
        self.artifact_path("report", "json")
    }
}
