use crate::output::OutputManager;
use crate::pool::default_workers;
use crate::probe::{ProbeReport, Prober};
use crate::records;
use crate::resolver::DnsClient;
use crate::reverse::ReverseResolver;
use crate::session::Session;
use crate::types::{Config, DnsRecordEntry, DnscopeError, DomainReport, DumpOutcome, ReverseLookupResult};
use crate::utils::progress_bar;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const REVERSE_QUESTION: &str = "Perform a reverse lookup on the found subdomains?";
pub const DUMP_QUESTION: &str = "Check and retrieve all the DNS records?";

/// Source of yes/no answers for the optional phases.
#[async_trait]
pub trait Prompter: Send {
    async fn confirm(&mut self, question: &str) -> Result<bool, DnscopeError>;
}

/// Answers given up front on the command line. `None` means ask.
#[derive(Debug, Clone, Copy, Default)]
pub struct Choices {
    pub reverse: Option<bool>,
    pub dump: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub subdomains: Vec<String>,
    pub reverse_lookups: Vec<ReverseLookupResult>,
    pub records: Option<DumpOutcome>,
    pub candidates: usize,
    pub failed_probes: usize,
    pub duration: Duration,
}

pub struct DnscopeEngine {
    config: Config,
    client: Arc<dyn DnsClient>,
    session: Session,
    output_manager: OutputManager,
    show_progress: bool,
}

impl DnscopeEngine {
    pub fn new(config: Config, client: Arc<dyn DnsClient>, session: Session) -> Self {
        let show_progress = !config.output.silent && atty::is(atty::Stream::Stderr);
        let output_manager = OutputManager::new(config.output.clone());

        Self {
            config,
            client,
            session,
            output_manager,
            show_progress,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(
        &self,
        wordlist: &[String],
        choices: Choices,
        prompter: &mut dyn Prompter,
    ) -> Result<RunSummary, DnscopeError> {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        let report = self.find_subdomains(wordlist).await?;
        summary.candidates = report.probed;
        summary.failed_probes = report.failed;
        summary.subdomains = report.sorted();

        if summary.subdomains.is_empty() {
            self.output_manager.announce("No subdomains found!");
        } else {
            self.output_manager
                .write_subdomains(&self.session.subdomains_path(), &summary.subdomains)?;

            if Self::decide(choices.reverse, REVERSE_QUESTION, prompter).await? {
                summary.reverse_lookups = self.reverse_lookup(&summary.subdomains).await?;
            }
        }

        if Self::decide(choices.dump, DUMP_QUESTION, prompter).await? {
            summary.records = Some(self.dump_records().await?);
        }

        if self.session.cancel_token().is_cancelled() {
            return Err(DnscopeError::Cancelled);
        }

        if self.output_manager.json_enabled() {
            let records: Vec<DnsRecordEntry> = match &summary.records {
                Some(DumpOutcome::Found(entries)) => entries.clone(),
                _ => Vec::new(),
            };
            let report = DomainReport {
                domain: self.session.domain.clone(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                subdomains: summary.subdomains.clone(),
                reverse_lookups: summary.reverse_lookups.clone(),
                records,
            };
            self.output_manager
                .write_report(&self.session.report_path(), &report)?;
        }

        summary.duration = start_time.elapsed();
        info!(
            "Run for {} finished in {:.2}s: {} subdomains",
            self.session.domain,
            summary.duration.as_secs_f64(),
            summary.subdomains.len()
        );

        Ok(summary)
    }

    pub async fn find_subdomains(&self, wordlist: &[String]) -> Result<ProbeReport, DnscopeError> {
        let progress = progress_bar(wordlist.len(), "domains", self.show_progress);
        let prober = Prober::new(self.client.clone(), self.config.probe.workers);

        let result = prober
            .probe(&self.session.domain, wordlist, &progress, self.session.cancel_token())
            .await;
        progress.finish_and_clear();
        result
    }

    pub async fn reverse_lookup(&self, subdomains: &[String]) -> Result<Vec<ReverseLookupResult>, DnscopeError> {
        let workers = self.config.reverse.workers.unwrap_or_else(default_workers);
        let resolver = ReverseResolver::new(
            self.client.clone(),
            workers,
            self.config.reverse.attempts,
            Duration::from_millis(self.config.reverse.backoff_ms),
        );
        let progress = progress_bar(subdomains.len(), "lookups", self.show_progress);

        let result = resolver
            .resolve_all(subdomains, &progress, self.session.cancel_token())
            .await;
        progress.finish_and_clear();

        let results = result?;
        self.output_manager
            .write_reverse_lookups(&self.session.reverse_lookup_path(), &results)?;
        Ok(results)
    }

    pub async fn dump_records(&self) -> Result<DumpOutcome, DnscopeError> {
        let outcome = tokio::select! {
            biased;

            _ = self.session.cancel_token().cancelled() => return Err(DnscopeError::Cancelled),
            outcome = records::dump_records(self.client.as_ref(), &self.session.domain) => outcome,
        };

        match &outcome {
            DumpOutcome::Found(entries) => self
                .output_manager
                .write_records(&self.session.dns_records_path(), entries)?,
            DumpOutcome::NoRecords => self
                .output_manager
                .announce("No DNS records found for the domain."),
        }

        Ok(outcome)
    }

    async fn decide(
        choice: Option<bool>,
        question: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<bool, DnscopeError> {
        match choice {
            Some(answer) => Ok(answer),
            None => prompter.confirm(question).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::tests::StubClient;
    use crate::types::OutputConfig;
    use trust_dns_resolver::proto::rr::RecordType;

    /// Replays canned answers and records the questions asked.
    struct ScriptedPrompter {
        answers: Vec<bool>,
        asked: Vec<String>,
    }

    #[async_trait]
    impl Prompter for ScriptedPrompter {
        async fn confirm(&mut self, question: &str) -> Result<bool, DnscopeError> {
            self.asked.push(question.to_string());
            Ok(if self.answers.is_empty() { false } else { self.answers.remove(0) })
        }
    }

    fn engine(dir: &std::path::Path, client: StubClient) -> DnscopeEngine {
        let mut config = Config::default();
        config.output = OutputConfig {
            directory: dir.to_path_buf(),
            silent: true,
            ..OutputConfig::default()
        };
        config.reverse.backoff_ms = 1;
        let session = Session::new("example.com", &config.output).unwrap();
        DnscopeEngine::new(config, Arc::new(client), session)
    }

    fn labels(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_full_run_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let client = StubClient::default()
            .with("www.example.com", RecordType::A, "93.184.216.34")
            .with("mail.example.com", RecordType::CNAME, "mx.provider.net.")
            .with("example.com", RecordType::A, "93.184.216.34")
            .with("example.com", RecordType::TXT, "v=spf1 -all");
        let engine = engine(dir.path(), client);
        let mut prompter = ScriptedPrompter {
            answers: vec![true, true],
            asked: Vec::new(),
        };

        let summary = engine
            .run(&labels(&["www", "mail", "bogus"]), Choices::default(), &mut prompter)
            .await
            .unwrap();

        assert_eq!(summary.subdomains, vec!["mail.example.com", "www.example.com"]);
        assert_eq!(prompter.asked, vec![REVERSE_QUESTION, DUMP_QUESTION]);

        let session = engine.session();
        assert_eq!(
            std::fs::read_to_string(session.subdomains_path()).unwrap(),
            "mail.example.com\nwww.example.com\n"
        );
        let reverse = std::fs::read_to_string(session.reverse_lookup_path()).unwrap();
        assert!(reverse.contains("93.184.216.34"));
        assert!(reverse.contains("not found"));
        let records = std::fs::read_to_string(session.dns_records_path()).unwrap();
        assert!(records.contains("v=spf1 -all"));
        assert!(matches!(summary.records, Some(DumpOutcome::Found(ref e)) if e.len() == 2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_nothing_found_skips_reverse_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path(), StubClient::default());
        let mut prompter = ScriptedPrompter {
            answers: vec![true],
            asked: Vec::new(),
        };

        let summary = engine
            .run(&labels(&["www", "mail"]), Choices::default(), &mut prompter)
            .await
            .unwrap();

        assert!(summary.subdomains.is_empty());
        assert_eq!(prompter.asked, vec![DUMP_QUESTION]);
        assert_eq!(summary.records, Some(DumpOutcome::NoRecords));
        assert!(!engine.session().subdomains_path().exists());
        assert!(!engine.session().dns_records_path().exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_preset_choices_do_not_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let client = StubClient::default().with("www.example.com", RecordType::A, "10.0.0.1");
        let engine = engine(dir.path(), client);
        let mut prompter = ScriptedPrompter {
            answers: Vec::new(),
            asked: Vec::new(),
        };
        let choices = Choices {
            reverse: Some(false),
            dump: Some(false),
        };

        let summary = engine
            .run(&labels(&["www"]), choices, &mut prompter)
            .await
            .unwrap();

        assert!(prompter.asked.is_empty());
        assert!(summary.reverse_lookups.is_empty());
        assert!(summary.records.is_none());
        assert!(!engine.session().reverse_lookup_path().exists());
    }

    #[tokio::test]
    async fn test_cancelled_run_stops_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let client = StubClient::default().with("www.example.com", RecordType::A, "10.0.0.1");
        let engine = engine(dir.path(), client);
        engine.session().cancel_token().cancel();
        let mut prompter = ScriptedPrompter {
            answers: vec![true, true],
            asked: Vec::new(),
        };

        let result = engine.run(&labels(&["www"]), Choices::default(), &mut prompter).await;

        assert!(matches!(result, Err(DnscopeError::Cancelled)));
        assert!(prompter.asked.is_empty());
        assert!(!engine.session().subdomains_path().exists());
    }

    #[tokio::test]
    async fn test_cancelled_dump_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let client = StubClient::default().with("example.com", RecordType::A, "93.184.216.34");
        let engine = engine(dir.path(), client);
        engine.session().cancel_token().cancel();

        let result = engine.dump_records().await;

        assert!(matches!(result, Err(DnscopeError::Cancelled)));
        assert!(!engine.session().dns_records_path().exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_summary_counts_every_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let client = StubClient::default().with("www.example.com", RecordType::A, "93.184.216.34");
        let engine = engine(dir.path(), client);
        let mut prompter = ScriptedPrompter {
            answers: Vec::new(),
            asked: Vec::new(),
        };
        let choices = Choices {
            reverse: Some(false),
            dump: Some(false),
        };

        let summary = engine
            .run(&labels(&["www", "api", "dev", "www"]), choices, &mut prompter)
            .await
            .unwrap();

        assert_eq!(summary.candidates, 4);
        assert_eq!(summary.subdomains, vec!["www.example.com"]);
    }
}
