use crate::types::Config;
use clap::Parser;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dnscope",
    version,
    long_version = LONG_VERSION,
    about = "Subdomain finder, reverse lookup and DNS record dumper",
    long_about = "dnscope brute-forces subdomains of a target from a wordlist, optionally resolves\nthe discovered hosts to IP addresses and dumps the DNS records of the root domain."
)]
pub struct Args {
    /// Target domain (prompted for when omitted)
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Wordlist with one label per line
    #[arg(short = 'w', long = "wordlist", value_name = "FILE")]
    pub wordlist: Option<PathBuf>,

    /// Directory for result files
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Concurrent subdomain probes
    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,

    /// Concurrent reverse lookups (platform default when unset)
    #[arg(long = "reverse-workers")]
    pub reverse_workers: Option<usize>,

    /// Address lookup attempts per subdomain
    #[arg(long = "attempts")]
    pub attempts: Option<u32>,

    /// Pause between address lookup attempts, in milliseconds
    #[arg(long = "backoff-ms")]
    pub backoff_ms: Option<u64>,

    /// Nameserver to query instead of the system configuration (repeatable)
    #[arg(short = 'r', long = "nameserver", value_name = "IP:PORT")]
    pub nameservers: Vec<String>,

    /// Per-query timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Run the reverse lookup without asking
    #[arg(long = "reverse", conflicts_with = "no_reverse")]
    pub reverse: bool,

    /// Skip the reverse lookup without asking
    #[arg(long = "no-reverse")]
    pub no_reverse: bool,

    /// Dump DNS records without asking
    #[arg(long = "dump", conflicts_with = "no_dump")]
    pub dump: bool,

    /// Skip the DNS record dump without asking
    #[arg(long = "no-dump")]
    pub no_dump: bool,

    /// Also write a JSON report
    #[arg(long = "json")]
    pub json: bool,

    /// Silent mode (no banner, no progress bars)
    #[arg(long = "silent")]
    pub silent: bool,

    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<PathBuf>,
}

impl Args {
    /// Pre-answered reverse lookup prompt, if any.
    pub fn reverse_choice(&self) -> Option<bool> {
        choice(self.reverse, self.no_reverse)
    }

    pub fn dump_choice(&self) -> Option<bool> {
        choice(self.dump, self.no_dump)
    }

    /// Command line flags win over file and environment settings.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(wordlist) = &self.wordlist {
            config.probe.wordlist = wordlist.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(threads) = self.threads {
            config.probe.workers = threads;
        }
        if let Some(workers) = self.reverse_workers {
            config.reverse.workers = Some(workers);
        }
        if let Some(attempts) = self.attempts {
            config.reverse.attempts = attempts;
        }
        if let Some(backoff) = self.backoff_ms {
            config.reverse.backoff_ms = backoff;
        }
        if !self.nameservers.is_empty() {
            config.resolver.nameservers = self.nameservers.clone();
        }
        if let Some(timeout) = self.timeout {
            config.resolver.timeout_secs = timeout;
        }
        if self.json {
            config.output.json = true;
        }
        if self.verbose {
            config.output.verbose = true;
        }
        if self.silent {
            config.output.silent = true;
        }
    }
}

fn choice(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
