use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use dnscope::config::{load_config, validate_config};
use dnscope::engine::{Choices, DnscopeEngine, Prompter};
use dnscope::session::Session;
use dnscope::utils::{ask_yes_no, is_valid_domain, log_level, normalize_domain, prompt_line, read_wordlist};
use dnscope::{Args, DnscopeError, TrustDnsClient};
use log::{error, info};
use std::io::{self, StdinLock, Stdout};
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const BANNER: &str = r#"
    ______ _   _  _____
    |  _  \ \ | |/  ___|
    | | | |  \| |\ `--.  ___ ___  _ __   ___
    | | | | . ` | `--. \/ __/ _ \| '_ \ / _ \
    | |/ /| |\  |/\__/ / (_| (_) | |_) |  __/
    |___/ \_| \_/\____/ \___\___/| .__/ \___|
                                 | |
                                 |_|
"#;

/// Reads answers from the terminal on a blocking thread so Ctrl-C can still
/// interrupt a pending prompt.
struct StdinPrompter {
    cancel: CancellationToken,
}

impl StdinPrompter {
    async fn ask<T, F>(&self, read: F) -> Result<T, DnscopeError>
    where
        T: Send + 'static,
        F: FnOnce(&mut StdinLock<'static>, &mut Stdout) -> io::Result<T> + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(move || {
            let mut input = io::stdin().lock();
            let mut output = io::stdout();
            read(&mut input, &mut output)
        });

        tokio::select! {
            _ = self.cancel.cancelled() => Err(DnscopeError::Cancelled),
            joined = task => match joined {
                Ok(answer) => answer.map_err(DnscopeError::Io),
                Err(e) => Err(DnscopeError::Io(io::Error::new(io::ErrorKind::Other, e))),
            },
        }
    }
}

#[async_trait]
impl Prompter for StdinPrompter {
    async fn confirm(&mut self, question: &str) -> Result<bool, DnscopeError> {
        let question = question.to_string();
        self.ask(move |input, output| ask_yes_no(input, output, &question)).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = load_config(args.config_path.as_deref())?;
    args.apply_to(&mut config);
    validate_config(&config)?;

    env_logger::Builder::from_default_env()
        .filter_level(log_level(&config.output))
        .init();

    if !config.output.silent {
        println!("{}", BANNER);
        println!("Subdomain Finder | DNS Record Dumper | Reverse Lookup Tool\n");
    }

    let wordlist = match read_wordlist(&config.probe.wordlist) {
        Ok(words) => words,
        Err(e @ DnscopeError::MissingInput { .. }) => {
            error!("{}", e);
            eprintln!("\n Wordlist not found!\n Please check the path: {}\n", config.probe.wordlist.display());
            process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    info!("Loaded {} wordlist entries", wordlist.len());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut prompter = StdinPrompter { cancel: cancel.clone() };

    let raw_domain = match args.domain.clone() {
        Some(domain) => domain,
        None => match prompter
            .ask(|input, output| prompt_line(input, output, "Enter domain to check: "))
            .await
        {
            Ok(Some(domain)) => domain,
            Ok(None) | Err(DnscopeError::Cancelled) => {
                println!("\n Exiting...");
                process::exit(130);
            }
            Err(e) => return Err(e.into()),
        },
    };

    let domain = normalize_domain(&raw_domain);
    if !is_valid_domain(&domain) {
        return Err(DnscopeError::InvalidDomain(raw_domain).into());
    }

    let session = Session::new(&domain, &config.output)?.with_cancel_token(cancel);
    let client = Arc::new(TrustDnsClient::new(&config.resolver)?);
    let choices = Choices {
        reverse: args.reverse_choice(),
        dump: args.dump_choice(),
    };

    let silent = config.output.silent;
    let engine = DnscopeEngine::new(config, client, session);

    match engine.run(&wordlist, choices, &mut prompter).await {
        Ok(summary) => {
            info!(
                "{} subdomains from {} candidates, {} reverse lookups, {} failed probes in {:.2}s",
                summary.subdomains.len(),
                summary.candidates,
                summary.reverse_lookups.len(),
                summary.failed_probes,
                summary.duration.as_secs_f64()
            );
        }
        Err(DnscopeError::Cancelled) => {
            println!("\nKeyboard interrupt detected. Exiting...");
            process::exit(130);
        }
        Err(e) => return Err(e.into()),
    }

    if !silent {
        let dir = engine.session().output_dir();
        let shown = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        println!("\n Done!! Please check your files in {} !", shown.display());
    }

    Ok(())
}
