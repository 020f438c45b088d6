// src/utils.rs
use crate::types::{DnscopeError, OutputConfig};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Reads the wordlist: one label per line, whitespace trimmed, blank lines skipped.
pub fn read_wordlist(path: &Path) -> Result<Vec<String>, DnscopeError> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DnscopeError::MissingInput {
            path: path.to_path_buf(),
        },
        _ => DnscopeError::Io(e),
    })?;

    Ok(parse_wordlist(&contents))
}

pub fn parse_wordlist(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trims, lowercases and drops a trailing dot.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_lowercase()
}

/// Check if a string is a valid domain
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    for part in parts {
        if part.is_empty() || part.len() > 63 {
            return false;
        }

        if !part.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return false;
        }

        if part.starts_with('-') || part.ends_with('-') {
            return false;
        }
    }

    true
}

/// Prints `message` and reads one line. `None` on end of input.
pub fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> io::Result<Option<String>> {
    write!(output, "{}", message)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Asks until the answer is `y` or `n`. End of input counts as no.
pub fn ask_yes_no<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    loop {
        match prompt_line(input, output, &format!("{} [y]es/[n]o: ", question))? {
            None => return Ok(false),
            Some(answer) => match answer.as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => writeln!(output, "Invalid input.")?,
            },
        }
    }
}

/// Log level for the binary: Info when verbose, Warn otherwise.
pub fn log_level(output: &OutputConfig) -> LevelFilter {
    if output.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

pub fn progress_bar(total: usize, unit: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {} ({{percent}}%)",
            unit
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    bar.set_style(style);
    bar
}
