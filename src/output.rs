// src/output.rs
use crate::error::ErrorContext;
use crate::types::{DnsRecordEntry, DnscopeError, DomainReport, OutputConfig, ReverseLookupResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

const NOT_FOUND: &str = "not found";

#[derive(Tabled)]
struct ReverseRow {
    #[tabled(rename = "Subdomain")]
    subdomain: String,
    #[tabled(rename = "IP Address")]
    ip: String,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Type")]
    record_type: String,
    #[tabled(rename = "Record")]
    value: String,
}

/// Two-column table of reverse lookups, sorted by subdomain.
pub fn render_reverse_table(results: &[ReverseLookupResult]) -> String {
    let mut rows: Vec<ReverseRow> = results
        .iter()
        .map(|r| ReverseRow {
            subdomain: r.subdomain.clone(),
            ip: r
                .ip
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| NOT_FOUND.to_string()),
        })
        .collect();
    rows.sort_by(|a, b| a.subdomain.cmp(&b.subdomain));

    Table::new(rows)
        .with(Style::markdown())
        .with(Alignment::center())
        .to_string()
}

/// Two-column table of DNS records grouped by type, record column left-aligned.
pub fn render_records_table(entries: &[DnsRecordEntry]) -> String {
    let mut rows: Vec<RecordRow> = entries
        .iter()
        .map(|e| RecordRow {
            record_type: e.record_type.clone(),
            value: e.value.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.record_type.cmp(&b.record_type));

    let mut table = Table::new(rows);
    table
        .with(Style::markdown())
        .with(Alignment::center())
        .modify(Columns::new(1..), Alignment::left());
    table.to_string()
}

pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn json_enabled(&self) -> bool {
        self.config.json
    }

    /// One name per line, sorted, each line newline-terminated.
    pub fn write_subdomains(&self, path: &Path, subdomains: &[String]) -> Result<(), DnscopeError> {
        let mut sorted = subdomains.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut file = Self::create(path)?;
        for subdomain in &sorted {
            writeln!(file, "{}", subdomain).map_err(|e| DnscopeError::OutputError(e.to_string()))?;
        }

        self.announce(&format!(
            "{} unique subdomains found and saved to {}!",
            sorted.len(),
            path.display()
        ));
        Ok(())
    }

    pub fn write_reverse_lookups(&self, path: &Path, results: &[ReverseLookupResult]) -> Result<(), DnscopeError> {
        let mut file = Self::create(path)?;
        write!(file, "{}", render_reverse_table(results))
            .with_context(|| format!("Failed to write {}", path.display()))?;

        self.announce(&format!("Reverse lookup results saved to {}.", path.display()));
        Ok(())
    }

    pub fn write_records(&self, path: &Path, entries: &[DnsRecordEntry]) -> Result<(), DnscopeError> {
        let mut file = Self::create(path)?;
        write!(file, "{}", render_records_table(entries))
            .with_context(|| format!("Failed to write {}", path.display()))?;

        self.announce(&format!("DNS records saved to {} file.", path.display()));
        Ok(())
    }

    pub fn write_report(&self, path: &Path, report: &DomainReport) -> Result<(), DnscopeError> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| DnscopeError::OutputError(format!("Failed to serialize JSON: {}", e)))?;

        let mut file = Self::create(path)?;
        writeln!(file, "{}", json).map_err(|e| DnscopeError::OutputError(e.to_string()))?;

        self.announce(&format!("JSON report saved to {}.", path.display()));
        Ok(())
    }

    pub fn announce(&self, message: &str) {
        if !self.config.silent {
            println!("{}", message);
        }
    }

    fn create(path: &Path) -> Result<File, DnscopeError> {
        File::create(path)
            .map_err(|e| DnscopeError::OutputError(format!("Failed to create {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn quiet() -> OutputManager {
        OutputManager::new(OutputConfig {
            silent: true,
            ..OutputConfig::default()
        })
    }

    #[test]
    fn test_subdomain_file_is_sorted_and_newline_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.txt");
        let names = vec![
            "www.example.com".to_string(),
            "mail.example.com".to_string(),
            "www.example.com".to_string(),
        ];

        quiet().write_subdomains(&path, &names).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "mail.example.com\nwww.example.com\n");
    }

    #[test]
    fn test_subdomain_file_is_stable_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.txt");
        let names = vec!["b.example.com".to_string(), "a.example.com".to_string()];
        let mut reversed = names.clone();
        reversed.reverse();

        quiet().write_subdomains(&first, &names).unwrap();
        quiet().write_subdomains(&second, &reversed).unwrap();

        assert_eq!(
            std::fs::read_to_string(first).unwrap(),
            std::fs::read_to_string(second).unwrap()
        );
    }

    #[test]
    fn test_reverse_table_marks_unresolved() {
        let results = vec![
            ReverseLookupResult {
                subdomain: "www.example.com".to_string(),
                ip: Some("93.184.216.34".parse::<IpAddr>().unwrap()),
            },
            ReverseLookupResult {
                subdomain: "api.example.com".to_string(),
                ip: None,
            },
        ];

        let table = render_reverse_table(&results);

        assert!(table.contains("Subdomain"));
        assert!(table.contains("IP Address"));
        assert!(table.contains("not found"));
        assert!(table.contains("93.184.216.34"));
        let api = table.find("api.example.com").unwrap();
        let www = table.find("www.example.com").unwrap();
        assert!(api < www);
    }

    #[test]
    fn test_records_table_groups_by_type() {
        let entries = vec![
            DnsRecordEntry {
                record_type: "TXT".to_string(),
                value: "v=spf1 -all".to_string(),
            },
            DnsRecordEntry {
                record_type: "A".to_string(),
                value: "93.184.216.34".to_string(),
            },
        ];

        let table = render_records_table(&entries);

        assert!(table.contains("Type"));
        assert!(table.contains("Record"));
        let a = table.find("93.184.216.34").unwrap();
        let txt = table.find("v=spf1 -all").unwrap();
        assert!(a < txt);
        assert_eq!(table.matches("TXT").count(), 1);
    }

    #[test]
    fn test_report_is_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = DomainReport {
            domain: "example.com".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            subdomains: vec!["www.example.com".to_string()],
            reverse_lookups: Vec::new(),
            records: Vec::new(),
        };

        quiet().write_report(&path, &report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["domain"], "example.com");
        assert_eq!(value["subdomains"][0], "www.example.com");
    }
}
