// src/records.rs
use crate::resolver::{DnsClient, ResolutionOutcome};
use crate::types::{DnsRecordEntry, DumpOutcome};
use log::{debug, info};
use trust_dns_resolver::proto::rr::RecordType;

/// Record types dumped for the root domain, in query order.
pub const DUMP_RECORD_TYPES: [RecordType; 12] = [
    RecordType::A,
    RecordType::AAAA,
    RecordType::CNAME,
    RecordType::MX,
    RecordType::NS,
    RecordType::PTR,
    RecordType::SRV,
    RecordType::SOA,
    RecordType::TXT,
    RecordType::CAA,
    RecordType::DS,
    RecordType::DNSKEY,
];

/// Queries every type in [`DUMP_RECORD_TYPES`] one after another.
pub async fn dump_records(client: &dyn DnsClient, domain: &str) -> DumpOutcome {
    let mut entries = Vec::new();

    for record_type in DUMP_RECORD_TYPES {
        match client.resolve(domain, record_type).await {
            ResolutionOutcome::Answers(values) => {
                debug!("{} {}: {} answers", domain, record_type, values.len());
                entries.extend(values.into_iter().map(|value| DnsRecordEntry {
                    record_type: record_type.to_string(),
                    value,
                }));
            }
            ResolutionOutcome::NotFound => {}
            ResolutionOutcome::Transient(reason) => {
                debug!("{} {} query failed: {}", domain, record_type, reason);
            }
        }
    }

    if entries.is_empty() {
        info!("No DNS records found for {}", domain);
        DumpOutcome::NoRecords
    } else {
        info!("Collected {} DNS records for {}", entries.len(), domain);
        DumpOutcome::Found(entries)
    }
}
