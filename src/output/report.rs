//! Error report rendering.

use std::io::{self, Write};

use crate::model::ErrorRecord;
use crate::output::table::tabulate;

/// Table rows for the report, one per record.
pub fn report_rows(records: &[ErrorRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                r.count.to_string(),
                r.service.clone(),
                r.identity.clone(),
                r.operation_name().to_string(),
                r.url.clone(),
                r.code.to_string(),
                r.traces.join(","),
            ]
        })
        .collect()
}

/// Write the report table and a summary line, or a notice when empty.
pub fn write_report<W: Write>(
    out: &mut W,
    records: &[ErrorRecord],
    limit: u32,
    monitoring_url: &str,
) -> io::Result<()> {
    if records.is_empty() {
        writeln!(out, "No results found.")?;
        return Ok(());
    }

    let traces_header = format!("traces (limit={})", limit);
    let headers = [
        "count",
        "service",
        "identity",
        "operation",
        "url",
        "code",
        traces_header.as_str(),
    ];
    writeln!(out, "{}", tabulate(&headers, &report_rows(records)))?;

    writeln!(
        out,
        "> {} results found. You can read the traces from {}/explore and select the jaeger datasource.",
        records.len(),
        monitoring_url.trim_end_matches('/')
    )?;
    writeln!(out, "  Or run tracer [--stack <name>] --open <trace>.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operation;

    fn record() -> ErrorRecord {
        ErrorRecord {
            code: 404,
            service: "squall".into(),
            identity: "namespace".into(),
            operation: Some(Operation::Retrieve),
            method: "GET".into(),
            url: "/namespaces/abc".into(),
            count: 2,
            traces: vec!["t1".into(), "t2".into()],
        }
    }

    #[test]
    fn test_rows() {
        let rows = report_rows(&[record()]);
        assert_eq!(
            rows[0],
            vec!["2", "squall", "namespace", "retrieve", "/namespaces/abc", "404", "t1,t2"]
        );
    }

    #[test]
    fn test_report() {
        let mut out = Vec::new();
        write_report(&mut out, &[record()], 2, "https://grafana.example.com/").unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("traces (limit=2)"));
        assert!(text.contains("| t1,t2"));
        assert!(text.contains(
            "> 1 results found. You can read the traces from https://grafana.example.com/explore"
        ));
        assert!(text.ends_with("--open <trace>.\n"));
    }

    #[test]
    fn test_empty_report() {
        let mut out = Vec::new();
        write_report(&mut out, &[], 1, "https://grafana.example.com").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No results found.\n");
    }
}
