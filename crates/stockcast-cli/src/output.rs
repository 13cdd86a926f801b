use serde_json::Value;
use stockcast_core::Envelope;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(envelope)?),
    }

    Ok(())
}

fn render_table(envelope: &Envelope<Value>) -> Result<String, CliError> {
    let meta = &envelope.meta;
    let mut out = String::new();
    out.push_str(&format!("request_id  : {}\n", meta.request_id));
    out.push_str(&format!("schema      : {}\n", meta.schema_version));
    out.push_str(&format!("generated_at: {}\n", meta.generated_at));
    if let Some(origin) = &meta.origin {
        out.push_str(&format!("origin      : {origin}\n"));
    }
    out.push_str(&format!("latency_ms  : {}\n", meta.latency_ms));

    if !meta.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &meta.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }

    out.push_str("data:\n");
    match &envelope.data {
        Value::Array(rows) if rows.iter().all(Value::is_object) && !rows.is_empty() => {
            for row in rows {
                out.push_str(&format!("  {}\n", row_line(row)));
            }
        }
        other => {
            for line in serde_json::to_string_pretty(other)?.lines() {
                out.push_str(&format!("  {line}\n"));
            }
        }
    }

    if !envelope.errors.is_empty() {
        out.push_str("errors:\n");
        for error in &envelope.errors {
            out.push_str(&format!("  - {}: {}\n", error.code, error.message));
        }
    }

    Ok(out)
}

/// One `key=value` pair per field, ordered by key.
fn row_line(row: &Value) -> String {
    let Some(fields) = row.as_object() else {
        return row.to_string();
    };
    fields
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}={text}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join("  ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stockcast_core::EnvelopeMeta;

    use super::*;

    #[test]
    fn table_lists_rows_and_warnings() {
        let mut meta = EnvelopeMeta::new("0b6a3e14-request", 3).expect("meta");
        meta.push_warning("popular: backend: timeout (source.unavailable)");
        let envelope = Envelope::success(
            meta,
            json!([{"symbol": "AAPL", "price": 175.5}, {"symbol": "MSFT", "price": 338.1}]),
        );

        let table = render_table(&envelope).expect("table");
        assert!(table.contains("request_id  : 0b6a3e14-request"));
        assert!(table.contains("  - popular: backend: timeout (source.unavailable)"));
        assert!(table.contains("symbol=AAPL"));
        assert!(table.contains("price=338.1"));
    }

    #[test]
    fn non_tabular_data_is_indented_json() {
        let meta = EnvelopeMeta::new("0b6a3e14-request", 0).expect("meta");
        let envelope = Envelope::success(meta, json!({"total_amount": 1000}));

        let table = render_table(&envelope).expect("table");
        assert!(table.contains("    \"total_amount\": 1000"));
    }
}
