use serde::Serialize;

use portal::record::StageCount;
use portal::Page;

use crate::commands::{CliError, CliRecord};
use crate::OutputFormat;

pub(crate) fn json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn line<R: CliRecord>(record: &R) -> String {
    format!(
        "{:<46} {:<26} {}",
        record.id(),
        record.stage().to_string(),
        record.headline()
    )
}

pub(crate) fn page<R: CliRecord>(page: &Page<R>, output: OutputFormat) -> Result<(), CliError> {
    if output == OutputFormat::Json {
        return json(page);
    }

    for record in &page.records {
        println!("{}", line(record));
    }
    let p = &page.pagination;
    println!(
        "Page {} of {} ({} matching, {} per page)",
        p.current_page, p.total_pages, p.total_records, p.page_size
    );
    Ok(())
}

pub(crate) fn record<R: CliRecord>(record: &R, output: OutputFormat) -> Result<(), CliError> {
    match output {
        OutputFormat::Json => json(record),
        OutputFormat::Text => {
            println!("{}", line(record));
            println!(
                "  created {}  updated {}",
                record.created_date().format("%Y-%m-%d %H:%M:%S"),
                record.updated_date().format("%Y-%m-%d %H:%M:%S")
            );
            Ok(())
        }
    }
}

/// Prints rows built by the `stages` command.
pub(crate) fn stage_rows(
    collection: &str,
    rows: &[serde_json::Value],
    output: OutputFormat,
) -> Result<(), CliError> {
    if output == OutputFormat::Json {
        return json(rows);
    }

    println!("{}", collection);
    for row in rows {
        let stage = row["stage"].as_str().unwrap_or_default();
        let position = match row["position"].as_u64() {
            Some(n) => format!("{:>2}.", n),
            None => " --".to_string(),
        };
        let mut notes = Vec::new();
        if let Some(progress) = row["progress"].as_u64() {
            notes.push(format!("progress {}%", progress));
        }
        if let Some(stamps) = row["stamps"].as_array() {
            for stamp in stamps.iter().filter_map(|s| s.as_str()) {
                notes.push(format!("stamps {}", stamp));
            }
        }
        if row["position"].is_null() {
            notes.push("off-chain".to_string());
        }
        println!("{} {:<26} {}", position, stage, notes.join(", "));
    }
    Ok(())
}

pub(crate) fn summary<S>(
    collection: &str,
    counts: &[StageCount<S>],
    output: OutputFormat,
) -> Result<(), CliError>
where
    S: Serialize + std::fmt::Display,
{
    if output == OutputFormat::Json {
        return json(counts);
    }

    println!("{}", collection);
    for count in counts {
        let marker = if count.in_chain { "" } else { " (off-chain)" };
        println!("  {:<26} {:>5}{}", count.stage.to_string(), count.count, marker);
    }
    let total: usize = counts.iter().map(|c| c.count).sum();
    println!("  {:<26} {:>5}", "total", total);
    Ok(())
}
