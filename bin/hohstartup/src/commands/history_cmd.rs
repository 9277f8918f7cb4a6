use chrono::{DateTime, NaiveDate, Utc};
use hohstartup_core::Paths;
use hohstartup_storage::{HistoryLog, RunOutcome, RunRecord};

fn format_record(record: &RunRecord) -> String {
    let time = DateTime::<Utc>::from_timestamp_millis(record.timestamp_ms)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    match record.outcome {
        RunOutcome::Done => format!(
            "{}  ✓ done      {:>6}ms  {}",
            time,
            record.duration_ms,
            if record.follow_up { "resource opened" } else { "no resource" }
        ),
        RunOutcome::Failed => format!(
            "{}  ✗ failed    {:>6}ms  {} [{}] {}",
            time,
            record.duration_ms,
            record
                .failed_stage
                .map(|s| s.to_string())
                .unwrap_or_else(|| "?".to_string()),
            record
                .error_kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| "?".to_string()),
            record.error.as_deref().unwrap_or("")
        ),
    }
}

/// Print the run history for one day.
pub async fn show(date: Option<String>) -> anyhow::Result<()> {
    let date = match date {
        Some(d) => {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("Invalid date '{}': {} (expected YYYY-MM-DD)", d, e))?;
            d
        }
        None => Utc::now().format("%Y-%m-%d").to_string(),
    };

    let log = HistoryLog::new(Paths::new());
    let records = log.read_date(&date)?;

    if records.is_empty() {
        println!("(No runs on {})", date);
        return Ok(());
    }

    println!("📋 Runs on {} ({})", date, records.len());
    println!();
    for record in &records {
        println!("  {}", format_record(record));
    }
    Ok(())
}
