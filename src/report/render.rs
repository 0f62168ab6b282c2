//! Report renderers: plain text, JSON and CSV

use chrono::DateTime;
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;

use super::VetReport;
use crate::events::Category;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("CSV writer error: {0}")]
    Writer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text/plain; charset=utf-8",
            ReportFormat::Json => "application/json",
            ReportFormat::Csv => "text/csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("Unknown report format: {} (use text, json or csv)", other)),
        }
    }
}

/// Render a report. `bar_width` is the length of the longest text bar.
pub fn render(report: &VetReport, format: ReportFormat, bar_width: usize) -> Result<String, RenderError> {
    match format {
        ReportFormat::Text => Ok(render_text(report, bar_width)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ReportFormat::Csv => render_csv(report),
    }
}

fn format_millis(millis: i64, pattern: &str) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format(pattern).to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn render_text(report: &VetReport, bar_width: usize) -> String {
    let mut out = String::new();
    let profile = &report.profile;

    // Writing to a String cannot fail
    let _ = writeln!(out, "VET REPORT: {}", profile.name);
    let _ = writeln!(
        out,
        "Breed: {}   Age: {}",
        profile.breed.as_deref().unwrap_or("unknown"),
        profile
            .age_years
            .map(|y| format!("{} years", y))
            .unwrap_or_else(|| "unknown".to_string())
    );
    if !profile.known_allergies.is_empty() {
        let _ = writeln!(out, "Known allergies: {}", profile.known_allergies.join(", "));
    }
    let _ = writeln!(
        out,
        "Period: {} ({} to {})",
        report.preset.description(),
        format_millis(report.window.start, "%Y-%m-%d"),
        format_millis(report.window.end, "%Y-%m-%d")
    );
    let _ = writeln!(
        out,
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    let _ = writeln!(out, "\nTRIGGERS OBSERVED");
    for item in &report.checklist {
        let mark = if item.present { "x" } else { " " };
        if item.present {
            let _ = writeln!(out, "  [{}] {} ({})", mark, item.label, item.count);
        } else {
            let _ = writeln!(out, "  [{}] {}", mark, item.label);
        }
    }

    let _ = writeln!(out, "\nTRIGGER FREQUENCY");
    if report.bars.is_empty() {
        let _ = writeln!(out, "  No triggers logged in this period.");
    } else {
        let label_width = report.bars.iter().map(|b| b.label.len()).max().unwrap_or(0);
        for bar in &report.bars {
            let _ = writeln!(
                out,
                "  {:<width$}  {:<bar_width$}  {} ({}%)",
                bar.label,
                text_bar(bar.fraction, bar_width),
                bar.count,
                bar.percentage,
                width = label_width,
                bar_width = bar_width,
            );
        }
    }

    let _ = writeln!(out, "\nSEVERITY");
    match (report.severity.average, report.severity.max) {
        (Some(average), Some(max)) => {
            let _ = writeln!(
                out,
                "  Logs: {}   Average: {:.1}   Worst: {} ({})",
                report.severity.count,
                average,
                max,
                max.label()
            );
        }
        _ => {
            let _ = writeln!(out, "  No symptoms logged in this period.");
        }
    }

    if !report.symptoms.is_empty() {
        let _ = writeln!(out, "\nSYMPTOMS");
        for entry in &report.symptoms.entries {
            let _ = writeln!(out, "  {:<14} {} ({}%)", entry.label, entry.count, entry.percentage);
        }

        let _ = writeln!(out, "\nSYMPTOM LOG");
        for row in &report.symptom_log {
            let triggers = if row.triggers.is_empty() {
                "-".to_string()
            } else {
                row.triggers
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let _ = write!(
                out,
                "  {}  {:<14} {}/5  triggers: {}",
                format_millis(row.timestamp, "%Y-%m-%d %H:%M"),
                row.label,
                row.severity,
                triggers
            );
            if let Some(notes) = &row.notes {
                let _ = write!(out, "  \"{}\"", notes);
            }
            out.push('\n');
        }
    }

    if !report.medications.is_empty() {
        let _ = writeln!(out, "\nMEDICATIONS");
        for med in &report.medications {
            let _ = write!(out, "  {} {}", med.name, med.dosage);
            if !med.reminder_times.is_empty() {
                let _ = write!(out, "   at {}", med.reminder_times.join(", "));
            }
            if let Some(next) = med.next_reminder {
                let _ = write!(out, "   next {}", format_millis(next, "%Y-%m-%d %H:%M"));
            }
            out.push('\n');
        }
    }

    out
}

/// Bar of `#` proportional to `fraction`; any non-zero count shows at least one
fn text_bar(fraction: f64, width: usize) -> String {
    if fraction <= 0.0 || width == 0 {
        return String::new();
    }
    let len = ((fraction * width as f64).round() as usize).clamp(1, width);
    "#".repeat(len)
}

fn render_csv(report: &VetReport) -> Result<String, RenderError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["section", "timestamp", "item", "count", "percentage", "severity", "notes"])?;

    for entry in report.triggers.with_all_categories() {
        let count = entry.count.to_string();
        let percentage = entry.percentage.to_string();
        writer.write_record([
            "trigger",
            "",
            entry.category.key(),
            count.as_str(),
            percentage.as_str(),
            "",
            "",
        ])?;
    }

    for entry in &report.symptoms.entries {
        let count = entry.count.to_string();
        let percentage = entry.percentage.to_string();
        writer.write_record([
            "symptom",
            "",
            entry.category.key(),
            count.as_str(),
            percentage.as_str(),
            "",
            "",
        ])?;
    }

    for row in &report.symptom_log {
        let timestamp = format_millis(row.timestamp, "%Y-%m-%dT%H:%M:%SZ");
        let severity = row.severity.to_string();
        writer.write_record([
            "log",
            timestamp.as_str(),
            row.symptom.key(),
            "",
            "",
            severity.as_str(),
            row.notes.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RenderError::Writer(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
