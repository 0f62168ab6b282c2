//! Pawtrack CLI
//!
//! Command-line interface for Pawtrack:
//! - Analyze exported event logs offline
//! - Render vet reports
//! - Convert CSV exports to event logs
//! - Log triggers and symptoms to a running API

use anyhow::{bail, Context};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use pawtrack::analysis::{
    Clock, FixedClock, FrequencyAnalyzer, FrequencyEntry, SystemClock, TriggerAnalyzer,
    WindowPreset,
};
use pawtrack::config::{generate_default_config, Config};
use pawtrack::events::{EventLog, Subject, SymptomCategory, TriggerCategory};
use pawtrack::import::{load_event_logs, save_event_log, CsvImporter};
use pawtrack::report::{render, ReportFormat, VetReportBuilder};
use pawtrack::telemetry;
use pawtrack::views::TriggerAnalysisBuilder;

/// Output of `pawtrack analyze`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeFormat {
    Table,
    Json,
}

impl FromStr for AnalyzeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(AnalyzeFormat::Table),
            "json" => Ok(AnalyzeFormat::Json),
            other => Err(format!("Unknown analyze format: {} (use table or json)", other)),
        }
    }
}

#[derive(Parser)]
#[command(name = "pawtrack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track your dog's allergy triggers and symptoms")]
#[command(long_about = "Pawtrack logs suspected allergy triggers and symptoms for your dog,\nranks the triggers that come up most often, and prints a report for your vet.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL (defaults to the configured host and port)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: ~/.config/pawtrack/config.toml or ./pawtrack.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show info-level logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank triggers in an event log file (JSON or CSV)
    Analyze {
        /// Event log (.json) or CSV export (.csv)
        file: PathBuf,
        /// Window: 7d, 30d or 90d
        #[arg(short, long)]
        window: Option<String>,
        /// Also rank symptoms
        #[arg(short, long)]
        symptoms: bool,
        /// Only analyze this subject when the file holds several
        #[arg(long)]
        subject: Option<String>,
        /// End the window on this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: AnalyzeFormat,
    },

    /// Render a vet report
    Report {
        /// Event log (.json) or CSV export (.csv)
        file: PathBuf,
        /// Window: 7d, 30d or 90d
        #[arg(short, long)]
        window: Option<String>,
        /// Output format (text, json, csv)
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Subject to report on when the file holds several
        #[arg(long)]
        subject: Option<String>,
        /// End the window on this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a CSV export into a JSON event log
    Import {
        /// Path to CSV file
        path: PathBuf,
        /// Subject id (default: file name)
        #[arg(long)]
        subject: Option<String>,
        /// Dog's name (default: subject id)
        #[arg(long)]
        name: Option<String>,
        /// The CSV has no header row
        #[arg(long)]
        no_header: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Log a trigger exposure to the API
    LogTrigger {
        /// Subject id
        subject: String,
        /// Trigger category (food, walk_location, pollen, weather, ...)
        category: String,
        /// Where it happened
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
        /// Timestamp (default: now). Supports: "now", "yesterday", ISO 8601, Unix millis
        #[arg(short, long)]
        time: Option<String>,
    },

    /// Log a symptom to the API
    LogSymptom {
        /// Subject id
        subject: String,
        /// Symptom (itching, redness, licking, ...)
        symptom: String,
        /// Severity from 1 (mild) to 5 (severe)
        severity: u8,
        /// Suspected trigger; repeat for several
        #[arg(short = 'T', long = "trigger")]
        triggers: Vec<String>,
        #[arg(short, long)]
        notes: Option<String>,
        /// Timestamp (default: now). Supports: "now", "yesterday", ISO 8601, Unix millis
        #[arg(short, long)]
        time: Option<String>,
    },

    /// Show API server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if !cli.verbose {
        config.logging.level = "warn".to_string();
    }
    if let Err(e) = telemetry::init(&config.logging) {
        eprintln!("Logging disabled: {}", e);
    }

    let api_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config.api.base_url());
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Analyze {
            file,
            window,
            symptoms,
            subject,
            as_of,
            format,
        } => {
            let preset = resolve_preset(window.as_deref(), &config)?;
            let analyzer: Arc<dyn TriggerAnalyzer> =
                Arc::new(FrequencyAnalyzer::new(config.report.trigger_basis));
            let builder = TriggerAnalysisBuilder::new(Arc::clone(&analyzer), clock_for(as_of));

            for log in select_logs(load_logs(&file, subject.as_deref())?, subject.as_deref())? {
                let analysis = builder.build(&log, preset);

                if format == AnalyzeFormat::Json {
                    println!("{}", serde_json::to_string_pretty(&analysis)?);
                    continue;
                }

                println!("{} ({}), {}", log.subject.name, log.subject.id, preset.description());
                println!();
                if analysis.is_empty() {
                    println!("No triggers logged in this period.");
                } else {
                    print_table("Trigger", &analysis.ranked, analysis.total);
                }

                if symptoms {
                    let report = analyzer.symptom_frequencies(&log, Some(&analysis.window));
                    println!();
                    if report.is_empty() {
                        println!("No symptoms logged in this period.");
                    } else {
                        print_table("Symptom", &report.entries, report.total);
                    }
                }
                println!();
            }
        }

        Commands::Report {
            file,
            window,
            format,
            subject,
            as_of,
            output,
        } => {
            let preset = resolve_preset(window.as_deref(), &config)?;
            let format: ReportFormat = format.parse().map_err(anyhow::Error::msg)?;

            let mut logs =
                select_logs(load_logs(&file, subject.as_deref())?, subject.as_deref())?;
            if logs.len() > 1 {
                let ids: Vec<String> = logs.iter().map(|l| l.subject.id.to_string()).collect();
                bail!(
                    "{} holds several subjects ({}); pick one with --subject",
                    file.display(),
                    ids.join(", ")
                );
            }
            let Some(log) = logs.pop() else {
                bail!("No event log found in {}", file.display());
            };

            let builder = VetReportBuilder::new(
                Arc::new(FrequencyAnalyzer::new(config.report.trigger_basis)),
                clock_for(as_of),
            );
            let report = builder.build(&log, preset);
            let rendered = render(&report, format, config.report.bar_width)?;

            match output {
                Some(path) => {
                    write_output(&path, &rendered)?;
                    println!("Report written to {:?}", path);
                }
                None => {
                    print!("{}", rendered);
                }
            }
        }

        Commands::Import {
            path,
            subject,
            name,
            no_header,
            output,
        } => {
            if !path.exists() {
                eprintln!("File not found: {:?}", path);
                std::process::exit(1);
            }

            let subject_id = subject.unwrap_or_else(|| file_stem(&path));
            let result = CsvImporter::new(subject_id.as_str())
                .with_header(!no_header)
                .import(&path)?;

            eprintln!("Import results:");
            eprintln!("  Rows processed: {}", result.rows_processed);
            eprintln!("  Rows failed: {}", result.rows_failed);
            eprintln!("  Triggers: {}", result.triggers.len());
            eprintln!("  Symptoms: {}", result.symptoms.len());

            if !result.errors.is_empty() {
                eprintln!();
                eprintln!("Errors (first 10):");
                for error in result.errors.iter().take(10) {
                    eprintln!("  {}", error);
                }
            }

            let name = name.unwrap_or_else(|| subject_id.clone());
            let log = result.into_event_log(Subject::new(subject_id.as_str(), name));

            match output {
                Some(path) => {
                    save_event_log(&path, &log)?;
                    eprintln!();
                    eprintln!("Event log written to {:?}", path);
                }
                None => {
                    println!("{}", serde_json::to_string_pretty(&log)?);
                }
            }
        }

        Commands::LogTrigger {
            subject,
            category,
            location,
            notes,
            time,
        } => {
            let category: TriggerCategory = category.parse()?;
            let timestamp = parse_time(time.as_deref())?;

            let body = serde_json::json!({
                "category": category,
                "timestamp": timestamp,
                "location": location,
                "notes": notes,
            });

            let response = client
                .post(format!("{}/api/v1/subjects/{}/triggers", api_url, subject))
                .json(&body)
                .send()
                .await?;

            if response.status().is_success() {
                println!("Logged {} for {} at {}", category, subject, format_time(timestamp));
            } else {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                eprintln!("Failed ({}): {}", status, text);
                std::process::exit(1);
            }
        }

        Commands::LogSymptom {
            subject,
            symptom,
            severity,
            triggers,
            notes,
            time,
        } => {
            let symptom: SymptomCategory = symptom.parse()?;
            let triggers = triggers
                .iter()
                .map(|t| t.parse::<TriggerCategory>())
                .collect::<Result<Vec<_>, _>>()?;
            let timestamp = parse_time(time.as_deref())?;

            let body = serde_json::json!({
                "symptom": symptom,
                "severity": severity,
                "triggers": triggers,
                "timestamp": timestamp,
                "notes": notes,
            });

            let response = client
                .post(format!("{}/api/v1/subjects/{}/symptoms", api_url, subject))
                .json(&body)
                .send()
                .await?;

            if response.status().is_success() {
                println!(
                    "Logged {} ({}/5) for {} at {}",
                    symptom,
                    severity,
                    subject,
                    format_time(timestamp)
                );
            } else {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                eprintln!("Failed ({}): {}", status, text);
                std::process::exit(1);
            }
        }

        Commands::Status => {
            let response = client.get(format!("{}/health", api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Pawtrack v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );

                    println!();
                    println!("Store:");
                    if let Some(subjects) = health["subjects"].as_u64() {
                        println!("  Subjects: {}", subjects);
                    }
                    if let Some(events) = health["events"].as_u64() {
                        println!("  Events: {}", events);
                    }

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Pawtrack API at {}", api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Pawtrack API server is running:");
                    eprintln!("  cargo run --bin pawtrack-api");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    write_output(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn resolve_preset(window: Option<&str>, config: &Config) -> anyhow::Result<WindowPreset> {
    match window {
        Some(w) => Ok(w.parse()?),
        None => Ok(config.report.default_window),
    }
}

/// Wall clock, or the end of `as_of` for exports analyzed after the fact
fn clock_for(as_of: Option<NaiveDate>) -> Arc<dyn Clock> {
    match as_of.and_then(|d| d.and_hms_opt(23, 59, 59)) {
        Some(end) => Arc::new(FixedClock::at(end.and_utc())),
        None => Arc::new(SystemClock),
    }
}

/// Read a JSON event log file, or a CSV export when the extension says so
fn load_logs(path: &Path, subject: Option<&str>) -> anyhow::Result<Vec<EventLog>> {
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        let subject_id = subject.map(str::to_string).unwrap_or_else(|| file_stem(path));
        let result = CsvImporter::new(subject_id.as_str())
            .import(path)
            .with_context(|| format!("Failed to import {}", path.display()))?;

        if result.rows_failed > 0 {
            eprintln!(
                "Skipped {} of {} rows in {}",
                result.rows_failed,
                result.rows_processed,
                path.display()
            );
        }
        let subject = Subject::new(subject_id.as_str(), subject_id.as_str());
        return Ok(vec![result.into_event_log(subject)]);
    }

    let loaded = load_event_logs(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    Ok(loaded
        .into_iter()
        .map(|l| {
            if l.skipped > 0 {
                eprintln!("Skipped {} malformed records for {}", l.skipped, l.log.subject.id);
            }
            l.log
        })
        .collect())
}

fn select_logs(logs: Vec<EventLog>, subject: Option<&str>) -> anyhow::Result<Vec<EventLog>> {
    let Some(id) = subject else {
        return Ok(logs);
    };

    let selected: Vec<EventLog> = logs
        .into_iter()
        .filter(|l| l.subject.id.as_str() == id)
        .collect();
    if selected.is_empty() {
        bail!("Subject not found: {}", id);
    }
    Ok(selected)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "dog".to_string())
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    // Create parent directory if needed
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn parse_time(time: Option<&str>) -> anyhow::Result<i64> {
    match time {
        None | Some("now") => Ok(Utc::now().timestamp_millis()),
        Some("yesterday") => Ok((Utc::now() - Duration::days(1)).timestamp_millis()),
        Some(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                Ok(dt.timestamp_millis())
            } else if let Ok(ts) = s.parse::<i64>() {
                Ok(ts)
            } else {
                bail!("Invalid timestamp format: {}", s)
            }
        }
    }
}

fn format_time(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_table<C>(heading: &str, entries: &[FrequencyEntry<C>], total: usize) {
    println!("{:<4} {:<22} {:>6} {:>6}", "#", heading, "Count", "Share");
    println!("{}", "-".repeat(41));

    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "{:<4} {:<22} {:>6} {:>5}%",
            rank + 1,
            entry.label,
            entry.count,
            entry.percentage
        );
    }

    println!("{}", "-".repeat(41));
    println!("{:<4} {:<22} {:>6}", "", "Total", total);
}
