//! Command-line interface
//!
//! One invocation is one poll. Scheduling belongs to cron or a systemd timer;
//! the scheduler is also responsible for never starting a run while the
//! previous one is still going.

use crate::config::Config;
use crate::error::Result;
use crate::history::{self, LoggedReading, Summary};
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;

const SCHEDULER_NOTE: &str = "Run from cron or a systemd timer. Each invocation performs a single \
poll and exits; configure the scheduler so that runs never overlap.";

#[derive(Debug, Parser)]
#[command(name = "thermolog", version, about = "Poll Nest thermostats and append readings to per-device CSV logs", after_help = SCHEDULER_NOTE)]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Write logs to this file (truncated at start) instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// DEBUG, INFO, WARNING or ERROR
    #[arg(long, default_value = "INFO")]
    pub log_level: String,

    /// Emit JSON log lines
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize logged readings instead of polling
    Report {
        /// Only this device (label such as "Living Room" or file slug)
        #[arg(long)]
        device: Option<String>,

        /// First day to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Trailing rows to print per device
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

/// Options for [`render_report`]
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub device: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub rows: usize,
}

/// Default report window: the last 7 days ending `today`
pub fn default_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(6), today)
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|v| format!("{:.*}", decimals, v)).unwrap_or_else(|| "-".to_string())
}

fn render_summary(out: &mut String, summary: &Summary, symbol: &str) {
    let _ = writeln!(
        out,
        "  samples: {}  ({} .. {})",
        summary.samples, summary.first, summary.last
    );
    let _ = writeln!(
        out,
        "  ambient: min {}{s}  max {}{s}  mean {}{s}",
        fmt_opt(summary.ambient_min, 1),
        fmt_opt(summary.ambient_max, 1),
        fmt_opt(summary.ambient_mean, 1),
        s = symbol
    );
    let latest = &summary.latest;
    let _ = writeln!(
        out,
        "  latest: heat {}  cool {}  outdoor {}{}  hvac {}",
        fmt_opt(latest.heat_setpoint, 0),
        fmt_opt(latest.cool_setpoint, 0),
        fmt_opt(latest.outdoor_temp, 1),
        symbol,
        latest.hvac_status.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "  hvac active: {:.0}% of samples",
        summary.hvac_duty_cycle * 100.0
    );
}

fn render_row(out: &mut String, r: &LoggedReading) {
    let _ = writeln!(
        out,
        "    {}  {:>6}  {:>5}  {:>4}  {:>4}  {:>6}  {}{}",
        r.timestamp,
        fmt_opt(r.ambient_temp, 1),
        fmt_opt(r.humidity, 0),
        fmt_opt(r.heat_setpoint, 0),
        fmt_opt(r.cool_setpoint, 0),
        fmt_opt(r.outdoor_temp, 1),
        r.hvac_status.as_deref().unwrap_or("-"),
        if history::hvac_active(r) { " *" } else { "" }
    );
}

/// Text report over the logs in `config.output_dir`
pub fn render_report(config: &Config, options: &ReportOptions, today: NaiveDate) -> Result<String> {
    let (default_start, default_end) = default_range(today);
    let start = options.start.unwrap_or(default_start);
    let end = options.end.unwrap_or(default_end);
    let symbol = config.temperature_scale.symbol();

    let logs = history::list_logs(&config.output_dir)?;
    let selected: Vec<_> = match &options.device {
        Some(name) => history::find_log(&logs, name).into_iter().collect(),
        None => logs.iter().collect(),
    };

    let mut out = String::new();
    if selected.is_empty() {
        let _ = writeln!(
            out,
            "No logs found in {}{}",
            config.output_dir.display(),
            options
                .device
                .as_ref()
                .map(|d| format!(" for '{}'", d))
                .unwrap_or_default()
        );
        return Ok(out);
    }

    let _ = writeln!(out, "Readings from {} to {}", start, end);
    for log in selected {
        let readings = history::load_log(&log.path)?;
        let in_range = history::filter_by_range(&readings, start, end);
        let _ = writeln!(out, "\n{} ({})", log.label, log.path.display());
        match history::summarize(&in_range) {
            Some(summary) => {
                render_summary(&mut out, &summary, symbol);
                if options.rows > 0 {
                    let skip = in_range.len().saturating_sub(options.rows);
                    for r in &in_range[skip..] {
                        render_row(&mut out, r);
                    }
                }
            }
            None => {
                let _ = writeln!(out, "  no readings in range");
            }
        }
    }
    Ok(out)
}
