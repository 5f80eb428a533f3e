//! Read-side of the device logs: list, load, filter and summarize.
//!
//! Loading is lenient. Logs outlive code versions and get edited by hand, so
//! rows with an unparseable date/time are dropped and unparseable numbers
//! become missing values instead of failing the whole file.

use crate::error::{PollerError, Result};
use crate::logging::get_logger;
use crate::record::HvacStatus;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::path::{Path, PathBuf};

/// A device log found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLog {
    /// Human label derived from the file stem, e.g. `Living Room`
    pub label: String,
    pub path: PathBuf,
}

/// One row read back from a log
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedReading {
    pub timestamp: NaiveDateTime,
    pub ambient_temp: Option<f64>,
    pub humidity: Option<f64>,
    pub heat_setpoint: Option<f64>,
    pub cool_setpoint: Option<f64>,
    pub outdoor_temp: Option<f64>,
    pub hvac_status: Option<String>,
}

/// Aggregate view of a set of readings
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub samples: usize,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
    pub ambient_min: Option<f64>,
    pub ambient_max: Option<f64>,
    pub ambient_mean: Option<f64>,
    pub latest: LoggedReading,
    /// Fraction of samples with the HVAC heating or cooling
    pub hvac_duty_cycle: f64,
}

fn label_from_stem(stem: &str) -> String {
    stem.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every `*.csv` log under `dir`, sorted by path. A missing directory is empty.
pub fn list_logs(dir: &Path) -> Result<Vec<DeviceLog>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut logs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") || !path.is_file() {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        logs.push(DeviceLog {
            label: label_from_stem(&stem),
            path,
        });
    }
    logs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(logs)
}

/// Find a log by label or slug, case-insensitively
pub fn find_log<'a>(logs: &'a [DeviceLog], name: &str) -> Option<&'a DeviceLog> {
    let wanted = crate::csv_log::sanitize_name(name);
    logs.iter().find(|log| {
        log.label.eq_ignore_ascii_case(name)
            || log.path.file_stem().and_then(|s| s.to_str()) == Some(wanted.as_str())
    })
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Load a log, oldest reading first
pub fn load_log(path: &Path) -> Result<Vec<LoggedReading>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| PollerError::io(format!("Failed to open {}: {}", path.display(), e)))?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(date_col), Some(time_col)) = (column("date"), column("time")) else {
        return Err(PollerError::validation(
            "csv",
            &format!("{} is missing date/time columns", path.display()),
        ));
    };
    let ambient_col = column("ambient_temp");
    let humidity_col = column("humidity");
    let heat_col = column("heat_setpoint");
    let cool_col = column("cool_setpoint");
    let outdoor_col = column("outdoor_temp");
    let hvac_col = column("hvac_status");

    let mut readings = Vec::new();
    let mut dropped = 0usize;
    for row in reader.records() {
        let Ok(row) = row else {
            dropped += 1;
            continue;
        };
        let cell = |col: Option<usize>| col.and_then(|c| row.get(c));

        let date = cell(Some(date_col))
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
        let time = cell(Some(time_col)).and_then(parse_time);
        let (Some(date), Some(time)) = (date, time) else {
            dropped += 1;
            continue;
        };

        readings.push(LoggedReading {
            timestamp: date.and_time(time),
            ambient_temp: parse_number(cell(ambient_col)),
            humidity: parse_number(cell(humidity_col)),
            heat_setpoint: parse_number(cell(heat_col)),
            cool_setpoint: parse_number(cell(cool_col)),
            outdoor_temp: parse_number(cell(outdoor_col)),
            hvac_status: cell(hvac_col)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        });
    }

    if dropped > 0 {
        get_logger("history").debug(&format!(
            "Dropped {} unparseable row(s) from {}",
            dropped,
            path.display()
        ));
    }
    readings.sort_by_key(|r| r.timestamp);
    Ok(readings)
}

/// Readings from the start of `start` through the end of `end`
pub fn filter_by_range(
    readings: &[LoggedReading],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<LoggedReading> {
    readings
        .iter()
        .filter(|r| {
            let day = r.timestamp.date();
            day >= start && day <= end
        })
        .cloned()
        .collect()
}

/// Whether the HVAC was heating or cooling at this reading
pub fn hvac_active(reading: &LoggedReading) -> bool {
    reading
        .hvac_status
        .as_deref()
        .and_then(HvacStatus::from_label)
        .is_some_and(|s| s.is_active())
}

/// Summarize readings; `None` when there are none
pub fn summarize(readings: &[LoggedReading]) -> Option<Summary> {
    let first = readings.first()?;
    let latest = readings.last()?;

    let ambient: Vec<f64> = readings.iter().filter_map(|r| r.ambient_temp).collect();
    let ambient_mean = if ambient.is_empty() {
        None
    } else {
        Some(ambient.iter().sum::<f64>() / ambient.len() as f64)
    };
    let active = readings.iter().filter(|r| hvac_active(r)).count();

    Some(Summary {
        samples: readings.len(),
        first: first.timestamp,
        last: latest.timestamp,
        ambient_min: ambient.iter().copied().reduce(f64::min),
        ambient_max: ambient.iter().copied().reduce(f64::max),
        ambient_mean,
        latest: latest.clone(),
        hvac_duty_cycle: active as f64 / readings.len() as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_stem() {
        assert_eq!(label_from_stem("living_room"), "Living Room");
        assert_eq!(label_from_stem("den"), "Den");
        assert_eq!(label_from_stem("upstairs__hall_2"), "Upstairs Hall 2");
    }

    #[test]
    fn test_parse_time_accepts_legacy_minutes() {
        assert_eq!(parse_time("07:05"), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_time("07:05:09"), NaiveTime::from_hms_opt(7, 5, 9));
        assert_eq!(parse_time("7pm"), None);
    }

    #[test]
    fn test_parse_number_is_lenient() {
        assert_eq!(parse_number(Some(" 68.5 ")), Some(68.5));
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(Some("n/a")), None);
        assert_eq!(parse_number(None), None);
    }
}
