use chrono::{NaiveDate, NaiveDateTime};
use thermolog::cli::{ReportOptions, render_report};
use thermolog::config::Config;
use thermolog::history::{filter_by_range, find_log, hvac_active, list_logs, load_log, summarize};

const LOG: &str = "\
date,time,ambient_temp,humidity,heat_setpoint,cool_setpoint,outdoor_temp,hvac_status
2024-01-16,08:00:00,67.0,40.0,68,,31.0,HEATING
2024-01-15,23:59:59,68.0,41.0,68,,30.0,OFF
not-a-date,10:00:00,99.0,,,,,OFF
2024-01-15,07:30,66.5,bad,68,,,HEATING
2024-01-17,00:00:00,70.0,39.0,,75,,COOLING
";

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

#[test]
fn list_logs_labels_and_sorts() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("upstairs_hall.csv"), LOG).unwrap();
    std::fs::write(tmp.path().join("den.csv"), LOG).unwrap();
    std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();

    let logs = list_logs(tmp.path()).unwrap();
    let labels: Vec<&str> = logs.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, vec!["Den", "Upstairs Hall"]);

    assert_eq!(find_log(&logs, "upstairs hall").unwrap().label, "Upstairs Hall");
    assert!(find_log(&logs, "Garage").is_none());

    assert!(list_logs(&tmp.path().join("missing")).unwrap().is_empty());
}

#[test]
fn load_log_is_lenient_and_sorted() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), LOG).unwrap();

    let readings = load_log(tmp.path()).unwrap();
    assert_eq!(readings.len(), 4);
    assert_eq!(readings[0].timestamp, ts("2024-01-15 07:30:00"));
    assert_eq!(readings[0].humidity, None);
    assert_eq!(readings[0].heat_setpoint, Some(68.0));
    assert_eq!(readings[1].timestamp, ts("2024-01-15 23:59:59"));
    assert_eq!(readings[3].cool_setpoint, Some(75.0));
    assert_eq!(readings[3].heat_setpoint, None);
    assert!(readings.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn range_includes_whole_end_day() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), LOG).unwrap();
    let readings = load_log(tmp.path()).unwrap();

    let jan15 = filter_by_range(&readings, day(15), day(15));
    assert_eq!(jan15.len(), 2);
    assert_eq!(jan15[1].timestamp, ts("2024-01-15 23:59:59"));

    assert_eq!(filter_by_range(&readings, day(16), day(17)).len(), 2);
    assert!(filter_by_range(&readings, day(18), day(20)).is_empty());
}

#[test]
fn summary_and_hvac_indicator() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), LOG).unwrap();
    let readings = load_log(tmp.path()).unwrap();

    assert!(hvac_active(&readings[0]));
    assert!(!hvac_active(&readings[1]));

    let summary = summarize(&readings).unwrap();
    assert_eq!(summary.samples, 4);
    assert_eq!(summary.first, ts("2024-01-15 07:30:00"));
    assert_eq!(summary.last, ts("2024-01-17 00:00:00"));
    assert_eq!(summary.ambient_min, Some(66.5));
    assert_eq!(summary.ambient_max, Some(70.0));
    assert_eq!(summary.ambient_mean, Some(67.875));
    assert_eq!(summary.hvac_duty_cycle, 0.75);
    assert_eq!(summary.latest.hvac_status.as_deref(), Some("COOLING"));

    assert!(summarize(&[]).is_none());
}

#[test]
fn report_renders_selected_device() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("living_room.csv"), LOG).unwrap();
    let cfg = Config {
        output_dir: tmp.path().to_path_buf(),
        ..Config::default()
    };
    let options = ReportOptions {
        device: Some("Living Room".to_string()),
        start: None,
        end: None,
        rows: 2,
    };

    let text = render_report(&cfg, &options, day(17)).unwrap();
    assert!(text.contains("Readings from 2024-01-11 to 2024-01-17"));
    assert!(text.contains("Living Room"));
    assert!(text.contains("samples: 4"));
    assert!(text.contains("hvac active: 75% of samples"));

    let options = ReportOptions {
        device: Some("Garage".to_string()),
        ..options
    };
    let text = render_report(&cfg, &options, day(17)).unwrap();
    assert!(text.contains("No logs found"));
}
