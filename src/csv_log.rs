//! Append-only per-device CSV logs
//!
//! One file per thermostat, `<slug>.csv` under the output directory. The
//! header is written only when the file is created; existing rows are never
//! touched.

use crate::error::{PollerError, Result};
use crate::logging::get_logger;
use crate::record::ReadingRecord;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Filesystem-safe slug of a device name.
///
/// Runs of non-alphanumeric characters collapse to one `_`, leading and
/// trailing separators are dropped and the result is lower-cased.
pub fn sanitize_name(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    if slug.is_empty() {
        "thermostat".to_string()
    } else {
        slug
    }
}

/// Path of the log for `device_name` under `output_dir`
pub fn log_path(output_dir: &Path, device_name: &str) -> PathBuf {
    output_dir.join(format!("{}.csv", sanitize_name(device_name)))
}

/// Append `record` to the device's log, creating it with a header if needed.
///
/// The file handle lives only inside this call; it is flushed before
/// returning and closed on every path out.
pub fn append_record(
    output_dir: &Path,
    device_name: &str,
    record: &ReadingRecord,
) -> Result<PathBuf> {
    let path = log_path(output_dir, device_name);
    let fail = |e: &dyn std::fmt::Display| {
        PollerError::csv_write(path.display().to_string(), e.to_string())
    };

    std::fs::create_dir_all(output_dir).map_err(|e| fail(&e))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| fail(&e))?;
    // A zero-length file (e.g. left by an interrupted first run) still needs its header
    let is_new = file.metadata().map_err(|e| fail(&e))?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    writer.serialize(record).map_err(|e| fail(&e))?;
    writer.flush().map_err(|e| fail(&e))?;

    get_logger("csv").debug(&format!(
        "Appended row for {} to {}{}",
        device_name,
        path.display(),
        if is_new { " (new file)" } else { "" }
    ));
    Ok(path)
}
