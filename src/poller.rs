//! One poll run: token → device list → per device (traits → row → CSV)
//!
//! A failed token refresh or device listing aborts the run. Anything that
//! goes wrong for a single device is logged, recorded in the
//! [`RunReport`] and the loop moves on to the next device.

use crate::config::Config;
use crate::csv_log::{append_record, sanitize_name};
use crate::error::{PollerError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::normalize::normalize;
use crate::sdm::{AccessToken, Device, DeviceApi, TokenProvider};
use crate::weather::{WeatherProvider, get_outdoor_temperature};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::PathBuf;

/// A row that reached disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenRow {
    pub device: String,
    pub path: PathBuf,
}

/// A device that was skipped this run
#[derive(Debug)]
pub struct DeviceFailure {
    pub device: String,
    pub error: PollerError,
}

/// Outcome of a completed run
#[derive(Debug, Default)]
pub struct RunReport {
    pub devices_seen: usize,
    pub written: Vec<WrittenRow>,
    pub failures: Vec<DeviceFailure>,
    pub outdoor_temp_f: Option<f64>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Poll pipeline with its collaborators injected
pub struct Poller<'a> {
    config: &'a Config,
    tokens: &'a dyn TokenProvider,
    devices: &'a dyn DeviceApi,
    weather: &'a dyn WeatherProvider,
    logger: StructuredLogger,
}

impl<'a> Poller<'a> {
    pub fn new(
        config: &'a Config,
        tokens: &'a dyn TokenProvider,
        devices: &'a dyn DeviceApi,
        weather: &'a dyn WeatherProvider,
    ) -> Self {
        Self {
            config,
            tokens,
            devices,
            weather,
            logger: get_logger("poller"),
        }
    }

    /// Run one poll for `poll_instant`.
    ///
    /// Returns `Err` only for fatal failures (auth, device listing). The
    /// access token is fetched here and dropped when the run ends.
    pub async fn run_once(&self, poll_instant: DateTime<Utc>) -> Result<RunReport> {
        let token = self.tokens.get_access_token().await?;
        let devices = self.devices.list_devices(&token).await?;

        let mut report = RunReport {
            devices_seen: devices.len(),
            ..RunReport::default()
        };
        if devices.is_empty() {
            self.logger.warn("No thermostat devices found.");
            return Ok(report);
        }

        report.outdoor_temp_f =
            get_outdoor_temperature(self.weather, self.config.weather.as_ref()).await;

        let names = log_names(&devices);
        for (device, log_name) in devices.iter().zip(names) {
            match self
                .poll_device(&token, device, &log_name, report.outdoor_temp_f, poll_instant)
                .await
            {
                Ok(path) => report.written.push(WrittenRow {
                    device: device.display_name.clone(),
                    path,
                }),
                Err(error) => report.failures.push(DeviceFailure {
                    device: device.display_name.clone(),
                    error,
                }),
            }
        }

        self.logger.info(&format!(
            "Run complete: {} device(s), {} row(s) written, {} skipped",
            report.devices_seen,
            report.written.len(),
            report.failures.len()
        ));
        Ok(report)
    }

    async fn poll_device(
        &self,
        token: &AccessToken,
        device: &Device,
        log_name: &str,
        outdoor_temp_f: Option<f64>,
        poll_instant: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let logger = self.logger.for_device(&device.display_name);

        let snapshot = match self.devices.get_traits(token, &device.id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                logger.warn(&format!("Skipping device: {}", e));
                return Err(e);
            }
        };

        let record = normalize(&snapshot, outdoor_temp_f, poll_instant, self.config);
        logger.debug(&format!("Prepared row: {:?}", record));

        match append_record(&self.config.output_dir, log_name, &record) {
            Ok(path) => {
                logger.info(&format!("Logged data to {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                logger.error(&format!("Failed to write row: {}", e));
                Err(e)
            }
        }
    }
}

/// Log name per device, in the order of `devices`.
///
/// When several devices slug to the same file name, the one with the lowest
/// device id keeps the plain name and the others get their short id
/// appended. Names are assigned in id order, so the mapping does not depend
/// on the order the API lists devices in.
pub fn log_names(devices: &[Device]) -> Vec<String> {
    let mut order: Vec<usize> = (0..devices.len()).collect();
    order.sort_by(|&a, &b| devices[a].id.cmp(&devices[b].id));

    let mut taken = HashSet::new();
    let mut names = vec![String::new(); devices.len()];
    for index in order {
        let device = &devices[index];
        let mut name = device.display_name.clone();
        if !taken.insert(sanitize_name(&name)) {
            name = format!("{} {}", device.display_name, device.short_id());
            taken.insert(sanitize_name(&name));
        }
        names[index] = name;
    }
    names
}
