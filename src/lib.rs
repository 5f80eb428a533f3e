//! # Thermolog - Nest thermostat data logger
//!
//! Polls every thermostat in a Google Smart Device Management project,
//! optionally enriches the readings with the outdoor temperature from the
//! National Weather Service, and appends one row per device per run to
//! append-only CSV logs. A read-only report command summarizes the logs.
//!
//! ## Architecture
//!
//! - `config`: JSON configuration loading and validation
//! - `logging`: Structured logging and tracing
//! - `sdm`: OAuth token refresh and the Smart Device Management client
//! - `weather`: Outdoor temperature from api.weather.gov
//! - `normalize`: Unit conversion, setpoint selection, local timestamps
//! - `record`: The persisted row and its CSV layout
//! - `csv_log`: Per-device append-only CSV files
//! - `poller`: One poll run over all devices
//! - `history`: Reading logs back for reports
//! - `cli`: Command-line arguments and the text report

pub mod cli;
pub mod config;
pub mod csv_log;
pub mod error;
pub mod history;
pub mod logging;
pub mod normalize;
pub mod poller;
pub mod record;
pub mod sdm;
pub mod weather;

// Re-export commonly used types
pub use config::Config;
pub use error::{PollerError, Result};
pub use poller::{Poller, RunReport};
pub use record::{HvacStatus, ReadingRecord};
