//! Command line and boundary file configuration.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use fenceline_core::alert::DEFAULT_ALERT_DURATION;
use fenceline_core::geo::Boundary;
use fenceline_core::proximity::{
    Thresholds, DEFAULT_DEBOUNCE, DEFAULT_NEAR_DISTANCE, DEFAULT_RED_DISTANCE,
};

const BOUNDARY_FILE_NAME: &str = "boundary.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no boundary file given and no configuration directory could be determined")]
    NoConfigDir,
    #[error("cannot read boundary file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse boundary file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Boundary definition (JSON). Defaults to boundary.json in the user config directory
    #[arg(short, long)]
    pub boundary: Option<PathBuf>,

    /// Position samples as JSON lines; "-" or absent reads stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Near zone distance in meters (inclusive)
    #[arg(long, default_value_t = DEFAULT_NEAR_DISTANCE)]
    pub near: f64,

    /// Crossed zone distance in meters (exclusive)
    #[arg(long, default_value_t = DEFAULT_RED_DISTANCE)]
    pub red: f64,

    /// Minimum time between zone changes in milliseconds
    #[arg(long, default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64)]
    pub debounce_ms: u64,

    /// Vibration length in milliseconds
    #[arg(long, default_value_t = DEFAULT_ALERT_DURATION.as_millis() as u64)]
    pub alert_ms: u64,

    /// Program to run on every alert; receives the duration in ms as last argument
    #[arg(long)]
    pub alert_command: Option<String>,

    /// Serve the JSON status API on this port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Where position samples come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

/// Contents of the boundary definition file
///
/// The endpoints are validated while parsing, so a loaded file always holds
/// a usable [`Boundary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub boundary: Boundary,
}

impl BoundaryFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub boundary_path: PathBuf,
    pub boundary_file: BoundaryFile,
    pub boundary: Boundary,
    pub thresholds: Thresholds,
    pub alert_duration: Duration,
    pub alert_command: Option<String>,
    pub input: InputSource,
    pub port: Option<u16>,
}

impl Cli {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            near_distance: self.near,
            red_distance: self.red,
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }

    pub fn input_source(&self) -> InputSource {
        match &self.input {
            Some(path) if path.as_path() != Path::new("-") => InputSource::File(path.clone()),
            _ => InputSource::Stdin,
        }
    }

    pub fn boundary_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.boundary {
            Some(path) => Ok(path.clone()),
            None => default_boundary_path().ok_or(ConfigError::NoConfigDir),
        }
    }

    /// Resolve paths and load the boundary file
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let boundary_path = self.boundary_path()?;
        log::debug!("Loading boundary from {}", boundary_path.display());

        let boundary_file = BoundaryFile::load(&boundary_path)?;

        Ok(Settings {
            boundary_path,
            boundary: boundary_file.boundary,
            boundary_file,
            thresholds: self.thresholds(),
            alert_duration: Duration::from_millis(self.alert_ms),
            alert_command: self.alert_command.clone(),
            input: self.input_source(),
            port: self.port,
        })
    }
}

/// `<config dir>/fenceline/boundary.json` for the current user
pub fn default_boundary_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "Fenceline", "fenceline")
        .map(|dirs| dirs.config_dir().join(BOUNDARY_FILE_NAME))
}
