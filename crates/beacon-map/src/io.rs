//! JSON configuration and report helpers.

use crate::{parse::parse_scanners, BeaconMapError};
use beacon_map_core::{Coordinate, Scanner};
use beacon_map_registration::{RegistrationParams, RegistrationResult, ScannerPlacement};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum BeaconMapIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Read and parse a scanner report file.
pub fn load_scanners(path: impl AsRef<Path>) -> Result<Vec<Scanner>, BeaconMapError> {
    let raw = fs::read_to_string(path).map_err(BeaconMapIoError::from)?;
    Ok(parse_scanners(&raw)?)
}

/// Registration overrides loaded from JSON. Missing fields keep the
/// [`RegistrationParams`] defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationConfig {
    #[serde(default)]
    pub min_neighbor_matches: Option<usize>,
    #[serde(default)]
    pub min_shared_beacons: Option<usize>,
    #[serde(default)]
    pub parallel: Option<bool>,
}

impl RegistrationConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BeaconMapIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BeaconMapIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Build registration parameters, applying overrides from the config.
    pub fn build_params(&self) -> RegistrationParams {
        let mut params = RegistrationParams::default();
        if let Some(min_neighbor_matches) = self.min_neighbor_matches {
            params.min_neighbor_matches = min_neighbor_matches;
        }
        if let Some(min_shared_beacons) = self.min_shared_beacons {
            params.min_shared_beacons = min_shared_beacons;
        }
        if let Some(parallel) = self.parallel {
            params.parallel = parallel;
        }
        params
    }
}

/// Serializable summary of a finished registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReport {
    #[serde(default)]
    pub input: Option<String>,
    pub beacon_count: usize,
    pub rounds: usize,
    pub placements: Vec<ScannerPlacement>,
    pub beacons: Vec<Coordinate>,
}

impl RegistrationReport {
    pub fn new(input: Option<String>, result: &RegistrationResult) -> Self {
        Self {
            input,
            beacon_count: result.beacon_count(),
            rounds: result.rounds,
            placements: result.placements.clone(),
            beacons: result.sorted_beacons(),
        }
    }

    pub fn to_json(&self) -> Result<String, BeaconMapIoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BeaconMapIoError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
