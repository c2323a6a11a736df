//! High-level facade crate for the `beacon-map-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry (`beacon_map::core`) and registration
//!   (`beacon_map::registration`) crates,
//! - a parser for the `--- scanner <id> ---` report format,
//! - JSON config/report helpers and the `beacon-map` command-line tool
//!   (feature `cli`).
//!
//! ## Quickstart
//!
//! ```no_run
//! use beacon_map::{io::load_scanners, register, RegistrationParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scanners = load_scanners("scanners.txt")?;
//! let result = register(scanners, RegistrationParams::default())?;
//! println!("{} unique beacons", result.beacon_count());
//! # Ok(())
//! # }
//! ```

pub use beacon_map_core as core;
pub use beacon_map_registration as registration;

pub mod io;
pub mod parse;

pub use beacon_map_core::{Alignment, Coordinate, Rotation, Scanner, ScannerId};
pub use beacon_map_registration::{
    register, Registration, RegistrationError, RegistrationParams, RegistrationResult,
    ScannerPlacement,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the facade helpers and the CLI.
#[derive(thiserror::Error, Debug)]
pub enum BeaconMapError {
    #[error(transparent)]
    Io(#[from] io::BeaconMapIoError),

    #[error(transparent)]
    Parse(#[from] parse::ParseError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Parse a scanner report and register it end to end.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(bytes = input.len())))]
pub fn register_report(
    input: &str,
    params: RegistrationParams,
) -> Result<RegistrationResult, BeaconMapError> {
    let scanners = parse::parse_scanners(input)?;
    Ok(register(scanners, params)?)
}

/// Number of unique beacons in a scanner report, with default parameters.
pub fn count_beacons(input: &str) -> Result<usize, BeaconMapError> {
    Ok(register_report(input, RegistrationParams::default())?.beacon_count())
}
