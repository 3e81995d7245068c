//! Reading instances and solutions from files.

use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::parse::{parse_instance_with, parse_solomon_with, parse_solution, ParseOptions};
use crate::solution::Solution;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Instance file conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstanceFormat {
    #[default]
    Vrplib,
    Solomon,
}

impl FromStr for InstanceFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "vrplib" => Ok(InstanceFormat::Vrplib),
            "solomon" => Ok(InstanceFormat::Solomon),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Reads the instance at `path`.
pub fn read_instance<P: AsRef<Path>>(path: P, format: InstanceFormat) -> Result<Instance> {
    read_instance_with(path, format, &ParseOptions::default())
}

pub fn read_instance_with<P: AsRef<Path>>(
    path: P,
    format: InstanceFormat,
    options: &ParseOptions,
) -> Result<Instance> {
    let path = path.as_ref();
    log::debug!("reading {:?} instance from {}", format, path.display());
    let text = fs::read_to_string(path)?;

    match format {
        InstanceFormat::Vrplib => parse_instance_with(&text, options),
        InstanceFormat::Solomon => parse_solomon_with(&text, options),
    }
}

/// Reads the solution at `path`.
pub fn read_solution<P: AsRef<Path>>(path: P) -> Result<Solution> {
    let text = fs::read_to_string(path)?;
    Ok(parse_solution(&text))
}
