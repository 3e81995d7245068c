//! Error kinds raised while reading, reconstructing and writing VRPLIB data.

use std::io;
use thiserror::Error as ThisError;

/// Errors produced by the parsers, the distance reconstruction and the writers.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A line violates the VRPLIB grammar (stray line, specification after a section, bad token).
    #[error("malformed VRPLIB instance: {0}")]
    MalformedInstance(String),
    /// The depot section is missing its `-1` terminator or is too short.
    #[error("malformed depot section: {0}")]
    MalformedDepotSection(String),
    /// A structural line of a Solomon file does not match the expected layout.
    #[error("malformed Solomon instance: expected {expected}, got '{actual}'")]
    MalformedSolomonInstance { expected: String, actual: String },
    #[error("unknown edge weight type '{0}'")]
    UnknownEdgeWeightType(String),
    #[error("{}", unknown_format_message(.0))]
    UnknownEdgeWeightFormat(Option<String>),
    /// A 2-D edge weight type was requested but there is no `node_coord` table.
    #[error("cannot compute Euclidean distances because node coordinates are not provided")]
    MissingCoordinates,
    /// A name is used both as specification and as section.
    #[error("{} is used both as specification and section", .0.to_uppercase())]
    DuplicateField(String),
    /// A specification required to derive a value is absent.
    #[error("missing specification '{}'", .0.to_uppercase())]
    MissingSpecification(String),
    /// Route number (1-based) that has no visits.
    #[error("route #{0} is empty")]
    EmptyRoute(usize),
    #[error("instance format '{0}' not known")]
    UnknownFormat(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn unknown_format_message(format: &Option<String>) -> String {
    match format {
        Some(format) => format!("unknown edge weight format '{}'", format),
        None => "explicit edge weights without an edge weight format".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
