//! Parsers for instance and solution text.

pub mod distances;
pub mod lines;
pub mod solomon;
pub mod solution;
pub mod vrplib;

pub use distances::reconstruct_distances;
pub use solomon::{parse_solomon, parse_solomon_with};
pub use solution::parse_solution;
pub use vrplib::{parse_instance, parse_instance_with};

/// Options shared by the instance parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Derive the edge weight matrix when the file does not give it explicitly.
    pub compute_edge_weights: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            compute_edge_weights: true,
        }
    }
}
