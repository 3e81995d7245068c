//! VRPLIB reader and writer
//!
//! Reads and writes instance and solution files of vehicle routing
//! benchmarks in the VRPLIB convention and its Solomon VRPTW variant, and
//! reconstructs the edge weight matrix an instance declares.
//!
//! # Features
//!
//! - VRPLIB instances: specifications, data sections, depot lists
//! - Edge weights from coordinates (`EUC_2D`, `FLOOR_2D`, `EXACT_2D`) or
//!   explicit matrices (`FULL_MATRIX`, `LOWER_ROW`, Eilon flattening)
//! - Solomon VRPTW instances
//! - Solutions with routes and metadata
//! - Writers that read back to the same values
//!
//! # Example
//!
//! ```no_run
//! use vrplib_io::{read_instance, read_solution, InstanceFormat};
//!
//! let instance = read_instance("A-n32-k5.vrp", InstanceFormat::Vrplib).unwrap();
//! let solution = read_solution("A-n32-k5.sol").unwrap();
//!
//! println!("{}", instance.statistics());
//! println!("Solution cost: {:?}", solution.cost(&instance));
//! ```

pub mod batch;
pub mod error;
pub mod instance;
pub mod parse;
pub mod read;
pub mod solution;
pub mod value;
pub mod write;

pub use error::{Error, Result};
pub use instance::Instance;
pub use parse::{
    parse_instance, parse_instance_with, parse_solomon, parse_solomon_with, parse_solution,
    reconstruct_distances, ParseOptions,
};
pub use read::{read_instance, read_instance_with, read_solution, InstanceFormat};
pub use solution::{Solution, Visit};
pub use value::{infer_type, Number, Value};
pub use write::{format_instance, format_solution, write_instance, write_routes, write_solution};
