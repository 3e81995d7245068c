//! Writers for VRPLIB instances and solutions.
//!
//! Scalars are written as `KEY: VALUE` lines, tables as `KEY_SECTION` blocks
//! with one row per line, prefixed by the 1-based row index. The edge weight
//! and depot sections carry no index. Values are written as stored, never
//! rounded or recomputed.

use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::parse::distances::ExplicitLayout;
use crate::parse::lines::EOF_MARKER;
use crate::parse::vrplib::{DEPOT_SENTINEL, SECTION_SUFFIX};
use crate::solution::{Solution, Visit};
use crate::value::{Number, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `instance` to `path` in the VRPLIB format.
pub fn write_instance<P: AsRef<Path>>(path: P, instance: &Instance) -> Result<()> {
    write_text(path.as_ref(), &format_instance(instance))
}

/// Writes the routes and metadata of `solution` to `path`.
pub fn write_solution<P: AsRef<Path>>(path: P, solution: &Solution) -> Result<()> {
    write_text(path.as_ref(), &format_solution(solution)?)
}

/// Writes `routes` followed by `metadata` to `path`, for callers that do not
/// hold a [`Solution`].
pub fn write_routes<P, K>(path: P, routes: &[Vec<Visit>], metadata: &[(K, Value)]) -> Result<()>
where
    P: AsRef<Path>,
    K: AsRef<str>,
{
    let mut solution = Solution::default();
    solution.routes = routes.to_vec();
    for (key, value) in metadata {
        solution.insert(key.as_ref(), value.clone());
    }
    write_solution(path, &solution)
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    log::debug!("wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

/// Formats `instance` as VRPLIB text: all specifications, then all sections,
/// then the end-of-file marker.
pub fn format_instance(instance: &Instance) -> String {
    let mut out = String::new();

    for (key, value) in instance.iter().filter(|(_, v)| v.is_scalar()) {
        out.push_str(&format!("{}: {}\n", key.to_uppercase(), value));
    }

    for (key, value) in instance.iter().filter(|(_, v)| !v.is_scalar()) {
        out.push_str(&format!("{}{}\n", key.to_uppercase(), SECTION_SUFFIX));
        match key {
            "depot" => format_depot(&mut out, value),
            "edge_weight" => format_edge_weight(&mut out, value, instance),
            _ => format_indexed(&mut out, value),
        }
    }

    out.push_str(EOF_MARKER);
    out.push('\n');
    out
}

fn join(row: &[Number]) -> String {
    row.iter()
        .map(Number::to_string)
        .collect::<Vec<_>>()
        .join("\t")
}

fn format_indexed(out: &mut String, value: &Value) {
    match value {
        Value::Vector(values) => {
            for (idx, v) in values.iter().enumerate() {
                out.push_str(&format!("{}\t{}\n", idx + 1, v));
            }
        }
        Value::Matrix(rows) | Value::Ragged(rows) => {
            for (idx, row) in rows.iter().enumerate() {
                if row.is_empty() {
                    out.push_str(&format!("{}\n", idx + 1));
                } else {
                    out.push_str(&format!("{}\t{}\n", idx + 1, join(row)));
                }
            }
        }
        _ => {}
    }
}

/// Depots are stored zero-based; the file holds 1-based indices and a terminator.
fn format_depot(out: &mut String, value: &Value) {
    if let Value::Vector(depots) = value {
        for depot in depots {
            match depot {
                Number::Int(idx) => {
                    out.push_str(&format!("{}\n", idx + 1));
                }
                Number::Float(idx) => {
                    out.push_str(&format!("{:?}\n", idx + 1.0));
                }
            }
        }
    } else {
        format_indexed(out, value);
        return;
    }
    out.push_str(&format!("{}\n", DEPOT_SENTINEL));
}

/// Edge weights are written in the layout the instance declares, so that
/// reading the file back yields the same matrix.
fn format_edge_weight(out: &mut String, value: &Value, instance: &Instance) {
    let rows = match value.as_rows() {
        Some(rows) => rows,
        None => return format_indexed(out, value),
    };

    match ExplicitLayout::of(instance).ok().flatten() {
        Some(ExplicitLayout::LowerRow) => {
            for (i, row) in rows.iter().enumerate().skip(1) {
                out.push_str(&format!("{}\n", join(&row[..i.min(row.len())])));
            }
        }
        Some(ExplicitLayout::EilonFlattened) => {
            for (i, row) in rows.iter().enumerate() {
                if i + 1 < row.len() {
                    out.push_str(&format!("{}\n", join(&row[i + 1..])));
                }
            }
        }
        Some(ExplicitLayout::FullMatrix) | None => {
            for row in rows {
                out.push_str(&format!("{}\n", join(row)));
            }
        }
    }
}

/// Formats routes as `Route #n: ...` lines followed by `key: value` metadata.
/// Fails on an empty route.
pub fn format_solution(solution: &Solution) -> Result<String> {
    let mut out = String::new();

    for (idx, route) in solution.routes.iter().enumerate() {
        if route.is_empty() {
            return Err(Error::EmptyRoute(idx + 1));
        }
        let visits = route
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!("Route #{}: {}\n", idx + 1, visits));
    }

    for (key, value) in solution.metadata() {
        out.push_str(&format!("{}: {}\n", key, value));
    }

    Ok(out)
}
