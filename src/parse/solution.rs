//! Parser for VRPLIB solution files.
//!
//! Routes appear as `Route #n: node node ...`, with 0-based customer indices
//! (the depot is implicit) or string markers such as `|` for reloads. Every
//! other line is a `key: value` or `key value` pair. Lines matching neither
//! are skipped.

use super::lines::significant_lines;
use crate::solution::{Solution, Visit};
use crate::value::infer_type;

pub const ROUTE_MARKER: &str = "Route";

pub fn parse_solution(text: &str) -> Solution {
    let mut solution = Solution::default();

    for line in significant_lines(text) {
        if let Some(route) = parse_route(line) {
            solution.routes.push(route);
        } else if let Some((key, value)) = split_key_value(line) {
            solution.insert(key.to_lowercase(), infer_type(value));
        } else {
            log::debug!("skipping solution line '{}'", line);
        }
    }

    solution
}

fn parse_route(line: &str) -> Option<Vec<Visit>> {
    if line.split_whitespace().next() != Some(ROUTE_MARKER) {
        return None;
    }
    let (_, visits) = line.split_once(':')?;

    Some(
        visits
            .split_whitespace()
            .map(|token| match token.parse::<usize>() {
                Ok(node) => Visit::Node(node),
                Err(_) => Visit::Marker(token.to_string()),
            })
            .collect(),
    )
}

/// Splits at the first colon, or at the first whitespace when there is no colon.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line
        .split_once(':')
        .or_else(|| line.split_once(char::is_whitespace))?;
    Some((key.trim(), value.trim()))
}
