//! Solution representation for VRPLIB solution files.
//!
//! A solution holds the routes, each an ordered list of visited nodes with
//! the depot left implicit, and scalar metadata such as `cost` or `time`.

use crate::instance::Instance;
use crate::value::Value;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// One entry of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Visit {
    /// Customer index
    Node(usize),
    /// Non-numeric token, e.g. `|` for a reload at the depot
    Marker(String),
}

impl fmt::Display for Visit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visit::Node(node) => write!(f, "{}", node),
            Visit::Marker(marker) => f.write_str(marker),
        }
    }
}

/// Represents a solution read from or written to a solution file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    pub routes: Vec<Vec<Visit>>,
    metadata: Vec<(String, Value)>,
}

impl Solution {
    /// Create a solution from routes of customer indices
    pub fn new(routes: Vec<Vec<usize>>) -> Self {
        Solution {
            routes: routes
                .into_iter()
                .map(|route| route.into_iter().map(Visit::Node).collect())
                .collect(),
            metadata: Vec::new(),
        }
    }

    /// Get a metadata value (keys are lower-case)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert a metadata value, replacing an existing one in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.metadata.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.metadata.push((key, value));
                None
            }
        }
    }

    pub fn metadata(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.metadata.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The `cost` metadata, if numeric
    pub fn declared_cost(&self) -> Option<f64> {
        self.get("cost").and_then(Value::as_f64)
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of customer visits over all routes
    pub fn num_visits(&self) -> usize {
        self.routes
            .iter()
            .flatten()
            .filter(|visit| matches!(visit, Visit::Node(_)))
            .count()
    }

    /// Calculate the total travel cost on the edge weights of `instance`.
    ///
    /// Every route starts and ends at the first depot (node 0 when the
    /// instance declares none); markers are treated as a return to that
    /// depot. Returns `None` when the instance has no edge weights or a
    /// route visits a node outside the matrix.
    pub fn cost(&self, instance: &Instance) -> Option<f64> {
        let depot = instance
            .depots()
            .and_then(|depots| depots.first().copied())
            .unwrap_or(0);

        let mut total = 0.0;
        for route in &self.routes {
            let mut prev = depot;
            for visit in route {
                let next = match visit {
                    Visit::Node(node) => *node,
                    Visit::Marker(_) => depot,
                };
                total += instance.distance(prev, next)?;
                prev = next;
            }
            total += instance.distance(prev, depot)?;
        }

        Some(total)
    }
}

impl Serialize for Solution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.metadata.len() + 1))?;
        map.serialize_entry("routes", &self.routes)?;
        for (key, value) in &self.metadata {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution ({} routes, {} visits)", self.num_routes(), self.num_visits())?;
        for (key, value) in self.metadata() {
            writeln!(f, "  {}: {}", key, value)?;
        }
        Ok(())
    }
}
