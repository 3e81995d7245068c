//! Module representing parsed VRPLIB instances.
//!
//! An instance is an ordered mapping from lower-case field names to typed
//! values. Specifications come first, then data sections, in file order.
//! Typed accessors cover the fields shared by most benchmark sets.

use crate::value::{Number, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use statrs::statistics::Statistics;

/// A parsed instance: field name to value, in insertion order.
///
/// Equality compares fields by name and ignores their order.
#[derive(Debug, Clone, Default)]
pub struct Instance {
    fields: Vec<(String, Value)>,
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Instance {
    pub fn new() -> Self {
        Instance { fields: Vec::new() }
    }

    /// Get the value stored under `key` (lower-case)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Insert a field, replacing an existing value in place.
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn comment(&self) -> Option<&str> {
        self.get("comment").and_then(Value::as_str)
    }

    pub fn edge_weight_type(&self) -> Option<&str> {
        self.get("edge_weight_type").and_then(Value::as_str)
    }

    pub fn edge_weight_format(&self) -> Option<&str> {
        self.get("edge_weight_format").and_then(Value::as_str)
    }

    /// Declared `DIMENSION`, if present and a non-negative integer
    pub fn dimension(&self) -> Option<usize> {
        self.get("dimension")
            .and_then(Value::as_i64)
            .and_then(|d| usize::try_from(d).ok())
    }

    pub fn capacity(&self) -> Option<f64> {
        self.get("capacity").and_then(Value::as_f64)
    }

    /// Zero-based depot indices.
    pub fn depots(&self) -> Option<Vec<usize>> {
        self.get("depot")?
            .as_vector()?
            .iter()
            .map(|n| n.as_i64().and_then(|v| usize::try_from(v).ok()))
            .collect()
    }

    pub fn node_coords(&self) -> Option<&[Vec<Number>]> {
        self.get("node_coord").and_then(Value::as_rows)
    }

    /// Single-dimensional demands.
    pub fn demands(&self) -> Option<Vec<f64>> {
        self.get("demand")
            .and_then(Value::as_vector)
            .map(|values| values.iter().map(|n| n.as_f64()).collect())
    }

    /// Full edge weight matrix, once reconstructed.
    pub fn edge_weights(&self) -> Option<&[Vec<Number>]> {
        self.get("edge_weight").and_then(Value::as_rows)
    }

    /// Edge weight between two nodes as `f64`
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> Option<f64> {
        self.edge_weights()?.get(i)?.get(j).map(|n| n.as_f64())
    }

    /// Number of nodes: declared dimension, or the row count of the coordinates
    /// or edge weights when the dimension is not declared.
    pub fn num_nodes(&self) -> usize {
        self.dimension()
            .or_else(|| self.node_coords().map(<[_]>::len))
            .or_else(|| self.edge_weights().map(<[_]>::len))
            .unwrap_or(0)
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let total_demand = match self.get("demand") {
            Some(Value::Vector(values)) => values.iter().map(|n| n.as_f64()).sum(),
            Some(Value::Matrix(rows)) | Some(Value::Ragged(rows)) => {
                rows.iter().flatten().map(|n| n.as_f64()).sum()
            }
            _ => 0.0,
        };

        let mut distances: Vec<f64> = Vec::new();
        if let Some(matrix) = self.edge_weights() {
            for (i, row) in matrix.iter().enumerate() {
                for (j, value) in row.iter().enumerate() {
                    if i != j {
                        distances.push(value.as_f64());
                    }
                }
            }
        }

        let (avg_distance, std_distance, max_distance) = if distances.is_empty() {
            (None, None, None)
        } else {
            let max = distances.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let std = if distances.len() > 1 {
                Some(distances.iter().std_dev())
            } else {
                None
            };
            (Some(distances.iter().mean()), std, Some(max))
        };

        InstanceStatistics {
            name: self.name().unwrap_or("<unnamed>").to_string(),
            num_nodes: self.num_nodes(),
            num_depots: self.depots().map(|d| d.len()).unwrap_or(0),
            capacity: self.capacity(),
            total_demand,
            avg_distance,
            std_distance,
            max_distance,
        }
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Instance {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut instance = Instance::new();
        for (key, value) in iter {
            instance.insert(key, value);
        }
        instance
    }
}

/// Statistics about an instance
#[derive(Debug, Clone, serde::Serialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub num_nodes: usize,
    pub num_depots: usize,
    pub capacity: Option<f64>,
    pub total_demand: f64,
    pub avg_distance: Option<f64>,
    pub std_distance: Option<f64>,
    pub max_distance: Option<f64>,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn opt(value: Option<f64>) -> String {
            value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
        }

        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Nodes: {} ({} depots)", self.num_nodes, self.num_depots)?;
        writeln!(f, "  Capacity: {}", opt(self.capacity))?;
        writeln!(f, "  Total demand: {:.2}", self.total_demand)?;
        writeln!(f, "  Avg distance: {}", opt(self.avg_distance))?;
        writeln!(f, "  Std distance: {}", opt(self.std_distance))?;
        writeln!(f, "  Max distance: {}", opt(self.max_distance))
    }
}
