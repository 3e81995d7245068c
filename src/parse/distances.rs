//! Reconstruction of the full edge weight matrix from the instance metadata.
//!
//! The `EDGE_WEIGHT_TYPE` specification decides between a Euclidean matrix
//! computed from `node_coord` and an explicit matrix given in the
//! `EDGE_WEIGHT_SECTION`, whose encoding `EDGE_WEIGHT_FORMAT` describes.

use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::value::{Number, Value};

/// Substring of the Euclidean edge weight types.
pub const TWO_D_MARKER: &str = "2D";
pub const EXPLICIT: &str = "EXPLICIT";
pub const FULL_MATRIX: &str = "FULL_MATRIX";
pub const LOWER_ROW: &str = "LOWER_ROW";

/// The Eilon instances declare `LOWER_ROW` but store a column-wise flattening.
/// They are recognised by this marker in their `COMMENT`.
pub const EILON_COMMENT_MARKER: &str = "Eilon";

/// Rounding applied to Euclidean distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// `EUC_2D`: nearest integer, halves away from zero.
    Nearest,
    /// `FLOOR_2D`
    Floor,
    /// `EXACT_2D`: no rounding.
    Exact,
}

impl Rounding {
    pub fn from_edge_weight_type(edge_weight_type: &str) -> Option<Rounding> {
        match edge_weight_type {
            "EUC_2D" => Some(Rounding::Nearest),
            "FLOOR_2D" => Some(Rounding::Floor),
            "EXACT_2D" => Some(Rounding::Exact),
            _ => None,
        }
    }

    #[inline]
    pub fn apply(self, distance: f64) -> f64 {
        match self {
            Rounding::Nearest => distance.round(),
            Rounding::Floor => distance.floor(),
            Rounding::Exact => distance,
        }
    }
}

/// How an explicit edge weight section is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplicitLayout {
    FullMatrix,
    /// Strict lower triangle, row `i` holding `i` entries.
    LowerRow,
    /// Eilon data: upper triangle flattened in row-major order, ignoring line breaks.
    EilonFlattened,
}

impl ExplicitLayout {
    /// Layout of the edge weights of `specs`, `None` for coordinate-derived types.
    pub fn of(specs: &Instance) -> Result<Option<ExplicitLayout>> {
        let edge_weight_type = edge_weight_type(specs)?;
        if edge_weight_type.contains(TWO_D_MARKER) {
            return Ok(None);
        }
        if edge_weight_type != EXPLICIT {
            return Err(Error::UnknownEdgeWeightType(edge_weight_type));
        }

        match specs.get("edge_weight_format").map(Value::to_string) {
            Some(format) if format == FULL_MATRIX => Ok(Some(ExplicitLayout::FullMatrix)),
            Some(format) if format == LOWER_ROW => {
                if is_eilon(specs) {
                    Ok(Some(ExplicitLayout::EilonFlattened))
                } else {
                    Ok(Some(ExplicitLayout::LowerRow))
                }
            }
            Some(format) => Err(Error::UnknownEdgeWeightFormat(Some(format))),
            None => Err(Error::UnknownEdgeWeightFormat(None)),
        }
    }
}

/// Derives the full N×N edge weight matrix.
///
/// `specs` holds the specifications (and `node_coord` for the Euclidean
/// types), `rows` the raw body of the edge weight section, which is empty
/// when the instance has none.
pub fn reconstruct_distances(specs: &Instance, rows: &[Vec<Number>]) -> Result<Vec<Vec<Number>>> {
    match ExplicitLayout::of(specs)? {
        None => {
            let edge_weight_type = edge_weight_type(specs)?;
            let rounding = Rounding::from_edge_weight_type(&edge_weight_type)
                .ok_or_else(|| Error::UnknownEdgeWeightType(edge_weight_type.clone()))?;
            let coords = specs.node_coords().ok_or(Error::MissingCoordinates)?;

            if !rows.is_empty() {
                log::warn!(
                    "ignoring explicit edge weights, {} distances are computed from coordinates",
                    edge_weight_type
                );
            }
            Ok(pairwise_euclidean(coords, rounding))
        }
        Some(ExplicitLayout::FullMatrix) => from_full_matrix(rows),
        Some(ExplicitLayout::LowerRow) => from_lower_row(rows),
        Some(ExplicitLayout::EilonFlattened) => {
            log::debug!("reading LOWER_ROW edge weights as Eilon flattened columns");
            from_eilon(rows)
        }
    }
}

fn edge_weight_type(specs: &Instance) -> Result<String> {
    specs
        .get("edge_weight_type")
        .map(Value::to_string)
        .ok_or_else(|| Error::MissingSpecification("edge_weight_type".to_string()))
}

fn is_eilon(specs: &Instance) -> bool {
    specs
        .comment()
        .map(|comment| comment.contains(EILON_COMMENT_MARKER))
        .unwrap_or(false)
}

/// Compute the symmetric Euclidean distance matrix of `coords`.
pub fn pairwise_euclidean(coords: &[Vec<Number>], rounding: Rounding) -> Vec<Vec<Number>> {
    let n = coords.len();
    let mut matrix = vec![vec![Number::Float(0.0); n]; n];

    for i in 0..n {
        for j in i + 1..n {
            let squared: f64 = coords[i]
                .iter()
                .zip(&coords[j])
                .map(|(a, b)| (a.as_f64() - b.as_f64()).powi(2))
                .sum();
            let distance = Number::Float(rounding.apply(squared.sqrt()));
            matrix[i][j] = distance;
            matrix[j][i] = distance;
        }
    }

    matrix
}

fn from_full_matrix(rows: &[Vec<Number>]) -> Result<Vec<Vec<Number>>> {
    let n = rows.len();
    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
        return Err(Error::MalformedInstance(format!(
            "FULL_MATRIX row {} has {} entries, expected {}",
            idx + 1,
            row.len(),
            n
        )));
    }
    Ok(rows.to_vec())
}

/// Full matrix from a strict lower triangle: entry `j` of row `i` is the
/// weight between nodes `i + 1` and `j`.
fn from_lower_row(rows: &[Vec<Number>]) -> Result<Vec<Vec<Number>>> {
    let n = rows.len() + 1;
    let mut matrix = vec![vec![Number::Int(0); n]; n];

    for (i, row) in rows.iter().enumerate() {
        if row.len() != i + 1 {
            return Err(Error::MalformedInstance(format!(
                "LOWER_ROW row {} has {} entries, expected {}",
                i + 1,
                row.len(),
                i + 1
            )));
        }
        for (j, &weight) in row.iter().enumerate() {
            matrix[i + 1][j] = weight;
            matrix[j][i + 1] = weight;
        }
    }

    Ok(matrix)
}

/// Full matrix from the Eilon encoding: the rows concatenated fill the pairs
/// (0, 1), (0, 2), ..., (0, n-1), (1, 2), ... in that order.
fn from_eilon(rows: &[Vec<Number>]) -> Result<Vec<Vec<Number>>> {
    let flattened: Vec<Number> = rows.iter().flatten().copied().collect();
    let n = triangular_root(flattened.len()).ok_or_else(|| {
        Error::MalformedInstance(format!(
            "{} Eilon edge weights do not fill a triangular matrix",
            flattened.len()
        ))
    })?;

    let mut matrix = vec![vec![Number::Int(0); n]; n];
    let pairs = (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j)));
    for ((i, j), weight) in pairs.zip(flattened) {
        matrix[i][j] = weight;
        matrix[j][i] = weight;
    }

    Ok(matrix)
}

/// The `n` with `n * (n - 1) / 2 == count`, if there is one.
fn triangular_root(count: usize) -> Option<usize> {
    let n = ((2 * count) as f64).sqrt() as usize + 1;
    (n * (n - 1) / 2 == count).then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ints(rows: &[&[i64]]) -> Vec<Vec<Number>> {
        rows.iter()
            .map(|row| row.iter().map(|&v| Number::Int(v)).collect())
            .collect()
    }

    fn as_f64(matrix: &[Vec<Number>]) -> Vec<Vec<f64>> {
        matrix
            .iter()
            .map(|row| row.iter().map(|n| n.as_f64()).collect())
            .collect()
    }

    fn specs(entries: &[(&str, &str)]) -> Instance {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::Str(v.to_string())))
            .collect()
    }

    fn with_coords(edge_weight_type: &str, coords: &[&[i64]]) -> Instance {
        let mut instance = specs(&[("edge_weight_type", edge_weight_type)]);
        instance.insert("node_coord", Value::Matrix(ints(coords)));
        instance
    }

    #[test]
    fn test_lower_row_reconstruction() {
        let specs = specs(&[("edge_weight_type", "EXPLICIT"), ("edge_weight_format", "LOWER_ROW")]);
        let rows = ints(&[&[1], &[2, 3], &[4, 5, 6]]);

        let matrix = reconstruct_distances(&specs, &rows).unwrap();

        assert_eq!(
            matrix,
            ints(&[&[0, 1, 2, 4], &[1, 0, 3, 5], &[2, 3, 0, 6], &[4, 5, 6, 0]])
        );
    }

    #[test]
    fn test_eilon_reconstruction() {
        let specs = specs(&[
            ("edge_weight_type", "EXPLICIT"),
            ("edge_weight_format", "LOWER_ROW"),
            ("comment", "(Eilon et al, Min no of trucks: 4, Optimal value: 247)"),
        ]);
        let rows = ints(&[&[1, 2, 3, 4], &[5, 6]]);

        let matrix = reconstruct_distances(&specs, &rows).unwrap();

        assert_eq!(
            matrix,
            ints(&[&[0, 1, 2, 3], &[1, 0, 4, 5], &[2, 4, 0, 6], &[3, 5, 6, 0]])
        );
    }

    #[test]
    fn test_eilon_requires_triangular_count() {
        let specs = specs(&[
            ("edge_weight_type", "EXPLICIT"),
            ("edge_weight_format", "LOWER_ROW"),
            ("comment", "Eilon"),
        ]);
        let rows = ints(&[&[1, 2, 3, 4]]);

        assert!(matches!(
            reconstruct_distances(&specs, &rows),
            Err(Error::MalformedInstance(_))
        ));
    }

    #[test]
    fn test_short_lower_row_is_rejected() {
        let specs = specs(&[("edge_weight_type", "EXPLICIT"), ("edge_weight_format", "LOWER_ROW")]);
        let rows = ints(&[&[1], &[2]]);

        assert!(matches!(
            reconstruct_distances(&specs, &rows),
            Err(Error::MalformedInstance(_))
        ));
    }

    #[test]
    fn test_full_matrix_is_kept() {
        let specs = specs(&[
            ("edge_weight_type", "EXPLICIT"),
            ("edge_weight_format", "FULL_MATRIX"),
        ]);
        let rows = ints(&[&[0, 7], &[9, 0]]);

        assert_eq!(reconstruct_distances(&specs, &rows).unwrap(), rows);
        assert!(reconstruct_distances(&specs, &ints(&[&[0, 7], &[9]])).is_err());
    }

    #[test]
    fn test_euclidean_rounding() {
        let coords: &[&[i64]] = &[&[0, 0], &[1, 1]];

        let exact = reconstruct_distances(&with_coords("EXACT_2D", coords), &[]).unwrap();
        assert!((exact[0][1].as_f64() - 2f64.sqrt()).abs() < 1e-12);

        let floor = reconstruct_distances(&with_coords("FLOOR_2D", coords), &[]).unwrap();
        assert_eq!(as_f64(&floor), vec![vec![0.0, 1.0], vec![1.0, 0.0]]);

        let nearest = reconstruct_distances(&with_coords("EUC_2D", coords), &[]).unwrap();
        assert_eq!(as_f64(&nearest), vec![vec![0.0, 1.0], vec![1.0, 0.0]]);

        let coords: &[&[i64]] = &[&[0, 0], &[3, 4], &[1, 2]];
        let wide = reconstruct_distances(&with_coords("EUC_2D", coords), &[]).unwrap();
        assert_eq!(wide[0][1].as_f64(), 5.0);
        assert_eq!(wide[0][2].as_f64(), 2.0); // sqrt(5) = 2.236
    }

    #[test]
    fn test_missing_coordinates() {
        for kind in ["EUC_2D", "FLOOR_2D", "EXACT_2D"] {
            let specs = specs(&[("edge_weight_type", kind)]);
            assert!(matches!(
                reconstruct_distances(&specs, &[]),
                Err(Error::MissingCoordinates)
            ));
        }
    }

    #[test]
    fn test_unknown_type_and_format() {
        let cases = [
            ("2D", Some(""), "type"),
            ("EXPLICIT", None, "format"),
            ("EXPLICIT", Some("UPPER_COL"), "format"),
            ("IMPLICIT", Some("LOWER_ROW"), "type"),
            ("TEST", Some("ABCD"), "type"),
        ];

        for (kind, format, expected) in cases {
            let mut specs = with_coords(kind, &[&[0, 0], &[1, 1]]);
            if let Some(format) = format {
                specs.insert("edge_weight_format", Value::Str(format.to_string()));
            }
            let result = reconstruct_distances(&specs, &[]);
            match expected {
                "type" => {
                    assert!(matches!(result, Err(Error::UnknownEdgeWeightType(_))), "{}", kind)
                }
                _ => assert!(matches!(result, Err(Error::UnknownEdgeWeightFormat(_))), "{}", kind),
            }
        }
    }

    #[test]
    fn test_missing_type() {
        assert!(matches!(
            reconstruct_distances(&Instance::new(), &[]),
            Err(Error::MissingSpecification(_))
        ));
    }

    #[test]
    fn test_triangular_root() {
        assert_eq!(triangular_root(0), Some(1));
        assert_eq!(triangular_root(1), Some(2));
        assert_eq!(triangular_root(6), Some(4));
        assert_eq!(triangular_root(4), None);
        assert_eq!(triangular_root(630), Some(36));
    }

    proptest! {
        #[test]
        fn prop_euclidean_is_symmetric(
            coords in prop::collection::vec((-1000i64..1000, -1000i64..1000), 1..12)
        ) {
            let coords: Vec<Vec<Number>> = coords
                .into_iter()
                .map(|(x, y)| vec![Number::Int(x), Number::Int(y)])
                .collect();

            for rounding in [Rounding::Nearest, Rounding::Floor, Rounding::Exact] {
                let matrix = pairwise_euclidean(&coords, rounding);
                for i in 0..coords.len() {
                    prop_assert_eq!(matrix[i][i].as_f64(), 0.0);
                    for j in 0..coords.len() {
                        prop_assert_eq!(matrix[i][j], matrix[j][i]);
                        prop_assert!(matrix[i][j].as_f64() >= 0.0);
                    }
                }
            }
        }
    }
}
