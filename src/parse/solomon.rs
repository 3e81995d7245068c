//! Parser for Solomon VRPTW instances.
//!
//! The layout is positional:
//!
//! ```text
//! C101
//! VEHICLE
//! NUMBER     CAPACITY
//!   25         200
//! CUSTOMER
//! CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE   TIME
//!     0      40         50          0          0       1236          0
//! ```
//!
//! followed by one row per node, the depot first.

use super::distances::{pairwise_euclidean, Rounding};
use super::lines::significant_lines;
use super::ParseOptions;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::value::{Number, Value};

/// Customer number, x, y, demand, ready time, due time, service time.
const NUM_COLUMNS: usize = 7;

pub fn parse_solomon(text: &str) -> Result<Instance> {
    parse_solomon_with(text, &ParseOptions::default())
}

pub fn parse_solomon_with(text: &str, options: &ParseOptions) -> Result<Instance> {
    let lines = significant_lines(text);

    let name = line_at(&lines, 0, "an instance name")?;
    expect_tokens(&lines, 1, &["VEHICLE"])?;
    expect_tokens(&lines, 2, &["NUMBER", "CAPACITY"])?;
    let (vehicles, capacity) = parse_fleet(&lines)?;
    expect_tokens(&lines, 4, &["CUSTOMER"])?;
    expect_tokens(&lines, 5, &["CUST", "XCOORD"])?;

    let rows = lines[6..]
        .iter()
        .map(|line| parse_customer(line))
        .collect::<Result<Vec<_>>>()?;
    if rows.is_empty() {
        return Err(Error::MalformedSolomonInstance {
            expected: "at least one customer row".to_string(),
            actual: "<end of file>".to_string(),
        });
    }

    let column = |idx: usize| rows.iter().map(|row| row[idx]).collect::<Vec<_>>();
    let columns = |from: usize, to: usize| {
        rows.iter()
            .map(|row| row[from..to].to_vec())
            .collect::<Vec<_>>()
    };

    let node_coord = columns(1, 3);
    let edge_weight = options
        .compute_edge_weights
        .then(|| pairwise_euclidean(&node_coord, Rounding::Exact));

    let mut instance = Instance::new();
    instance.insert("name", Value::Str(name.to_string()));
    instance.insert("vehicles", Value::Int(vehicles));
    instance.insert("capacity", Value::Int(capacity));
    instance.insert("node_coord", Value::Matrix(node_coord));
    instance.insert("demand", Value::Vector(column(3)));
    instance.insert("time_window", Value::Matrix(columns(4, 6)));
    instance.insert("service_time", Value::Vector(column(6)));
    if let Some(matrix) = edge_weight {
        instance.insert("edge_weight", Value::Matrix(matrix));
    }

    log::debug!("parsed Solomon instance {} with {} nodes", name, rows.len());
    Ok(instance)
}

fn line_at<'a>(lines: &[&'a str], idx: usize, expected: &str) -> Result<&'a str> {
    lines
        .get(idx)
        .copied()
        .ok_or_else(|| Error::MalformedSolomonInstance {
            expected: expected.to_string(),
            actual: "<end of file>".to_string(),
        })
}

fn expect_tokens(lines: &[&str], idx: usize, tokens: &[&str]) -> Result<()> {
    let expected = tokens
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(" and ");
    let line = line_at(lines, idx, &expected)?;

    if tokens.iter().all(|token| line.contains(token)) {
        Ok(())
    } else {
        Err(Error::MalformedSolomonInstance {
            expected,
            actual: line.to_string(),
        })
    }
}

fn parse_fleet(lines: &[&str]) -> Result<(i64, i64)> {
    const EXPECTED: &str = "vehicle number and capacity";
    let line = line_at(lines, 3, EXPECTED)?;
    let malformed = || Error::MalformedSolomonInstance {
        expected: EXPECTED.to_string(),
        actual: line.to_string(),
    };

    let values = line
        .split_whitespace()
        .map(|token| token.parse::<i64>().map_err(|_| malformed()))
        .collect::<Result<Vec<_>>>()?;
    match values[..] {
        [vehicles, capacity] => Ok((vehicles, capacity)),
        _ => Err(malformed()),
    }
}

fn parse_customer(line: &str) -> Result<Vec<Number>> {
    let malformed = || Error::MalformedSolomonInstance {
        expected: format!("{} numeric columns", NUM_COLUMNS),
        actual: line.to_string(),
    };

    let row = line
        .split_whitespace()
        .map(|token| Number::parse(token).ok_or_else(malformed))
        .collect::<Result<Vec<_>>>()?;
    if row.len() != NUM_COLUMNS {
        return Err(malformed());
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    const C101: &[&str] = &[
        "C101",
        "",
        "VEHICLE",
        "NUMBER     CAPACITY",
        "  25         200",
        "",
        "CUSTOMER",
        "CUST NO.  XCOORD.   YCOORD.  DEMAND   READY TIME  DUE DATE  SERVICE TIME",
        " ",
        "    0      40         50          0          0       1236          0",
        "    1      45         68         10        912        967         90",
    ];

    fn ints(values: &[i64]) -> Vec<Number> {
        values.iter().map(|&v| Number::Int(v)).collect()
    }

    #[test]
    fn test_parse_solomon() {
        let instance = parse_solomon(&C101.join("\n")).unwrap();
        let dist = ((40f64 - 45.0).powi(2) + (50f64 - 68.0).powi(2)).sqrt();

        let expected: Instance = vec![
            ("name", Value::Str("C101".into())),
            ("vehicles", Value::Int(25)),
            ("capacity", Value::Int(200)),
            ("node_coord", Value::Matrix(vec![ints(&[40, 50]), ints(&[45, 68])])),
            ("demand", Value::Vector(ints(&[0, 10]))),
            ("time_window", Value::Matrix(vec![ints(&[0, 1236]), ints(&[912, 967])])),
            ("service_time", Value::Vector(ints(&[0, 90]))),
            (
                "edge_weight",
                Value::Matrix(vec![
                    vec![Number::Float(0.0), Number::Float(dist)],
                    vec![Number::Float(dist), Number::Float(0.0)],
                ]),
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(instance, expected);
    }

    #[test]
    fn test_without_edge_weights() {
        let options = ParseOptions { compute_edge_weights: false };
        let instance = parse_solomon_with(&C101.join("\n"), &options).unwrap();
        assert!(!instance.contains_key("edge_weight"));
        assert_eq!(instance.len(), 7);
    }

    #[test]
    fn test_invalid_preamble() {
        let cases: Vec<Vec<&str>> = vec![
            vec![""],
            vec!["NAME", "CARS"],
            vec!["NAME", "VEHICLES", "?"],
            vec!["NAME", "VEHICLES", "NUMBER CAPACITY", "20"],
            vec!["NAME", "VEHICLES", "NUMBER CAPACITY", "20 x"],
            vec!["NAME", "VEHICLES", "NUMBER CAPACITY", "20 100", "wrong"],
            vec!["NAME", "VEHICLES", "NUMBER CAPACITY", "20 100", "CUSTOMER", "CUST NO. XCOORD."],
            vec![
                "NAME",
                "VEHICLES",
                "NUMBER CAPACITY",
                "20 100",
                "CUSTOMER",
                "NO HEADERS",
                "0 40 50 0 0 1236 0",
            ],
        ];

        for lines in cases {
            assert!(
                matches!(
                    parse_solomon(&lines.join("\n")),
                    Err(Error::MalformedSolomonInstance { .. })
                ),
                "{:?}",
                lines
            );
        }
    }

    #[test]
    fn test_error_reports_expected_and_actual() {
        let err = parse_solomon("NAME\nCARS").unwrap_err();
        match err {
            Error::MalformedSolomonInstance { expected, actual } => {
                assert_eq!(expected, "'VEHICLE'");
                assert_eq!(actual, "CARS");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_short_customer_row() {
        let mut lines = C101.to_vec();
        lines.push("2 1 2 3");
        assert!(matches!(
            parse_solomon(&lines.join("\n")),
            Err(Error::MalformedSolomonInstance { .. })
        ));
    }

    #[test]
    fn test_vrplib_text_is_not_solomon() {
        let text = "NAME: A-n32-k5\nCOMMENT: x\nTYPE: CVRP\nDIMENSION: 32\n";
        assert!(parse_solomon(text).is_err());
    }
}
