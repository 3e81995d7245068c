//! Parser for the VRPLIB instance convention.
//!
//! An instance consists of two parts:
//! 1. specifications, single lines of the form `KEY : VALUE`;
//! 2. data sections, a `NAME_SECTION` header followed by rows of numbers.
//!
//! All specifications precede all sections. Section rows start with the
//! 1-based node index, except in the edge weight and depot sections.

use super::distances::{reconstruct_distances, ExplicitLayout};
use super::lines::significant_lines;
use super::ParseOptions;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::value::{infer_type, Number, Value};

pub const SPEC_SEPARATOR: char = ':';
pub const SECTION_SUFFIX: &str = "_SECTION";
pub const DEPOT_SENTINEL: i64 = -1;

/// Parses VRPLIB text, deriving the edge weights when they are not given.
pub fn parse_instance(text: &str) -> Result<Instance> {
    parse_instance_with(text, &ParseOptions::default())
}

pub fn parse_instance_with(text: &str, options: &ParseOptions) -> Result<Instance> {
    let lines = significant_lines(text);
    let (specs, sections) = group_specifications_and_sections(&lines)?;

    let mut instance = Instance::new();
    for line in specs {
        let (key, value) = parse_specification(line);
        instance.insert(key, value);
    }

    // The edge weight section is resolved last so that it sees every other
    // section, whatever their order in the file.
    let mut edge_weight_rows = None;

    for section in &sections {
        let name = section_name(section[0]);
        if instance.contains_key(&name) {
            return Err(Error::DuplicateField(name));
        }

        let rows = parse_rows(&name, &section[1..])?;
        if name == "edge_weight" {
            instance.insert(name, Value::Matrix(Vec::new()));
            edge_weight_rows = Some(rows);
        } else {
            let value = section_value(&name, rows)?;
            instance.insert(name, value);
        }
    }

    if let Some(rows) = edge_weight_rows {
        let matrix = reconstruct_distances(&instance, &rows)?;
        instance.insert("edge_weight", Value::Matrix(matrix));
    } else if options.compute_edge_weights && instance.contains_key("edge_weight_type") {
        match ExplicitLayout::of(&instance)? {
            None => {
                let matrix = reconstruct_distances(&instance, &[])?;
                instance.insert("edge_weight", Value::Matrix(matrix));
            }
            Some(layout) => {
                log::warn!("{:?} edge weights declared without an EDGE_WEIGHT_SECTION", layout)
            }
        }
    }

    if let (Some(dimension), Some(matrix)) = (instance.dimension(), instance.edge_weights()) {
        if matrix.len() != dimension {
            log::warn!(
                "edge weight matrix has {} rows but DIMENSION is {}",
                matrix.len(),
                dimension
            );
        }
    }

    log::debug!(
        "parsed instance {} with {} fields",
        instance.name().unwrap_or("<unnamed>"),
        instance.len()
    );
    Ok(instance)
}

/// Splits significant lines into specification lines and section blocks.
/// Each block starts with its header line.
pub fn group_specifications_and_sections<'a>(
    lines: &[&'a str],
) -> Result<(Vec<&'a str>, Vec<Vec<&'a str>>)> {
    let mut specs = Vec::new();
    let mut sections: Vec<Vec<&'a str>> = Vec::new();

    for &line in lines {
        if is_specification(line) {
            if !sections.is_empty() {
                return Err(Error::MalformedInstance(format!(
                    "specification '{}' presented after a section",
                    line
                )));
            }
            specs.push(line);
        } else if is_section_header(line) {
            sections.push(vec![line]);
        } else if let Some(section) = sections.last_mut() {
            section.push(line);
        } else {
            return Err(Error::MalformedInstance(format!(
                "line '{}' is neither a specification nor part of a section",
                line
            )));
        }
    }

    Ok((specs, sections))
}

fn is_specification(line: &str) -> bool {
    match (line.find(SPEC_SEPARATOR), line.find(SECTION_SUFFIX)) {
        (Some(sep), Some(header)) => sep < header,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn is_section_header(line: &str) -> bool {
    line.contains(SECTION_SUFFIX)
}

/// Parses a specification line as a key/value pair, split at the first separator.
/// The key is lower-cased and the value typed.
pub fn parse_specification(line: &str) -> (String, Value) {
    let (key, value) = line.split_once(SPEC_SEPARATOR).unwrap_or((line, ""));
    (key.trim().to_lowercase(), infer_type(value.trim()))
}

fn section_name(header: &str) -> String {
    let end = header.find(SECTION_SUFFIX).unwrap_or(header.len());
    header[..end].trim().to_lowercase()
}

fn parse_rows(name: &str, body: &[&str]) -> Result<Vec<Vec<Number>>> {
    body.iter()
        .map(|line| {
            line.split_whitespace()
                .map(|token| {
                    Number::parse(token).ok_or_else(|| {
                        Error::MalformedInstance(format!(
                            "non-numeric value '{}' in {} section",
                            token,
                            name.to_uppercase()
                        ))
                    })
                })
                .collect()
        })
        .collect()
}

/// Parses one section block against the specifications seen so far.
pub fn parse_section(lines: &[&str], instance: &Instance) -> Result<(String, Value)> {
    let header = lines.first().ok_or_else(|| {
        Error::MalformedInstance("empty section block".to_string())
    })?;
    let name = section_name(header);
    let rows = parse_rows(&name, &lines[1..])?;

    let value = if name == "edge_weight" {
        Value::Matrix(reconstruct_distances(instance, &rows)?)
    } else {
        section_value(&name, rows)?
    };

    Ok((name, value))
}

fn section_value(name: &str, rows: Vec<Vec<Number>>) -> Result<Value> {
    if name == "depot" {
        return parse_depot(&rows).map(Value::Vector);
    }

    let rows: Vec<Vec<Number>> = rows
        .into_iter()
        .map(|row| row.into_iter().skip(1).collect())
        .collect();

    let width = rows.first().map(Vec::len).unwrap_or(1);
    if rows.iter().any(|row| row.len() != width) {
        Ok(Value::Ragged(rows))
    } else if width == 1 {
        Ok(Value::Vector(rows.into_iter().flatten().collect()))
    } else {
        Ok(Value::Matrix(rows))
    }
}

/// Zero-based depot indices from a `-1` terminated list of 1-based indices.
fn parse_depot(rows: &[Vec<Number>]) -> Result<Vec<Number>> {
    if rows.len() < 2 {
        return Err(Error::MalformedDepotSection(format!(
            "expected at least one depot and a {} terminator, got {} rows",
            DEPOT_SENTINEL,
            rows.len()
        )));
    }

    let values: Vec<Number> = rows.iter().flatten().copied().collect();
    match values.split_last() {
        Some((Number::Int(DEPOT_SENTINEL), depots)) => depots
            .iter()
            .map(|depot| match depot.as_i64() {
                Some(idx) if idx >= 1 => Ok(Number::Int(idx - 1)),
                _ => Err(Error::MalformedDepotSection(format!(
                    "invalid depot index '{}'",
                    depot
                ))),
            })
            .collect(),
        Some((last, _)) => Err(Error::MalformedDepotSection(format!(
            "section ends with '{}' instead of {}",
            last, DEPOT_SENTINEL
        ))),
        None => Err(Error::MalformedDepotSection("no values".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Number> {
        values.iter().map(|&v| Number::Int(v)).collect()
    }

    #[test]
    fn test_group_specifications_and_sections() {
        let lines = vec![
            "NAME : ORTEC-VRPTW-ASYM-00c5356f-d1-n258-k12",
            "COMMENT : ORTEC",
            "EDGE_WEIGHT_SECTION",
            "0\t1908",
            "1994\t0",
            "TIME_WINDOW_SECTION",
            "1\t0\t41340",
            "2\t15600\t23100",
        ];

        let (specs, sections) = group_specifications_and_sections(&lines).unwrap();

        assert_eq!(specs, lines[..2].to_vec());
        assert_eq!(sections, vec![lines[2..5].to_vec(), lines[5..].to_vec()]);
    }

    #[test]
    fn test_specification_after_section_is_rejected() {
        let lines = vec!["NAME: x", "DEMAND_SECTION", "1 0", "CAPACITY: 10"];
        assert!(matches!(
            group_specifications_and_sections(&lines),
            Err(Error::MalformedInstance(_))
        ));
    }

    #[test]
    fn test_stray_line_is_rejected() {
        let lines = vec!["NAME: x", "CAPACITY 10"];
        assert!(matches!(
            group_specifications_and_sections(&lines),
            Err(Error::MalformedInstance(_))
        ));
    }

    #[test]
    fn test_header_with_trailing_colon_text_is_a_section() {
        let lines = vec!["NODE_COORD_SECTION : x", "1 0 0"];
        let (specs, sections) = group_specifications_and_sections(&lines).unwrap();
        assert!(specs.is_empty());
        assert_eq!(sections.len(), 1);
        assert_eq!(section_name(sections[0][0]), "node_coord");
    }

    #[test]
    fn test_parse_specification() {
        let cases = [
            ("NAME : Antwerp 1", "name", Value::Str("Antwerp 1".into())),
            ("COMMENT:'test' ", "comment", Value::Str("'test'".into())),
            ("COMMENT: BKS:1", "comment", Value::Str("BKS:1".into())),
            ("CAPACITY: 30", "capacity", Value::Int(30)),
            ("CAPACITY: 30.5", "capacity", Value::Float(30.5)),
            ("name: Antwerp 1", "name", Value::Str("Antwerp 1".into())),
        ];

        for (line, key, value) in cases {
            assert_eq!(parse_specification(line), (key.to_string(), value));
        }
    }

    #[test]
    fn test_parse_section() {
        let empty = Instance::new();

        let lines = ["SERVICE_TIME_SECTION", "1  2", "2  3", "3  100"];
        let (name, value) = parse_section(&lines, &empty).unwrap();
        assert_eq!(name, "service_time");
        assert_eq!(value, Value::Vector(ints(&[2, 3, 100])));

        let lines = ["TIME_WINDOW_SECTION", "1  2  3", "2  1  2"];
        let (name, value) = parse_section(&lines, &empty).unwrap();
        assert_eq!(name, "time_window");
        assert_eq!(value, Value::Matrix(vec![ints(&[2, 3]), ints(&[1, 2])]));

        let (_, value) = parse_section(&["DEMAND_SECTION", "1  1.1", "2  2.2"], &empty).unwrap();
        assert_eq!(value, Value::Vector(vec![Number::Float(1.1), Number::Float(2.2)]));

        let (name, value) = parse_section(&["UNKNOWN_SECTION", "1 1", "1 -1"], &empty).unwrap();
        assert_eq!(name, "unknown");
        assert_eq!(value, Value::Vector(ints(&[1, -1])));

        let (_, value) = parse_section(&["PICKUP_SECTION", "1 1", "2 1 2"], &empty).unwrap();
        assert_eq!(value, Value::Ragged(vec![ints(&[1]), ints(&[1, 2])]));
    }

    #[test]
    fn test_depot_section() {
        let empty = Instance::new();

        let (name, value) = parse_section(&["DEPOT_SECTION", "1", "-1"], &empty).unwrap();
        assert_eq!(name, "depot");
        assert_eq!(value, Value::Vector(ints(&[0])));

        let (_, value) = parse_section(&["DEPOT_SECTION", "1", "3", "-1"], &empty).unwrap();
        assert_eq!(value, Value::Vector(ints(&[0, 2])));

        for lines in [
            vec!["DEPOT_SECTION"],
            vec!["DEPOT_SECTION", "1"],
            vec!["DEPOT_SECTION", "1", "-100"],
            vec!["DEPOT_SECTION", "1", "2"],
        ] {
            assert!(matches!(
                parse_section(&lines, &empty),
                Err(Error::MalformedDepotSection(_))
            ));
        }
    }

    #[test]
    fn test_non_numeric_section_value() {
        assert!(matches!(
            parse_section(&["DEMAND_SECTION", "1 abc"], &Instance::new()),
            Err(Error::MalformedInstance(_))
        ));
    }

    #[test]
    fn test_parse_instance_explicit() {
        let text = [
            "NAME: VRPLIB",
            "EDGE_WEIGHT_TYPE: EXPLICIT",
            "EDGE_WEIGHT_FORMAT: FULL_MATRIX",
            "EDGE_WEIGHT_SECTION",
            "0  1",
            "1  0",
            "SERVICE_TIME_SECTION",
            "1  1",
            "TIME_WINDOW_SECTION",
            "1  1   2",
            "EOF",
        ]
        .join("\n");

        let instance = parse_instance(&text).unwrap();

        let expected: Instance = vec![
            ("name", Value::Str("VRPLIB".into())),
            ("edge_weight_type", Value::Str("EXPLICIT".into())),
            ("edge_weight_format", Value::Str("FULL_MATRIX".into())),
            ("edge_weight", Value::Matrix(vec![ints(&[0, 1]), ints(&[1, 0])])),
            ("service_time", Value::Vector(ints(&[1]))),
            ("time_window", Value::Matrix(vec![ints(&[1, 2])])),
        ]
        .into_iter()
        .collect();
        assert_eq!(instance, expected);
    }

    #[test]
    fn test_parse_instance_computes_edge_weights() {
        let text = [
            "NAME: VRPLIB",
            "EDGE_WEIGHT_TYPE: FLOOR_2D",
            "NODE_COORD_SECTION",
            "1  0   1",
            "2  1   0",
            "SERVICE_TIME_SECTION",
            "1  1",
            "2  1",
            "EOF",
        ]
        .join("\n");

        let instance = parse_instance(&text).unwrap();
        let keys: Vec<&str> = instance.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["name", "edge_weight_type", "node_coord", "service_time", "edge_weight"]
        );
        assert_eq!(instance.distance(0, 1), Some(1.0));
        assert_eq!(instance.distance(1, 1), Some(0.0));

        let options = ParseOptions { compute_edge_weights: false };
        let instance = parse_instance_with(&text, &options).unwrap();
        assert!(!instance.contains_key("edge_weight"));
    }

    #[test]
    fn test_edge_weight_section_sees_later_coordinates() {
        let text = [
            "EDGE_WEIGHT_TYPE: EUC_2D",
            "EDGE_WEIGHT_SECTION",
            "0 0",
            "0 0",
            "NODE_COORD_SECTION",
            "1 0 0",
            "2 3 4",
        ]
        .join("\n");

        let instance = parse_instance(&text).unwrap();
        let keys: Vec<&str> = instance.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["edge_weight_type", "edge_weight", "node_coord"]);
        assert_eq!(instance.distance(0, 1), Some(5.0));
    }

    #[test]
    fn test_duplicate_field() {
        let text = "DEMAND: 3\nDEMAND_SECTION\n1 0\n";
        assert!(matches!(
            parse_instance(text),
            Err(Error::DuplicateField(name)) if name == "demand"
        ));

        let text = "DEMAND_SECTION\n1 0\nDEMAND_SECTION\n1 0\n";
        assert!(matches!(parse_instance(text), Err(Error::DuplicateField(_))));
    }

    #[test]
    fn test_lines_after_eof_are_ignored() {
        let text = "NAME: x\nEOF\nthis is not VRPLIB\n";
        let instance = parse_instance(text).unwrap();
        assert_eq!(instance.name(), Some("x"));
        assert_eq!(instance.len(), 1);
    }

    #[test]
    fn test_solomon_text_is_not_vrplib() {
        let text = "C101\n\nVEHICLE\nNUMBER     CAPACITY\n  25         200\n";
        assert!(matches!(parse_instance(text), Err(Error::MalformedInstance(_))));
    }
}
