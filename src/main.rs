//! VRPLIB I/O - Command Line Interface
//!
//! Reads, converts and inspects VRPLIB and Solomon instances and solutions.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use vrplib_io::batch::{self, BatchConfig};
use vrplib_io::{
    read_instance_with, read_solution, write_instance, Instance, InstanceFormat, Number,
    ParseOptions, Value,
};

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "vrplib-io")]
#[command(version = "1.0")]
#[command(about = "Read, convert and inspect VRPLIB instances and solutions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an instance and print it as JSON
    Instance {
        path: PathBuf,

        /// Instance file convention
        #[arg(short, long, value_enum, default_value = "vrplib")]
        format: Format,

        /// Do not derive edge weights from coordinates
        #[arg(long)]
        no_edge_weights: bool,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a solution and print it as JSON
    Solution {
        path: PathBuf,

        /// Instance to evaluate the route cost on
        #[arg(short, long)]
        instance: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "vrplib")]
        format: Format,
    },

    /// Convert a Solomon instance to the VRPLIB format
    Convert {
        input: PathBuf,
        output: PathBuf,
    },

    /// Print statistics about an instance
    Analyze {
        path: PathBuf,

        #[arg(short, long, value_enum, default_value = "vrplib")]
        format: Format,
    },

    /// Export the edge weight matrix of an instance to CSV
    Matrix {
        path: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value = "vrplib")]
        format: Format,
    },

    /// Read every instance of a directory
    Batch {
        /// Directory containing instance files
        #[arg(short, long)]
        dir: PathBuf,

        #[arg(short, long, value_enum, default_value = "vrplib")]
        format: Format,

        /// File extensions to read
        #[arg(short, long, value_delimiter = ',', default_value = "vrp")]
        extensions: Vec<String>,

        /// Output CSV file for the per-file report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Format {
    /// KEY: VALUE specifications and NAME_SECTION blocks
    Vrplib,
    /// Positional Solomon VRPTW layout
    Solomon,
}

impl From<Format> for InstanceFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Vrplib => InstanceFormat::Vrplib,
            Format::Solomon => InstanceFormat::Solomon,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Instance { path, format, no_edge_weights, output } => {
            let options = ParseOptions { compute_edge_weights: !no_edge_weights };
            print_instance(&path, format, &options, output)
        }

        Commands::Solution { path, instance, format } => print_solution(&path, instance, format),

        Commands::Convert { input, output } => convert_solomon(&input, &output),

        Commands::Analyze { path, format } => {
            let instance = load_instance(&path, format, &ParseOptions::default())?;
            println!("{}", instance.statistics());
            Ok(())
        }

        Commands::Matrix { path, output, format } => export_matrix(&path, &output, format),

        Commands::Batch { dir, format, extensions, output, quiet } => {
            run_batch(dir, format, extensions, output, quiet)
        }
    }
}

fn load_instance(path: &PathBuf, format: Format, options: &ParseOptions) -> Result<Instance> {
    let start = Instant::now();
    let instance = read_instance_with(path, format.into(), options)
        .with_context(|| format!("cannot read instance {:?}", path))?;
    log::info!("read {:?} in {:.4}s", path, start.elapsed().as_secs_f64());
    Ok(instance)
}

fn print_instance(
    path: &PathBuf,
    format: Format,
    options: &ParseOptions,
    output: Option<PathBuf>,
) -> Result<()> {
    let instance = load_instance(path, format, options)?;
    let json = serde_json::to_string_pretty(&instance)?;

    match output {
        Some(out) => {
            std::fs::write(&out, json).with_context(|| format!("cannot write {:?}", out))?;
            println!("Instance written to {:?}", out);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn print_solution(path: &PathBuf, instance: Option<PathBuf>, format: Format) -> Result<()> {
    let solution = read_solution(path).with_context(|| format!("cannot read solution {:?}", path))?;
    println!("{}", serde_json::to_string_pretty(&solution)?);

    if let Some(instance_path) = instance {
        let instance = load_instance(&instance_path, format, &ParseOptions::default())?;
        match solution.cost(&instance) {
            Some(cost) => {
                println!("Evaluated cost: {:.2}", cost);
                if let Some(declared) = solution.declared_cost() {
                    if (declared - cost).abs() > 1e-6 {
                        log::warn!(
                            "declared cost {} differs from evaluated cost {:.2}",
                            declared,
                            cost
                        );
                    }
                }
            }
            None => bail!("solution visits nodes outside the edge weights of {:?}", instance_path),
        }
    }
    Ok(())
}

/// VRPLIB fields for a parsed Solomon instance: the depot is the first node
/// and distances are the unrounded Euclidean ones.
fn solomon_to_vrplib(solomon: &Instance) -> Instance {
    let mut instance = Instance::new();
    if let Some(name) = solomon.get("name") {
        instance.insert("name", name.clone());
    }
    instance.insert("type", Value::Str("VRPTW".to_string()));
    instance.insert("dimension", Value::Int(solomon.num_nodes() as i64));
    instance.insert("edge_weight_type", Value::Str("EXACT_2D".to_string()));

    for (key, value) in solomon.iter().filter(|(k, _)| *k != "name") {
        instance.insert(key, value.clone());
    }
    instance.insert("depot", Value::Vector(vec![Number::Int(0)]));
    instance
}

fn convert_solomon(input: &PathBuf, output: &PathBuf) -> Result<()> {
    let solomon = load_instance(input, Format::Solomon, &ParseOptions::default())?;
    let instance = solomon_to_vrplib(&solomon);

    write_instance(output, &instance)
        .with_context(|| format!("cannot write instance {:?}", output))?;
    println!("Converted {:?} -> {:?}", input, output);
    Ok(())
}

fn export_matrix(path: &PathBuf, output: &PathBuf, format: Format) -> Result<()> {
    let instance = load_instance(path, format, &ParseOptions::default())?;
    let matrix = match instance.edge_weights() {
        Some(matrix) => matrix,
        None => bail!("instance {:?} has no edge weights", path),
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output)
        .with_context(|| format!("cannot create {:?}", output))?;
    for row in matrix {
        writer.write_record(row.iter().map(Number::to_string))?;
    }
    writer.flush()?;

    println!("Wrote {}x{} matrix to {:?}", matrix.len(), matrix.len(), output);
    Ok(())
}

fn run_batch(
    dir: PathBuf,
    format: Format,
    extensions: Vec<String>,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let config = BatchConfig {
        format: format.into(),
        extensions,
        show_progress: !quiet,
        ..Default::default()
    };

    let files = batch::collect_files(&dir, &config)
        .with_context(|| format!("cannot list {:?}", dir))?;
    if files.is_empty() {
        bail!("no instance files found in {:?}", dir);
    }
    println!("Reading {} files from {:?}...", files.len(), dir);

    let start = Instant::now();
    let reports = batch::process_files(&files, &config);
    println!("{}", batch::generate_report(&reports));
    println!("Time: {:.4}s", start.elapsed().as_secs_f64());

    if let Some(out) = output {
        batch::export_to_csv(&reports, &out).with_context(|| format!("cannot write {:?}", out))?;
        println!("Report written to {:?}", out);
    }
    Ok(())
}
