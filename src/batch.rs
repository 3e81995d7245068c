//! Batch processing of instance directories.
//!
//! Parses every matching file of a directory, one file per task, and
//! collects a report row per file that can be exported to CSV.

use crate::parse::ParseOptions;
use crate::read::{read_instance_with, InstanceFormat};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Result of reading a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub name: Option<String>,
    pub num_nodes: usize,
    pub num_fields: usize,
    pub edge_weight_type: Option<String>,
    pub error: Option<String>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Batch configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub format: InstanceFormat,
    /// File extensions to pick up, without the dot
    pub extensions: Vec<String>,
    pub options: ParseOptions,
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            format: InstanceFormat::Vrplib,
            extensions: vec!["vrp".to_string()],
            options: ParseOptions::default(),
            show_progress: true,
        }
    }
}

/// Lists the files of `dir` with one of the configured extensions, sorted by path.
pub fn collect_files<P: AsRef<Path>>(
    dir: P,
    config: &BatchConfig,
) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| config.extensions.iter().any(|wanted| wanted == e))
            .unwrap_or(false);
        if path.is_file() && matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Reads every file in parallel. Failures are recorded in the report, not raised.
pub fn process_files(files: &[PathBuf], config: &BatchConfig) -> Vec<FileReport> {
    let progress = if config.show_progress {
        ProgressBar::new(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}") {
        progress.set_style(style);
    }

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| {
            let report = process_file(path, config);
            progress.inc(1);
            report
        })
        .collect();

    progress.finish_and_clear();

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    log::info!("read {} files, {} failed", reports.len(), failed);
    reports
}

fn process_file(path: &Path, config: &BatchConfig) -> FileReport {
    let file = path.display().to_string();

    match read_instance_with(path, config.format, &config.options) {
        Ok(instance) => FileReport {
            file,
            name: instance.name().map(str::to_string),
            num_nodes: instance.num_nodes(),
            num_fields: instance.len(),
            edge_weight_type: instance.edge_weight_type().map(str::to_string),
            error: None,
        },
        Err(e) => {
            log::warn!("cannot read {}: {}", file, e);
            FileReport {
                file,
                name: None,
                num_nodes: 0,
                num_fields: 0,
                edge_weight_type: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Export reports to CSV
pub fn export_to_csv<P: AsRef<Path>>(reports: &[FileReport], path: P) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for report in reports {
        writer.serialize(report)?;
    }

    writer.flush()?;
    Ok(())
}

/// Generate summary report
pub fn generate_report(reports: &[FileReport]) -> String {
    let mut report = String::new();

    report.push_str(&format!(
        "{:<40} {:>8} {:>8} {:>12}\n",
        "File", "Nodes", "Fields", "Edge weights"
    ));
    report.push_str("-".repeat(72).as_str());
    report.push('\n');

    for r in reports {
        let file = Path::new(&r.file)
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| r.file.clone());
        match &r.error {
            None => report.push_str(&format!(
                "{:<40} {:>8} {:>8} {:>12}\n",
                file,
                r.num_nodes,
                r.num_fields,
                r.edge_weight_type.as_deref().unwrap_or("-")
            )),
            Some(e) => report.push_str(&format!("{:<40} error: {}\n", file, e)),
        }
    }

    let ok = reports.iter().filter(|r| r.is_ok()).count();
    report.push_str("-".repeat(72).as_str());
    report.push_str(&format!("\n{}/{} files read\n", ok, reports.len()));
    report
}
