//! Find command - Resolve leaf datasets for a job
//!
//! Loads the job and every store file, runs discovery and prints one row per
//! leaf dataset below the common dataset root.

use crate::cli::error::HelpfulError;
use crate::cli::output::{plural, print_json, print_table};
use crate::cli::{load_client, load_job};
use comfy_table::Color;
use quarry_finder::{DatasetDescriptor, DatasetFinder, DescriptorMaterializer, Location};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the find command
#[derive(Debug)]
pub struct FindArgs {
    pub job: PathBuf,
    pub stores: Vec<PathBuf>,
    pub json: bool,
}

/// Complete find result
#[derive(Debug, Serialize)]
pub struct FindResult {
    pub common_root: Location,
    pub datasets: Vec<DatasetDescriptor>,
}

pub fn run(args: FindArgs) -> anyhow::Result<()> {
    let config = load_job(&args.job)?;
    let client = load_client(&args.stores, config.store_version())?;
    let finder = DatasetFinder::with_config(client, config);

    let datasets = finder
        .find_datasets(&DescriptorMaterializer)
        .map_err(|e| HelpfulError::discovery_failed(&e))?;
    info!(
        job = %args.job.display(),
        datasets = datasets.len(),
        "Discovery finished"
    );

    let result = FindResult {
        common_root: finder.common_dataset_root().clone(),
        datasets,
    };

    if args.json {
        return print_json(&result);
    }

    if result.datasets.is_empty() {
        println!("No datasets found under {}", result.common_root);
        return Ok(());
    }

    let rows = result
        .datasets
        .iter()
        .map(|d| {
            vec![
                (d.relative_path.clone(), Some(Color::Green)),
                (d.location.to_string(), None),
            ]
        })
        .collect();
    print_table(&["DATASET", "LOCATION"], rows);
    println!();
    println!(
        "{} under {}",
        plural(result.datasets.len(), "dataset"),
        result.common_root
    );
    Ok(())
}
