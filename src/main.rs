// src/main.rs

use anyhow::Result;
use clap::Parser;
use extruder::generate::{RECIPE_FOLDER, TEMPLATE_FOLDER};
use extruder::index::PypiClient;
use extruder::{generate, requirements};
use std::path::Path;
use tracing::info;

/// Generate conda build recipes from templates and PyPI metadata
#[derive(Parser)]
#[command(name = "extrude-recipes")]
#[command(author, version, about = "Generate build recipes from templates and package-index metadata", long_about = None)]
struct Cli {
    /// Path to requirements.yml
    requirements: String,

    /// Path to the folder of recipe templates, if any
    #[arg(long, default_value = TEMPLATE_FOLDER)]
    template_dir: String,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let client = PypiClient::new()?;
    let mut packages = requirements::load(Path::new(&cli.requirements), &client)?;
    info!("Loaded {} package descriptors", packages.len());

    generate::write_recipes(
        &mut packages,
        Path::new(&cli.template_dir),
        Path::new(RECIPE_FOLDER),
        &client,
    )?;

    Ok(())
}
