//! Defines command-line interface options using `clap` for the mesh_regrid application.

use clap::Parser;
use std::path::PathBuf;

/// A CLI tool for regridding UGRID mesh data onto latitude/longitude grids
#[derive(Parser, Debug)]
#[command(
    version,
    name = "mesh_regrid",
    about = "Regrid NetCDF data from an unstructured mesh onto a rectilinear grid"
)]
pub struct Args {
    /// Path to the NetCDF file holding the mesh data
    #[arg(short, long)]
    pub source: PathBuf,

    /// Name of the data variable to regrid
    #[arg(short = 'n', long)]
    pub variable: String,

    /// Path to the NetCDF file defining the target grid
    #[arg(short, long)]
    pub target: PathBuf,

    /// Longitude coordinate variable in the target file. Found automatically if not set.
    #[arg(long)]
    pub lon: Option<String>,

    /// Latitude coordinate variable in the target file. Found automatically if not set.
    #[arg(long)]
    pub lat: Option<String>,

    /// Missing data tolerance between 0 and 1
    #[arg(short, long, default_value_t = 1.0, value_parser = parse_mdtol)]
    pub mdtol: f64,

    /// Path to save the result as NetCDF. If not set, prints a summary to the terminal.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the source cube, its mesh and the target grid before regridding
    #[arg(long)]
    pub describe: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Number of threads to use for weight generation. Defaults to number of CPU cores.
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

fn parse_mdtol(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("Invalid mdtol '{}': expected a number", s))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("Value for mdtol must be in range 0 - 1, got {}.", value))
    }
}
