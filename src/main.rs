//! Entry point for the mesh_regrid application.
//! Handles CLI parsing, file loading, and runs the mesh to grid regridding.

use clap::Parser;
use mesh_regrid::metadata::{print_cube_summary, print_mesh_summary};
use mesh_regrid::netcdf_io::{read_grid_cube, read_mesh_cube, NetCDFWriter};
use mesh_regrid::parallel::{get_parallel_info, ParallelConfig};
use mesh_regrid::scheme::MeshToGridRegridder;
use netcdf::open;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    println!("------------------------------------------------------------------");
    println!("            mesh_regrid: UGRID mesh to grid regridding");
    println!("------------------------------------------------------------------");

    ParallelConfig::new(args.threads).setup_global_pool()?;
    if args.verbose {
        get_parallel_info().print_info();
    }

    // Open NetCDF files
    let source = open(&args.source)?;
    println!("Successfully opened source file: {}", args.source.display());
    let target = open(&args.target)?;
    println!("Successfully opened target file: {}", args.target.display());

    let src_cube = read_mesh_cube(&source, &args.variable)?;
    let grid_cube = read_grid_cube(&target, args.lon.as_deref(), args.lat.as_deref())?;

    if args.describe {
        print_cube_summary(&src_cube);
        if let Some(mesh) = src_cube.mesh() {
            print_mesh_summary(mesh);
        }
        print_cube_summary(&grid_cube);
    }

    println!("\n⚡ Computing regridding weights...");
    let regridder = MeshToGridRegridder::new(&src_cube, &grid_cube, args.mdtol)?;
    println!(
        "✅ {} weights between {} faces and {} cells",
        regridder.regridder().weight_matrix().nnz(),
        regridder.regridder().src().size(),
        regridder.regridder().tgt().size()
    );

    let result = regridder.regrid(&src_cube)?;

    if let Some(output_path) = args.output {
        NetCDFWriter::new(&output_path).write_cube(&result)?;
        println!("✅ Saved result to {}", output_path.display());
    } else {
        print_cube_summary(&result);
    }

    Ok(())
}
