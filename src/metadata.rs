//! Cube and mesh inspection
//!
//! This module provides summaries of cubes (shape, coordinates, mesh binding
//! and data statistics) and of meshes, used by the CLI's `--describe` output.

use crate::cube::Cube;
use crate::mesh::Mesh;

/// Structured description of a cube
#[derive(Debug, Clone, PartialEq)]
pub struct CubeSummary {
    pub name: String,
    pub units: Option<String>,
    pub shape: Vec<usize>,
    /// `(name, dimension)` for each dimension coordinate
    pub dim_coords: Vec<(String, usize)>,
    /// `(name, dimensions)` for each auxiliary coordinate
    pub aux_coords: Vec<(String, Vec<usize>)>,
    /// `(location, dimension)` when a mesh is attached
    pub mesh: Option<(String, usize)>,
    pub masked_points: usize,
    pub total_points: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// Collects a [`CubeSummary`]; statistics ignore masked and non-finite points.
#[must_use]
pub fn summarize_cube(cube: &Cube) -> CubeSummary {
    let data = cube.data();
    let valid: Vec<f64> = data
        .data()
        .iter()
        .zip(data.mask().iter())
        .filter(|&(v, m)| !*m && v.is_finite())
        .map(|(&v, _)| v)
        .collect();

    let (min, max, mean) = if valid.is_empty() {
        (None, None, None)
    } else {
        let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
        let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = valid.iter().sum::<f64>() / valid.len() as f64;
        (Some(min), Some(max), Some(mean))
    };

    CubeSummary {
        name: cube.name().to_string(),
        units: cube.metadata.units.clone(),
        shape: cube.shape().to_vec(),
        dim_coords: cube
            .dim_coords()
            .map(|(c, d)| (c.name().to_string(), d))
            .collect(),
        aux_coords: cube
            .aux_coords()
            .map(|(c, d)| (c.name().to_string(), d.to_vec()))
            .collect(),
        mesh: cube
            .mesh_binding()
            .map(|b| (b.location.to_string(), b.dim)),
        masked_points: data.count_masked(),
        total_points: data.len(),
        min,
        max,
        mean,
    }
}

/// Prints a cube summary in the CLI's format.
pub fn print_cube_summary(cube: &Cube) {
    let summary = summarize_cube(cube);

    println!("\n Cube: {}", summary.name);
    println!("={}", "=".repeat(summary.name.len() + 7));
    if let Some(units) = &summary.units {
        println!(" Units: {}", units);
    }
    println!(
        " Shape: ({})",
        summary
            .shape
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" × ")
    );

    if let Some((location, dim)) = &summary.mesh {
        println!(" Mesh: data on {}s along dimension {}", location, dim);
    }

    if !summary.dim_coords.is_empty() {
        println!("\n Dimension coordinates:");
        for (name, dim) in &summary.dim_coords {
            println!("    {} (dimension {})", name, dim);
        }
    }

    if !summary.aux_coords.is_empty() {
        println!("\n Auxiliary coordinates:");
        for (name, dims) in &summary.aux_coords {
            if dims.is_empty() {
                println!("    {} (scalar)", name);
            } else {
                println!("    {} (dimensions {:?})", name, dims);
            }
        }
    }

    println!(
        "\n Valid points: {} / {}",
        summary.total_points - summary.masked_points,
        summary.total_points
    );
    match (summary.min, summary.max, summary.mean) {
        (Some(min), Some(max), Some(mean)) => {
            println!("    Min: {:.4}", min);
            println!("    Max: {:.4}", max);
            println!("    Mean: {:.4}", mean);
        }
        _ => println!("\n⚠ No valid (finite) data found"),
    }
}

/// Prints node and face counts plus the node coordinate extent of a mesh.
pub fn print_mesh_summary(mesh: &Mesh) {
    let name = mesh.var_name.as_deref().unwrap_or("mesh");
    println!("\n Mesh: {}", name);
    println!("={}", "=".repeat(name.len() + 7));
    println!(" Topology dimension: {}", mesh.topology_dimension);
    println!(" Nodes: {}", mesh.num_nodes());
    println!(" Faces: {}", mesh.num_faces());
    println!(
        " Max nodes per face: {}",
        mesh.face_node_connectivity.indices.ncols()
    );
    println!(" Start index: {}", mesh.face_node_connectivity.start_index);

    let (x, y) = &mesh.node_coords;
    let extent = |values: &ndarray::ArrayD<f64>| {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    };
    let (x_min, x_max) = extent(&x.points);
    let (y_min, y_max) = extent(&y.points);
    println!("    {}: {:.4} to {:.4}", x.name(), x_min, x_max);
    println!("    {}: {:.4} to {:.4}", y.name(), y_min, y_max);
}
