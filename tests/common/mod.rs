//! Shared fixtures: lattice meshes whose faces line up with grid cells

#![allow(dead_code)]

use mesh_regrid::bounds::simple_1d_to_bounds_cf;
use mesh_regrid::prelude::*;
use ndarray::{Array1, Array2, ArrayD};
use std::sync::Arc;

pub fn lon_coord(edges: &[f64]) -> DimCoord {
    DimCoord::new(
        CoordMetadata::standard("longitude")
            .with_units("degrees")
            .with_var_name("lon"),
        midpoints(edges),
        Some(simple_1d_to_bounds_cf(edges)),
    )
    .expect("valid longitude")
}

pub fn lat_coord(edges: &[f64]) -> DimCoord {
    DimCoord::new(
        CoordMetadata::standard("latitude")
            .with_units("degrees")
            .with_var_name("lat"),
        midpoints(edges),
        Some(simple_1d_to_bounds_cf(edges)),
    )
    .expect("valid latitude")
}

pub fn midpoints(edges: &[f64]) -> Array1<f64> {
    edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
}

/// A `(lat, lon)` cube of zeros with bounded coordinates
pub fn grid_cube(lon_edges: &[f64], lat_edges: &[f64], circular: bool) -> Cube {
    let lon = lon_coord(lon_edges).with_circular(circular);
    let lat = lat_coord(lat_edges);
    let mut cube = Cube::new(MaskedArray::zeros(&[lat.len(), lon.len()]));
    cube.add_dim_coord(lat, 0).expect("lat fits");
    cube.add_dim_coord(lon, 1).expect("lon fits");
    cube
}

/// Quad mesh whose nodes sit on the given edges. Face `j * n_lon + i`
/// covers longitude cell `i` and latitude cell `j`.
pub fn lattice_mesh(lon_edges: &[f64], lat_edges: &[f64], start_index: i64) -> Mesh {
    let nx = lon_edges.len();
    let ny = lat_edges.len();
    let mut xs = Vec::with_capacity(nx * ny);
    let mut ys = Vec::with_capacity(nx * ny);
    for &lat in lat_edges {
        for &lon in lon_edges {
            xs.push(lon);
            ys.push(lat);
        }
    }

    let node = |i: usize, j: usize| (j * nx + i) as i64 + start_index;
    let n_faces = (nx - 1) * (ny - 1);
    let mut indices = Array2::<i64>::zeros((n_faces, 4));
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let f = j * (nx - 1) + i;
            indices[[f, 0]] = node(i, j);
            indices[[f, 1]] = node(i + 1, j);
            indices[[f, 2]] = node(i + 1, j + 1);
            indices[[f, 3]] = node(i, j + 1);
        }
    }

    Mesh::new(
        2,
        AuxCoord::new(
            CoordMetadata::standard("longitude").with_units("degrees"),
            ArrayD::from_shape_vec(vec![nx * ny], xs).expect("node x"),
        ),
        AuxCoord::new(
            CoordMetadata::standard("latitude").with_units("degrees"),
            ArrayD::from_shape_vec(vec![nx * ny], ys).expect("node y"),
        ),
        Connectivity::new(indices, start_index),
    )
    .expect("valid mesh")
}

/// Cube with `data`, the mesh bound on `mesh_dim` at face location
pub fn mesh_cube(mesh: Mesh, data: MaskedArray, mesh_dim: usize) -> Cube {
    let mut cube = Cube::new(data).with_metadata(CubeMetadata {
        standard_name: Some("sea_surface_temperature".to_string()),
        var_name: Some("sst".to_string()),
        units: Some("K".to_string()),
        ..CubeMetadata::default()
    });
    cube.set_mesh(Arc::new(mesh), MeshLocation::Face, mesh_dim)
        .expect("mesh fits");
    cube
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
