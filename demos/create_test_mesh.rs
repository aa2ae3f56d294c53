//! Creates a sample UGRID mesh file and a matching target grid file.
//!
//! The mesh is a global triangulation (each 15 degree lat/lon box split in
//! two) carrying a smooth temperature field over a few time steps. The grid
//! file holds a 5 degree global grid with CF bounds.

use ndarray::{arr0, Array1, Array2};
use netcdf::create;
use std::path::Path;

const MESH_STEP: f64 = 15.0;
const GRID_STEP: f64 = 5.0;
const N_TIMES: usize = 3;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mesh_path = Path::new("test_mesh.nc");
    let grid_path = Path::new("test_grid.nc");

    create_mesh_file(mesh_path)?;
    create_grid_file(grid_path)?;

    println!("\n🧪 Try the regridder with:");
    println!(
        "   cargo run -- -s {} -n surface_temperature -t {} -o regridded.nc",
        mesh_path.display(),
        grid_path.display()
    );

    Ok(())
}

fn create_mesh_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔨 Creating UGRID mesh file: {}", path.display());
    if path.exists() {
        std::fs::remove_file(path)?
    }

    let lons: Vec<f64> = (0..=(360.0 / MESH_STEP) as usize)
        .map(|i| -180.0 + i as f64 * MESH_STEP)
        .collect();
    let lats: Vec<f64> = (0..=(180.0 / MESH_STEP) as usize)
        .map(|j| -90.0 + j as f64 * MESH_STEP)
        .collect();
    let nx = lons.len();

    let mut node_x = Vec::new();
    let mut node_y = Vec::new();
    for &lat in &lats {
        for &lon in &lons {
            node_x.push(lon);
            node_y.push(lat);
        }
    }

    let node = |i: usize, j: usize| (j * nx + i) as i32;
    let mut triangles = Vec::new();
    let mut centres = Vec::new();
    for j in 0..lats.len() - 1 {
        for i in 0..nx - 1 {
            let (sw, se, ne, nw) = (node(i, j), node(i + 1, j), node(i + 1, j + 1), node(i, j + 1));
            triangles.push([sw, se, ne]);
            triangles.push([sw, ne, nw]);
            let lon = lons[i] + MESH_STEP / 2.0;
            let lat = lats[j] + MESH_STEP / 2.0;
            centres.push((lon + MESH_STEP / 6.0, lat - MESH_STEP / 6.0));
            centres.push((lon - MESH_STEP / 6.0, lat + MESH_STEP / 6.0));
        }
    }
    let n_faces = triangles.len();
    let connectivity =
        Array2::from_shape_vec((n_faces, 3), triangles.into_iter().flatten().collect())?;

    let mut file = create(path)?;
    file.add_attribute("title", "Synthetic UGRID surface temperature")?;
    file.add_attribute("Conventions", "CF-1.7 UGRID-1.0")?;

    file.add_dimension("time", N_TIMES)?;
    file.add_dimension("nMesh2_node", node_x.len())?;
    file.add_dimension("nMesh2_face", n_faces)?;
    file.add_dimension("nMaxMesh2_face_nodes", 3)?;

    {
        let mut topo = file.add_variable::<i32>("Mesh2", &[])?;
        topo.put_attribute("cf_role", "mesh_topology")?;
        topo.put_attribute("long_name", "Topology data of 2D unstructured mesh")?;
        topo.put_attribute("topology_dimension", 2i32)?;
        topo.put_attribute("node_coordinates", "Mesh2_node_x Mesh2_node_y")?;
        topo.put_attribute("face_node_connectivity", "Mesh2_face_nodes")?;
        topo.put_attribute("face_dimension", "nMesh2_face")?;
        topo.put(arr0(0i32).view(), &[] as &[usize])?;
    }

    {
        let mut x_var = file.add_variable::<f64>("Mesh2_node_x", &["nMesh2_node"])?;
        x_var.put_attribute("standard_name", "longitude")?;
        x_var.put_attribute("units", "degrees_east")?;
        x_var.put(Array1::from(node_x).view(), ..)?;
    }

    {
        let mut y_var = file.add_variable::<f64>("Mesh2_node_y", &["nMesh2_node"])?;
        y_var.put_attribute("standard_name", "latitude")?;
        y_var.put_attribute("units", "degrees_north")?;
        y_var.put(Array1::from(node_y).view(), ..)?;
    }

    {
        let mut conn_var = file.add_variable::<i32>(
            "Mesh2_face_nodes",
            &["nMesh2_face", "nMaxMesh2_face_nodes"],
        )?;
        conn_var.put_attribute("cf_role", "face_node_connectivity")?;
        conn_var.put_attribute("start_index", 0i32)?;
        conn_var.put(connectivity.view(), ..)?;
    }

    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("standard_name", "time")?;
        time_var.put_attribute("units", "days since 2023-01-01")?;
        time_var.put_attribute("calendar", "standard")?;
        let times: Vec<f64> = (0..N_TIMES).map(|t| t as f64 * 30.0).collect();
        time_var.put(Array1::from(times).view(), ..)?;
    }

    {
        let mut temp_var =
            file.add_variable::<f64>("surface_temperature", &["time", "nMesh2_face"])?;
        temp_var.put_attribute("_FillValue", -999.0f64)?;
        temp_var.put_attribute("standard_name", "surface_temperature")?;
        temp_var.put_attribute("units", "K")?;
        temp_var.put_attribute("mesh", "Mesh2")?;
        temp_var.put_attribute("location", "face")?;

        let mut temp_data = Array2::<f64>::zeros((N_TIMES, n_faces));
        for t in 0..N_TIMES {
            let season = 5.0 * (t as f64 * std::f64::consts::PI / 6.0).cos();
            for (f, &(lon, lat)) in centres.iter().enumerate() {
                let zonal = 30.0 * lat.to_radians().cos();
                let wave = 3.0 * (2.0 * lon.to_radians()).sin();
                temp_data[[t, f]] = 250.0 + zonal + wave + season;
            }
        }
        // A patch of missing data over the first time step
        for f in 0..n_faces.min(8) {
            temp_data[[0, f]] = -999.0;
        }
        temp_var.put(temp_data.view(), ..)?;
    }

    println!("✅ Mesh with {} nodes and {} triangular faces", nx * lats.len(), n_faces);
    Ok(())
}

fn create_grid_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔨 Creating target grid file: {}", path.display());
    if path.exists() {
        std::fs::remove_file(path)?
    }

    let n_lon = (360.0 / GRID_STEP) as usize;
    let n_lat = (180.0 / GRID_STEP) as usize;
    let lon_edges: Vec<f64> = (0..=n_lon).map(|i| -180.0 + i as f64 * GRID_STEP).collect();
    let lat_edges: Vec<f64> = (0..=n_lat).map(|j| -90.0 + j as f64 * GRID_STEP).collect();

    let mut file = create(path)?;
    file.add_attribute("title", "Global 5 degree target grid")?;
    file.add_dimension("lon", n_lon)?;
    file.add_dimension("lat", n_lat)?;
    file.add_dimension("bnds", 2)?;

    for (name, edges, standard_name, units) in [
        ("lon", &lon_edges, "longitude", "degrees_east"),
        ("lat", &lat_edges, "latitude", "degrees_north"),
    ] {
        let points: Array1<f64> = edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
        let bounds = Array2::from_shape_fn((points.len(), 2), |(i, k)| edges[i + k]);
        let bounds_name = format!("{}_bnds", name);
        {
            let mut var = file.add_variable::<f64>(name, &[name])?;
            var.put_attribute("standard_name", standard_name)?;
            var.put_attribute("units", units)?;
            var.put_attribute("bounds", bounds_name.as_str())?;
            var.put(points.view(), ..)?;
        }
        let mut bounds_var = file.add_variable::<f64>(&bounds_name, &[name, "bnds"])?;
        bounds_var.put(bounds.view(), ..)?;
    }

    println!("✅ Grid of {} x {} cells", n_lat, n_lon);
    Ok(())
}
