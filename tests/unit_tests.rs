//! Unit tests for the data model, bounds handling and engine descriptors

mod common;

use common::{grid_cube, lattice_mesh, mesh_cube};
use mesh_regrid::{
    bounds::{bounds_cf_to_simple_1d, guess_bounds, guess_latitude_bounds, simple_1d_to_bounds_cf},
    coords::{guess_axis, AuxCoord, CoordAxis, CoordMetadata, CoordRef, DimCoord},
    cube::Cube,
    engine::{validate_mdtol, GridInfo, MeshInfo},
    errors::RegridError,
    masked::MaskedArray,
    mesh::{Connectivity, MeshLocation},
    metadata::summarize_cube,
    parallel::{get_parallel_info, ParallelConfig},
};
use ndarray::{array, Array1, ArrayD, IxDyn};
use std::sync::Arc;

#[test]
fn test_error_messages() {
    let err = RegridError::InvalidMdtol(1.5);
    assert_eq!(
        format!("{}", err),
        "Value for mdtol must be in range 0 - 1, got 1.5."
    );

    let err = RegridError::UnsupportedTopology { dimension: 1 };
    assert!(format!("{}", err).contains("must be 2, got 1"));

    let err = RegridError::NonContiguousBounds {
        index: 0,
        upper: 1.0,
        next_lower: 1.5,
    };
    assert!(format!("{}", err).contains("not contiguous"));

    let err = RegridError::VariableNotFound {
        var: "temp".to_string(),
    };
    assert!(format!("{}", err).contains("Variable 'temp' not found"));

    let generic: RegridError = "Test error".into();
    assert_eq!(format!("{}", generic), "Test error");
}

#[test]
fn test_bounds_contiguous() {
    let bounds = array![[0.0, 1.0], [1.0, 2.5], [2.5, 4.0]];
    let simple = bounds_cf_to_simple_1d(bounds.view()).expect("contiguous");
    assert_eq!(simple, array![0.0, 1.0, 2.5, 4.0]);
}

#[test]
fn test_bounds_descending() {
    let bounds = array![[90.0, 45.0], [45.0, 0.0]];
    let simple = bounds_cf_to_simple_1d(bounds.view()).expect("contiguous");
    assert_eq!(simple, array![90.0, 45.0, 0.0]);
}

#[test]
fn test_bounds_single_cell() {
    let bounds = array![[-10.0, 10.0]];
    let simple = bounds_cf_to_simple_1d(bounds.view()).expect("single cell");
    assert_eq!(simple, array![-10.0, 10.0]);
}

#[test]
fn test_bounds_gap_rejected() {
    let bounds = array![[0.0, 1.0], [1.0, 2.0], [2.5, 3.0]];
    match bounds_cf_to_simple_1d(bounds.view()) {
        Err(RegridError::NonContiguousBounds {
            index,
            upper,
            next_lower,
        }) => {
            assert_eq!(index, 1);
            assert_eq!(upper, 2.0);
            assert_eq!(next_lower, 2.5);
        }
        other => panic!("Expected NonContiguousBounds, got {:?}", other),
    }
}

#[test]
fn test_bounds_overlap_rejected() {
    let bounds = array![[0.0, 1.0], [0.9, 2.0]];
    assert!(matches!(
        bounds_cf_to_simple_1d(bounds.view()),
        Err(RegridError::NonContiguousBounds { index: 0, .. })
    ));
}

#[test]
fn test_bounds_bad_shape_rejected() {
    let empty = ndarray::Array2::<f64>::zeros((0, 2));
    assert!(matches!(
        bounds_cf_to_simple_1d(empty.view()),
        Err(RegridError::InvalidBounds { .. })
    ));

    let wide = ndarray::Array2::<f64>::zeros((2, 3));
    assert!(matches!(
        bounds_cf_to_simple_1d(wide.view()),
        Err(RegridError::InvalidBounds { .. })
    ));
}

#[test]
fn test_guess_bounds() {
    let bounds = guess_bounds(&[5.0, 15.0, 25.0]).expect("three points");
    assert_eq!(bounds, array![[0.0, 10.0], [10.0, 20.0], [20.0, 30.0]]);
    assert!(guess_bounds(&[1.0]).is_none());
    assert_eq!(simple_1d_to_bounds_cf(&[0.0, 1.0]), array![[0.0, 1.0]]);
}

#[test]
fn test_guess_latitude_bounds_clipped_at_poles() {
    let points = [-90.0, -60.0, -30.0, 0.0, 30.0, 60.0, 90.0];
    assert_eq!(guess_bounds(&points).unwrap()[[0, 0]], -105.0);

    let bounds = guess_latitude_bounds(&points).unwrap();
    assert_eq!(bounds[[0, 0]], -90.0);
    assert_eq!(bounds[[0, 1]], -75.0);
    assert_eq!(bounds[[6, 0]], 75.0);
    assert_eq!(bounds[[6, 1]], 90.0);
    let edges = bounds_cf_to_simple_1d(bounds.view()).unwrap();
    assert_eq!(edges.len(), 8);

    // Descending points clip the same way
    let bounds = guess_latitude_bounds(&[90.0, 0.0, -90.0]).unwrap();
    assert_eq!(bounds, array![[90.0, 45.0], [45.0, -45.0], [-45.0, -90.0]]);

    // Points outside the valid range are not latitudes, so nothing is clipped
    let bounds = guess_latitude_bounds(&[0.0, 100.0]).unwrap();
    assert_eq!(bounds[[1, 1]], 150.0);
}

#[test]
fn test_masked_array() {
    let data = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1.0, -999.0, f64::NAN, 4.0]).unwrap();
    let masked = MaskedArray::from_fill_value(data, -999.0);
    assert_eq!(masked.count_masked(), 2);
    assert_eq!(masked.get(&[0, 0]), Some(1.0));
    assert_eq!(masked.get(&[0, 1]), None);
    assert_eq!(masked.get(&[1, 0]), None);
    assert_eq!(masked.get(&[5, 5]), None);

    let filled = masked.filled(0.0);
    assert_eq!(filled[[0, 1]], 0.0);
    assert_eq!(filled[[1, 1]], 4.0);

    let mismatch = MaskedArray::with_mask(
        ArrayD::zeros(IxDyn(&[3])),
        ArrayD::from_elem(IxDyn(&[2]), false),
    );
    assert!(matches!(mismatch, Err(RegridError::ShapeMismatch { .. })));
}

#[test]
fn test_coord_metadata_names() {
    let md = CoordMetadata::standard("longitude").with_var_name("lon");
    assert_eq!(md.name(), "longitude");
    assert!(md.matches("lon"));
    assert!(md.matches("longitude"));
    assert!(!md.matches("lat"));

    let md = CoordMetadata::default().with_long_name("model level");
    assert_eq!(md.name(), "model level");
    assert_eq!(CoordMetadata::default().name(), "unknown");
}

#[test]
fn test_guess_axis() {
    assert_eq!(
        guess_axis(&CoordMetadata::standard("longitude")),
        Some(CoordAxis::X)
    );
    assert_eq!(
        guess_axis(&CoordMetadata::standard("grid_latitude")),
        Some(CoordAxis::Y)
    );
    let by_units = CoordMetadata::default()
        .with_var_name("nav_lon")
        .with_units("degrees_east");
    assert_eq!(guess_axis(&by_units), Some(CoordAxis::X));
    assert_eq!(guess_axis(&CoordMetadata::standard("time")), None);
}

#[test]
fn test_dim_coord_validation() {
    let md = CoordMetadata::standard("latitude");
    assert!(DimCoord::new(md.clone(), array![0.0, 1.0, 1.0], None).is_err());
    assert!(DimCoord::new(md.clone(), array![0.0, 2.0, 1.0], None).is_err());
    assert!(DimCoord::new(md.clone(), array![2.0, 1.0, 0.0], None).is_ok());
    assert!(matches!(
        DimCoord::new(md.clone(), array![0.0, 1.0], Some(array![[0.0, 0.5]])),
        Err(RegridError::InvalidBounds { .. })
    ));

    let mut coord = DimCoord::new(md, array![0.0, 10.0, 20.0], None).unwrap();
    assert!(!coord.has_bounds());
    coord.guess_bounds().unwrap();
    assert_eq!(
        coord.bounds().unwrap(),
        &array![[-5.0, 5.0], [5.0, 15.0], [15.0, 25.0]]
    );
}

#[test]
fn test_cube_coordinates() {
    let mut cube = grid_cube(&[0.0, 10.0, 20.0], &[0.0, 10.0], false);
    assert_eq!(cube.shape(), &[1, 2]);

    match cube.coord("longitude").unwrap() {
        CoordRef::Dim(c) => assert_eq!(c.len(), 2),
        CoordRef::Aux(_) => panic!("longitude should be a dimension coordinate"),
    }
    assert_eq!(cube.coord_dims("lat"), Some(vec![0]));
    assert!(matches!(
        cube.coord("time"),
        Err(RegridError::CoordinateNotFound { .. })
    ));

    // Wrong length
    let bad = DimCoord::new(CoordMetadata::standard("x"), array![0.0, 1.0, 2.0], None).unwrap();
    assert!(cube.add_dim_coord(bad, 1).is_err());

    // Dimension already described
    let dup = DimCoord::new(CoordMetadata::standard("y"), array![3.0], None).unwrap();
    assert!(cube.add_dim_coord(dup, 0).is_err());

    cube.add_aux_coord(AuxCoord::scalar(CoordMetadata::standard("height"), 2.0), &[])
        .unwrap();
    assert_eq!(cube.scalar_coords().count(), 1);
    assert!(matches!(cube.coord("height").unwrap(), CoordRef::Aux(_)));
    assert!(matches!(
        cube.coord("height").unwrap().as_dim(),
        Err(RegridError::NotDimCoord { .. })
    ));
}

#[test]
fn test_cube_mesh_binding() {
    let mesh = lattice_mesh(&[0.0, 10.0, 20.0], &[0.0, 10.0], 0);
    assert_eq!(mesh.num_faces(), 2);
    assert_eq!(mesh.num_nodes(), 6);

    let mut cube = Cube::new(MaskedArray::zeros(&[3, 2]));
    assert!(cube.mesh().is_none());
    assert!(cube.mesh_dim().is_none());

    let mesh = Arc::new(mesh);
    assert!(cube
        .set_mesh(Arc::clone(&mesh), MeshLocation::Face, 0)
        .is_err());
    assert!(cube
        .set_mesh(Arc::clone(&mesh), MeshLocation::Face, 2)
        .is_err());
    cube.set_mesh(mesh, MeshLocation::Face, 1).unwrap();
    assert_eq!(cube.mesh_dim(), Some(1));
    assert_eq!(cube.mesh().unwrap().num_faces(), 2);
}

#[test]
fn test_mesh_info_start_index() {
    let mesh = lattice_mesh(&[0.0, 1.0, 2.0], &[0.0, 1.0], 1);
    let conn = &mesh.face_node_connectivity;
    let info = MeshInfo::new(mesh.node_points(), conn.indices.view(), conn.start_index).unwrap();
    assert_eq!(info.size(), 2);
    assert_eq!(info.num_nodes(), 6);
    assert_eq!(info.start_index(), 1);
    assert_eq!(info.face_nodes(0), &[0, 1, 4, 3]);
    assert_eq!(
        info.face_polygon(1),
        vec![[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0]]
    );
}

#[test]
fn test_mesh_info_rejects_bad_connectivity() {
    let nodes = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

    let out_of_range = array![[0_i64, 1, 3]];
    assert!(matches!(
        MeshInfo::new(nodes.clone(), out_of_range.view(), 0),
        Err(RegridError::InvalidConnectivity { .. })
    ));

    // One-based indices read with the wrong start index
    let one_based = array![[1_i64, 2, 3]];
    assert!(MeshInfo::new(nodes.clone(), one_based.view(), 0).is_err());
    assert!(MeshInfo::new(nodes.clone(), one_based.view(), 1).is_ok());

    let too_small = array![[0_i64, 1, -1]];
    let conn = Connectivity::new(too_small, 0).with_fill_value(-1);
    assert!(matches!(
        MeshInfo::with_mask(nodes, conn.indices.view(), 0, conn.mask_view()),
        Err(RegridError::InvalidConnectivity { .. })
    ));
}

#[test]
fn test_mesh_info_ragged_faces() {
    let nodes = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [2.0, 0.5]];
    let indices = array![[0_i64, 1, 2, 3], [1, 4, 2, -1]];
    let conn = Connectivity::new(indices, 0).with_fill_value(-1);
    let info = MeshInfo::with_mask(nodes, conn.indices.view(), 0, conn.mask_view()).unwrap();
    assert_eq!(info.face_nodes(0).len(), 4);
    assert_eq!(info.face_nodes(1), &[1, 4, 2]);
}

#[test]
fn test_grid_info_validation() {
    let lon = array![5.0, 15.0];
    let lat = array![5.0];
    let grid = GridInfo::new(
        lon.clone(),
        lat.clone(),
        array![0.0, 10.0, 20.0],
        array![0.0, 10.0],
        false,
    )
    .unwrap();
    assert_eq!(grid.shape(), (1, 2));
    assert_eq!(grid.size(), 2);
    assert_eq!(grid.cell_index(0, 1), 1);

    assert!(GridInfo::new(lon.clone(), lat.clone(), array![0.0, 10.0], array![0.0, 10.0], false).is_err());
    assert!(GridInfo::new(
        lon.clone(),
        lat.clone(),
        array![0.0, 20.0, 10.0],
        array![0.0, 10.0],
        false
    )
    .is_err());
    assert!(GridInfo::new(lon, lat, array![0.0, 10.0, 20.0], array![85.0, 95.0], false).is_err());
    assert!(GridInfo::new(
        Array1::zeros(0),
        array![0.0],
        array![0.0],
        array![-1.0, 1.0],
        false
    )
    .is_err());
}

#[test]
fn test_validate_mdtol() {
    assert_eq!(validate_mdtol(0.0).unwrap(), 0.0);
    assert_eq!(validate_mdtol(1.0).unwrap(), 1.0);
    assert!(matches!(
        validate_mdtol(-0.01),
        Err(RegridError::InvalidMdtol(_))
    ));
    assert!(validate_mdtol(1.01).is_err());
    assert!(validate_mdtol(f64::NAN).is_err());
}

#[test]
fn test_summarize_cube() {
    let mesh = lattice_mesh(&[0.0, 10.0, 20.0, 30.0], &[0.0, 10.0], 0);
    let data = ArrayD::from_shape_vec(IxDyn(&[3]), vec![1.0, -1.0, 3.0]).unwrap();
    let cube = mesh_cube(mesh, MaskedArray::from_fill_value(data, -1.0), 0);

    let summary = summarize_cube(&cube);
    assert_eq!(summary.name, "sea_surface_temperature");
    assert_eq!(summary.shape, vec![3]);
    assert_eq!(summary.mesh, Some(("face".to_string(), 0)));
    assert_eq!(summary.masked_points, 1);
    assert_eq!(summary.total_points, 3);
    assert_eq!(summary.min, Some(1.0));
    assert_eq!(summary.max, Some(3.0));
    assert_eq!(summary.mean, Some(2.0));
}

#[test]
fn test_parallel_config() {
    let default_config = ParallelConfig::default();
    assert!(default_config.num_threads.is_none());

    let config_4 = ParallelConfig::with_threads(4);
    assert_eq!(config_4.num_threads, Some(4));

    let all_cores = ParallelConfig::all_cores();
    assert!(all_cores.num_threads.unwrap() > 0);
    assert!(default_config.effective_threads() > 0);
    assert_eq!(config_4.effective_threads(), 4);

    let threads = ParallelConfig::with_threads(2)
        .install(rayon::current_num_threads)
        .unwrap();
    assert_eq!(threads, 2);
    assert!(matches!(
        ParallelConfig::with_threads(0).install(|| ()),
        Err(RegridError::ThreadPoolError(_))
    ));

    let info = get_parallel_info();
    assert!(info.current_threads > 0);
    assert!(info.available_cores > 0);
    info.print_info();
}

#[test]
fn test_circular_grid_span() {
    let lon = array![90.0, 270.0];
    let lat = array![0.0];
    let lat_bounds = array![-10.0, 10.0];

    assert!(GridInfo::new(lon.clone(), lat.clone(), array![0.0, 180.0, 360.0], lat_bounds.clone(), true)
        .unwrap()
        .circular());

    // Wrapping a grid wider than the globe would count overlaps twice
    assert!(matches!(
        GridInfo::new(lon.clone(), lat.clone(), array![0.0, 200.0, 400.0], lat_bounds.clone(), true),
        Err(RegridError::InvalidGrid { .. })
    ));
    assert!(GridInfo::new(lon.clone(), lat.clone(), array![0.0, 200.0, 400.0], lat_bounds.clone(), false).is_ok());

    // A regional grid marked circular is kept, with a warning
    assert!(GridInfo::new(lon, lat, array![0.0, 50.0, 100.0], lat_bounds, true).is_ok());
}
