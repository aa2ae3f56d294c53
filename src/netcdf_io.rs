//! NetCDF I/O for mesh cubes, grid cubes and regridded results
//!
//! Source data follows the UGRID conventions: a data variable names its mesh
//! topology variable in a `mesh` attribute and the element kind in a
//! `location` attribute; the topology variable points at the node coordinate
//! and face-node connectivity variables. Target grids are read from ordinary
//! CF 1D coordinate variables. Results are written as CF gridded data.

use crate::bounds::{guess_bounds, guess_latitude_bounds};
use crate::coords::{guess_axis, AttrValue, AuxCoord, CoordAxis, CoordMetadata, DimCoord};
use crate::cube::{Cube, CubeMetadata};
use crate::errors::{RegridError, Result};
use crate::masked::MaskedArray;
use crate::mesh::{Connectivity, Mesh, MeshLocation};
use chrono::Utc;
use ndarray::{Array1, Array2, ArrayD, IxDyn};
use netcdf::{AttributeValue, File, Variable, VariableMut};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::{fs, path::Path};

/// Default fill value for masked points in written files
pub const DEFAULT_FILL_VALUE: f64 = 9.969_209_968_386_869e36;

/// Attributes that are interpreted rather than copied into metadata
const RESERVED_ATTRIBUTES: [&str; 11] = [
    "standard_name",
    "long_name",
    "units",
    "_FillValue",
    "missing_value",
    "mesh",
    "location",
    "coordinates",
    "cell_methods",
    "bounds",
    "axis",
];

/// Reads a UGRID data variable as a cube with its mesh attached.
///
/// Other dimensions pick up 1D coordinate variables of the same name, and
/// variables listed in `coordinates` that avoid the mesh dimension become
/// auxiliary (or scalar) coordinates.
///
/// # Errors
///
/// Returns [`RegridError::VariableNotFound`] or [`RegridError::AttributeError`]
/// when the UGRID structure is incomplete, plus any NetCDF or shape error.
pub fn read_mesh_cube(file: &File, var_name: &str) -> Result<Cube> {
    let var = find_variable(file, var_name)?;

    let mesh_name = string_attr(&var, "mesh").ok_or_else(|| attr_error(var_name, "mesh"))?;
    let location = string_attr(&var, "location")
        .as_deref()
        .and_then(MeshLocation::parse)
        .ok_or_else(|| attr_error(var_name, "location"))?;

    let (mesh, element_dims) = read_mesh(file, &mesh_name)?;
    let element_dim = match location {
        MeshLocation::Face => element_dims.face,
        MeshLocation::Node => element_dims.node,
        MeshLocation::Edge => {
            return Err(RegridError::UnsupportedLocation {
                location: location.to_string(),
            })
        }
    };

    let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let mesh_dim = dim_names
        .iter()
        .position(|d| *d == element_dim)
        .ok_or_else(|| RegridError::ShapeMismatch {
            message: format!(
                "variable '{}' has no dimension '{}' for mesh '{}'",
                var_name, element_dim, mesh_name
            ),
        })?;

    let values = var.get_values::<f64, _>(..)?;
    let data = ArrayD::from_shape_vec(IxDyn(&shape), values)?;
    let fill = numeric_attr(&var, "_FillValue").or_else(|| numeric_attr(&var, "missing_value"));
    let data = MaskedArray::from_fill_value(data, fill.unwrap_or(f64::NAN));

    let mut cube = Cube::new(data).with_metadata(read_cube_metadata(&var, var_name));
    cube.set_mesh(Arc::new(mesh), location, mesh_dim)?;

    for (dim, dim_name) in dim_names.iter().enumerate() {
        if dim == mesh_dim {
            continue;
        }
        let Some(coord_var) = file.variable(dim_name) else {
            continue;
        };
        if coord_var.dimensions().len() != 1 {
            continue;
        }
        match read_dim_coord(file, &coord_var, None) {
            Ok(coord) => cube.add_dim_coord(coord, dim)?,
            Err(e) => {
                tracing::warn!(coordinate = %dim_name, error = %e, "reading as auxiliary coordinate");
                cube.add_aux_coord(read_aux_coord(&coord_var)?, &[dim])?;
            }
        }
    }

    if let Some(coordinates) = string_attr(&var, "coordinates") {
        for name in coordinates.split_whitespace() {
            let Some(coord_var) = file.variable(name) else {
                tracing::warn!(coordinate = name, "listed coordinate variable not found");
                continue;
            };
            let coord_dims: Option<Vec<usize>> = coord_var
                .dimensions()
                .iter()
                .map(|d| dim_names.iter().position(|n| *n == d.name()))
                .collect();
            match coord_dims {
                Some(dims) if !dims.contains(&mesh_dim) => {
                    cube.add_aux_coord(read_aux_coord(&coord_var)?, &dims)?;
                }
                _ => {}
            }
        }
    }

    tracing::debug!(
        variable = var_name,
        shape = ?cube.shape(),
        mesh_dim,
        "read mesh cube"
    );

    Ok(cube)
}

/// Names of the NetCDF dimensions mesh elements run along
struct ElementDims {
    face: String,
    node: String,
}

fn read_mesh(file: &File, mesh_name: &str) -> Result<(Mesh, ElementDims)> {
    let topo = find_variable(file, mesh_name)?;

    let topology_dimension = numeric_attr(&topo, "topology_dimension")
        .ok_or_else(|| attr_error(mesh_name, "topology_dimension"))?;

    let node_names: Vec<String> = string_attr(&topo, "node_coordinates")
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    let [first, second] = node_names.as_slice() else {
        return Err(attr_error(mesh_name, "node_coordinates"));
    };
    let first_var = find_variable(file, first)?;
    let second_var = find_variable(file, second)?;
    let node_dim = first_var
        .dimensions()
        .first()
        .map(|d| d.name())
        .ok_or_else(|| attr_error(mesh_name, "node_coordinates"))?;
    let first = read_aux_coord(&first_var)?;
    let second = read_aux_coord(&second_var)?;
    let (node_x, node_y) = if guess_axis(&first.metadata) == Some(CoordAxis::Y) {
        (second, first)
    } else {
        (first, second)
    };

    let conn_name = string_attr(&topo, "face_node_connectivity")
        .ok_or_else(|| attr_error(mesh_name, "face_node_connectivity"))?;
    let conn_var = find_variable(file, &conn_name)?;
    let conn_dims: Vec<String> = conn_var.dimensions().iter().map(|d| d.name()).collect();
    let conn_shape: Vec<usize> = conn_var.dimensions().iter().map(|d| d.len()).collect();
    if conn_shape.len() != 2 {
        return Err(RegridError::InvalidConnectivity {
            message: format!("'{}' must be two-dimensional", conn_name),
        });
    }
    let indices = Array2::from_shape_vec(
        (conn_shape[0], conn_shape[1]),
        conn_var.get_values::<i64, _>(..)?,
    )?;

    let face_dim_attr = string_attr(&topo, "face_dimension");
    let (indices, face_dim) = if face_dim_attr.as_deref() == Some(conn_dims[1].as_str()) {
        (indices.reversed_axes().as_standard_layout().to_owned(), conn_dims[1].clone())
    } else {
        (indices, conn_dims[0].clone())
    };

    let start_index = numeric_attr(&conn_var, "start_index").unwrap_or(0.0) as i64;
    let mut connectivity = Connectivity::new(indices, start_index);
    if let Some(fill) = numeric_attr(&conn_var, "_FillValue") {
        connectivity = connectivity.with_fill_value(fill as i64);
    }

    let mesh = Mesh::new(topology_dimension as usize, node_x, node_y, connectivity)?
        .with_var_name(mesh_name);

    tracing::debug!(
        mesh = mesh_name,
        nodes = mesh.num_nodes(),
        faces = mesh.num_faces(),
        "read UGRID mesh"
    );

    Ok((
        mesh,
        ElementDims {
            face: face_dim,
            node: node_dim,
        },
    ))
}

/// Reads a target grid as a zero-valued `(lat, lon)` cube.
///
/// Coordinate variables are taken by name when given, otherwise found by
/// `standard_name` or units. Missing bounds are guessed from the points and
/// the longitude is marked circular when its cells span 360 degrees.
///
/// # Errors
///
/// Returns [`RegridError::CoordinateNotFound`] if an axis cannot be found,
/// plus NetCDF and coordinate construction errors.
pub fn read_grid_cube(file: &File, lon_name: Option<&str>, lat_name: Option<&str>) -> Result<Cube> {
    let lon_var = match lon_name {
        Some(name) => find_variable(file, name)?,
        None => find_axis_variable(file, CoordAxis::X)?,
    };
    let lat_var = match lat_name {
        Some(name) => find_variable(file, name)?,
        None => find_axis_variable(file, CoordAxis::Y)?,
    };

    let mut lon = read_dim_coord(file, &lon_var, Some(CoordAxis::X))?;
    let mut lat = read_dim_coord(file, &lat_var, Some(CoordAxis::Y))?;
    lon.metadata.standard_name.get_or_insert_with(|| "longitude".to_string());
    lat.metadata.standard_name.get_or_insert_with(|| "latitude".to_string());

    if let Some(b) = lon.bounds() {
        if let Some(last) = b.nrows().checked_sub(1) {
            let span = (b[[last, 1]] - b[[0, 0]]).abs();
            lon.circular = (span - 360.0).abs() < 1e-6;
        }
    }

    let mut cube = Cube::new(MaskedArray::zeros(&[lat.len(), lon.len()])).with_metadata(
        CubeMetadata {
            long_name: Some("target grid".to_string()),
            ..CubeMetadata::default()
        },
    );
    cube.add_dim_coord(lat, 0)?;
    cube.add_dim_coord(lon, 1)?;

    Ok(cube)
}

fn find_axis_variable<'f>(file: &'f File, axis: CoordAxis) -> Result<Variable<'f>> {
    file.variables()
        .find(|v| {
            let dims = v.dimensions();
            dims.len() == 1
                && dims[0].name() == v.name()
                && guess_axis(&read_coord_metadata(v)) == Some(axis)
        })
        .ok_or_else(|| RegridError::CoordinateNotFound {
            name: format!("{:?} axis coordinate variable", axis),
        })
}

/// Reads a 1D coordinate variable and its CF bounds. With `guess_for` set,
/// missing bounds are guessed, clipped to the poles for a Y axis.
fn read_dim_coord(file: &File, var: &Variable<'_>, guess_for: Option<CoordAxis>) -> Result<DimCoord> {
    let points = Array1::from(var.get_values::<f64, _>(..)?);
    let mut bounds = None;
    if let Some(bounds_name) = string_attr(var, "bounds") {
        let bounds_var = find_variable(file, &bounds_name)?;
        let values = bounds_var.get_values::<f64, _>(..)?;
        bounds = Some(Array2::from_shape_vec((points.len(), 2), values)?);
    }
    if bounds.is_none() {
        let points = points.to_vec();
        bounds = match guess_for {
            Some(CoordAxis::Y) => guess_latitude_bounds(&points),
            Some(CoordAxis::X) => guess_bounds(&points),
            None => None,
        };
    }
    DimCoord::new(read_coord_metadata(var), points, bounds)
}

fn read_aux_coord(var: &Variable<'_>) -> Result<AuxCoord> {
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let points = ArrayD::from_shape_vec(IxDyn(&shape), var.get_values::<f64, _>(..)?)?;
    Ok(AuxCoord::new(read_coord_metadata(var), points))
}

fn read_coord_metadata(var: &Variable<'_>) -> CoordMetadata {
    CoordMetadata {
        standard_name: string_attr(var, "standard_name"),
        long_name: string_attr(var, "long_name"),
        var_name: Some(var.name()),
        units: string_attr(var, "units"),
        attributes: read_attributes(var),
    }
}

fn read_cube_metadata(var: &Variable<'_>, var_name: &str) -> CubeMetadata {
    CubeMetadata {
        standard_name: string_attr(var, "standard_name"),
        long_name: string_attr(var, "long_name"),
        var_name: Some(var_name.to_string()),
        units: string_attr(var, "units"),
        attributes: read_attributes(var),
        cell_methods: string_attr(var, "cell_methods").into_iter().collect(),
    }
}

fn read_attributes(var: &Variable<'_>) -> BTreeMap<String, AttrValue> {
    let mut attributes = BTreeMap::new();
    for attr in var.attributes() {
        let name = attr.name().to_string();
        if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
            continue;
        }
        match attr.value().ok().and_then(to_attr_value) {
            Some(value) => {
                attributes.insert(name, value);
            }
            None => {
                tracing::warn!(attribute = %name, "skipped unsupported attribute type");
            }
        }
    }
    attributes
}

fn to_attr_value(value: AttributeValue) -> Option<AttrValue> {
    Some(match value {
        AttributeValue::Str(s) => AttrValue::Str(s),
        AttributeValue::Strs(v) => AttrValue::Str(v.join(" ")),
        AttributeValue::Double(v) => AttrValue::Double(v),
        AttributeValue::Float(v) => AttrValue::Double(f64::from(v)),
        AttributeValue::Doubles(v) => AttrValue::Doubles(v),
        AttributeValue::Floats(v) => AttrValue::Doubles(v.into_iter().map(f64::from).collect()),
        AttributeValue::Schar(v) => AttrValue::Int(i64::from(v)),
        AttributeValue::Uchar(v) => AttrValue::Int(i64::from(v)),
        AttributeValue::Short(v) => AttrValue::Int(i64::from(v)),
        AttributeValue::Ushort(v) => AttrValue::Int(i64::from(v)),
        AttributeValue::Int(v) => AttrValue::Int(i64::from(v)),
        AttributeValue::Uint(v) => AttrValue::Int(i64::from(v)),
        AttributeValue::Longlong(v) => AttrValue::Int(v),
        AttributeValue::Shorts(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Ints(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Longlongs(v) => AttrValue::Ints(v),
        _ => return None,
    })
}

fn find_variable<'f>(file: &'f File, name: &str) -> Result<Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| RegridError::VariableNotFound {
            var: name.to_string(),
        })
}

fn attr_error(var: &str, attr: &str) -> RegridError {
    RegridError::AttributeError {
        var: var.to_string(),
        attr: attr.to_string(),
    }
}

fn string_attr(var: &Variable<'_>, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

fn numeric_attr(var: &Variable<'_>, name: &str) -> Option<f64> {
    match to_attr_value(var.attribute(name)?.value().ok()?)? {
        AttrValue::Double(v) => Some(v),
        AttrValue::Int(v) => Some(v as f64),
        _ => None,
    }
}

/// Writes cubes as CF NetCDF files
pub struct NetCDFWriter<'a> {
    output_path: &'a Path,
    fill_value: f64,
}

impl<'a> NetCDFWriter<'a> {
    /// Create a new NetCDF writer
    pub fn new(output_path: &'a Path) -> Self {
        Self {
            output_path,
            fill_value: DEFAULT_FILL_VALUE,
        }
    }

    /// Use `fill_value` for masked points instead of the NetCDF default
    #[must_use]
    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = fill_value;
        self
    }

    /// Write a cube, its dimension coordinates (with bounds) and its
    /// auxiliary coordinates, replacing any existing file.
    pub fn write_cube(&self, cube: &Cube) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = netcdf::create(self.output_path)?;

        let dim_names: Vec<String> = (0..cube.ndim())
            .map(|d| match cube.dim_coord_for(d) {
                Some(c) => variable_name(&c.metadata),
                None => format!("dim{}", d),
            })
            .collect();
        for (name, &len) in dim_names.iter().zip(cube.shape()) {
            file.add_dimension(name, len)?;
        }
        if cube.dim_coords().any(|(c, _)| c.has_bounds()) {
            file.add_dimension("bnds", 2)?;
        }

        for (coord, dim) in cube.dim_coords() {
            let name = &dim_names[dim];
            let bounds_name = format!("{}_bnds", name);
            {
                let mut var = file.add_variable::<f64>(name, &[name.as_str()])?;
                var.put_values(&coord.points().to_vec(), ..)?;
                put_coord_metadata(&mut var, &coord.metadata)?;
                if coord.has_bounds() {
                    var.put_attribute("bounds", bounds_name.as_str())?;
                }
            }
            if let Some(b) = coord.bounds() {
                let mut bounds_var =
                    file.add_variable::<f64>(&bounds_name, &[name.as_str(), "bnds"])?;
                bounds_var.put_values(&b.iter().copied().collect::<Vec<_>>(), ..)?;
            }
        }

        let mut coordinates = Vec::new();
        for (coord, dims) in cube.aux_coords() {
            let name = variable_name(&coord.metadata);
            let dims: Vec<&str> = dims.iter().map(|&d| dim_names[d].as_str()).collect();
            let mut var = file.add_variable::<f64>(&name, &dims)?;
            if dims.is_empty() {
                var.put(coord.points.view(), &[] as &[usize])?;
            } else {
                var.put(coord.points.view(), ..)?;
            }
            put_coord_metadata(&mut var, &coord.metadata)?;
            coordinates.push(name);
        }

        let data_name = cube
            .metadata
            .var_name
            .clone()
            .unwrap_or_else(|| sanitize(cube.name()));
        let dim_refs: Vec<&str> = dim_names.iter().map(String::as_str).collect();
        let mut data_var = file.add_variable::<f64>(&data_name, &dim_refs)?;
        data_var.put_attribute("_FillValue", self.fill_value)?;
        let filled = cube.data().filled(self.fill_value);
        data_var.put_values(&filled.iter().copied().collect::<Vec<_>>(), ..)?;

        let metadata = &cube.metadata;
        if let Some(v) = &metadata.standard_name {
            data_var.put_attribute("standard_name", v.as_str())?;
        }
        if let Some(v) = &metadata.long_name {
            data_var.put_attribute("long_name", v.as_str())?;
        }
        if let Some(v) = &metadata.units {
            data_var.put_attribute("units", v.as_str())?;
        }
        if !metadata.cell_methods.is_empty() {
            data_var.put_attribute("cell_methods", metadata.cell_methods.join(" "))?;
        }
        if !coordinates.is_empty() {
            data_var.put_attribute("coordinates", coordinates.join(" "))?;
        }
        for (name, value) in &metadata.attributes {
            put_attr_value(&mut data_var, name, value)?;
        }

        file.add_attribute("Conventions", "CF-1.7")?;
        file.add_attribute(
            "history",
            format!("Created by mesh_regrid on {}", Utc::now().to_rfc3339()),
        )?;

        tracing::debug!(path = %self.output_path.display(), variable = %data_name, "wrote cube");

        Ok(())
    }
}

/// Writes a cube to a new NetCDF file.
pub fn write_cube_to_netcdf(cube: &Cube, output_path: &Path) -> Result<()> {
    NetCDFWriter::new(output_path).write_cube(cube)
}

fn variable_name(metadata: &CoordMetadata) -> String {
    metadata
        .var_name
        .clone()
        .unwrap_or_else(|| sanitize(metadata.name()))
}

fn sanitize(name: &str) -> String {
    name.replace(|c: char| !(c.is_ascii_alphanumeric() || c == '_'), "_")
}

fn put_coord_metadata(var: &mut VariableMut<'_>, metadata: &CoordMetadata) -> Result<()> {
    if let Some(v) = &metadata.standard_name {
        var.put_attribute("standard_name", v.as_str())?;
    }
    if let Some(v) = &metadata.long_name {
        var.put_attribute("long_name", v.as_str())?;
    }
    if let Some(v) = &metadata.units {
        var.put_attribute("units", v.as_str())?;
    }
    for (name, value) in &metadata.attributes {
        put_attr_value(var, name, value)?;
    }
    Ok(())
}

fn put_attr_value(var: &mut VariableMut<'_>, name: &str, value: &AttrValue) -> Result<()> {
    match value {
        AttrValue::Str(s) => {
            var.put_attribute(name, s.as_str())?;
        }
        AttrValue::Int(v) => match i32::try_from(*v) {
            Ok(v) => {
                var.put_attribute(name, v)?;
            }
            Err(_) => {
                var.put_attribute(name, *v)?;
            }
        },
        AttrValue::Ints(v) => {
            var.put_attribute(name, v.clone())?;
        }
        AttrValue::Double(v) => {
            var.put_attribute(name, *v)?;
        }
        AttrValue::Doubles(v) => {
            var.put_attribute(name, v.clone())?;
        }
    }
    Ok(())
}
