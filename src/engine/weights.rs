//! First-order conservative weight generation
//!
//! Face polygons and grid cells are compared in the cylindrical equal-area
//! plane `(lon, sin(lat))`, where a latitude/longitude cell is an axis-aligned
//! rectangle whose area is proportional to its area on the sphere. Each face
//! is clipped against every candidate cell (Sutherland–Hodgman against the
//! four cell edges) and the overlap area is measured with the shoelace
//! formula. Weights are `overlap / cell_area`, so a fully covered target cell
//! has weights summing to one.

use super::grid_info::GridInfo;
use super::mesh_info::MeshInfo;
use rayon::prelude::*;
use std::ops::Range;

/// Overlaps smaller than this fraction of a cell are dropped
const MIN_WEIGHT: f64 = 1e-12;

/// Sparse `(target, source, weight)` entry
pub type Triplet = (usize, usize, f64);

/// Cell edges sorted ascending, remembering whether the grid runs the other way
#[derive(Debug, Clone)]
pub(crate) struct AxisEdges {
    edges: Vec<f64>,
    reversed: bool,
}

impl AxisEdges {
    pub(crate) fn new(edges: &[f64]) -> Self {
        let reversed = edges.len() > 1 && edges[0] > edges[edges.len() - 1];
        let mut edges = edges.to_vec();
        if reversed {
            edges.reverse();
        }
        Self { edges, reversed }
    }

    pub(crate) fn num_cells(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub(crate) fn lower(&self) -> f64 {
        self.edges[0]
    }

    pub(crate) fn upper(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Ascending cell `i` as `(lower, upper)`
    pub(crate) fn cell(&self, i: usize) -> (f64, f64) {
        (self.edges[i], self.edges[i + 1])
    }

    /// Ascending cells whose interior intersects the open interval `(lo, hi)`
    pub(crate) fn cells_overlapping(&self, lo: f64, hi: f64) -> Range<usize> {
        let start = self.edges.partition_point(|&e| e <= lo).saturating_sub(1);
        let end = self.edges.partition_point(|&e| e < hi).min(self.num_cells());
        start..end.max(start)
    }

    /// Maps an ascending cell index back to the grid's own ordering
    pub(crate) fn grid_index(&self, i: usize) -> usize {
        if self.reversed {
            self.num_cells() - 1 - i
        } else {
            i
        }
    }
}

/// Computes all non-negligible weights, processing faces in parallel.
///
/// Triplets come back in face order regardless of thread count.
#[must_use]
pub fn compute_weights(src: &MeshInfo, tgt: &GridInfo) -> Vec<Triplet> {
    let lon_axis = AxisEdges::new(&tgt.lon_bounds().to_vec());
    let sin_lat_edges: Vec<f64> = tgt
        .lat_bounds()
        .iter()
        .map(|lat| lat.to_radians().sin())
        .collect();
    let lat_axis = AxisEdges::new(&sin_lat_edges);

    let per_face: Vec<Vec<Triplet>> = (0..src.size())
        .into_par_iter()
        .map(|face| face_weights(src, tgt, &lon_axis, &lat_axis, face))
        .collect();

    per_face.into_iter().flatten().collect()
}

fn face_weights(
    src: &MeshInfo,
    tgt: &GridInfo,
    lon_axis: &AxisEdges,
    lat_axis: &AxisEdges,
    face: usize,
) -> Vec<Triplet> {
    let polygon = project(&unwrap_longitudes(split_pole_vertices(src.face_polygon(face))));
    let mut triplets = Vec::new();

    for shift in candidate_shifts(&polygon, lon_axis, tgt.circular()) {
        let shifted: Vec<[f64; 2]> = polygon.iter().map(|p| [p[0] + shift, p[1]]).collect();
        let (min, max) = bounding_box(&shifted);

        for ai in lon_axis.cells_overlapping(min[0], max[0]) {
            let (x0, x1) = lon_axis.cell(ai);
            for aj in lat_axis.cells_overlapping(min[1], max[1]) {
                let (y0, y1) = lat_axis.cell(aj);
                let cell_area = (x1 - x0) * (y1 - y0);
                if cell_area <= 0.0 {
                    continue;
                }
                let clipped = clip_to_rect(&shifted, x0, x1, y0, y1);
                let weight = polygon_area(&clipped) / cell_area;
                if weight > MIN_WEIGHT {
                    let target = tgt.cell_index(lat_axis.grid_index(aj), lon_axis.grid_index(ai));
                    triplets.push((target, face, weight));
                }
            }
        }
    }

    triplets
}

/// Replaces each pole vertex by two vertices on the pole, one at the
/// longitude of the previous non-pole vertex and one at the next, so the
/// polar edge runs along the pole instead of back to the pole node's
/// arbitrary longitude.
pub(crate) fn split_pole_vertices(polygon: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    let is_pole = |p: &[f64; 2]| p[1].abs() >= 90.0;
    if !polygon.iter().any(is_pole) || polygon.iter().all(is_pole) {
        return polygon;
    }

    let n = polygon.len();
    let neighbour_lon = |start: usize, step: usize| {
        (1..n)
            .map(|k| &polygon[(start + k * step) % n])
            .find(|p| !is_pole(*p))
            .map_or(polygon[start][0], |p| p[0])
    };

    let mut out = Vec::with_capacity(n + 2);
    for (k, p) in polygon.iter().enumerate() {
        if is_pole(p) {
            out.push([neighbour_lon(k, n - 1), p[1]]);
            out.push([neighbour_lon(k, 1), p[1]]);
        } else {
            out.push(*p);
        }
    }
    out
}

/// Makes consecutive vertex longitudes differ by at most 180 degrees so a
/// face crossing the dateline stays one connected polygon.
pub(crate) fn unwrap_longitudes(mut polygon: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    for k in 1..polygon.len() {
        let prev = polygon[k - 1][0];
        let lon = &mut polygon[k][0];
        while *lon - prev > 180.0 {
            *lon -= 360.0;
        }
        while *lon - prev < -180.0 {
            *lon += 360.0;
        }
    }
    polygon
}

fn project(polygon: &[[f64; 2]]) -> Vec<[f64; 2]> {
    polygon
        .iter()
        .map(|&[lon, lat]| [lon, lat.clamp(-90.0, 90.0).to_radians().sin()])
        .collect()
}

/// Longitude offsets to try for a face.
///
/// A circular grid wraps, so a face may overlap cells at either end and all
/// three offsets are tried. Otherwise a single offset moves the face centre
/// into the grid's longitude span when one does.
fn candidate_shifts(polygon: &[[f64; 2]], lon_axis: &AxisEdges, circular: bool) -> Vec<f64> {
    if circular {
        return vec![-360.0, 0.0, 360.0];
    }
    let centre = polygon.iter().map(|p| p[0]).sum::<f64>() / polygon.len() as f64;
    let shift = [0.0, -360.0, 360.0]
        .into_iter()
        .find(|s| (lon_axis.lower()..=lon_axis.upper()).contains(&(centre + s)))
        .unwrap_or(0.0);
    vec![shift]
}

fn bounding_box(polygon: &[[f64; 2]]) -> ([f64; 2], [f64; 2]) {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for p in polygon {
        for k in 0..2 {
            min[k] = min[k].min(p[k]);
            max[k] = max[k].max(p[k]);
        }
    }
    (min, max)
}

/// Clips a polygon against the rectangle `[x0, x1] x [y0, y1]`.
pub(crate) fn clip_to_rect(polygon: &[[f64; 2]], x0: f64, x1: f64, y0: f64, y1: f64) -> Vec<[f64; 2]> {
    let mut out = polygon.to_vec();
    out = clip_half_plane(&out, 0, x0, true);
    out = clip_half_plane(&out, 0, x1, false);
    out = clip_half_plane(&out, 1, y0, true);
    clip_half_plane(&out, 1, y1, false)
}

/// Keeps the part of the polygon where `p[axis] >= value` (`keep_above`) or
/// `p[axis] <= value`.
fn clip_half_plane(polygon: &[[f64; 2]], axis: usize, value: f64, keep_above: bool) -> Vec<[f64; 2]> {
    let inside = |p: &[f64; 2]| {
        if keep_above {
            p[axis] >= value
        } else {
            p[axis] <= value
        }
    };
    let intersect = |a: &[f64; 2], b: &[f64; 2]| {
        let t = (value - a[axis]) / (b[axis] - a[axis]);
        let mut p = [a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])];
        p[axis] = value;
        p
    };

    let mut out = Vec::with_capacity(polygon.len() + 2);
    let Some(mut prev) = polygon.last() else {
        return out;
    };
    for cur in polygon {
        match (inside(prev), inside(cur)) {
            (true, true) => out.push(*cur),
            (true, false) => out.push(intersect(prev, cur)),
            (false, true) => {
                out.push(intersect(prev, cur));
                out.push(*cur);
            }
            (false, false) => {}
        }
        prev = cur;
    }
    out
}

/// Unsigned polygon area from the shoelace formula
pub(crate) fn polygon_area(polygon: &[[f64; 2]]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..polygon.len() {
        let j = (i + 1) % polygon.len();
        area += polygon[i][0] * polygon[j][1];
        area -= polygon[j][0] * polygon[i][1];
    }
    (area / 2.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT_SQUARE: [[f64; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    #[test]
    fn test_polygon_area_either_orientation() {
        assert!((polygon_area(&UNIT_SQUARE) - 1.0).abs() < 1e-12);
        let mut reversed = UNIT_SQUARE.to_vec();
        reversed.reverse();
        assert!((polygon_area(&reversed) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_clip_partial_overlap() {
        let clipped = clip_to_rect(&UNIT_SQUARE, 0.5, 2.0, -1.0, 0.25);
        assert!((polygon_area(&clipped) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_clip_disjoint() {
        let clipped = clip_to_rect(&UNIT_SQUARE, 2.0, 3.0, 2.0, 3.0);
        assert_eq!(polygon_area(&clipped), 0.0);
    }

    #[test]
    fn test_clip_triangle_inside() {
        let triangle = [[0.2, 0.2], [0.8, 0.2], [0.5, 0.8]];
        let clipped = clip_to_rect(&triangle, 0.0, 1.0, 0.0, 1.0);
        assert!((polygon_area(&clipped) - 0.18).abs() < 1e-12);
    }

    #[test]
    fn test_axis_edges_descending() {
        let axis = AxisEdges::new(&[3.0, 2.0, 1.0, 0.0]);
        assert_eq!(axis.num_cells(), 3);
        assert_eq!(axis.cell(0), (0.0, 1.0));
        assert_eq!(axis.grid_index(0), 2);
        assert_eq!(axis.cells_overlapping(0.5, 1.5), 0..2);
        assert_eq!(axis.cells_overlapping(1.0, 2.0), 1..2);
        assert!(axis.cells_overlapping(4.0, 5.0).is_empty());
    }

    #[test]
    fn test_split_pole_vertex() {
        let triangle = vec![[10.0, 80.0], [20.0, 80.0], [0.0, 90.0]];
        let split = split_pole_vertices(triangle);
        assert_eq!(
            split,
            vec![[10.0, 80.0], [20.0, 80.0], [20.0, 90.0], [10.0, 90.0]]
        );

        // Pole first in a south polar triangle
        let triangle = vec![[123.0, -90.0], [30.0, -80.0], [40.0, -80.0]];
        let split = split_pole_vertices(triangle);
        assert_eq!(split[0], [40.0, -90.0]);
        assert_eq!(split[1], [30.0, -90.0]);
        assert_eq!(split.len(), 4);

        let plain = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        assert_eq!(split_pole_vertices(plain.clone()), plain);
    }

    #[test]
    fn test_unwrap_dateline_face() {
        let face = vec![[170.0, 0.0], [-170.0, 0.0], [-170.0, 10.0], [170.0, 10.0]];
        let unwrapped = unwrap_longitudes(face);
        assert_eq!(unwrapped[1][0], 190.0);
        assert_eq!(unwrapped[2][0], 190.0);
        assert_eq!(unwrapped[3][0], 170.0);
    }
}
