//! Simple closed primitives used by the fallback tree

use canopy_core::{Point3f, TriangleMesh};
use std::f32::consts::TAU;

/// Build a capped, tapered cylinder centred on the origin with its axis along Y.
///
/// The side is made of `height_segments + 1` rings of `radial_segments`
/// vertices, interpolated from `radius_bottom` at `-height / 2` to
/// `radius_top` at `+height / 2`. A zero top radius collapses the top ring
/// into a single apex vertex, giving a cone.
///
/// # Arguments
/// * `radius_top` - Radius of the top ring
/// * `radius_bottom` - Radius of the bottom ring
/// * `height` - Distance between the caps
/// * `radial_segments` - Vertices per ring, at least 3
/// * `height_segments` - Number of ring intervals along the axis, at least 1
pub fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: usize,
    height_segments: usize,
) -> TriangleMesh {
    let radial = radial_segments.max(3);
    let rows = height_segments.max(1);
    let half = height / 2.0;
    let mut mesh = TriangleMesh::new();

    // ring_start[row] is the index of the first vertex of that ring; an apex ring has one vertex
    let mut ring_start = Vec::with_capacity(rows + 1);
    for row in 0..=rows {
        let v = row as f32 / rows as f32;
        let radius = radius_bottom + (radius_top - radius_bottom) * v;
        let y = -half + height * v;
        ring_start.push(mesh.vertex_count());

        if radius <= 0.0 {
            mesh.add_vertex(Point3f::new(0.0, y, 0.0));
            continue;
        }
        for i in 0..radial {
            let theta = i as f32 / radial as f32 * TAU;
            mesh.add_vertex(Point3f::new(radius * theta.sin(), y, radius * theta.cos()));
        }
    }

    let total = mesh.vertex_count();
    let ring_len: Vec<usize> = (0..=rows)
        .map(|row| ring_start.get(row + 1).copied().unwrap_or(total) - ring_start[row])
        .collect();
    let at = |row: usize, i: usize| {
        ring_start[row] + if ring_len[row] == 1 { 0 } else { i % radial }
    };

    for row in 0..rows {
        for i in 0..radial {
            let (a, b) = (at(row, i), at(row, i + 1));
            let (c, d) = (at(row + 1, i), at(row + 1, i + 1));
            if a != b {
                mesh.add_face([a, b, c]);
            }
            if c != d {
                mesh.add_face([b, d, c]);
            }
        }
    }

    // Caps, fanned from a centre vertex
    for (row, y, flip) in [(0, -half, true), (rows, half, false)] {
        if ring_len[row] < 3 {
            continue;
        }
        let centre = mesh.add_vertex(Point3f::new(0.0, y, 0.0));
        for i in 0..radial {
            let (a, b) = (ring_start[row] + i, ring_start[row] + (i + 1) % radial);
            mesh.add_face(if flip { [centre, b, a] } else { [centre, a, b] });
        }
    }

    mesh
}

/// A cone with its apex up, centred on the origin
pub fn cone(radius: f32, height: f32, radial_segments: usize, height_segments: usize) -> TriangleMesh {
    cylinder(0.0, radius, height, radial_segments, height_segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{radial_distance, Drawable};
    use approx::assert_relative_eq;

    #[test]
    fn test_cylinder_counts() {
        let mesh = cylinder(1.0, 2.0, 4.0, 8, 5);
        // 6 rings of 8 plus two cap centres
        assert_eq!(mesh.vertex_count(), 6 * 8 + 2);
        // side quads plus two cap fans
        assert_eq!(mesh.face_count(), 5 * 8 * 2 + 2 * 8);
        assert!(mesh.faces.iter().flatten().all(|&i| i < mesh.vertex_count()));
    }

    #[test]
    fn test_cylinder_taper_and_extent() {
        let mesh = cylinder(1.0, 2.0, 4.0, 8, 1);
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min.y, -2.0);
        assert_relative_eq!(max.y, 2.0);

        for v in &mesh.vertices[..8] {
            assert_relative_eq!(radial_distance(v), 2.0, epsilon = 1e-5);
        }
        for v in &mesh.vertices[8..16] {
            assert_relative_eq!(radial_distance(v), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_cone_has_single_apex() {
        let mesh = cone(1.0, 3.0, 8, 3);
        // 3 rings of 8, one apex, one bottom cap centre
        assert_eq!(mesh.vertex_count(), 3 * 8 + 1 + 1);
        let apex_count = mesh
            .vertices
            .iter()
            .filter(|v| (v.y - 1.5).abs() < 1e-6)
            .count();
        assert_eq!(apex_count, 1);
        assert!(mesh.faces.iter().flatten().all(|&i| i < mesh.vertex_count()));
    }
}
