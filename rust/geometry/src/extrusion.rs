// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D profiles to 3D meshes

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::{Profile2D, Triangulation};
use nalgebra::{Point2, Point3, Vector3};

/// Extrude a 2D profile (lying in the XY plane) along `direction` by `depth`
///
/// The direction need not be normalized or perpendicular to the profile, but
/// it must leave the XY plane.
pub fn extrude_profile(profile: &Profile2D, depth: f64, direction: Vector3<f64>) -> Result<Mesh> {
    if depth <= 0.0 || !depth.is_finite() {
        return Err(Error::InvalidExtrusion(format!(
            "depth must be positive, got {}",
            depth
        )));
    }
    let direction = direction
        .try_normalize(1e-12)
        .ok_or_else(|| Error::InvalidExtrusion("zero extrusion direction".to_string()))?;
    if direction.z.abs() < 1e-9 {
        return Err(Error::InvalidExtrusion(
            "extrusion direction lies in the profile plane".to_string(),
        ));
    }

    let offset = direction * depth;
    let triangulation = profile.triangulate()?;

    let loop_vertices: usize = profile.outer.len() + profile.holes.iter().map(Vec::len).sum::<usize>();
    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + loop_vertices * 4,
        triangulation.indices.len() * 2 + loop_vertices * 6,
    );

    // Extruding downwards mirrors the solid, so caps swap roles
    let upward = direction.z > 0.0;
    create_cap(&triangulation, Vector3::zeros(), !upward, &mut mesh);
    create_cap(&triangulation, offset, upward, &mut mesh);

    create_side_walls(&profile.outer, offset, upward, &mut mesh);
    for hole in &profile.holes {
        create_side_walls(hole, offset, upward, &mut mesh);
    }

    Ok(mesh)
}

fn lift(p: &Point2<f64>, offset: Vector3<f64>) -> Point3<f64> {
    Point3::new(p.x, p.y, 0.0) + offset
}

/// One cap; `facing_up` selects counter-clockwise winding seen from +Z
fn create_cap(tri: &Triangulation, offset: Vector3<f64>, facing_up: bool, mesh: &mut Mesh) {
    let normal = if facing_up {
        Vector3::new(0.0, 0.0, 1.0)
    } else {
        Vector3::new(0.0, 0.0, -1.0)
    };

    let base = mesh.vertex_count() as u32;
    for p in &tri.points {
        mesh.add_vertex(lift(p, offset), normal);
    }

    for t in tri.indices.chunks_exact(3) {
        let (a, b, c) = (tri.points[t[0]], tri.points[t[1]], tri.points[t[2]]);
        let ccw = (b - a).perp(&(c - a)) > 0.0;
        let (i0, i1, i2) = (base + t[0] as u32, base + t[1] as u32, base + t[2] as u32);
        if ccw == facing_up {
            mesh.add_triangle(i0, i1, i2);
        } else {
            mesh.add_triangle(i0, i2, i1);
        }
    }
}

/// Quads along one closed loop; outer loops are CCW and holes CW, so the
/// same winding rule faces every wall away from the material
fn create_side_walls(points: &[Point2<f64>], offset: Vector3<f64>, upward: bool, mesh: &mut Mesh) {
    let n = points.len();
    if n < 2 {
        return;
    }

    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let edge = b - a;
        if edge.norm() < 1e-12 {
            continue;
        }
        let normal = Vector3::new(edge.y, -edge.x, 0.0).normalize();

        let a0 = mesh.add_vertex(lift(&a, Vector3::zeros()), normal);
        let b0 = mesh.add_vertex(lift(&b, Vector3::zeros()), normal);
        let b1 = mesh.add_vertex(lift(&b, offset), normal);
        let a1 = mesh.add_vertex(lift(&a, offset), normal);

        if upward {
            mesh.add_triangle(a0, b0, b1);
            mesh.add_triangle(a0, b1, a1);
        } else {
            mesh.add_triangle(a0, b1, b0);
            mesh.add_triangle(a0, a1, b1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_extrusion() {
        let profile = Profile2D::rectangle(2.0, 1.0);
        let mesh = extrude_profile(&profile, 3.0, Vector3::z()).unwrap();

        // 2 caps x 2 triangles + 4 walls x 2 triangles
        assert_eq!(mesh.triangle_count(), 12);
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.z, 0.0);
        assert_relative_eq!(max.z, 3.0);
        assert_relative_eq!(max.x - min.x, 2.0);
    }

    #[test]
    fn test_faces_point_outward() {
        let profile = Profile2D::rectangle(1.0, 1.0);
        for direction in [Vector3::z(), -Vector3::z()] {
            let flat = extrude_profile(&profile, 1.0, direction)
                .unwrap()
                .into_flat_shaded();
            let centre = {
                let (min, max) = flat.bounds().unwrap();
                nalgebra::center(&min, &max)
            };
            for (i, n) in flat.normals.chunks_exact(3).enumerate() {
                let p = &flat.positions[i * 3..i * 3 + 3];
                let outward = (p[0] - centre.x) * n[0] + (p[1] - centre.y) * n[1] + (p[2] - centre.z) * n[2];
                assert!(outward > 0.0);
            }
        }
    }

    #[test]
    fn test_oblique_direction() {
        let profile = Profile2D::rectangle(1.0, 1.0);
        let mesh = extrude_profile(&profile, 2.0, Vector3::new(1.0, 0.0, 1.0)).unwrap();
        let (_, max) = mesh.bounds().unwrap();
        assert_relative_eq!(max.z, 2.0 / 2f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_parameters() {
        let profile = Profile2D::rectangle(1.0, 1.0);
        assert!(extrude_profile(&profile, 0.0, Vector3::z()).is_err());
        assert!(extrude_profile(&profile, 1.0, Vector3::x()).is_err());
    }
}
