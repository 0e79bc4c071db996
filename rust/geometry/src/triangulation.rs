// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Planar 3D faces are projected onto their own plane and handed to earcutr.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Newell normal of a polygon; its direction follows the loop orientation
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Triangulate a planar face with optional holes
///
/// Returns triangles indexing the concatenation `outer ++ holes[0] ++ ...`,
/// wound counter-clockwise around the outer loop's normal.
pub fn triangulate_face(outer: &[Point3<f64>], holes: &[Vec<Point3<f64>>]) -> Result<Vec<[usize; 3]>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }

    // Triangle fast path
    if outer.len() == 3 && holes.is_empty() {
        return Ok(vec![[0, 1, 2]]);
    }

    let normal = newell_normal(outer)
        .try_normalize(1e-12)
        .ok_or_else(|| Error::TriangulationError("Degenerate face".to_string()))?;
    let helper = if normal.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    let u = helper.cross(&normal).normalize();
    let v = normal.cross(&u);
    let project = |p: &Point3<f64>| Point2::new(p.coords.dot(&u), p.coords.dot(&v));

    let valid_holes: Vec<&Vec<Point3<f64>>> = holes.iter().filter(|h| h.len() >= 3).collect();
    let mut flat: Vec<Point2<f64>> = outer.iter().map(project).collect();
    let mut hole_indices = Vec::with_capacity(valid_holes.len());
    let mut index_map: Vec<usize> = (0..outer.len()).collect();
    let mut offset = outer.len();
    for hole in holes {
        if hole.len() >= 3 {
            hole_indices.push(flat.len());
            flat.extend(hole.iter().map(project));
            index_map.extend(offset..offset + hole.len());
        }
        offset += hole.len();
    }

    let vertices: Vec<f64> = flat.iter().flat_map(|p| [p.x, p.y]).collect();
    let indices = earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

    Ok(indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (flat[t[0]], flat[t[1]], flat[t[2]]);
            let tri = if (b - a).perp(&(c - a)) >= 0.0 {
                [t[0], t[1], t[2]]
            } else {
                [t[0], t[2], t[1]]
            };
            tri.map(|i| index_map[i])
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newell_normal_orientation() {
        let square = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let normal = newell_normal(&square).normalize();
        assert!((normal.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_triangulated_face_follows_loop_orientation() {
        // Clockwise seen from +Z, so triangles must face -Z
        let square = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let tris = triangulate_face(&square, &[]).unwrap();
        assert_eq!(tris.len(), 2);
        for [a, b, c] in tris {
            let n = (square[b] - square[a]).cross(&(square[c] - square[a]));
            assert!(n.z < 0.0);
        }
    }

    #[test]
    fn test_face_with_hole() {
        let outer = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ];
        let hole = vec![
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let tris = triangulate_face(&outer, &[hole]).unwrap();
        assert_eq!(tris.len(), 8);
        assert!(tris.iter().flatten().all(|&i| i < 8));
    }
}
