// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Profile definitions and triangulation

use crate::error::{Error, Result};
use nalgebra::{Matrix3, Point2};

/// 2D Profile with optional holes
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

/// Twice the signed area; positive for counter-clockwise loops
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Drop a closing point that repeats the first one
fn open_loop(mut points: Vec<Point2<f64>>) -> Vec<Point2<f64>> {
    if points.len() > 1 {
        let (first, last) = (points[0], points[points.len() - 1]);
        if (first - last).norm() < 1e-9 {
            points.pop();
        }
    }
    points
}

impl Profile2D {
    /// Create a profile, normalizing the outer loop to counter-clockwise
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        let mut outer = open_loop(outer);
        if signed_area(&outer) < 0.0 {
            outer.reverse();
        }
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Add a hole, normalizing it to clockwise
    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        let mut hole = open_loop(hole);
        if hole.len() < 3 {
            return;
        }
        if signed_area(&hole) > 0.0 {
            hole.reverse();
        }
        self.holes.push(hole);
    }

    /// Axis-aligned rectangle centred on the origin
    pub fn rectangle(x_dim: f64, y_dim: f64) -> Self {
        let (hx, hy) = (x_dim / 2.0, y_dim / 2.0);
        Self::new(vec![
            Point2::new(-hx, -hy),
            Point2::new(hx, -hy),
            Point2::new(hx, hy),
            Point2::new(-hx, hy),
        ])
    }

    /// Circle approximated by a regular polygon
    pub fn circle(radius: f64, segments: usize) -> Self {
        let segments = segments.max(3);
        let points = (0..segments)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / segments as f64;
                Point2::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        Self::new(points)
    }

    /// Apply a 2D homogeneous transform to every loop
    pub fn transform(&mut self, matrix: &Matrix3<f64>) {
        for p in self.outer.iter_mut().chain(self.holes.iter_mut().flatten()) {
            *p = matrix.transform_point(p);
        }
    }

    /// Triangulate the profile using earcutr
    /// Returns triangle indices into the flattened vertex array
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }

        let mut vertices = Vec::with_capacity(
            (self.outer.len() + self.holes.iter().map(|h| h.len()).sum::<usize>()) * 2,
        );
        for p in &self.outer {
            vertices.push(p.x);
            vertices.push(p.y);
        }

        let mut hole_indices = Vec::with_capacity(self.holes.len());
        for hole in &self.holes {
            hole_indices.push(vertices.len() / 2);
            for p in hole {
                vertices.push(p.x);
                vertices.push(p.y);
            }
        }

        let indices = earcutr::earcut(&vertices, &hole_indices, 2)
            .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;
        if indices.is_empty() {
            return Err(Error::TriangulationError(
                "Profile produced no triangles".to_string(),
            ));
        }

        let points = vertices
            .chunks_exact(2)
            .map(|c| Point2::new(c[0], c[1]))
            .collect();

        Ok(Triangulation { points, indices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_triangulation() {
        let profile = Profile2D::rectangle(2.0, 1.0);
        let tri = profile.triangulate().unwrap();
        assert_eq!(tri.points.len(), 4);
        assert_eq!(tri.indices.len(), 6);
        assert_relative_eq!(signed_area(&profile.outer), 4.0);
    }

    #[test]
    fn test_winding_is_normalized() {
        let clockwise = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 0.0),
        ];
        let mut profile = Profile2D::new(clockwise);
        assert_eq!(profile.outer.len(), 4);
        assert!(signed_area(&profile.outer) > 0.0);

        profile.add_hole(vec![
            Point2::new(0.25, 0.25),
            Point2::new(0.75, 0.25),
            Point2::new(0.75, 0.75),
            Point2::new(0.25, 0.75),
        ]);
        assert!(signed_area(&profile.holes[0]) < 0.0);
        assert_eq!(profile.triangulate().unwrap().indices.len(), 8 * 3);
    }

    #[test]
    fn test_degenerate_profile() {
        let profile = Profile2D::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(profile.triangulate().is_err());
    }
}
