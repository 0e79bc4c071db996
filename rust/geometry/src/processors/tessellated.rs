// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tessellated geometry processors - pre-tessellated/polygon meshes.
//!
//! Handles IfcTriangulatedFaceSet (explicit triangle meshes) and
//! IfcPolygonalFaceSet (polygon meshes requiring triangulation).

use super::{index_loop, pn_index, point_list_3d};
use crate::router::GeometryProcessor;
use crate::triangulation::triangulate_face;
use crate::{Error, Mesh, Point3, Result};
use ifc_audit_core::{DecodedEntity, EntityDecoder, IfcType};

/// Handles IfcTriangulatedFaceSet
/// (Coordinates, Normals, Closed, CoordIndex, PnIndex)
#[derive(Default)]
pub struct TriangulatedFaceSetProcessor;

impl TriangulatedFaceSetProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryProcessor for TriangulatedFaceSetProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Mesh> {
        let positions = point_list_3d(entity, entity.get(0), decoder)?;
        let remap = pn_index(entity.get(4));

        let faces = entity
            .get_list(3)
            .ok_or_else(|| Error::geometry(format!("#{} missing CoordIndex", entity.id)))?;

        let mut indices = Vec::with_capacity(faces.len() * 3);
        for face in faces {
            let tri = index_loop(face.as_list().unwrap_or_default(), remap.as_deref());
            if tri.len() == 3 {
                indices.extend_from_slice(&tri);
            }
        }

        // Normals are computed once the element mesh is complete
        let mut mesh = Mesh {
            positions,
            normals: Vec::new(),
            indices,
        };
        mesh.retain_valid_triangles();
        Ok(mesh)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcTriangulatedFaceSet]
    }
}

/// Handles IfcPolygonalFaceSet (Coordinates, Closed, Faces, PnIndex) whose
/// faces are IfcIndexedPolygonalFace or IfcIndexedPolygonalFaceWithVoids
#[derive(Default)]
pub struct PolygonalFaceSetProcessor;

impl PolygonalFaceSetProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryProcessor for PolygonalFaceSetProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Mesh> {
        let positions = point_list_3d(entity, entity.get(0), decoder)?;
        let remap = pn_index(entity.get(3));
        let faces_attr = entity
            .get(2)
            .ok_or_else(|| Error::geometry(format!("#{} missing Faces", entity.id)))?;

        let vertex_count = positions.len() / 3;
        let point = |i: u32| {
            let b = i as usize * 3;
            Point3::new(positions[b] as f64, positions[b + 1] as f64, positions[b + 2] as f64)
        };

        let mut indices = Vec::new();
        for face in decoder.resolve_ref_list(faces_attr)? {
            let outer = index_loop(face.get_list(0).unwrap_or_default(), remap.as_deref());
            let inner: Vec<Vec<u32>> = if face.ifc_type == IfcType::IfcIndexedPolygonalFaceWithVoids {
                face.get_list(1)
                    .unwrap_or_default()
                    .iter()
                    .map(|l| index_loop(l.as_list().unwrap_or_default(), remap.as_deref()))
                    .collect()
            } else {
                Vec::new()
            };

            if outer.len() < 3 || outer.iter().chain(inner.iter().flatten()).any(|&i| i as usize >= vertex_count) {
                continue;
            }

            let outer_points: Vec<Point3<f64>> = outer.iter().map(|&i| point(i)).collect();
            let inner_points: Vec<Vec<Point3<f64>>> = inner
                .iter()
                .map(|l| l.iter().map(|&i| point(i)).collect())
                .collect();
            let Ok(triangles) = triangulate_face(&outer_points, &inner_points) else {
                tracing::debug!(face = face.id, "skipping degenerate polygonal face");
                continue;
            };

            let lookup: Vec<u32> = outer.iter().chain(inner.iter().flatten()).copied().collect();
            for [a, b, c] in triangles {
                indices.extend_from_slice(&[lookup[a], lookup[b], lookup[c]]);
            }
        }

        Ok(Mesh {
            positions,
            normals: Vec::new(),
            indices,
        })
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcPolygonalFaceSet]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangulated_face_set() {
        let content = "DATA;\n\
#1=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(1.,0.,0.),(1.,1.,0.),(0.,1.,0.)));\n\
#2=IFCTRIANGULATEDFACESET(#1,$,.T.,((1,2,3),(1,3,4),(1,2,9)),$);\n";
        let mut decoder = EntityDecoder::new(content);
        let entity = decoder.decode_by_id(2).unwrap();
        let mesh = TriangulatedFaceSetProcessor::new()
            .process(&entity, &mut decoder)
            .unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_polygonal_face_set() {
        let content = "DATA;\n\
#1=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(2.,0.,0.),(2.,2.,0.),(1.,3.,0.),(0.,2.,0.)));\n\
#2=IFCINDEXEDPOLYGONALFACE((1,2,3,4,5));\n\
#3=IFCPOLYGONALFACESET(#1,.T.,(#2),$);\n";
        let mut decoder = EntityDecoder::new(content);
        let entity = decoder.decode_by_id(3).unwrap();
        let mesh = PolygonalFaceSetProcessor::new()
            .process(&entity, &mut decoder)
            .unwrap();
        assert_eq!(mesh.triangle_count(), 3);
    }
}
