// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! FacetedBrep processor.
//!
//! IfcFacetedBrep → IfcClosedShell → IfcFace → IfcFace(Outer)Bound → IfcPolyLoop

use crate::router::GeometryProcessor;
use crate::transform::parse_cartesian_point;
use crate::triangulation::triangulate_face;
use crate::{Error, Mesh, Point3, Result, Vector3};
use ifc_audit_core::{DecodedEntity, EntityDecoder, IfcType};

/// Handles IfcFacetedBrep; faces with inner bounds become faces with holes
#[derive(Default)]
pub struct FacetedBrepProcessor;

impl FacetedBrepProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Points of a bound's IfcPolyLoop, reversed when Orientation is false
    fn bound_points(bound: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Vec<Point3<f64>>> {
        let loop_entity = match bound.get(0) {
            Some(attr) => decoder.resolve_ref(attr)?,
            None => None,
        }
        .ok_or_else(|| Error::geometry(format!("#{} missing Bound", bound.id)))?;

        if loop_entity.ifc_type != IfcType::IfcPolyLoop {
            return Err(Error::geometry(format!(
                "#{}: only IfcPolyLoop bounds are supported",
                loop_entity.id
            )));
        }

        let mut points = Vec::new();
        if let Some(polygon) = loop_entity.get(0) {
            for point in decoder.resolve_ref_list(polygon)? {
                points.push(parse_cartesian_point(&point)?);
            }
        }

        if bound.get(1).and_then(|a| a.as_enum()) == Some("F") {
            points.reverse();
        }
        Ok(points)
    }

    fn add_face(face: &DecodedEntity, decoder: &mut EntityDecoder, mesh: &mut Mesh) -> Result<()> {
        let Some(bounds_attr) = face.get(0) else {
            return Ok(());
        };
        let bounds = decoder.resolve_ref_list(bounds_attr)?;
        let outer_index = bounds
            .iter()
            .position(|b| b.ifc_type == IfcType::IfcFaceOuterBound)
            .unwrap_or(0);

        let mut outer = Vec::new();
        let mut holes = Vec::new();
        for (i, bound) in bounds.iter().enumerate() {
            let points = Self::bound_points(bound, decoder)?;
            if i == outer_index {
                outer = points;
            } else {
                holes.push(points);
            }
        }

        let triangles = triangulate_face(&outer, &holes)?;
        let base = mesh.vertex_count() as u32;
        for p in outer.iter().chain(holes.iter().flatten()) {
            mesh.add_vertex(*p, Vector3::zeros());
        }
        for [a, b, c] in triangles {
            mesh.add_triangle(base + a as u32, base + b as u32, base + c as u32);
        }
        Ok(())
    }
}

impl GeometryProcessor for FacetedBrepProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Mesh> {
        let shell = match entity.get(0) {
            Some(attr) => decoder.resolve_ref(attr)?,
            None => None,
        }
        .ok_or_else(|| Error::geometry(format!("#{} missing Outer shell", entity.id)))?;

        let Some(faces_attr) = shell.get(0) else {
            return Ok(Mesh::new());
        };

        let mut mesh = Mesh::new();
        for face in decoder.resolve_ref_list(faces_attr)? {
            if let Err(error) = Self::add_face(&face, decoder, &mut mesh) {
                tracing::debug!(face = face.id, %error, "skipping brep face");
            }
        }
        Ok(mesh)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcFacetedBrep]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tetrahedron_brep() {
        let content = "DATA;\n\
#1=IFCCARTESIANPOINT((0.,0.,0.));\n\
#2=IFCCARTESIANPOINT((1.,0.,0.));\n\
#3=IFCCARTESIANPOINT((0.,1.,0.));\n\
#4=IFCCARTESIANPOINT((0.,0.,1.));\n\
#10=IFCPOLYLOOP((#1,#3,#2));\n\
#11=IFCPOLYLOOP((#1,#2,#4));\n\
#12=IFCPOLYLOOP((#2,#3,#4));\n\
#13=IFCPOLYLOOP((#1,#4,#3));\n\
#20=IFCFACEOUTERBOUND(#10,.T.);\n\
#21=IFCFACEOUTERBOUND(#11,.T.);\n\
#22=IFCFACEOUTERBOUND(#12,.T.);\n\
#23=IFCFACEOUTERBOUND(#13,.F.);\n\
#30=IFCFACE((#20));\n\
#31=IFCFACE((#21));\n\
#32=IFCFACE((#22));\n\
#33=IFCFACE((#23));\n\
#40=IFCCLOSEDSHELL((#30,#31,#32,#33));\n\
#50=IFCFACETEDBREP(#40);\n";
        let mut decoder = EntityDecoder::new(content);
        let brep = decoder.decode_by_id(50).unwrap();
        let mesh = FacetedBrepProcessor::new().process(&brep, &mut decoder).unwrap();
        assert_eq!(mesh.triangle_count(), 4);

        // #13 winds towards -X; the .F. orientation of #23 flips it
        let flat = mesh.into_flat_shaded();
        let last = &flat.normals[flat.normals.len() - 3..];
        assert!(last[0] > 0.9);
    }
}
