// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement and direction parsing shared by the router and processors

use crate::error::{Error, Result};
use ifc_audit_core::{DecodedEntity, EntityDecoder, IfcType};
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3};

/// Depth limit for placement chains; guards against reference cycles
const MAX_PLACEMENT_DEPTH: usize = 100;

/// Parse IfcCartesianPoint (2D points get z = 0)
pub fn parse_cartesian_point(point: &DecodedEntity) -> Result<Point3<f64>> {
    let coords = point
        .get(0)
        .and_then(|a| a.as_point3())
        .ok_or_else(|| Error::geometry(format!("#{} has no coordinates", point.id)))?;
    Ok(Point3::new(coords[0], coords[1], coords[2]))
}

/// Parse IfcDirection into an unnormalized vector
pub fn parse_direction(direction: &DecodedEntity) -> Result<Vector3<f64>> {
    let ratios = direction
        .get(0)
        .and_then(|a| a.as_point3())
        .ok_or_else(|| Error::geometry(format!("#{} has no direction ratios", direction.id)))?;
    Ok(Vector3::new(ratios[0], ratios[1], ratios[2]))
}

/// Resolve an optional direction attribute, falling back to `default`
fn optional_direction(
    entity: &DecodedEntity,
    index: usize,
    decoder: &mut EntityDecoder,
    default: Vector3<f64>,
) -> Result<Vector3<f64>> {
    match entity.get(index) {
        Some(attr) if !attr.is_null() => match decoder.resolve_ref(attr)? {
            Some(dir) => Ok(parse_direction(&dir)?.try_normalize(1e-12).unwrap_or(default)),
            None => Ok(default),
        },
        _ => Ok(default),
    }
}

/// Build a right-handed frame from Z and an approximate X
fn orthonormal_frame(z: Vector3<f64>, x_hint: Vector3<f64>) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let z = z.try_normalize(1e-12).unwrap_or_else(Vector3::z);
    let x = x_hint - z * x_hint.dot(&z);
    let x = x.try_normalize(1e-9).unwrap_or_else(|| {
        // X parallel to Z: pick any perpendicular
        let helper = if z.z.abs() < 0.9 { Vector3::z() } else { Vector3::x() };
        helper.cross(&z).normalize()
    });
    let y = z.cross(&x);
    (x, y, z)
}

/// Parse IfcAxis2Placement3D (Location, Axis, RefDirection) into a matrix
/// mapping local coordinates to the parent frame
pub fn parse_axis2_placement_3d(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let location = match placement.get(0) {
        Some(attr) => match decoder.resolve_ref(attr)? {
            Some(point) => parse_cartesian_point(&point)?,
            None => Point3::origin(),
        },
        None => Point3::origin(),
    };
    let z_axis = optional_direction(placement, 1, decoder, Vector3::z())?;
    let x_axis = optional_direction(placement, 2, decoder, Vector3::x())?;
    let (x, y, z) = orthonormal_frame(z_axis, x_axis);

    Ok(Matrix4::new(
        x.x, y.x, z.x, location.x,
        x.y, y.y, z.y, location.y,
        x.z, y.z, z.z, location.z,
        0.0, 0.0, 0.0, 1.0,
    ))
}

/// Parse IfcAxis2Placement2D (Location, RefDirection) into a homogeneous 2D matrix
pub fn parse_axis2_placement_2d(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix3<f64>> {
    let location = match placement.get(0) {
        Some(attr) => match decoder.resolve_ref(attr)? {
            Some(point) => parse_cartesian_point(&point)?,
            None => Point3::origin(),
        },
        None => Point3::origin(),
    };
    let x = optional_direction(placement, 1, decoder, Vector3::x())?;
    let x = Vector2::new(x.x, x.y)
        .try_normalize(1e-12)
        .unwrap_or_else(Vector2::x);
    let y = Vector2::new(-x.y, x.x);

    Ok(Matrix3::new(
        x.x, y.x, location.x,
        x.y, y.y, location.y,
        0.0, 0.0, 1.0,
    ))
}

/// Resolve the axis placement behind an attribute; non-3D placements are identity
pub fn resolve_axis2_placement(
    attr: Option<&ifc_audit_core::AttributeValue>,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let Some(attr) = attr else {
        return Ok(Matrix4::identity());
    };
    match decoder.resolve_ref(attr)? {
        Some(placement) if placement.ifc_type == IfcType::IfcAxis2Placement3D => {
            parse_axis2_placement_3d(&placement, decoder)
        }
        _ => Ok(Matrix4::identity()),
    }
}

/// Compose an IfcLocalPlacement chain (PlacementRelTo, RelativePlacement)
pub fn local_placement_transform(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let mut transform = Matrix4::identity();
    let mut current = Some(std::sync::Arc::new(placement.clone()));
    let mut depth = 0;

    while let Some(node) = current {
        if depth > MAX_PLACEMENT_DEPTH || node.ifc_type != IfcType::IfcLocalPlacement {
            break;
        }
        let local = resolve_axis2_placement(node.get(1), decoder)?;
        transform = local * transform;

        current = match node.get(0) {
            Some(parent) => decoder.resolve_ref(parent)?,
            None => None,
        };
        depth += 1;
    }

    Ok(transform)
}

/// Parse IfcCartesianTransformationOperator3D (and the non-uniform subtype)
///
/// Attributes: Axis1, Axis2, LocalOrigin, Scale, Axis3, then Scale2 and
/// Scale3 for the non-uniform variant.
pub fn parse_cartesian_transformation_operator(
    operator: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let x_hint = optional_direction(operator, 0, decoder, Vector3::x())?;
    let z_axis = optional_direction(operator, 4, decoder, Vector3::z())?;
    let (x, y, z) = orthonormal_frame(z_axis, x_hint);

    let origin = match operator.get(2) {
        Some(attr) => match decoder.resolve_ref(attr)? {
            Some(point) => parse_cartesian_point(&point)?,
            None => Point3::origin(),
        },
        None => Point3::origin(),
    };

    let scale = operator.get_float(3).unwrap_or(1.0);
    let (sx, sy, sz) = if operator.ifc_type == IfcType::IfcCartesianTransformationOperator3DnonUniform {
        (
            scale,
            operator.get_float(5).unwrap_or(scale),
            operator.get_float(6).unwrap_or(scale),
        )
    } else {
        (scale, scale, scale)
    };

    let (x, y, z) = (x * sx, y * sy, z * sz);
    Ok(Matrix4::new(
        x.x, y.x, z.x, origin.x,
        x.y, y.y, z.y, origin.y,
        x.z, y.z, z.z, origin.z,
        0.0, 0.0, 0.0, 1.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CONTENT: &str = "DATA;\n\
#1=IFCCARTESIANPOINT((0.,0.,0.));\n\
#2=IFCAXIS2PLACEMENT3D(#1,$,$);\n\
#3=IFCLOCALPLACEMENT($,#2);\n\
#4=IFCCARTESIANPOINT((1000.,0.,0.));\n\
#5=IFCDIRECTION((0.,1.,0.));\n\
#6=IFCAXIS2PLACEMENT3D(#4,$,#5);\n\
#7=IFCLOCALPLACEMENT(#3,#6);\n\
#8=IFCCARTESIANPOINT((0.,500.,0.));\n\
#9=IFCAXIS2PLACEMENT3D(#8,$,$);\n\
#10=IFCLOCALPLACEMENT(#7,#9);\n\
#11=IFCCARTESIANTRANSFORMATIONOPERATOR3D($,$,#4,2.,$);\n\
#12=IFCAXIS2PLACEMENT2D(#8,#5);\n";

    #[test]
    fn test_local_placement_chain() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let placement = decoder.decode_by_id(10).unwrap();
        let m = local_placement_transform(&placement, &mut decoder).unwrap();

        // #6 rotates X onto Y, so the local +Y offset of #9 ends up along -X
        let origin = m.transform_point(&Point3::origin());
        assert_relative_eq!(origin.x, 500.0, epsilon = 1e-9);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_transformation_operator_scale() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let operator = decoder.decode_by_id(11).unwrap();
        let m = parse_cartesian_transformation_operator(&operator, &mut decoder).unwrap();
        let p = m.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p.x, 1002.0);
        assert_relative_eq!(p.z, 2.0);
    }

    #[test]
    fn test_axis2_placement_2d() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let placement = decoder.decode_by_id(12).unwrap();
        let m = parse_axis2_placement_2d(&placement, &mut decoder).unwrap();
        let p = m.transform_point(&nalgebra::Point2::new(1.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 501.0);
    }
}
