// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile Processor - IfcProfileDef to Profile2D

use crate::error::{Error, Result};
use crate::profile::Profile2D;
use crate::transform::{parse_axis2_placement_2d, parse_cartesian_point};
use ifc_audit_core::{AttributeValue, DecodedEntity, EntityDecoder, IfcType};
use nalgebra::Point2;

/// Default number of segments used to approximate circles
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 24;

/// Converts profile definitions into 2D outlines
#[derive(Debug, Clone)]
pub struct ProfileProcessor {
    circle_segments: usize,
}

impl Default for ProfileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileProcessor {
    pub fn new() -> Self {
        Self {
            circle_segments: DEFAULT_CIRCLE_SEGMENTS,
        }
    }

    pub fn with_circle_segments(circle_segments: usize) -> Self {
        Self { circle_segments }
    }

    /// Build the outline of a profile definition in its own 2D frame
    pub fn process(&self, profile: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Profile2D> {
        match profile.ifc_type {
            IfcType::IfcRectangleProfileDef => {
                // ProfileType, ProfileName, Position, XDim, YDim
                let x_dim = profile
                    .get_float(3)
                    .ok_or_else(|| Error::InvalidProfile(format!("#{} missing XDim", profile.id)))?;
                let y_dim = profile
                    .get_float(4)
                    .ok_or_else(|| Error::InvalidProfile(format!("#{} missing YDim", profile.id)))?;
                let mut outline = Profile2D::rectangle(x_dim, y_dim);
                self.apply_position(profile, decoder, &mut outline)?;
                Ok(outline)
            }
            IfcType::IfcCircleProfileDef => {
                // ProfileType, ProfileName, Position, Radius
                let radius = profile
                    .get_float(3)
                    .ok_or_else(|| Error::InvalidProfile(format!("#{} missing Radius", profile.id)))?;
                let mut outline = Profile2D::circle(radius, self.circle_segments);
                self.apply_position(profile, decoder, &mut outline)?;
                Ok(outline)
            }
            IfcType::IfcArbitraryClosedProfileDef | IfcType::IfcArbitraryProfileDefWithVoids => {
                // ProfileType, ProfileName, OuterCurve[, InnerCurves]
                let outer_attr = profile.get(2).ok_or_else(|| {
                    Error::InvalidProfile(format!("#{} missing OuterCurve", profile.id))
                })?;
                let outer = decoder
                    .resolve_ref(outer_attr)?
                    .ok_or_else(|| Error::InvalidProfile(format!("#{} OuterCurve unset", profile.id)))?;
                let mut outline = Profile2D::new(self.curve_points(&outer, decoder)?);

                if profile.ifc_type == IfcType::IfcArbitraryProfileDefWithVoids {
                    if let Some(inner_attr) = profile.get(3) {
                        for inner in decoder.resolve_ref_list(inner_attr)? {
                            outline.add_hole(self.curve_points(&inner, decoder)?);
                        }
                    }
                }
                Ok(outline)
            }
            _ => Err(Error::InvalidProfile(format!(
                "unsupported profile #{} ({})",
                profile.id, profile.type_name
            ))),
        }
    }

    /// Parametric profiles carry an optional IfcAxis2Placement2D at attribute 2
    fn apply_position(
        &self,
        profile: &DecodedEntity,
        decoder: &mut EntityDecoder,
        outline: &mut Profile2D,
    ) -> Result<()> {
        let Some(attr) = profile.get(2) else {
            return Ok(());
        };
        if let Some(position) = decoder.resolve_ref(attr)? {
            if position.ifc_type == IfcType::IfcAxis2Placement2D {
                let matrix = parse_axis2_placement_2d(&position, decoder)?;
                outline.transform(&matrix);
            }
        }
        Ok(())
    }

    /// Points of a closed bounded curve
    fn curve_points(&self, curve: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Vec<Point2<f64>>> {
        match curve.ifc_type {
            IfcType::IfcPolyline => {
                let Some(points_attr) = curve.get(0) else {
                    return Err(Error::InvalidProfile(format!("#{} has no points", curve.id)));
                };
                decoder
                    .resolve_ref_list(points_attr)?
                    .iter()
                    .map(|p| parse_cartesian_point(p).map(|p| Point2::new(p.x, p.y)))
                    .collect()
            }
            IfcType::IfcIndexedPolyCurve => {
                // Points, Segments, SelfIntersect
                let points_attr = curve
                    .get(0)
                    .ok_or_else(|| Error::InvalidProfile(format!("#{} has no points", curve.id)))?;
                let list = decoder
                    .resolve_ref(points_attr)?
                    .ok_or_else(|| Error::InvalidProfile(format!("#{} points unset", curve.id)))?;
                let coords: Vec<Point2<f64>> = list
                    .get_list(0)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|c| c.as_point3())
                    .map(|c| Point2::new(c[0], c[1]))
                    .collect();

                match curve.get_list(1) {
                    Some(segments) if !segments.is_empty() => {
                        Ok(indexed_segment_points(&coords, segments))
                    }
                    _ => Ok(coords),
                }
            }
            _ => Err(Error::InvalidProfile(format!(
                "unsupported curve #{} ({})",
                curve.id, curve.type_name
            ))),
        }
    }
}

/// Walk IfcLineIndex / IfcArcIndex segments (1-based), arcs by their three points
fn indexed_segment_points(coords: &[Point2<f64>], segments: &[AttributeValue]) -> Vec<Point2<f64>> {
    let mut points: Vec<Point2<f64>> = Vec::new();
    for segment in segments {
        let indices = match segment {
            AttributeValue::Typed(_, args) => args.first().and_then(|a| a.as_list()),
            other => other.as_list(),
        };
        for index in indices.unwrap_or_default().iter().filter_map(|i| i.as_int()) {
            let Some(point) = usize::try_from(index - 1).ok().and_then(|i| coords.get(i)) else {
                continue;
            };
            if points.last() != Some(point) {
                points.push(*point);
            }
        }
    }
    points
}
