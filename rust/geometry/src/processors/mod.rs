// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Processors
//!
//! One processor per leaf representation item type:
//!
//! - `extrusion`: ExtrudedAreaSolid
//! - `tessellated`: TriangulatedFaceSet, PolygonalFaceSet
//! - `brep`: FacetedBrep
//!
//! Items that wrap other items (MappedItem, BooleanClippingResult) are
//! resolved by the router, which recurses back into these processors.

mod brep;
mod extrusion;
mod tessellated;

pub use brep::FacetedBrepProcessor;
pub use extrusion::ExtrudedAreaSolidProcessor;
pub use tessellated::{PolygonalFaceSetProcessor, TriangulatedFaceSetProcessor};

use crate::{Error, Result};
use ifc_audit_core::{AttributeValue, DecodedEntity, EntityDecoder};

/// Read the CoordList of an IfcCartesianPointList3D referenced by `attr`
pub(crate) fn point_list_3d(
    owner: &DecodedEntity,
    attr: Option<&AttributeValue>,
    decoder: &mut EntityDecoder,
) -> Result<Vec<f32>> {
    let list = match attr {
        Some(attr) => decoder.resolve_ref(attr)?,
        None => None,
    }
    .ok_or_else(|| Error::geometry(format!("#{} missing Coordinates", owner.id)))?;

    let coords = list.get_list(0).unwrap_or_default();
    let mut positions = Vec::with_capacity(coords.len() * 3);
    for point in coords {
        let p = point
            .as_point3()
            .ok_or_else(|| Error::geometry(format!("#{} has a malformed coordinate", list.id)))?;
        positions.extend_from_slice(&[p[0] as f32, p[1] as f32, p[2] as f32]);
    }
    Ok(positions)
}

/// 1-based IFC index list to 0-based indices, remapped through an optional PnIndex
pub(crate) fn index_loop(values: &[AttributeValue], pn_index: Option<&[u32]>) -> Vec<u32> {
    values
        .iter()
        .filter_map(|value| {
            let idx = usize::try_from(value.as_int()?).ok().filter(|i| *i > 0)?;
            match pn_index {
                Some(remap) => remap.get(idx - 1).copied().filter(|m| *m > 0).map(|m| m - 1),
                None => Some(idx as u32 - 1),
            }
        })
        .collect()
}

/// Parse an optional PnIndex attribute
pub(crate) fn pn_index(attr: Option<&AttributeValue>) -> Option<Vec<u32>> {
    let list = attr?.as_list()?;
    Some(
        list.iter()
            .filter_map(|v| v.as_int())
            .filter_map(|v| u32::try_from(v).ok())
            .collect(),
    )
}
