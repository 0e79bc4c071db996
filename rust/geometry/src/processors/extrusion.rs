// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ExtrudedAreaSolid processor - extrusion of 2D profiles.

use crate::extrusion::extrude_profile;
use crate::profiles::ProfileProcessor;
use crate::router::GeometryProcessor;
use crate::transform::{parse_direction, resolve_axis2_placement};
use crate::{Error, Mesh, Result, Vector3};
use ifc_audit_core::{DecodedEntity, EntityDecoder, IfcType};

/// Handles IfcExtrudedAreaSolid (SweptArea, Position, ExtrudedDirection, Depth)
pub struct ExtrudedAreaSolidProcessor {
    profiles: ProfileProcessor,
}

impl ExtrudedAreaSolidProcessor {
    pub fn new(profiles: ProfileProcessor) -> Self {
        Self { profiles }
    }
}

impl Default for ExtrudedAreaSolidProcessor {
    fn default() -> Self {
        Self::new(ProfileProcessor::new())
    }
}

impl GeometryProcessor for ExtrudedAreaSolidProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Mesh> {
        let swept_area = match entity.get(0) {
            Some(attr) => decoder.resolve_ref(attr)?,
            None => None,
        }
        .ok_or_else(|| Error::geometry(format!("#{} missing SweptArea", entity.id)))?;
        let profile = self.profiles.process(&swept_area, decoder)?;

        let direction = match entity.get(2) {
            Some(attr) => match decoder.resolve_ref(attr)? {
                Some(dir) => parse_direction(&dir)?,
                None => Vector3::z(),
            },
            None => Vector3::z(),
        };
        let depth = entity
            .get_float(3)
            .ok_or_else(|| Error::InvalidExtrusion(format!("#{} missing Depth", entity.id)))?;

        let mut mesh = extrude_profile(&profile, depth, direction)?;
        let position = resolve_axis2_placement(entity.get(1), decoder)?;
        mesh.transform(&position);
        Ok(mesh)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcExtrudedAreaSolid]
    }
}
