// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element and representation item processing.

use super::GeometryRouter;
use crate::transform::{
    local_placement_transform, parse_cartesian_transformation_operator, resolve_axis2_placement,
};
use crate::{Error, Mesh, Result};
use ifc_audit_core::{DecodedEntity, EntityDecoder, IfcType};
use std::sync::Arc;

/// Nesting limit for mapped items and boolean operands
const MAX_ITEM_DEPTH: usize = 16;

/// Representation types that describe solid or surface body geometry
const BODY_REPRESENTATION_TYPES: &[&str] = &[
    "SweptSolid",
    "SolidModel",
    "Brep",
    "CSG",
    "Clipping",
    "SurfaceModel",
    "Tessellation",
    "MappedRepresentation",
    "AdvancedSweptSolid",
];

impl GeometryRouter {
    /// Process a product (IfcWall, IfcDoor, ...) into a world-space mesh
    ///
    /// Follows Element → ProductDefinitionShape → ShapeRepresentation → Items,
    /// preferring the representation identified as `Body`. The result is placed
    /// by the element's ObjectPlacement, scaled to metres, optionally converted
    /// to Y-up, and flat shaded. Products without a representation yield an
    /// empty mesh; unsupported items are skipped.
    pub fn process_element(&self, element: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Mesh> {
        // IfcProduct: GlobalId, OwnerHistory, Name, Description, ObjectType, ObjectPlacement, Representation
        let Some(representation_attr) = element.get(6).filter(|a| !a.is_null()) else {
            return Ok(Mesh::new());
        };

        let shape = decoder
            .resolve_ref(representation_attr)?
            .ok_or_else(|| Error::geometry(format!("#{} representation unset", element.id)))?;
        if shape.ifc_type != IfcType::IfcProductDefinitionShape {
            return Err(Error::geometry(format!(
                "#{}: expected IfcProductDefinitionShape, got {}",
                element.id, shape.type_name
            )));
        }

        let representations = match shape.get(2) {
            Some(attr) => decoder.resolve_ref_list(attr)?,
            None => Vec::new(),
        };
        let body = select_body_representations(&representations);

        let mut combined = Mesh::new();
        for shape_rep in body {
            let Some(items_attr) = shape_rep.get(3) else {
                continue;
            };
            for item in decoder.resolve_ref_list(items_attr)? {
                match self.process_representation_item(&item, decoder) {
                    Ok(mesh) => combined.merge(&mesh),
                    Err(error) => {
                        tracing::debug!(element = element.id, item = item.id, %error, "skipping representation item")
                    }
                }
            }
        }

        if combined.is_empty() {
            return Ok(Mesh::new());
        }

        if let Some(placement_attr) = element.get(5) {
            if let Some(placement) = decoder.resolve_ref(placement_attr)? {
                let transform = local_placement_transform(&placement, decoder)?;
                combined.transform(&transform);
            }
        }

        combined.scale(self.unit_scale);
        if self.y_up {
            combined.to_y_up();
        }
        Ok(combined.into_flat_shaded())
    }

    /// Process a single representation item in its own coordinate system
    pub fn process_representation_item(
        &self,
        item: &DecodedEntity,
        decoder: &mut EntityDecoder,
    ) -> Result<Mesh> {
        self.process_item_with_depth(item, decoder, 0)
    }

    fn process_item_with_depth(
        &self,
        item: &DecodedEntity,
        decoder: &mut EntityDecoder,
        depth: usize,
    ) -> Result<Mesh> {
        if depth > MAX_ITEM_DEPTH {
            return Err(Error::geometry(format!("#{}: item nesting too deep", item.id)));
        }

        match item.ifc_type {
            IfcType::IfcMappedItem => self.process_mapped_item(item, decoder, depth),
            IfcType::IfcBooleanClippingResult | IfcType::IfcBooleanResult => {
                // Operator, FirstOperand, SecondOperand; the cut itself is not evaluated
                let first = match item.get(1) {
                    Some(attr) => decoder.resolve_ref(attr)?,
                    None => None,
                }
                .ok_or_else(|| Error::geometry(format!("#{} missing FirstOperand", item.id)))?;
                self.process_item_with_depth(&first, decoder, depth + 1)
            }
            _ => match self.processors.get(&item.ifc_type) {
                Some(processor) => processor.process(item, decoder),
                None => Err(Error::Unsupported {
                    id: item.id,
                    type_name: item.type_name.clone(),
                }),
            },
        }
    }

    /// IfcMappedItem (MappingSource, MappingTarget); the source
    /// IfcRepresentationMap (MappingOrigin, MappedRepresentation) is cached
    fn process_mapped_item(
        &self,
        item: &DecodedEntity,
        decoder: &mut EntityDecoder,
        depth: usize,
    ) -> Result<Mesh> {
        let source = match item.get(0) {
            Some(attr) => decoder.resolve_ref(attr)?,
            None => None,
        }
        .ok_or_else(|| Error::geometry(format!("#{} missing MappingSource", item.id)))?;

        let cached = self.mapped_item_cache.borrow().get(&source.id).cloned();
        let source_mesh = match cached {
            Some(mesh) => mesh,
            None => {
                let mesh = Arc::new(self.process_representation_map(&source, decoder, depth)?);
                self.mapped_item_cache
                    .borrow_mut()
                    .insert(source.id, Arc::clone(&mesh));
                mesh
            }
        };

        let mut mesh = (*source_mesh).clone();
        if let Some(target_attr) = item.get(1) {
            if let Some(target) = decoder.resolve_ref(target_attr)? {
                let transform = parse_cartesian_transformation_operator(&target, decoder)?;
                mesh.transform(&transform);
            }
        }
        Ok(mesh)
    }

    fn process_representation_map(
        &self,
        map: &DecodedEntity,
        decoder: &mut EntityDecoder,
        depth: usize,
    ) -> Result<Mesh> {
        let origin = resolve_axis2_placement(map.get(0), decoder)?;
        let representation = match map.get(1) {
            Some(attr) => decoder.resolve_ref(attr)?,
            None => None,
        }
        .ok_or_else(|| Error::geometry(format!("#{} missing MappedRepresentation", map.id)))?;

        let mut mesh = Mesh::new();
        if let Some(items_attr) = representation.get(3) {
            for item in decoder.resolve_ref_list(items_attr)? {
                match self.process_item_with_depth(&item, decoder, depth + 1) {
                    Ok(item_mesh) => mesh.merge(&item_mesh),
                    Err(error) => tracing::debug!(item = item.id, %error, "skipping mapped item"),
                }
            }
        }
        mesh.transform(&origin);
        Ok(mesh)
    }
}

/// `Body` representations when present, otherwise anything with a solid type
fn select_body_representations(representations: &[Arc<DecodedEntity>]) -> Vec<&Arc<DecodedEntity>> {
    let shapes = representations
        .iter()
        .filter(|r| r.ifc_type == IfcType::IfcShapeRepresentation);

    let body: Vec<_> = shapes
        .clone()
        .filter(|r| r.get_string(1) == Some("Body"))
        .collect();
    if !body.is_empty() {
        return body;
    }

    shapes
        .filter(|r| {
            r.get_string(2)
                .map(|t| BODY_REPRESENTATION_TYPES.contains(&t))
                .unwrap_or(false)
        })
        .collect()
}
