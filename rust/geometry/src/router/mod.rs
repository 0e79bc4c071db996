// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Router - Dynamic dispatch to geometry processors
//!
//! Routes IFC representation items to the processor registered for their
//! type, and resolves the wrapping items (mapped items, clipping results)
//! itself.

mod processing;


use crate::processors::{
    ExtrudedAreaSolidProcessor, FacetedBrepProcessor, PolygonalFaceSetProcessor,
    TriangulatedFaceSetProcessor,
};
use crate::profiles::ProfileProcessor;
use crate::{Mesh, Result};
use ifc_audit_core::{DecodedEntity, EntityDecoder, IfcType};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::Arc;

/// Geometry processor trait
/// Each processor handles one type of IFC representation item
pub trait GeometryProcessor {
    /// Process entity into a mesh in the item's own coordinate system
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Mesh>;

    /// Get supported IFC types
    fn supported_types(&self) -> Vec<IfcType>;
}

/// Geometry router - routes entities to processors
pub struct GeometryRouter {
    processors: FxHashMap<IfcType, Arc<dyn GeometryProcessor>>,
    /// RepresentationMap id -> mesh in the map's parent frame
    mapped_item_cache: RefCell<FxHashMap<u32, Arc<Mesh>>>,
    /// Length unit factor applied to finished element meshes
    unit_scale: f64,
    /// Convert finished meshes from IFC Z-up to Y-up
    y_up: bool,
}

impl Default for GeometryRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryRouter {
    /// Create new router with default processors
    pub fn new() -> Self {
        let mut router = Self {
            processors: FxHashMap::default(),
            mapped_item_cache: RefCell::new(FxHashMap::default()),
            unit_scale: 1.0,
            y_up: true,
        };

        router.register(Box::new(ExtrudedAreaSolidProcessor::new(ProfileProcessor::new())));
        router.register(Box::new(TriangulatedFaceSetProcessor::new()));
        router.register(Box::new(PolygonalFaceSetProcessor::new()));
        router.register(Box::new(FacetedBrepProcessor::new()));

        router
    }

    /// Create router with pre-calculated unit scale
    pub fn with_scale(unit_scale: f64) -> Self {
        let mut router = Self::new();
        router.unit_scale = unit_scale;
        router
    }

    /// Keep meshes in the IFC Z-up frame
    pub fn z_up(mut self) -> Self {
        self.y_up = false;
        self
    }

    /// Get the current unit scale factor
    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    /// Register a geometry processor
    pub fn register(&mut self, processor: Box<dyn GeometryProcessor>) {
        let processor: Arc<dyn GeometryProcessor> = Arc::from(processor);
        for ifc_type in processor.supported_types() {
            self.processors.insert(ifc_type, Arc::clone(&processor));
        }
    }

    /// Whether a leaf item type has a registered processor
    pub fn supports(&self, ifc_type: IfcType) -> bool {
        self.processors.contains_key(&ifc_type)
    }

    /// Drop cached mapped geometry, e.g. before switching models
    pub fn clear_cache(&self) {
        self.mapped_item_cache.borrow_mut().clear();
    }
}
