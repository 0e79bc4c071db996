// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model loading - IFC bytes to per-element world meshes

use ifc_audit_core::{is_geometry_type_name, IfcEngine, IfcType, ModelId};
use ifc_audit_geometry::{GeometryRouter, Mesh};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::category::Category;
use crate::error::Result;

/// What a load produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    /// Lines in the model
    pub entities: usize,
    /// Products carrying a representation
    pub products: usize,
    /// Products that produced a non-empty mesh
    pub meshed: usize,
    pub schema: Option<String>,
    /// Model length unit in metres
    pub unit_scale: f64,
}

/// A parsed model with its element meshes, owned by the session
pub struct LoadedModel {
    engine: IfcEngine,
    id: ModelId,
    meshes: FxHashMap<u32, Mesh>,
    summary: LoadSummary,
}

impl LoadedModel {
    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn engine(&self) -> &IfcEngine {
        &self.engine
    }

    pub fn summary(&self) -> &LoadSummary {
        &self.summary
    }

    /// World-space mesh of an element, if it has geometry
    pub fn mesh(&self, express_id: u32) -> Option<&Mesh> {
        self.meshes.get(&express_id)
    }

    /// Express ids of exactly the category's type, ascending
    pub fn items_of_category(&self, category: Category) -> Result<Vec<u32>> {
        Ok(self
            .engine
            .get_all_items_of_ifc_type(self.id, category.descriptor().ifc_type)?)
    }

    /// Release the engine model
    pub fn close(mut self) {
        self.engine.close_model(self.id);
    }
}

/// Opens models and meshes their products
#[derive(Debug, Clone, Default)]
pub struct ModelLoader;

impl ModelLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse `bytes` and mesh every product that has a representation
    ///
    /// Parse failures are returned; geometry failures of single products
    /// are logged and leave that product without a mesh.
    pub fn load(&self, bytes: &[u8]) -> Result<LoadedModel> {
        let mut engine = IfcEngine::new();
        let id = engine.open_model(bytes)?;

        let unit_scale = engine.length_unit_scale(id)?;
        let router = GeometryRouter::with_scale(unit_scale);

        let shapes: FxHashSet<u32> = engine
            .get_all_items_of_ifc_type(id, IfcType::IfcProductDefinitionShape)?
            .into_iter()
            .collect();

        let lines = engine.get_all_lines(id)?;
        let mut meshes = FxHashMap::default();
        let mut products = 0;
        {
            let mut decoder = engine.decoder(id)?;
            for &express_id in lines {
                match engine.get_line_type(id, express_id) {
                    Ok(type_name) if !is_geometry_type_name(type_name) => {}
                    _ => continue,
                }
                let entity = match decoder.decode_by_id(express_id) {
                    Ok(entity) => entity,
                    Err(error) => {
                        tracing::warn!(express_id, %error, "skipping undecodable line");
                        continue;
                    }
                };

                let has_shape = entity.get_ref(6).is_some_and(|shape| shapes.contains(&shape));
                if !has_shape || entity.global_id().is_none() {
                    continue;
                }
                products += 1;

                match router.process_element(&entity, &mut decoder) {
                    Ok(mesh) if !mesh.is_empty() => {
                        meshes.insert(express_id, mesh);
                    }
                    Ok(_) => {
                        tracing::debug!(express_id, element = %entity.type_name, "no supported geometry")
                    }
                    Err(error) => {
                        tracing::warn!(express_id, element = %entity.type_name, %error, "geometry failed")
                    }
                }
            }
        }

        let summary = LoadSummary {
            entities: lines.len(),
            products,
            meshed: meshes.len(),
            schema: engine.schema_version(id)?.map(str::to_string),
            unit_scale,
        };
        tracing::info!(
            model = %id,
            entities = summary.entities,
            products = summary.products,
            meshed = summary.meshed,
            schema = summary.schema.as_deref().unwrap_or("unknown"),
            "model loaded"
        );

        Ok(LoadedModel {
            engine,
            id,
            meshes,
            summary,
        })
    }
}
