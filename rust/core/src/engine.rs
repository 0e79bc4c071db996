// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-model IFC engine
//!
//! An [`IfcEngine`] owns any number of open models, each identified by a
//! [`ModelId`] allocated at open time. Models are indexed once on open and
//! decoded lazily afterwards.
//!
//! ```rust,ignore
//! use ifc_audit_core::IfcEngine;
//!
//! let mut engine = IfcEngine::new();
//! let model = engine.open_model(&bytes)?;
//! for id in engine.get_all_items_of_type(model, "IFCDOOR")? {
//!     let door = engine.get_line(model, id)?;
//!     println!("{:?}", door.global_id());
//! }
//! engine.close_model(model);
//! ```

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::decoder::{decode_line, EntityDecoder, EntityIndex};
use crate::entity::DecodedEntity;
use crate::error::{Error, Result};
use crate::parser::{data_section_start, entity_type_name, EntityScanner};
use crate::schema::IfcType;
use crate::units::extract_length_unit_scale;

/// Opaque handle of an open model, unique per engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u32);

impl ModelId {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open model: owned text plus its offset index
struct OpenModel {
    content: String,
    index: Arc<EntityIndex>,
    /// Express ids in ascending order
    ids: Vec<u32>,
    /// Upper-case type keyword -> express ids in ascending order
    by_type: FxHashMap<String, Vec<u32>>,
    schema: Option<String>,
}

impl OpenModel {
    fn new(content: String) -> Result<Self> {
        if data_section_start(&content) == 0 {
            return Err(Error::MissingDataSection);
        }

        let mut index: EntityIndex =
            FxHashMap::with_capacity_and_hasher(content.len() / 50, Default::default());
        let mut by_type: FxHashMap<String, Vec<u32>> = FxHashMap::default();
        let mut scanner = EntityScanner::new(&content);
        while let Some((id, type_name, start, end)) = scanner.next_entity() {
            index.insert(id, (start, end));
            by_type
                .entry(type_name.to_ascii_uppercase())
                .or_default()
                .push(id);
        }

        let mut ids: Vec<u32> = index.keys().copied().collect();
        ids.sort_unstable();
        for ids in by_type.values_mut() {
            ids.sort_unstable();
            ids.dedup();
        }

        let schema = read_file_schema(&content);

        Ok(Self {
            content,
            index: Arc::new(index),
            ids,
            by_type,
            schema,
        })
    }
}

/// Read the first identifier of `FILE_SCHEMA(('IFC4'))` from the header
fn read_file_schema(content: &str) -> Option<String> {
    let header_end = data_section_start(content);
    let header = &content[..header_end];
    let start = memchr::memmem::find(header.as_bytes(), b"FILE_SCHEMA")?;
    let rest = &header[start..];
    let open = rest.find('\'')? + 1;
    let close = rest[open..].find('\'')? + open;
    Some(rest[open..close].to_string())
}

/// STEP/IFC engine holding several open models
#[derive(Default)]
pub struct IfcEngine {
    models: FxHashMap<ModelId, OpenModel>,
    next_id: u32,
}

impl IfcEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a model from raw file bytes; invalid UTF-8 is replaced lossily
    pub fn open_model(&mut self, data: &[u8]) -> Result<ModelId> {
        self.open_model_from_str(String::from_utf8_lossy(data).into_owned())
    }

    /// Open a model from already decoded text
    pub fn open_model_from_str(&mut self, content: impl Into<String>) -> Result<ModelId> {
        let model = OpenModel::new(content.into())?;
        let id = ModelId(self.next_id);
        self.next_id += 1;
        self.models.insert(id, model);
        Ok(id)
    }

    /// Close a model and release its content; closing twice is a no-op
    pub fn close_model(&mut self, model: ModelId) {
        self.models.remove(&model);
    }

    fn model(&self, model: ModelId) -> Result<&OpenModel> {
        self.models
            .get(&model)
            .ok_or(Error::ModelNotOpen(model.value()))
    }

    /// All express ids in the model, ascending
    pub fn get_all_lines(&self, model: ModelId) -> Result<&[u32]> {
        Ok(&self.model(model)?.ids)
    }

    /// Decode one line by express id
    pub fn get_line(&self, model: ModelId, express_id: u32) -> Result<DecodedEntity> {
        let open = self.model(model)?;
        let (start, end) = open
            .index
            .get(&express_id)
            .copied()
            .ok_or(Error::EntityNotFound(express_id))?;
        decode_line(&open.content[start..end])
    }

    /// Type keyword of a line, as written, without decoding its attributes
    pub fn get_line_type(&self, model: ModelId, express_id: u32) -> Result<&str> {
        let open = self.model(model)?;
        let (start, end) = open
            .index
            .get(&express_id)
            .copied()
            .ok_or(Error::EntityNotFound(express_id))?;
        entity_type_name(&open.content[start..end])
            .ok_or_else(|| Error::parse(start, "unreadable entity header"))
    }

    /// Express ids of exactly this type (subtypes are not included), ascending
    pub fn get_all_items_of_type(&self, model: ModelId, type_name: &str) -> Result<Vec<u32>> {
        let open = self.model(model)?;
        Ok(open
            .by_type
            .get(&type_name.to_ascii_uppercase())
            .cloned()
            .unwrap_or_default())
    }

    /// Same as [`IfcEngine::get_all_items_of_type`] for a known schema type
    pub fn get_all_items_of_ifc_type(&self, model: ModelId, ifc_type: IfcType) -> Result<Vec<u32>> {
        self.get_all_items_of_type(model, ifc_type.name())
    }

    /// Schema identifier from the header, e.g. `IFC2X3` or `IFC4`
    pub fn schema_version(&self, model: ModelId) -> Result<Option<&str>> {
        Ok(self.model(model)?.schema.as_deref())
    }

    /// Factor converting model lengths to metres
    pub fn length_unit_scale(&self, model: ModelId) -> Result<f64> {
        let Some(&project_id) = self
            .model(model)?
            .by_type
            .get(IfcType::IfcProject.name())
            .and_then(|ids| ids.first())
        else {
            return Ok(1.0);
        };
        let mut decoder = self.decoder(model)?;
        extract_length_unit_scale(&mut decoder, project_id)
    }

    /// A caching decoder over the model, sharing the engine's offset index
    pub fn decoder(&self, model: ModelId) -> Result<EntityDecoder<'_>> {
        let open = self.model(model)?;
        Ok(EntityDecoder::with_arc_index(
            &open.content,
            Arc::clone(&open.index),
        ))
    }

    /// Number of open models
    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "ISO-10303-21;\n\
HEADER;\n\
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');\n\
FILE_NAME('test.ifc','2024-01-01T00:00:00',(''),(''),'','','');\n\
FILE_SCHEMA(('IFC4'));\n\
ENDSEC;\n\
DATA;\n\
#10=IFCPROJECT('0YvctVUKr0kugbFTf53O9L',$,'P',$,$,$,$,$,#11);\n\
#11=IFCUNITASSIGNMENT((#12));\n\
#12=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\n\
#3=IFCDOOR('1hOSvn6df7F8_7GcBWlRGQ',$,'Door',$,$,$,$,$,$,$);\n\
#20=IFCDOOR('1hOSvn6df7F8_7GcBWlRGR',$,'Door 2',$,$,$,$,$,$,$);\n\
#21=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',$,'Wall',$,$,$,$,$,$);\n\
ENDSEC;\n\
END-ISO-10303-21;\n";

    #[test]
    fn test_open_and_query() {
        let mut engine = IfcEngine::new();
        let model = engine.open_model(FILE.as_bytes()).unwrap();

        assert_eq!(engine.get_all_lines(model).unwrap(), &[3, 10, 11, 12, 20, 21]);
        assert_eq!(engine.get_all_items_of_type(model, "IfcDoor").unwrap(), vec![3, 20]);
        assert!(engine.get_all_items_of_type(model, "IFCWALLSTANDARDCASE").unwrap().is_empty());
        assert_eq!(engine.schema_version(model).unwrap(), Some("IFC4"));
        assert_eq!(engine.length_unit_scale(model).unwrap(), 0.001);

        let door = engine.get_line(model, 20).unwrap();
        assert_eq!(door.global_id(), Some("1hOSvn6df7F8_7GcBWlRGR"));
        assert_eq!(engine.get_line_type(model, 21).unwrap(), "IFCWALL");
    }

    #[test]
    fn test_models_are_independent() {
        let mut engine = IfcEngine::new();
        let first = engine.open_model(FILE.as_bytes()).unwrap();
        let second = engine.open_model_from_str(FILE).unwrap();
        assert_ne!(first, second);

        engine.close_model(first);
        assert_eq!(engine.get_all_lines(first).unwrap_err(), Error::ModelNotOpen(first.value()));
        assert_eq!(engine.get_all_lines(second).unwrap().len(), 6);
        assert_eq!(engine.model_count(), 1);
    }

    #[test]
    fn test_rejects_content_without_data_section() {
        let mut engine = IfcEngine::new();
        assert_eq!(
            engine.open_model(b"not an ifc file").unwrap_err(),
            Error::MissingDataSection
        );
    }

    #[test]
    fn test_unknown_line() {
        let mut engine = IfcEngine::new();
        let model = engine.open_model(FILE.as_bytes()).unwrap();
        assert_eq!(engine.get_line(model, 999).unwrap_err(), Error::EntityNotFound(999));
    }
}
