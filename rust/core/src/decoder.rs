// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity Decoder - On-demand entity parsing
//!
//! Entities are decoded lazily from byte offsets and cached per decoder.

use crate::entity::{AttributeValue, DecodedEntity};
use crate::error::{Error, Result};
use crate::parser::{parse_entity, EntityScanner};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Pre-built entity index: express id -> (start, end) byte range
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Build entity index from content in one linear scan
#[inline]
pub fn build_entity_index(content: &str) -> EntityIndex {
    // Roughly one entity per 50 bytes
    let mut index =
        FxHashMap::with_capacity_and_hasher(content.len() / 50, Default::default());

    let mut scanner = EntityScanner::new(content);
    while let Some((id, _, start, end)) = scanner.next_entity() {
        index.insert(id, (start, end));
    }

    index
}

/// Decode a single instance line without caching
pub fn decode_line(line: &str) -> Result<DecodedEntity> {
    let (id, type_name, tokens) = parse_entity(line)?;
    let attributes = tokens.iter().map(AttributeValue::from_token).collect();
    Ok(DecodedEntity::new(id, type_name, attributes))
}

/// Entity decoder for lazy parsing; decoded entities are shared through `Arc`
pub struct EntityDecoder<'a> {
    content: &'a str,
    cache: FxHashMap<u32, Arc<DecodedEntity>>,
    entity_index: Option<Arc<EntityIndex>>,
}

impl<'a> EntityDecoder<'a> {
    /// Create new decoder; the index is built on first lookup
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            cache: FxHashMap::default(),
            entity_index: None,
        }
    }

    /// Create decoder with a shared, pre-built index
    pub fn with_arc_index(content: &'a str, index: Arc<EntityIndex>) -> Self {
        Self {
            content,
            cache: FxHashMap::default(),
            entity_index: Some(index),
        }
    }

    fn index(&mut self) -> &EntityIndex {
        let content = self.content;
        self.entity_index
            .get_or_insert_with(|| Arc::new(build_entity_index(content)))
    }

    /// Decode entity at byte offset, caching the result
    pub fn decode_at(&mut self, start: usize, end: usize) -> Result<Arc<DecodedEntity>> {
        let line = self
            .content
            .get(start..end)
            .ok_or_else(|| Error::parse(start, "entity range out of bounds"))?;
        let entity = Arc::new(decode_line(line).map_err(|e| match e {
            Error::Parse { position, message } => Error::parse(start + position, message),
            other => other,
        })?);
        self.cache.insert(entity.id, Arc::clone(&entity));
        Ok(entity)
    }

    /// Decode entity by ID using the entity index
    #[inline]
    pub fn decode_by_id(&mut self, entity_id: u32) -> Result<Arc<DecodedEntity>> {
        if let Some(entity) = self.cache.get(&entity_id) {
            return Ok(Arc::clone(entity));
        }

        let (start, end) = self
            .index()
            .get(&entity_id)
            .copied()
            .ok_or(Error::EntityNotFound(entity_id))?;

        self.decode_at(start, end)
    }

    /// Resolve entity reference (follow #ID); `None` for anything that is not a reference
    #[inline]
    pub fn resolve_ref(&mut self, attr: &AttributeValue) -> Result<Option<Arc<DecodedEntity>>> {
        match attr.as_entity_ref() {
            Some(id) => Ok(Some(self.decode_by_id(id)?)),
            None => Ok(None),
        }
    }

    /// Resolve list of entity references, skipping non-reference members
    pub fn resolve_ref_list(&mut self, attr: &AttributeValue) -> Result<Vec<Arc<DecodedEntity>>> {
        let list = attr
            .as_list()
            .ok_or_else(|| Error::parse(0, "expected list of references"))?;

        let mut entities = Vec::with_capacity(list.len());
        for item in list {
            if let Some(id) = item.as_entity_ref() {
                entities.push(self.decode_by_id(id)?);
            }
        }
        Ok(entities)
    }

    /// Get raw content string for an entity
    #[inline]
    pub fn get_raw_content(&mut self, entity_id: u32) -> Option<&'a str> {
        let content = self.content;
        let (start, end) = self.index().get(&entity_id).copied()?;
        content.get(start..end)
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IfcType;

    const CONTENT: &str = "DATA;\n\
#1=IFCCARTESIANPOINT((0.,0.,0.));\n\
#2=IFCDIRECTION((0.,0.,1.));\n\
#3=IFCAXIS2PLACEMENT3D(#1,#2,$);\n\
#4=IFCLOCALPLACEMENT($,#3);\n\
ENDSEC;\n";

    #[test]
    fn test_build_entity_index() {
        let index = build_entity_index(CONTENT);
        assert_eq!(index.len(), 4);
        let (start, end) = index[&2];
        assert_eq!(&CONTENT[start..end], "#2=IFCDIRECTION((0.,0.,1.));");
    }

    #[test]
    fn test_decode_and_resolve() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let placement = decoder.decode_by_id(3).unwrap();
        assert_eq!(placement.ifc_type, IfcType::IfcAxis2Placement3D);

        let location = decoder.resolve_ref(&placement.attributes[0]).unwrap().unwrap();
        assert_eq!(location.ifc_type, IfcType::IfcCartesianPoint);
        assert!(decoder.resolve_ref(&placement.attributes[2]).unwrap().is_none());
        assert_eq!(decoder.cache_size(), 2);
    }

    #[test]
    fn test_missing_entity() {
        let mut decoder = EntityDecoder::new(CONTENT);
        assert_eq!(decoder.decode_by_id(99).unwrap_err(), Error::EntityNotFound(99));
    }

    #[test]
    fn test_raw_content() {
        let mut decoder = EntityDecoder::new(CONTENT);
        assert_eq!(decoder.get_raw_content(4), Some("#4=IFCLOCALPLACEMENT($,#3);"));
    }
}
