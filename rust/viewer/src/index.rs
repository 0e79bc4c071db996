// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Item index - express id to decoded properties of every non-geometry line
//!
//! Built from the selected file's raw bytes by an engine instance of its
//! own, independent of the render model, and used to resolve report GUIDs.

use std::collections::BTreeMap;

use ifc_audit_core::{is_geometry_type_name, DecodedEntity, IfcEngine};

use crate::error::Result;

#[derive(Debug, Default)]
pub struct ItemIndex {
    items: BTreeMap<u32, DecodedEntity>,
}

impl ItemIndex {
    /// Open `bytes` in a fresh engine and decode every non-geometry line
    ///
    /// The bytes go through a lossy UTF-8 text decode first. Lines that
    /// fail to decode are logged and left out. The engine model is closed
    /// before returning.
    pub fn build(bytes: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(bytes).into_owned();
        let mut engine = IfcEngine::new();
        let model = engine.open_model_from_str(text)?;

        let mut items = BTreeMap::new();
        for &express_id in engine.get_all_lines(model)? {
            let item = engine
                .get_line_type(model, express_id)
                .and_then(|type_name| {
                    if is_geometry_type_name(type_name) {
                        Ok(None)
                    } else {
                        engine.get_line(model, express_id).map(Some)
                    }
                });
            match item {
                Ok(Some(entity)) => {
                    items.insert(express_id, entity);
                }
                Ok(None) => {}
                Err(error) => tracing::warn!(express_id, %error, "skipping item"),
            }
        }

        engine.close_model(model);
        tracing::debug!(items = items.len(), "built item index");
        Ok(Self { items })
    }

    /// Express id of the first item, in ascending id order, with this GlobalId
    pub fn find_express_id(&self, global_id: &str) -> Option<u32> {
        self.items
            .values()
            .find(|item| item.global_id() == Some(global_id))
            .map(|item| item.id)
    }

    pub fn get(&self, express_id: u32) -> Option<&DecodedEntity> {
        self.items.get(&express_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#1=IFCCARTESIANPOINT((0.,0.,0.));\n\
#7=IFCDOOR('0LV8Pp2XDEBhNs3ybL9vy6',$,'Door',$,$,$,$,$,$,$,$,$,$);\n\
#3=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',$,'Wall',$,$,$,$,$,$);\n\
#9=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',$,'Copy',$,$,$,$,$,$);\n\
#5=IFCPROPERTYSINGLEVALUE('Status',$,IFCLABEL('Fail'),$);\n\
#6=IFCWINDOW(,,);\n\
ENDSEC;\nEND-ISO-10303-21;\n";

    #[test]
    fn test_geometry_and_broken_lines_are_excluded() {
        let index = ItemIndex::build(FILE.as_bytes()).unwrap();
        assert!(index.get(1).is_none());
        assert!(index.get(5).is_some());
        assert!(index.get(6).is_none());
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_first_match_in_id_order() {
        let index = ItemIndex::build(FILE.as_bytes()).unwrap();
        assert_eq!(index.find_express_id("2O2Fr$t4X7Zf8NOew3FLOH"), Some(3));
        assert_eq!(index.find_express_id("0LV8Pp2XDEBhNs3ybL9vy6"), Some(7));
        assert_eq!(index.find_express_id("unknown"), None);
    }

    #[test]
    fn test_lossy_bytes() {
        let mut bytes = FILE.as_bytes().to_vec();
        // Invalid UTF-8 inside a label
        let at = FILE.find("'Door'").unwrap() + 2;
        bytes[at] = 0xff;
        let index = ItemIndex::build(&bytes).unwrap();
        assert_eq!(index.find_express_id("0LV8Pp2XDEBhNs3ybL9vy6"), Some(7));
    }
}
