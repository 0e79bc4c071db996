// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned, decoded entity instances and their attribute values.

use crate::parser::Token;
use crate::schema::IfcType;
use crate::strings::decode_step_string;

/// IFC entity attribute value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeValue {
    /// Entity reference
    EntityRef(u32),
    /// String value, STEP escapes already decoded
    String(String),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Enum value without the surrounding dots
    Enum(String),
    /// Aggregate
    List(Vec<AttributeValue>),
    /// Typed value such as `IFCLABEL('x')`
    Typed(String, Vec<AttributeValue>),
    /// `$`
    Null,
    /// `*`
    Derived,
}

impl AttributeValue {
    /// Convert from a borrowed token
    pub fn from_token(token: &Token) -> Self {
        match token {
            Token::EntityRef(id) => AttributeValue::EntityRef(*id),
            Token::String(s) => AttributeValue::String(decode_step_string(s).into_owned()),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum(e) => AttributeValue::Enum(e.to_string()),
            Token::List(items) => AttributeValue::List(items.iter().map(Self::from_token).collect()),
            Token::TypedValue(name, args) => AttributeValue::Typed(
                name.to_string(),
                args.iter().map(Self::from_token).collect(),
            ),
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }

    #[inline]
    pub fn as_entity_ref(&self) -> Option<u32> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// String payload; typed labels such as `IFCLABEL('x')` unwrap to their content
    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::Typed(_, args) if args.len() == 1 => args[0].as_string(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric payload; integers widen, typed measures unwrap
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Typed(_, args) if args.len() == 1 => args[0].as_float(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// `$` or `*`
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null | AttributeValue::Derived)
    }

    /// Read a coordinate tuple of up to three reals, padding with zeros
    pub fn as_point3(&self) -> Option<[f64; 3]> {
        let coords = self.as_list()?;
        if coords.is_empty() {
            return None;
        }
        let mut point = [0.0; 3];
        for (slot, value) in point.iter_mut().zip(coords) {
            *slot = value.as_float()?;
        }
        Some(point)
    }
}

/// A decoded entity instance
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedEntity {
    /// Express id (`#id`)
    pub id: u32,
    pub ifc_type: IfcType,
    /// Upper-case STEP keyword as written in the file
    pub type_name: String,
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    pub fn new(id: u32, type_name: &str, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id,
            ifc_type: IfcType::from_name(type_name),
            type_name: type_name.to_ascii_uppercase(),
            attributes,
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    #[inline]
    pub fn get_ref(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(|a| a.as_entity_ref())
    }

    #[inline]
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|a| a.as_string())
    }

    #[inline]
    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|a| a.as_float())
    }

    #[inline]
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|a| a.as_list())
    }

    /// GlobalId (attribute 0 of every IfcRoot subtype)
    pub fn global_id(&self) -> Option<&str> {
        if !self.is_rooted() {
            return None;
        }
        self.get_string(0)
    }

    /// Name (attribute 2 of every IfcRoot subtype)
    pub fn name(&self) -> Option<&str> {
        if !self.is_rooted() {
            return None;
        }
        self.get_string(2)
    }

    /// Heuristic for IfcRoot subtypes: a 22-character GlobalId string
    /// followed by an OwnerHistory reference or `$`
    fn is_rooted(&self) -> bool {
        let guid_like = self
            .get_string(0)
            .map(|s| s.len() == 22)
            .unwrap_or(false);
        let owner_like = self
            .get(1)
            .map(|a| a.as_entity_ref().is_some() || a.is_null())
            .unwrap_or(false);
        guid_like && owner_like
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_entity;

    fn decode(line: &str) -> DecodedEntity {
        let (id, type_name, tokens) = parse_entity(line).unwrap();
        DecodedEntity::new(id, type_name, tokens.iter().map(AttributeValue::from_token).collect())
    }

    #[test]
    fn test_global_id_and_name() {
        let wall = decode("#42=IFCWALLSTANDARDCASE('2O2Fr$t4X7Zf8NOew3FLOH',#5,'Wand ''A''',$,$,#6,#7,$);");
        assert_eq!(wall.ifc_type, IfcType::IfcWallStandardCase);
        assert_eq!(wall.global_id(), Some("2O2Fr$t4X7Zf8NOew3FLOH"));
        assert_eq!(wall.name(), Some("Wand 'A'"));
    }

    #[test]
    fn test_non_root_entity_has_no_global_id() {
        let label = decode("#3=IFCPROPERTYSINGLEVALUE('Reference',$,IFCIDENTIFIER('abc'),$);");
        assert_eq!(label.global_id(), None);
        assert_eq!(label.get(2).and_then(|a| a.as_string()), Some("abc"));
    }

    #[test]
    fn test_point_and_measures() {
        let point = decode("#1=IFCCARTESIANPOINT((1.,2.));");
        assert_eq!(point.get(0).and_then(|a| a.as_point3()), Some([1.0, 2.0, 0.0]));

        let measure = AttributeValue::Typed(
            "IFCLENGTHMEASURE".into(),
            vec![AttributeValue::Float(2.5)],
        );
        assert_eq!(measure.as_float(), Some(2.5));
    }
}
