// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Audit Core Parser
//!
//! STEP/IFC parsing engine built with [nom](https://docs.rs/nom) and
//! [memchr](https://docs.rs/memchr).
//!
//! - **STEP Tokenization**: zero-copy parsing of entity instances
//! - **Entity Scanning**: byte-offset indexing of the DATA section
//! - **Lazy Decoding**: attributes are decoded on demand and cached
//! - **Engine**: several models open at once under numeric model ids
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_audit_core::{EntityScanner, IfcEngine};
//!
//! let mut scanner = EntityScanner::new(content);
//! while let Some((id, type_name, _start, _end)) = scanner.next_entity() {
//!     println!("#{} {}", id, type_name);
//! }
//!
//! let mut engine = IfcEngine::new();
//! let model = engine.open_model(content.as_bytes())?;
//! let doors = engine.get_all_items_of_type(model, "IFCDOOR")?;
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for decoded entities

pub mod decoder;
pub mod engine;
pub mod entity;
pub mod error;
pub mod parser;
pub mod schema;
pub mod strings;
pub mod units;

pub use decoder::{build_entity_index, decode_line, EntityDecoder, EntityIndex};
pub use engine::{IfcEngine, ModelId};
pub use entity::{AttributeValue, DecodedEntity};
pub use error::{Error, Result};
pub use parser::{entity_type_name, parse_entity, EntityScanner, Token};
pub use schema::{is_geometry_type_name, IfcType};
pub use strings::decode_step_string;
pub use units::{extract_length_unit_scale, si_prefix_multiplier};
