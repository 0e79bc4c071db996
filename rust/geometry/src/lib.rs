// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Audit Geometry Processing
//!
//! Turns IFC product representations into flat-shaded triangle meshes using
//! earcutr triangulation and nalgebra for transformations.
//!
//! ```rust,ignore
//! use ifc_audit_core::IfcEngine;
//! use ifc_audit_geometry::GeometryRouter;
//!
//! let mut engine = IfcEngine::new();
//! let model = engine.open_model(&bytes)?;
//! let router = GeometryRouter::with_scale(engine.length_unit_scale(model)?);
//! let mut decoder = engine.decoder(model)?;
//! let wall = decoder.decode_by_id(42)?;
//! let mesh = router.process_element(&wall, &mut decoder)?;
//! ```

pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod processors;
pub mod profile;
pub mod profiles;
pub mod router;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use error::{Error, Result};
pub use extrusion::extrude_profile;
pub use mesh::Mesh;
pub use processors::{
    ExtrudedAreaSolidProcessor, FacetedBrepProcessor, PolygonalFaceSetProcessor,
    TriangulatedFaceSetProcessor,
};
pub use profile::Profile2D;
pub use profiles::ProfileProcessor;
pub use router::{GeometryProcessor, GeometryRouter};
pub use triangulation::triangulate_face;
