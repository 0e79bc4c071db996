// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Meshes every product of the sample model and checks their world bounds.

use approx::assert_relative_eq;
use ifc_audit_core::{IfcEngine, ModelId};
use ifc_audit_geometry::{GeometryRouter, Mesh};

const SAMPLE: &str = include_str!("../../../tests/models/audit_sample.ifc");

fn open() -> (IfcEngine, ModelId) {
    let mut engine = IfcEngine::new();
    let model = engine.open_model(SAMPLE.as_bytes()).unwrap();
    (engine, model)
}

fn mesh_of(engine: &IfcEngine, model: ModelId, router: &GeometryRouter, type_name: &str) -> Mesh {
    let ids = engine.get_all_items_of_type(model, type_name).unwrap();
    assert_eq!(ids.len(), 1, "{type_name}");
    let mut decoder = engine.decoder(model).unwrap();
    let element = decoder.decode_by_id(ids[0]).unwrap();
    router.process_element(&element, &mut decoder).unwrap()
}

#[test]
fn test_every_category_produces_geometry() {
    let (engine, model) = open();
    let router = GeometryRouter::with_scale(engine.length_unit_scale(model).unwrap());
    assert_relative_eq!(router.unit_scale(), 0.001);

    let expected = [
        ("IFCWALLSTANDARDCASE", 12),
        ("IFCSLAB", 12),
        ("IFCFURNISHINGELEMENT", 4),
        ("IFCDOOR", 12),
        ("IFCWINDOW", 12),
        ("IFCPLATE", 12),
        ("IFCMEMBER", 92),
    ];
    for (type_name, triangles) in expected {
        let mesh = mesh_of(&engine, model, &router, type_name);
        assert_eq!(mesh.triangle_count(), triangles, "{type_name}");
        assert_eq!(mesh.normals.len(), mesh.positions.len(), "{type_name}");
    }
}

#[test]
fn test_world_bounds_in_metres_y_up() {
    let (engine, model) = open();
    let router = GeometryRouter::with_scale(engine.length_unit_scale(model).unwrap());

    // Slab extrudes downwards from the floor level
    let (min, max) = mesh_of(&engine, model, &router, "IFCSLAB").bounds().unwrap();
    assert_relative_eq!(min.y, -0.2, epsilon = 1e-5);
    assert_relative_eq!(max.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(min.z, -4.0, epsilon = 1e-5);

    // Window sits in its own placement at (2.5, -0.05, 0.9)
    let (min, max) = mesh_of(&engine, model, &router, "IFCWINDOW").bounds().unwrap();
    assert_relative_eq!(min.x, 2.5, epsilon = 1e-5);
    assert_relative_eq!(max.x, 3.5, epsilon = 1e-5);
    assert_relative_eq!(min.y, 0.9, epsilon = 1e-5);
    assert_relative_eq!(max.y, 2.1, epsilon = 1e-5);

    // Door geometry comes through its representation map and target offset
    let (min, max) = mesh_of(&engine, model, &router, "IFCDOOR").bounds().unwrap();
    assert_relative_eq!(min.x, 0.5, epsilon = 1e-5);
    assert_relative_eq!(max.x, 1.4, epsilon = 1e-5);
    assert_relative_eq!(max.y, 2.1, epsilon = 1e-5);
}

#[test]
fn test_faceted_brep_faces_point_outward() {
    let (engine, model) = open();
    let router = GeometryRouter::with_scale(0.001);
    let mesh = mesh_of(&engine, model, &router, "IFCWINDOW");
    let (min, max) = mesh.bounds().unwrap();
    let centre = nalgebra::center(&min, &max);

    for (i, n) in mesh.normals.chunks_exact(3).enumerate() {
        let p = &mesh.positions[i * 3..i * 3 + 3];
        let outward = (p[0] - centre.x) * n[0] + (p[1] - centre.y) * n[1] + (p[2] - centre.z) * n[2];
        assert!(outward > 0.0, "vertex {i} faces inward");
    }
}

#[test]
fn test_product_without_representation() {
    let (engine, model) = open();
    let router = GeometryRouter::new();
    let mesh = mesh_of(&engine, model, &router, "IFCWALL");
    assert!(mesh.is_empty());
}
