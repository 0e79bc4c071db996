// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subsets - named, merged selections of element meshes
//!
//! A subset is keyed by a [`SubsetKey`]; creating a subset under a key that
//! already exists replaces it outright.

use ifc_audit_geometry::Mesh;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::model::LoadedModel;

/// Identity of a subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubsetKey {
    Category(Category),
    Highlight,
}

/// Surface appearance of a subset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Material {
    /// 0xRRGGBB
    pub color: u32,
    pub opacity: f32,
    pub transparent: bool,
    pub depth_test: bool,
}

impl Default for Material {
    /// The failure highlight: translucent red drawn over everything
    fn default() -> Self {
        Self {
            color: 0xdc2626,
            opacity: 0.6,
            transparent: true,
            depth_test: false,
        }
    }
}

impl Material {
    /// Opaque, depth-tested material of the given colour
    pub fn opaque(color: u32) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
            depth_test: true,
        }
    }

    /// Linear RGB components in 0..=1
    pub fn rgb(&self) -> [f32; 3] {
        [
            ((self.color >> 16) & 0xff) as f32 / 255.0,
            ((self.color >> 8) & 0xff) as f32 / 255.0,
            (self.color & 0xff) as f32 / 255.0,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Subset {
    pub key: SubsetKey,
    /// Requested express ids, in request order
    pub ids: Vec<u32>,
    /// Merged meshes of those ids that have geometry
    pub mesh: Mesh,
    pub material: Material,
    /// Bumped on every replacement so GPU buffers can be refreshed
    pub revision: u64,
}

/// All live subsets of the current model
#[derive(Debug, Default)]
pub struct SubsetRegistry {
    subsets: FxHashMap<SubsetKey, Subset>,
    next_revision: u64,
}

impl SubsetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the subset for `key`, replacing any previous one
    pub fn create_subset(
        &mut self,
        key: SubsetKey,
        ids: &[u32],
        model: &LoadedModel,
        material: Material,
    ) -> &Subset {
        let mut mesh = Mesh::new();
        for id in ids {
            if let Some(element) = model.mesh(*id) {
                mesh.merge(element);
            }
        }

        self.next_revision += 1;
        let subset = Subset {
            key,
            ids: ids.to_vec(),
            mesh,
            material,
            revision: self.next_revision,
        };
        tracing::debug!(
            ?key,
            ids = subset.ids.len(),
            triangles = subset.mesh.triangle_count(),
            "created subset"
        );

        self.subsets.insert(key, subset);
        &self.subsets[&key]
    }

    pub fn get(&self, key: SubsetKey) -> Option<&Subset> {
        self.subsets.get(&key)
    }

    pub fn contains(&self, key: SubsetKey) -> bool {
        self.subsets.contains_key(&key)
    }

    pub fn remove(&mut self, key: SubsetKey) -> Option<Subset> {
        self.subsets.remove(&key)
    }

    pub fn clear(&mut self) {
        self.subsets.clear();
    }

    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_rgb() {
        let rgb = Material::default().rgb();
        assert_eq!(rgb[0], 220.0 / 255.0);
        assert_eq!(rgb[1], 38.0 / 255.0);
        assert_eq!(rgb[2], 38.0 / 255.0);
        assert_eq!(Material::opaque(0xffffff).rgb(), [1.0, 1.0, 1.0]);
    }
}
