// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene graph of attached subsets

use std::collections::BTreeSet;

use crate::subset::{Subset, SubsetKey, SubsetRegistry};

/// Which subsets are currently part of the rendered scene
///
/// Keys order categories before the highlight, which is also the draw
/// order: the highlight ignores depth and must come last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneGraph {
    attached: BTreeSet<SubsetKey>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a subset; attaching twice is a no-op
    pub fn attach(&mut self, key: SubsetKey) {
        self.attached.insert(key);
    }

    /// Detach a subset; detaching an absent subset is a no-op
    pub fn detach(&mut self, key: SubsetKey) {
        self.attached.remove(&key);
    }

    pub fn is_attached(&self, key: SubsetKey) -> bool {
        self.attached.contains(&key)
    }

    pub fn clear(&mut self) {
        self.attached.clear();
    }

    pub fn attached(&self) -> impl Iterator<Item = SubsetKey> + '_ {
        self.attached.iter().copied()
    }

    /// Attached subsets that exist in `registry`, in draw order
    pub fn visible<'r>(&'r self, registry: &'r SubsetRegistry) -> impl Iterator<Item = &'r Subset> + 'r {
        self.attached.iter().filter_map(move |key| registry.get(*key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    #[test]
    fn test_highlight_draws_last() {
        let mut scene = SceneGraph::new();
        scene.attach(SubsetKey::Highlight);
        scene.attach(SubsetKey::Category(Category::Member));
        scene.attach(SubsetKey::Category(Category::WallStandardCase));
        scene.attach(SubsetKey::Category(Category::WallStandardCase));

        let keys: Vec<_> = scene.attached().collect();
        assert_eq!(
            keys,
            [
                SubsetKey::Category(Category::WallStandardCase),
                SubsetKey::Category(Category::Member),
                SubsetKey::Highlight
            ]
        );

        scene.detach(SubsetKey::Highlight);
        scene.detach(SubsetKey::Highlight);
        assert!(!scene.is_attached(SubsetKey::Highlight));
    }
}
