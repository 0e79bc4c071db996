// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The seven toggleable element categories

use std::fmt;

use ifc_audit_core::IfcType;

/// An element category with its own subset and checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    WallStandardCase,
    Slab,
    FurnishingElement,
    Door,
    Window,
    Plate,
    Member,
}

/// Static description of a category
#[derive(Debug, Clone, Copy)]
pub struct CategoryDescriptor {
    pub category: Category,
    /// Upper-case STEP keyword, also the checkbox id
    pub name: &'static str,
    /// web-ifc numeric type code
    pub type_code: u32,
    pub ifc_type: IfcType,
    /// Base colour of the category subset (0xRRGGBB)
    pub color: u32,
}

/// Categories in setup order
pub const CATEGORIES: [CategoryDescriptor; 7] = [
    CategoryDescriptor {
        category: Category::WallStandardCase,
        name: "IFCWALLSTANDARDCASE",
        type_code: 3_512_223_829,
        ifc_type: IfcType::IfcWallStandardCase,
        color: 0xd6d3d1,
    },
    CategoryDescriptor {
        category: Category::Slab,
        name: "IFCSLAB",
        type_code: 1_529_196_076,
        ifc_type: IfcType::IfcSlab,
        color: 0xa8a29e,
    },
    CategoryDescriptor {
        category: Category::FurnishingElement,
        name: "IFCFURNISHINGELEMENT",
        type_code: 263_784_265,
        ifc_type: IfcType::IfcFurnishingElement,
        color: 0xb45309,
    },
    CategoryDescriptor {
        category: Category::Door,
        name: "IFCDOOR",
        type_code: 395_920_057,
        ifc_type: IfcType::IfcDoor,
        color: 0x92400e,
    },
    CategoryDescriptor {
        category: Category::Window,
        name: "IFCWINDOW",
        type_code: 3_304_561_284,
        ifc_type: IfcType::IfcWindow,
        color: 0x7dd3fc,
    },
    CategoryDescriptor {
        category: Category::Plate,
        name: "IFCPLATE",
        type_code: 3_171_933_400,
        ifc_type: IfcType::IfcPlate,
        color: 0x94a3b8,
    },
    CategoryDescriptor {
        category: Category::Member,
        name: "IFCMEMBER",
        type_code: 1_073_191_201,
        ifc_type: IfcType::IfcMember,
        color: 0x64748b,
    },
];

impl Category {
    /// All categories in setup order
    pub fn all() -> impl Iterator<Item = Category> {
        CATEGORIES.iter().map(|d| d.category)
    }

    pub fn descriptor(self) -> &'static CategoryDescriptor {
        // CATEGORIES is declared in enum order
        &CATEGORIES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Look a category up by its symbolic name (checkbox id)
    pub fn from_name(name: &str) -> Option<Category> {
        CATEGORIES
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .map(|d| d.category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_table_matches_enum_order() {
        for (index, descriptor) in CATEGORIES.iter().enumerate() {
            assert_eq!(descriptor.category as usize, index);
            assert_eq!(descriptor.ifc_type.name(), descriptor.name);
            assert_eq!(descriptor.ifc_type.type_code(), Some(descriptor.type_code));
        }
    }

    #[test]
    fn test_setup_order() {
        let names: Vec<_> = Category::all().map(Category::name).collect();
        assert_eq!(
            names,
            [
                "IFCWALLSTANDARDCASE",
                "IFCSLAB",
                "IFCFURNISHINGELEMENT",
                "IFCDOOR",
                "IFCWINDOW",
                "IFCPLATE",
                "IFCMEMBER"
            ]
        );
    }

    #[test]
    fn test_lookup() {
        assert_eq!(Category::from_name("IFCDOOR"), Some(Category::Door));
        assert_eq!(Category::from_name("IFCWALL"), None);
    }
}
