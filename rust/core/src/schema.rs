// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Schema Types
//!
//! Enum for the entity types the viewer and mesher dispatch on; everything
//! else decodes as [`IfcType::Unknown`] and keeps its keyword on the entity.

use std::fmt;

macro_rules! ifc_types {
    ($($variant:ident => $keyword:literal,)*) => {
        /// IFC entity types known to the engine
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum IfcType {
            $($variant,)*
            /// Any type not listed above
            Unknown,
        }

        impl IfcType {
            /// Look up a STEP keyword (case-insensitive)
            pub fn from_name(name: &str) -> IfcType {
                if name.bytes().any(|b| b.is_ascii_lowercase()) {
                    return Self::from_upper(&name.to_ascii_uppercase());
                }
                Self::from_upper(name)
            }

            fn from_upper(name: &str) -> IfcType {
                match name {
                    $($keyword => IfcType::$variant,)*
                    _ => IfcType::Unknown,
                }
            }

            /// Upper-case STEP keyword, e.g. `IFCWALLSTANDARDCASE`
            pub fn name(&self) -> &'static str {
                match self {
                    $(IfcType::$variant => $keyword,)*
                    IfcType::Unknown => "UNKNOWN",
                }
            }
        }
    };
}

ifc_types! {
    // Project and spatial structure
    IfcProject => "IFCPROJECT",
    IfcSite => "IFCSITE",
    IfcBuilding => "IFCBUILDING",
    IfcBuildingStorey => "IFCBUILDINGSTOREY",
    IfcSpace => "IFCSPACE",

    // Building elements
    IfcWall => "IFCWALL",
    IfcWallStandardCase => "IFCWALLSTANDARDCASE",
    IfcSlab => "IFCSLAB",
    IfcDoor => "IFCDOOR",
    IfcWindow => "IFCWINDOW",
    IfcFurnishingElement => "IFCFURNISHINGELEMENT",
    IfcMember => "IFCMEMBER",
    IfcPlate => "IFCPLATE",
    IfcBeam => "IFCBEAM",
    IfcColumn => "IFCCOLUMN",
    IfcRoof => "IFCROOF",
    IfcStair => "IFCSTAIR",
    IfcRailing => "IFCRAILING",
    IfcCovering => "IFCCOVERING",
    IfcCurtainWall => "IFCCURTAINWALL",
    IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
    IfcOpeningElement => "IFCOPENINGELEMENT",

    // Units
    IfcUnitAssignment => "IFCUNITASSIGNMENT",
    IfcSiUnit => "IFCSIUNIT",

    // Placement
    IfcLocalPlacement => "IFCLOCALPLACEMENT",
    IfcAxis2Placement2D => "IFCAXIS2PLACEMENT2D",
    IfcAxis2Placement3D => "IFCAXIS2PLACEMENT3D",
    IfcCartesianPoint => "IFCCARTESIANPOINT",
    IfcDirection => "IFCDIRECTION",
    IfcCartesianTransformationOperator3D => "IFCCARTESIANTRANSFORMATIONOPERATOR3D",
    IfcCartesianTransformationOperator3DnonUniform => "IFCCARTESIANTRANSFORMATIONOPERATOR3DNONUNIFORM",

    // Representation
    IfcProductDefinitionShape => "IFCPRODUCTDEFINITIONSHAPE",
    IfcShapeRepresentation => "IFCSHAPEREPRESENTATION",
    IfcMappedItem => "IFCMAPPEDITEM",
    IfcRepresentationMap => "IFCREPRESENTATIONMAP",

    // Solids and meshes
    IfcExtrudedAreaSolid => "IFCEXTRUDEDAREASOLID",
    IfcTriangulatedFaceSet => "IFCTRIANGULATEDFACESET",
    IfcPolygonalFaceSet => "IFCPOLYGONALFACESET",
    IfcIndexedPolygonalFace => "IFCINDEXEDPOLYGONALFACE",
    IfcIndexedPolygonalFaceWithVoids => "IFCINDEXEDPOLYGONALFACEWITHVOIDS",
    IfcCartesianPointList2D => "IFCCARTESIANPOINTLIST2D",
    IfcCartesianPointList3D => "IFCCARTESIANPOINTLIST3D",
    IfcFacetedBrep => "IFCFACETEDBREP",
    IfcClosedShell => "IFCCLOSEDSHELL",
    IfcOpenShell => "IFCOPENSHELL",
    IfcFace => "IFCFACE",
    IfcFaceBound => "IFCFACEBOUND",
    IfcFaceOuterBound => "IFCFACEOUTERBOUND",
    IfcPolyLoop => "IFCPOLYLOOP",
    IfcBooleanClippingResult => "IFCBOOLEANCLIPPINGRESULT",
    IfcBooleanResult => "IFCBOOLEANRESULT",

    // Profiles and curves
    IfcRectangleProfileDef => "IFCRECTANGLEPROFILEDEF",
    IfcCircleProfileDef => "IFCCIRCLEPROFILEDEF",
    IfcArbitraryClosedProfileDef => "IFCARBITRARYCLOSEDPROFILEDEF",
    IfcArbitraryProfileDefWithVoids => "IFCARBITRARYPROFILEDEFWITHVOIDS",
    IfcPolyline => "IFCPOLYLINE",
    IfcIndexedPolyCurve => "IFCINDEXEDPOLYCURVE",
}

impl IfcType {
    /// Numeric type code used by web-ifc for this type, where the viewer needs one
    pub fn type_code(&self) -> Option<u32> {
        match self {
            IfcType::IfcWallStandardCase => Some(3_512_223_829),
            IfcType::IfcSlab => Some(1_529_196_076),
            IfcType::IfcFurnishingElement => Some(263_784_265),
            IfcType::IfcDoor => Some(395_920_057),
            IfcType::IfcWindow => Some(3_304_561_284),
            IfcType::IfcPlate => Some(3_171_933_400),
            IfcType::IfcMember => Some(1_073_191_201),
            _ => None,
        }
    }

    /// Whether this is a pure geometry/presentation resource
    pub fn is_geometry(&self) -> bool {
        is_geometry_type_name(self.name())
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Geometry, placement and presentation keywords, sorted for binary search
const GEOMETRY_TYPES: &[&str] = &[
    "IFCADVANCEDBREP",
    "IFCADVANCEDFACE",
    "IFCARBITRARYCLOSEDPROFILEDEF",
    "IFCARBITRARYOPENPROFILEDEF",
    "IFCARBITRARYPROFILEDEFWITHVOIDS",
    "IFCAXIS1PLACEMENT",
    "IFCAXIS2PLACEMENT2D",
    "IFCAXIS2PLACEMENT3D",
    "IFCBOOLEANCLIPPINGRESULT",
    "IFCBOOLEANRESULT",
    "IFCBSPLINECURVEWITHKNOTS",
    "IFCBSPLINESURFACEWITHKNOTS",
    "IFCCARTESIANPOINT",
    "IFCCARTESIANPOINTLIST2D",
    "IFCCARTESIANPOINTLIST3D",
    "IFCCARTESIANTRANSFORMATIONOPERATOR2D",
    "IFCCARTESIANTRANSFORMATIONOPERATOR3D",
    "IFCCARTESIANTRANSFORMATIONOPERATOR3DNONUNIFORM",
    "IFCCIRCLE",
    "IFCCIRCLEHOLLOWPROFILEDEF",
    "IFCCIRCLEPROFILEDEF",
    "IFCCLOSEDSHELL",
    "IFCCOLOURRGB",
    "IFCCOMPOSITECURVE",
    "IFCCOMPOSITECURVESEGMENT",
    "IFCCONNECTEDFACESET",
    "IFCCURVESTYLE",
    "IFCCYLINDRICALSURFACE",
    "IFCDIRECTION",
    "IFCEDGECURVE",
    "IFCEDGELOOP",
    "IFCELLIPSE",
    "IFCEXTRUDEDAREASOLID",
    "IFCFACE",
    "IFCFACEBASEDSURFACEMODEL",
    "IFCFACEBOUND",
    "IFCFACEOUTERBOUND",
    "IFCFACETEDBREP",
    "IFCFACETEDBREPWITHVOIDS",
    "IFCFILLAREASTYLE",
    "IFCGEOMETRICCURVESET",
    "IFCGEOMETRICREPRESENTATIONCONTEXT",
    "IFCGEOMETRICREPRESENTATIONSUBCONTEXT",
    "IFCGEOMETRICSET",
    "IFCHALFSPACESOLID",
    "IFCINDEXEDPOLYCURVE",
    "IFCINDEXEDPOLYGONALFACE",
    "IFCINDEXEDPOLYGONALFACEWITHVOIDS",
    "IFCISHAPEPROFILEDEF",
    "IFCLINE",
    "IFCLOCALPLACEMENT",
    "IFCLSHAPEPROFILEDEF",
    "IFCMAPPEDITEM",
    "IFCOPENSHELL",
    "IFCORIENTEDEDGE",
    "IFCPLANE",
    "IFCPOLYGONALBOUNDEDHALFSPACE",
    "IFCPOLYGONALFACESET",
    "IFCPOLYLINE",
    "IFCPOLYLOOP",
    "IFCPRESENTATIONLAYERASSIGNMENT",
    "IFCPRESENTATIONSTYLEASSIGNMENT",
    "IFCPRODUCTDEFINITIONSHAPE",
    "IFCRECTANGLEHOLLOWPROFILEDEF",
    "IFCRECTANGLEPROFILEDEF",
    "IFCREPRESENTATIONMAP",
    "IFCREVOLVEDAREASOLID",
    "IFCSHAPEREPRESENTATION",
    "IFCSHELLBASEDSURFACEMODEL",
    "IFCSTYLEDITEM",
    "IFCSTYLEDREPRESENTATION",
    "IFCSURFACESTYLE",
    "IFCSURFACESTYLERENDERING",
    "IFCSURFACESTYLESHADING",
    "IFCSWEPTDISKSOLID",
    "IFCTRIANGULATEDFACESET",
    "IFCTRIMMEDCURVE",
    "IFCTSHAPEPROFILEDEF",
    "IFCUSHAPEPROFILEDEF",
    "IFCVECTOR",
    "IFCVERTEXPOINT",
];

/// Whether a STEP keyword names a geometry/presentation resource
/// rather than a semantic item (case-insensitive)
pub fn is_geometry_type_name(name: &str) -> bool {
    if name.bytes().any(|b| b.is_ascii_lowercase()) {
        let upper = name.to_ascii_uppercase();
        return GEOMETRY_TYPES.binary_search(&upper.as_str()).is_ok();
    }
    GEOMETRY_TYPES.binary_search(&name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_table_is_sorted() {
        assert!(GEOMETRY_TYPES.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_from_name_round_trip() {
        assert_eq!(IfcType::from_name("IFCWALLSTANDARDCASE"), IfcType::IfcWallStandardCase);
        assert_eq!(IfcType::from_name("IfcSlab"), IfcType::IfcSlab);
        assert_eq!(IfcType::from_name("IFCFLOWTERMINAL"), IfcType::Unknown);
        assert_eq!(IfcType::IfcDoor.name(), "IFCDOOR");
        assert_eq!(IfcType::IfcDoor.to_string(), "IfcDoor");
    }

    #[test]
    fn test_geometry_classification() {
        assert!(is_geometry_type_name("IFCCARTESIANPOINT"));
        assert!(is_geometry_type_name("IfcPolyLoop"));
        assert!(IfcType::IfcShapeRepresentation.is_geometry());
        assert!(!IfcType::IfcWall.is_geometry());
        assert!(!IfcType::IfcProject.is_geometry());
        assert!(!is_geometry_type_name("IFCPROPERTYSET"));
    }

    #[test]
    fn test_category_type_codes() {
        assert_eq!(IfcType::IfcWallStandardCase.type_code(), Some(3_512_223_829));
        assert_eq!(IfcType::IfcWall.type_code(), None);
    }
}
