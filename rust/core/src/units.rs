// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length unit extraction
//!
//! Follows IFCPROJECT → IFCUNITASSIGNMENT → IFCSIUNIT(.LENGTHUNIT.) and turns
//! the SI prefix into the factor that converts model coordinates to metres.

use crate::decoder::EntityDecoder;
use crate::error::Result;
use crate::schema::IfcType;

/// Multiplier for an IfcSIPrefix enum value; unknown or missing means 1
#[inline]
pub fn si_prefix_multiplier(prefix: &str) -> f64 {
    match prefix {
        "ATTO" => 1e-18,
        "FEMTO" => 1e-15,
        "PICO" => 1e-12,
        "NANO" => 1e-9,
        "MICRO" => 1e-6,
        "MILLI" => 1e-3,
        "CENTI" => 1e-2,
        "DECI" => 1e-1,
        "DECA" => 1e1,
        "HECTO" => 1e2,
        "KILO" => 1e3,
        "MEGA" => 1e6,
        "GIGA" => 1e9,
        "TERA" => 1e12,
        "PETA" => 1e15,
        "EXA" => 1e18,
        _ => 1.0,
    }
}

/// Length unit scale of the project, 1.0 when nothing usable is declared
///
/// IFCPROJECT attribute 8 is UnitsInContext; IFCSIUNIT attributes are
/// (Dimensions, UnitType, Prefix, Name). A project or unit assignment that
/// cannot be decoded counts as no declaration.
pub fn extract_length_unit_scale(decoder: &mut EntityDecoder, project_id: u32) -> Result<f64> {
    let project = match decoder.decode_by_id(project_id) {
        Ok(project) => project,
        Err(error) => {
            tracing::warn!(project_id, %error, "unreadable project, assuming metres");
            return Ok(1.0);
        }
    };
    if project.ifc_type != IfcType::IfcProject {
        return Ok(1.0);
    }

    let Some(assignment_id) = project.get_ref(8) else {
        return Ok(1.0);
    };
    let assignment = match decoder.decode_by_id(assignment_id) {
        Ok(assignment) => assignment,
        Err(error) => {
            tracing::warn!(assignment_id, %error, "unreadable unit assignment, assuming metres");
            return Ok(1.0);
        }
    };
    if assignment.ifc_type != IfcType::IfcUnitAssignment {
        return Ok(1.0);
    }

    let Some(units) = assignment.get_list(0) else {
        return Ok(1.0);
    };

    for unit_id in units.iter().filter_map(|u| u.as_entity_ref()) {
        // Conversion-based and derived units are not followed
        let Ok(unit) = decoder.decode_by_id(unit_id) else {
            continue;
        };
        if unit.ifc_type != IfcType::IfcSiUnit {
            continue;
        }
        if unit.get(1).and_then(|a| a.as_enum()) != Some("LENGTHUNIT") {
            continue;
        }

        let prefix = unit.get(2).and_then(|a| a.as_enum()).unwrap_or("");
        return Ok(si_prefix_multiplier(prefix));
    }

    Ok(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_si_prefix_multipliers() {
        assert_eq!(si_prefix_multiplier("MILLI"), 0.001);
        assert_eq!(si_prefix_multiplier("CENTI"), 0.01);
        assert_eq!(si_prefix_multiplier("KILO"), 1000.0);
        assert_eq!(si_prefix_multiplier(""), 1.0);
    }

    #[test]
    fn test_millimetre_project() {
        let content = "DATA;\n\
#1=IFCPROJECT('0YvctVUKr0kugbFTf53O9L',$,'P',$,$,$,$,$,#2);\n\
#2=IFCUNITASSIGNMENT((#3,#4));\n\
#3=IFCSIUNIT(*,.AREAUNIT.,$,.SQUARE_METRE.);\n\
#4=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\n";
        let mut decoder = EntityDecoder::new(content);
        assert_eq!(extract_length_unit_scale(&mut decoder, 1).unwrap(), 0.001);
    }

    #[test]
    fn test_metre_project_without_prefix() {
        let content = "DATA;\n\
#1=IFCPROJECT('0YvctVUKr0kugbFTf53O9L',$,'P',$,$,$,$,$,#2);\n\
#2=IFCUNITASSIGNMENT((#3));\n\
#3=IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.);\n";
        let mut decoder = EntityDecoder::new(content);
        assert_eq!(extract_length_unit_scale(&mut decoder, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_dangling_unit_assignment_falls_back_to_metres() {
        let content = "DATA;\n\
#1=IFCPROJECT('0YvctVUKr0kugbFTf53O9L',$,'P',$,$,$,$,$,#999);\n";
        let mut decoder = EntityDecoder::new(content);
        assert_eq!(extract_length_unit_scale(&mut decoder, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_malformed_project_falls_back_to_metres() {
        let content = "DATA;\n\
#1=IFCPROJECT('0YvctVUKr0kugbFTf53O9L',$,'P',(;\n";
        let mut decoder = EntityDecoder::new(content);
        assert_eq!(extract_length_unit_scale(&mut decoder, 1).unwrap(), 1.0);
    }
}
