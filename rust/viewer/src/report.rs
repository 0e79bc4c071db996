// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audit report parsing and failure scanning
//!
//! A report is a JSON array of objects. An entry fails when one of its keys
//! contains the status needle (case-insensitive) and holds exactly the fail
//! value; every key of a failing entry containing the GUID needle
//! (case-sensitive) then names an element to flag.

use serde_json::Value;

use crate::config::ReportRules;

/// Why a report text was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Not parseable as JSON
    InvalidJson,
    /// Valid JSON whose top level is not an array
    NotAnArray,
}

/// One flagged GUID of a failing entry
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// The GUID field's value as written in the report
    pub guid: Value,
    /// Name of the status key that marked the entry as failing
    pub status_key: String,
}

impl Failure {
    /// Text shown in the alert for this failure
    pub fn guid_text(&self) -> String {
        match &self.guid {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Candidate GlobalId; only string values can match an element
    pub fn candidate(&self) -> Option<&str> {
        self.guid.as_str()
    }
}

/// Parse report text into its entries
pub fn parse_report(text: &str) -> Result<Vec<Value>, ReportError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(entries)) => Ok(entries),
        Ok(_) => Err(ReportError::NotAnArray),
        Err(_) => Err(ReportError::InvalidJson),
    }
}

/// Collect the failures of every failing entry, in report order
///
/// Non-object entries are skipped. An entry with several failing status keys
/// still contributes each of its GUID keys once, attributed to the first
/// failing status key.
pub fn scan_failures(entries: &[Value], rules: &ReportRules) -> Vec<Failure> {
    let status_needle = rules.status_key.to_lowercase();
    let mut failures = Vec::new();

    for entry in entries {
        let Value::Object(fields) = entry else {
            continue;
        };

        let failing_key = fields.iter().find_map(|(key, value)| {
            let is_status = key.to_lowercase().contains(&status_needle);
            let is_fail = value.as_str() == Some(rules.fail_value.as_str());
            (is_status && is_fail).then_some(key)
        });
        let Some(status_key) = failing_key else {
            continue;
        };

        failures.extend(
            fields
                .iter()
                .filter(|(key, _)| key.contains(&rules.guid_key))
                .map(|(_, guid)| Failure {
                    guid: guid.clone(),
                    status_key: status_key.clone(),
                }),
        );
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scan(value: Value) -> Vec<Failure> {
        let entries = value.as_array().cloned().unwrap_or_default();
        scan_failures(&entries, &ReportRules::default())
    }

    #[test]
    fn test_parse_report() {
        assert_eq!(parse_report("[]"), Ok(vec![]));
        assert_eq!(parse_report("{\"a\": 1"), Err(ReportError::InvalidJson));
        assert_eq!(parse_report(""), Err(ReportError::InvalidJson));
        assert_eq!(parse_report("{\"Status\": \"Fail\"}"), Err(ReportError::NotAnArray));
        assert_eq!(parse_report("42"), Err(ReportError::NotAnArray));
    }

    #[test]
    fn test_status_key_is_case_insensitive() {
        let failures = scan(json!([
            {"Status": "Fail", "GUID": "a"},
            {"checkSTATUS": "Fail", "GUID": "b"},
            {"status": "Pass", "GUID": "c"},
            {"status": "fail", "GUID": "d"},
            {"state": "Fail", "GUID": "e"},
        ]));
        let guids: Vec<_> = failures.iter().map(Failure::guid_text).collect();
        assert_eq!(guids, ["a", "b"]);
        assert_eq!(failures[1].status_key, "checkSTATUS");
    }

    #[test]
    fn test_guid_key_is_case_sensitive_substring() {
        let failures = scan(json!([
            {"Status": "Fail", "IfcGUID": "a", "guid": "b", "HostGUID": "c"}
        ]));
        let guids: Vec<_> = failures.iter().map(Failure::guid_text).collect();
        assert_eq!(guids, ["a", "c"]);
    }

    #[test]
    fn test_multiple_failing_status_keys_flag_once() {
        let failures = scan(json!([
            {"Status": "Fail", "SubStatus": "Fail", "GUID": "a"}
        ]));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].status_key, "Status");
    }

    #[test]
    fn test_non_object_entries_and_values() {
        let failures = scan(json!([
            "Fail",
            null,
            [1, 2],
            {"Status": "Fail", "GUID": 12},
            {"Status": "Fail"}
        ]));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].guid_text(), "12");
        assert_eq!(failures[0].candidate(), None);
    }

    #[test]
    fn test_custom_rules() {
        let rules = ReportRules {
            status_key: "result".to_string(),
            fail_value: "KO".to_string(),
            guid_key: "Id".to_string(),
        };
        let entries = vec![json!({"Result": "KO", "ElementId": "x"})];
        let failures = scan_failures(&entries, &rules);
        assert_eq!(failures[0].candidate(), Some("x"));
    }
}
