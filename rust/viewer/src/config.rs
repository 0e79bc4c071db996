// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer configuration
//!
//! Every section deserializes with `#[serde(default)]`, so a host can pass a
//! partial object (`{"toast": {"durationMs": 5000}}`) and keep the rest.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::subset::Material;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub dom: DomIds,
    pub viewport: ViewportSettings,
    pub highlight: Material,
    pub toast: ToastSettings,
    pub report: ReportRules,
}

impl ViewerConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Ids of the page elements the viewer binds to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomIds {
    pub file_input: String,
    pub report_input: String,
    pub alert_box: String,
    pub canvas: String,
}

impl Default for DomIds {
    fn default() -> Self {
        Self {
            file_input: "file-input".to_string(),
            report_input: "json_error".to_string(),
            alert_box: "alert_box".to_string(),
            canvas: "three-canvas".to_string(),
        }
    }
}

/// Camera, lights, helpers and controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportSettings {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub camera_position: [f32; 3],
    pub controls_target: [f32; 3],
    pub damping_factor: f32,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub directional_target: [f32; 3],
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub axes_length: f32,
    pub max_pixel_ratio: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 2000.0,
            camera_position: [8.0, 13.0, 15.0],
            controls_target: [-2.0, 0.0, 0.0],
            damping_factor: 0.05,
            ambient_intensity: 0.5,
            directional_intensity: 1.0,
            directional_position: [0.0, 10.0, 0.0],
            directional_target: [-5.0, 0.0, 0.0],
            grid_size: 100.0,
            grid_divisions: 60,
            axes_length: 1.0,
            max_pixel_ratio: 2.0,
        }
    }
}

/// Toast presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToastSettings {
    pub duration_ms: u32,
    /// `top` or `bottom`
    pub gravity: String,
    /// `left`, `center` or `right`
    pub position: String,
    pub close: bool,
    pub background: String,
    pub color: String,
    pub padding: String,
    pub border_radius: String,
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            duration_ms: 3000,
            gravity: "bottom".to_string(),
            position: "center".to_string(),
            close: true,
            background: "#dc2626".to_string(),
            color: "#ffffff".to_string(),
            padding: "10px 30px".to_string(),
            border_radius: "8px".to_string(),
        }
    }
}

/// How report entries are recognised as failing and where GUIDs live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportRules {
    /// Matched case-insensitively as a substring of the key
    pub status_key: String,
    /// Compared exactly against string values
    pub fail_value: String,
    /// Matched case-sensitively as a substring of the key
    pub guid_key: String,
}

impl Default for ReportRules {
    fn default() -> Self {
        Self {
            status_key: "status".to_string(),
            fail_value: "Fail".to_string(),
            guid_key: "GUID".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = ViewerConfig::from_json(
            r#"{"toast": {"durationMs": 5000}, "dom": {"canvas": "view"}}"#,
        )
        .unwrap();
        assert_eq!(config.toast.duration_ms, 5000);
        assert_eq!(config.toast.gravity, "bottom");
        assert_eq!(config.dom.canvas, "view");
        assert_eq!(config.dom.file_input, "file-input");
        assert_eq!(config.viewport, ViewportSettings::default());
    }

    #[test]
    fn test_highlight_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.highlight.color, 0xdc2626);
        assert!(!config.highlight.depth_test);
        assert!(config.highlight.transparent);
    }

    #[test]
    fn test_rejects_malformed_config() {
        assert!(ViewerConfig::from_json("{\"toast\": 3}").is_err());
    }
}
