// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inline failure alerts and transient toast notifications

use crate::config::ToastSettings;
use crate::report::Failure;

/// One inline alert line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub guid: String,
    /// Status field that failed
    pub field: String,
}

impl Alert {
    pub fn from_failure(failure: &Failure) -> Self {
        Self {
            guid: failure.guid_text(),
            field: failure.status_key.clone(),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div class='bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative' role='alert'>\
<strong class='font-bold'>{}</strong> <span class='block sm:inline'>{}</span></div>",
            escape_html(&self.guid),
            escape_html(&self.field)
        )
    }
}

/// Accumulated alerts, cleared on each accepted report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertPanel {
    alerts: Vec<Alert>,
}

impl AlertPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }

    pub fn push(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Inner HTML of the alert container
    pub fn to_html(&self) -> String {
        self.alerts.iter().map(Alert::to_html).collect()
    }
}

/// Reason a toast is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// A report was entered before any IFC file was chosen
    MissingFile,
    /// The report text is not a JSON array
    InvalidJson,
}

impl ToastKind {
    pub fn message(self) -> &'static str {
        match self {
            ToastKind::MissingFile => "Please upload .ifc file then import json.",
            ToastKind::InvalidJson => "The text must be a valid JSON string.",
        }
    }
}

/// A transient notification ready to be shown
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: &'static str,
    pub settings: ToastSettings,
}

impl Toast {
    pub fn new(kind: ToastKind, settings: &ToastSettings) -> Self {
        Self {
            kind,
            text: kind.message(),
            settings: settings.clone(),
        }
    }

    /// Inline CSS for the toast element
    pub fn style(&self) -> String {
        let s = &self.settings;
        let vertical = if s.gravity == "top" { "top: 16px" } else { "bottom: 16px" };
        let horizontal = match s.position.as_str() {
            "left" => "left: 16px",
            "right" => "right: 16px",
            _ => "left: 50%; transform: translateX(-50%)",
        };
        format!(
            "position: fixed; {}; {}; z-index: 9999; background: {}; color: {}; padding: {}; border-radius: {};",
            vertical, horizontal, s.background, s.color, s.padding, s.border_radius
        )
    }
}

/// Escape text for inclusion in HTML element content or quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_html_is_escaped() {
        let alert = Alert {
            guid: "<b>x</b>".to_string(),
            field: "Status & 'more'".to_string(),
        };
        let html = alert.to_html();
        assert!(html.contains("<strong class='font-bold'>&lt;b&gt;x&lt;/b&gt;</strong>"));
        assert!(html.contains("Status &amp; &#39;more&#39;"));
        assert!(html.starts_with("<div class='bg-red-100"));
    }

    #[test]
    fn test_panel_accumulates_and_clears() {
        let mut panel = AlertPanel::new();
        panel.push(Alert {
            guid: "a".to_string(),
            field: "Status".to_string(),
        });
        panel.push(Alert {
            guid: "b".to_string(),
            field: "Status".to_string(),
        });
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.to_html().matches("role='alert'").count(), 2);
        panel.clear();
        assert!(panel.to_html().is_empty());
    }

    #[test]
    fn test_toast_defaults() {
        let toast = Toast::new(ToastKind::InvalidJson, &ToastSettings::default());
        assert_eq!(toast.text, "The text must be a valid JSON string.");
        assert_eq!(toast.settings.duration_ms, 3000);
        let style = toast.style();
        assert!(style.contains("bottom: 16px"));
        assert!(style.contains("translateX(-50%)"));
        assert!(style.contains("background: #dc2626"));
        assert!(style.contains("padding: 10px 30px"));
    }
}
