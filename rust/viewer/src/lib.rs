// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Audit Viewer
//!
//! Platform-independent state of the audit viewer: model loading, the seven
//! category subsets, report scanning and GUID resolution, the failure
//! highlight, alerts, and the camera/controls of the viewport.
//!
//! ```rust,ignore
//! use ifc_audit_viewer::{AuditSession, Category, ReportOutcome, ViewerConfig};
//!
//! let mut session = AuditSession::new(ViewerConfig::default());
//! session.load_model(std::fs::read("model.ifc")?)?;
//! session.set_category_visible(Category::Slab, false);
//!
//! match session.on_report_input(r#"[{"Status": "Fail", "GUID": "2O2Fr$t4X7Zf8NOew3FLOH"}]"#)? {
//!     ReportOutcome::Highlighted { resolved, .. } => println!("flagged {:?}", resolved),
//!     ReportOutcome::Rejected(toast) => println!("{}", toast.text),
//! }
//! ```

pub mod alert;
pub mod category;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod report;
pub mod scene;
pub mod session;
pub mod subset;
pub mod viewport;

pub use alert::{escape_html, Alert, AlertPanel, Toast, ToastKind};
pub use category::{Category, CategoryDescriptor, CATEGORIES};
pub use config::{DomIds, ReportRules, ToastSettings, ViewerConfig, ViewportSettings};
pub use error::{Result, ViewerError};
pub use index::ItemIndex;
pub use model::{LoadSummary, LoadedModel, ModelLoader};
pub use report::{parse_report, scan_failures, Failure, ReportError};
pub use scene::SceneGraph;
pub use session::{AuditSession, ReportOutcome};
pub use subset::{Material, Subset, SubsetKey, SubsetRegistry};
pub use viewport::{axes_helper, grid_helper, LineGeometry, Lighting, OrbitControls, PerspectiveCamera, Viewport};
