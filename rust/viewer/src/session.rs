// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audit session - the application context behind the page
//!
//! Owns the loaded model, the category and highlight subsets, the scene
//! graph and the alert panel. Event handlers call into it synchronously.

use rustc_hash::FxHashSet;

use crate::alert::{Alert, AlertPanel, Toast, ToastKind};
use crate::category::{Category, CATEGORIES};
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::index::ItemIndex;
use crate::model::{LoadSummary, LoadedModel, ModelLoader};
use crate::report::{parse_report, scan_failures};
use crate::scene::SceneGraph;
use crate::subset::{Material, SubsetKey, SubsetRegistry};

/// Result of handling one edit of the report field
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// Input was rejected; nothing else changed
    Rejected(Toast),
    /// A file is chosen but still being read; the text is kept and handed
    /// out by [`AuditSession::take_pending_report`] once the read is done
    Deferred,
    /// Alerts were rebuilt and the highlight subset replaced
    Highlighted {
        /// Alert lines produced
        failures: usize,
        /// Express ids in the highlight, in report order
        resolved: Vec<u32>,
    },
}

pub struct AuditSession {
    config: ViewerConfig,
    loader: ModelLoader,
    /// A file was chosen, even if its bytes have not arrived yet
    file_chosen: bool,
    /// Bytes of the chosen file, kept for report resolution
    selected_file: Option<Vec<u8>>,
    /// Report typed while the chosen file was still being read
    pending_report: Option<String>,
    model: Option<LoadedModel>,
    subsets: SubsetRegistry,
    scene: SceneGraph,
    /// Checkbox state, indexed by category
    visible: [bool; CATEGORIES.len()],
    alerts: AlertPanel,
    load_generation: u64,
}

impl AuditSession {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            loader: ModelLoader::new(),
            file_chosen: false,
            selected_file: None,
            pending_report: None,
            model: None,
            subsets: SubsetRegistry::new(),
            scene: SceneGraph::new(),
            visible: [true; CATEGORIES.len()],
            alerts: AlertPanel::new(),
            load_generation: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn subsets(&self) -> &SubsetRegistry {
        &self.subsets
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn alerts(&self) -> &AlertPanel {
        &self.alerts
    }

    /// Whether a file was chosen, whether or not its read has finished
    pub fn has_selected_file(&self) -> bool {
        self.file_chosen
    }

    /// Start a file read; the returned generation identifies it
    ///
    /// The file counts as chosen from here on.
    pub fn begin_load(&mut self) -> u64 {
        self.file_chosen = true;
        self.load_generation += 1;
        self.load_generation
    }

    /// Finish a file read started with [`AuditSession::begin_load`]
    ///
    /// Returns `Ok(None)` without touching the session when a newer read has
    /// started in the meantime.
    pub fn finish_load(&mut self, generation: u64, bytes: Vec<u8>) -> Result<Option<LoadSummary>> {
        if generation != self.load_generation {
            tracing::debug!(generation, current = self.load_generation, "discarding stale file read");
            return Ok(None);
        }
        self.load_model(bytes).map(Some)
    }

    /// Load a new file, replacing the current model and all its subsets
    ///
    /// The previous model goes away even when parsing fails, so nothing of
    /// it stays drawn or highlightable. The file still counts as selected,
    /// as with a file input whose content turns out to be broken.
    pub fn load_model(&mut self, bytes: Vec<u8>) -> Result<LoadSummary> {
        let loaded = self.loader.load(&bytes);
        self.file_chosen = true;
        self.selected_file = Some(bytes);

        self.scene.clear();
        self.subsets.clear();
        if let Some(previous) = self.model.take() {
            previous.close();
        }

        let loaded = loaded?;
        let summary = loaded.summary().clone();
        self.model = Some(loaded);
        self.setup_all_categories()?;
        Ok(summary)
    }

    /// Report text deferred while the file was being read
    pub fn take_pending_report(&mut self) -> Option<String> {
        self.pending_report.take()
    }

    /// Rebuild every category subset, in category order
    pub fn setup_all_categories(&mut self) -> Result<()> {
        for category in Category::all() {
            self.setup_category(category)?;
        }
        Ok(())
    }

    /// Replace one category's subset with all items of exactly its type
    pub fn setup_category(&mut self, category: Category) -> Result<()> {
        let model = self.model.as_ref().ok_or(ViewerError::NoModel)?;
        let ids = model.items_of_category(category)?;
        let key = SubsetKey::Category(category);
        self.subsets.create_subset(
            key,
            &ids,
            model,
            Material::opaque(category.descriptor().color),
        );

        if self.visible[category as usize] {
            self.scene.attach(key);
        } else {
            self.scene.detach(key);
        }
        Ok(())
    }

    /// Checkbox change: attach or detach the category's current subset
    pub fn set_category_visible(&mut self, category: Category, checked: bool) {
        self.visible[category as usize] = checked;
        let key = SubsetKey::Category(category);
        if !self.subsets.contains(key) {
            return;
        }
        if checked {
            self.scene.attach(key);
        } else {
            self.scene.detach(key);
        }
    }

    pub fn is_category_visible(&self, category: Category) -> bool {
        self.visible[category as usize]
    }

    /// Handle an edit of the report field
    ///
    /// Rejections (no file, bad JSON) come back as a toast and leave the
    /// alert panel alone. Otherwise the alerts are rebuilt from the failing
    /// entries, their GUIDs are resolved against an item index of the
    /// selected file, and the highlight subset is replaced with the matches.
    /// GUIDs without a match are dropped silently.
    pub fn on_report_input(&mut self, text: &str) -> Result<ReportOutcome> {
        if !self.file_chosen {
            return Ok(ReportOutcome::Rejected(Toast::new(ToastKind::MissingFile, &self.config.toast)));
        }
        let Ok(entries) = parse_report(text) else {
            return Ok(ReportOutcome::Rejected(Toast::new(ToastKind::InvalidJson, &self.config.toast)));
        };
        let Some(bytes) = self.selected_file.as_deref() else {
            tracing::debug!("file read in flight, report deferred");
            self.pending_report = Some(text.to_string());
            return Ok(ReportOutcome::Deferred);
        };

        let index = ItemIndex::build(bytes)?;
        let failures = scan_failures(&entries, &self.config.report);
        self.alerts.clear();
        for failure in &failures {
            self.alerts.push(Alert::from_failure(failure));
        }

        let mut seen = FxHashSet::default();
        let resolved: Vec<u32> = failures
            .iter()
            .filter_map(|failure| failure.candidate())
            .filter_map(|guid| index.find_express_id(guid))
            .filter(|id| seen.insert(*id))
            .collect();
        tracing::debug!(
            failures = failures.len(),
            resolved = resolved.len(),
            "resolved report GUIDs"
        );

        match &self.model {
            Some(model) => {
                self.subsets
                    .create_subset(SubsetKey::Highlight, &resolved, model, self.config.highlight.clone());
                self.scene.attach(SubsetKey::Highlight);
            }
            None => tracing::warn!("no render model, highlight skipped"),
        }

        Ok(ReportOutcome::Highlighted {
            failures: failures.len(),
            resolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#1=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(1.,0.,0.),(0.,1.,0.)));\n\
#2=IFCTRIANGULATEDFACESET(#1,$,$,((1,2,3)),$);\n\
#3=IFCSHAPEREPRESENTATION($,'Body','Tessellation',(#2));\n\
#4=IFCPRODUCTDEFINITIONSHAPE($,$,(#3));\n\
#5=IFCDOOR('0LV8Pp2XDEBhNs3ybL9vy6',$,'Door',$,$,$,#4,$,$,$,$,$,$);\n\
ENDSEC;\nEND-ISO-10303-21;\n";

    #[test]
    fn test_stale_load_is_discarded() {
        let mut session = AuditSession::new(ViewerConfig::default());
        let first = session.begin_load();
        let second = session.begin_load();
        assert_eq!(session.finish_load(first, FILE.as_bytes().to_vec()).unwrap(), None);
        assert!(session.model().is_none());
        assert!(session.has_selected_file());

        let summary = session.finish_load(second, FILE.as_bytes().to_vec()).unwrap().unwrap();
        assert_eq!(summary.meshed, 1);
    }

    #[test]
    fn test_failed_load_still_selects_file() {
        let mut session = AuditSession::new(ViewerConfig::default());
        assert!(session.load_model(b"garbage".to_vec()).is_err());
        assert!(session.has_selected_file());
        assert!(session.model().is_none());

        let outcome = session.on_report_input("[]");
        assert!(outcome.is_err());
    }

    #[test]
    fn test_report_during_read_is_deferred() {
        let mut session = AuditSession::new(ViewerConfig::default());
        let generation = session.begin_load();

        let text = r#"[{"Status": "Fail", "GUID": "0LV8Pp2XDEBhNs3ybL9vy6"}]"#;
        assert_eq!(session.on_report_input(text).unwrap(), ReportOutcome::Deferred);
        assert!(session.alerts().is_empty());

        session.finish_load(generation, FILE.as_bytes().to_vec()).unwrap();
        let pending = session.take_pending_report().unwrap();
        assert_eq!(pending, text);
        assert!(session.take_pending_report().is_none());

        match session.on_report_input(&pending).unwrap() {
            ReportOutcome::Highlighted { resolved, .. } => assert_eq!(resolved, vec![5]),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_during_read_is_rejected_at_once() {
        let mut session = AuditSession::new(ViewerConfig::default());
        session.begin_load();
        let outcome = session.on_report_input("{").unwrap();
        assert!(matches!(outcome, ReportOutcome::Rejected(Toast { kind: ToastKind::InvalidJson, .. })));
        assert!(session.take_pending_report().is_none());
    }

    #[test]
    fn test_hidden_category_stays_hidden_after_reload() {
        let mut session = AuditSession::new(ViewerConfig::default());
        session.set_category_visible(Category::Door, false);
        session.load_model(FILE.as_bytes().to_vec()).unwrap();

        let door = SubsetKey::Category(Category::Door);
        assert!(session.subsets().contains(door));
        assert!(!session.scene().is_attached(door));

        session.set_category_visible(Category::Door, true);
        assert!(session.scene().is_attached(door));
        assert_eq!(session.subsets().get(door).unwrap().mesh.triangle_count(), 1);
    }
}
