//! Saved project format.

use crate::tabs::{
    Tab, TabManager, default_photo_scale, default_slider, slider_value, surface_json,
};
use crate::view::{SingleSource, SurfaceKind, ViewMode, ViewState};
use crate::workspace::Workspace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project errors.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Everything needed to restore a session. Projects saved before tabs
/// existed carry a single comparison in the top-level fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub single_source: SingleSource,
    #[serde(default = "default_slider", deserialize_with = "slider_value")]
    pub slider: u8,
    #[serde(default)]
    pub description: String,
    /// Main surface of the active tab.
    #[serde(default, deserialize_with = "surface_json")]
    pub canvas: Option<String>,
    /// Side-by-side surface of the active tab.
    #[serde(default, deserialize_with = "surface_json")]
    pub canvas_side: Option<String>,
    #[serde(default = "default_photo_scale")]
    pub photo_scale: u32,
    #[serde(default)]
    pub tabs: Vec<Tab>,
    #[serde(default)]
    pub active_tab_id: Option<String>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            title: String::new(),
            view_mode: ViewMode::default(),
            single_source: SingleSource::default(),
            slider: default_slider(),
            description: String::new(),
            canvas: None,
            canvas_side: None,
            photo_scale: default_photo_scale(),
            tabs: Vec::new(),
            active_tab_id: None,
        }
    }
}

impl Project {
    /// Capture the session. The active tab is serialized first so the tab
    /// list is up to date.
    pub fn from_workspace(workspace: &mut Workspace) -> Self {
        workspace.serialize_active_tab();
        let view = workspace.view();
        Self {
            title: workspace.title.trim().to_string(),
            view_mode: view.mode(),
            single_source: view.single_source(),
            slider: view.slider(),
            description: workspace.description().to_string(),
            canvas: workspace.surface(SurfaceKind::Main).to_json().ok(),
            canvas_side: workspace.surface(SurfaceKind::Side).to_json().ok(),
            photo_scale: view.photo_scale(),
            tabs: workspace.tabs().tabs().to_vec(),
            active_tab_id: workspace.tabs().active_id().map(str::to_string),
        }
    }

    /// Whether this project predates tabs.
    pub fn is_legacy(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Rebuild a session and apply its active tab.
    pub fn into_workspace(self) -> Workspace {
        let mut view = ViewState::new();
        view.set_single_source(self.single_source);

        let tabs = if self.tabs.is_empty() {
            log::info!("Upgrading single-comparison project to tabs");
            let mut tab = Tab::new("Comparison 1", self.view_mode, self.photo_scale);
            tab.desc = self.description;
            tab.slider = self.slider;
            tab.canvas_json = self.canvas;
            tab.canvas_side_json = self.canvas_side;
            let mut tabs = TabManager::new();
            tabs.add(tab);
            tabs
        } else {
            TabManager::from_tabs(self.tabs, self.active_tab_id)
        };

        let mut workspace = Workspace::from_parts(self.title, view, tabs);
        if let Some(id) = workspace.tabs().active_id().map(str::to_string) {
            if let Err(e) = workspace.apply_tab(&id) {
                log::error!("Failed to apply restored tab: {}", e);
            }
        }
        workspace
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        serde_json::to_string(self).map_err(|e| ProjectError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        serde_json::from_str(json).map_err(|e| ProjectError::Serialization(e.to_string()))
    }

    /// File name for the exported PDF.
    pub fn export_file_name(&self) -> String {
        crate::export::export_file_name(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::ImageSlot;

    #[test]
    fn test_round_trip_through_workspace() {
        let mut ws = Workspace::new();
        ws.title = "  Bathroom  ".to_string();
        ws.set_description("Before the renovation");
        ws.load_image(ImageSlot::Before, b"\x89PNG....", None);
        ws.active_surface_mut().add_rect();
        ws.add_tab();
        ws.set_view_mode(ViewMode::SideBySide);
        ws.active_surface_mut().add_circle();

        let project = Project::from_workspace(&mut ws);
        assert_eq!(project.title, "Bathroom");
        assert_eq!(project.tabs.len(), 2);

        let json = project.to_json().unwrap();
        let restored = Project::from_json(&json).unwrap().into_workspace();
        assert_eq!(restored.tabs().len(), 2);
        assert_eq!(restored.view().mode(), ViewMode::SideBySide);
        assert_eq!(restored.surface(SurfaceKind::Side).len(), 1);

        let first = restored.tabs().tabs()[0].clone();
        assert_eq!(first.desc, "Before the renovation");
        assert!(first.before.is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let project = Project::from_json("{}").unwrap();
        assert_eq!(project.slider, 50);
        assert_eq!(project.view_mode, ViewMode::Slider);
        assert_eq!(project.single_source, SingleSource::Before);
        assert_eq!(project.photo_scale, 100);
        assert!(project.is_legacy());
    }

    #[test]
    fn test_legacy_project_becomes_one_tab() {
        let json = r#"{
            "title": "Old",
            "viewMode": "single",
            "singleSource": "after",
            "slider": "70",
            "description": "legacy note",
            "photoScale": 125
        }"#;
        let ws = Project::from_json(json).unwrap().into_workspace();
        assert_eq!(ws.tabs().len(), 1);
        let tab = ws.active_tab().unwrap();
        assert_eq!(tab.name, "Comparison 1");
        assert_eq!(tab.slider, 70);
        assert_eq!(ws.title, "Old");
        assert_eq!(ws.description(), "legacy note");
        assert_eq!(ws.view().mode(), ViewMode::Single);
        assert_eq!(ws.view().single_source(), SingleSource::After);
        assert_eq!(ws.view().photo_scale(), 125);
    }

    #[test]
    fn test_browser_save_loads() {
        let json = r#"{
            "title": "Hall",
            "viewMode": "slider",
            "singleSource": "before",
            "slider": "40",
            "description": "",
            "canvas": {"version": "5.3.0", "objects": [{"type": "path"}]},
            "canvasSide": null,
            "photoScale": 100,
            "tabs": [{
                "id": "t1", "name": "Page 1", "before": null, "after": null,
                "desc": "crack", "slider": "40", "viewMode": "slider", "photoScale": 100,
                "canvasJSON": {"version": "5.3.0", "objects": []}, "canvasSideJSON": null
            }],
            "activeTabId": "t1"
        }"#;
        let project = Project::from_json(json).unwrap();
        assert!(project.canvas.as_deref().unwrap().contains("5.3.0"));
        assert!(project.canvas_side.is_none());
        assert!(project.tabs[0].canvas_json.is_some());

        // Browser canvases are not in the surface format; the tab still loads
        // with empty annotations.
        let ws = project.into_workspace();
        assert_eq!(ws.active_tab().unwrap().name, "Page 1");
        assert_eq!(ws.description(), "crack");
        assert_eq!(ws.view().slider(), 40);
        assert!(ws.surface(SurfaceKind::Main).is_empty());
    }

    #[test]
    fn test_stale_active_id_falls_back_to_first() {
        let mut ws = Workspace::new();
        ws.add_tab();
        let mut project = Project::from_workspace(&mut ws);
        project.active_tab_id = Some("t-deleted".to_string());
        let first = project.tabs[0].id.clone();
        let restored = project.into_workspace();
        assert_eq!(restored.tabs().active_id(), Some(first.as_str()));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Project::from_json("[1,2"),
            Err(ProjectError::Serialization(_))
        ));
    }

    #[test]
    fn test_export_file_name() {
        let mut project = Project::default();
        assert_eq!(project.export_file_name(), "PhotoCheckr_Export.pdf");
        project.title = " Kitchen ".to_string();
        assert_eq!(project.export_file_name(), "Kitchen.pdf");
    }
}
