//! State behind the dual 3D model viewer: what each pane shows, its camera,
//! and the link/swap/auto-rotate controls.

use crate::data_url::DataUrl;
use crate::gltf::{self, FileSet, GltfError, NamedFile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extensions handled by the generic (non-glTF) viewer.
pub const OTHER_3D_EXTENSIONS: [&str; 8] = ["fbx", "obj", "stl", "ply", "3ds", "dae", "wrl", "off"];

/// Model loading errors.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("No files received")]
    NoFiles,
    #[error("No supported model among: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Gltf(#[from] GltfError),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// `.glb` or `.gltf`.
pub fn is_gltf_family(name: &str) -> bool {
    gltf::is_gltf_name(name) || gltf::is_glb_name(name)
}

pub fn is_other_3d(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower
        .rsplit_once('.')
        .is_some_and(|(_, ext)| OTHER_3D_EXTENSIONS.iter().any(|e| *e == ext))
}

/// A dropped set of files, sorted into what the viewers can load.
#[derive(Debug, Clone)]
pub enum ModelBundle {
    /// Remote or already-embedded model.
    Url(String),
    Glb(NamedFile),
    /// A `.gltf` document plus the files its URIs refer to.
    Gltf { main: NamedFile, files: FileSet },
    /// Formats for the generic viewer (FBX, OBJ, STL...).
    Other3d(Vec<NamedFile>),
}

impl ModelBundle {
    /// Sort dropped files. glTF files only go to the glTF viewer when no
    /// other 3D format is mixed in.
    pub fn classify(files: Vec<NamedFile>) -> ModelResult<Self> {
        if files.is_empty() {
            return Err(ModelError::NoFiles);
        }

        let has_gltf = files.iter().any(|f| is_gltf_family(&f.name));
        let has_other = files.iter().any(|f| is_other_3d(&f.name));

        if has_gltf && !has_other {
            if let Some(glb) = files.iter().find(|f| gltf::is_glb_name(&f.name)) {
                return Ok(ModelBundle::Glb(glb.clone()));
            }
            if let Some(main) = files.iter().find(|f| gltf::is_gltf_name(&f.name)).cloned() {
                return Ok(ModelBundle::Gltf {
                    main,
                    files: FileSet::new(files),
                });
            }
        }

        if has_other {
            return Ok(ModelBundle::Other3d(files));
        }

        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        Err(ModelError::Unsupported(names.join(", ")))
    }

    /// Which viewer renders this bundle.
    pub fn viewer_kind(&self) -> ViewerKind {
        match self {
            ModelBundle::Other3d(_) => ViewerKind::Generic,
            _ => ViewerKind::ModelViewer,
        }
    }

    /// Display name of the main file.
    pub fn source_name(&self) -> String {
        match self {
            ModelBundle::Url(url) => {
                let last = gltf::base_name(url);
                percent_encoding::percent_decode_str(last)
                    .decode_utf8_lossy()
                    .into_owned()
            }
            ModelBundle::Glb(file) => file.name.clone(),
            ModelBundle::Gltf { main, .. } => main.name.clone(),
            ModelBundle::Other3d(files) => files
                .iter()
                .find(|f| is_other_3d(&f.name))
                .or_else(|| files.first())
                .map(|f| f.name.clone())
                .unwrap_or_default(),
        }
    }

    /// Resolve to something a viewer can load directly. glTF bundles are
    /// inlined into one data URL.
    pub fn resolve(&self) -> ModelResult<ModelSource> {
        match self {
            ModelBundle::Url(url) => Ok(ModelSource::Url(url.clone())),
            ModelBundle::Glb(file) => Ok(ModelSource::Url(DataUrl::encode(
                gltf::mime_for(&file.name),
                &file.data,
            ))),
            ModelBundle::Gltf { main, files } => {
                let url = gltf::inline_gltf_to_data_url(main.text()?, files)?;
                Ok(ModelSource::Url(url))
            }
            ModelBundle::Other3d(files) => Ok(ModelSource::Files(files.clone())),
        }
    }
}

/// Loadable model input.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    Url(String),
    Files(Vec<NamedFile>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKind {
    /// Orbit-camera viewer for glTF/GLB.
    ModelViewer,
    /// Generic multi-format viewer with an eye/center/up camera.
    Generic,
}

/// Orbit camera attributes, as strings the orbit viewer understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrbitCamera {
    #[serde(rename = "cameraTarget")]
    pub target: String,
    #[serde(rename = "cameraOrbit")]
    pub orbit: String,
    #[serde(rename = "fieldOfView")]
    pub fov: String,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: "auto".to_string(),
            orbit: "0deg 75deg auto".to_string(),
            fov: "auto".to_string(),
        }
    }
}

/// Eye/center/up camera of the generic viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorCamera {
    #[serde(alias = "position")]
    pub eye: [f64; 3],
    #[serde(alias = "target")]
    pub center: [f64; 3],
    pub up: [f64; 3],
}

impl Default for VectorCamera {
    fn default() -> Self {
        Self {
            eye: [1.0, 1.0, 1.0],
            center: [0.0, 0.0, 0.0],
            up: [0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CameraState {
    Orbit(OrbitCamera),
    Vectors(VectorCamera),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One half of the dual viewer.
#[derive(Debug, Clone)]
pub struct ViewerPane {
    source_name: Option<String>,
    source: Option<ModelSource>,
    kind: Option<ViewerKind>,
    camera: Option<CameraState>,
    auto_rotate: bool,
    error: Option<String>,
}

impl Default for ViewerPane {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerPane {
    pub fn new() -> Self {
        Self {
            source_name: None,
            source: None,
            kind: None,
            camera: None,
            auto_rotate: false,
            error: None,
        }
    }

    /// Load a bundle. On failure the pane keeps its previous model and
    /// records the error message.
    pub fn load(&mut self, bundle: &ModelBundle) -> ModelResult<()> {
        let source = match bundle.resolve() {
            Ok(source) => source,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e);
            }
        };
        let kind = bundle.viewer_kind();
        self.camera = Some(match kind {
            ViewerKind::ModelViewer => CameraState::Orbit(OrbitCamera::default()),
            ViewerKind::Generic => CameraState::Vectors(VectorCamera::default()),
        });
        self.kind = Some(kind);
        self.source_name = Some(bundle.source_name());
        self.source = Some(source);
        self.error = None;
        log::info!("Loaded {:?} into {:?} viewer", self.source_name, kind);
        Ok(())
    }

    pub fn source(&self) -> Option<&ModelSource> {
        self.source.as_ref()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn kind(&self) -> Option<ViewerKind> {
        self.kind
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn camera(&self) -> Option<&CameraState> {
        self.camera.as_ref()
    }

    /// Apply a camera. Orbit panes take non-empty orbit attributes; generic
    /// panes take vector cameras. Anything else is ignored.
    pub fn set_camera(&mut self, state: &CameraState) -> bool {
        match (self.camera.as_mut(), state) {
            (Some(CameraState::Orbit(current)), CameraState::Orbit(next)) => {
                if !next.target.is_empty() {
                    current.target = next.target.clone();
                }
                if !next.orbit.is_empty() {
                    current.orbit = next.orbit.clone();
                }
                if !next.fov.is_empty() {
                    current.fov = next.fov.clone();
                }
                true
            }
            (Some(CameraState::Vectors(current)), CameraState::Vectors(next)) => {
                *current = *next;
                true
            }
            _ => false,
        }
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn set_auto_rotate(&mut self, on: bool) {
        self.auto_rotate = on;
    }

    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.auto_rotate = !self.auto_rotate;
        self.auto_rotate
    }

    /// Status line shown under the viewer.
    pub fn meta_line(&self) -> String {
        let rotate = format!("Auto-rotate: {}", if self.auto_rotate { "on" } else { "off" });
        match &self.source_name {
            Some(name) => format!("Source: {} — {}", name, rotate),
            None => rotate,
        }
    }
}

/// Two panes with optional camera linking.
#[derive(Debug, Clone, Default)]
pub struct DualViewer {
    left: ViewerPane,
    right: ViewerPane,
    linked: bool,
    auto_rotate: bool,
}

impl DualViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pane(&self, side: Side) -> &ViewerPane {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn pane_mut(&mut self, side: Side) -> &mut ViewerPane {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Load a bundle into one pane, then re-sync if linked.
    pub fn load(&mut self, side: Side, bundle: &ModelBundle) -> ModelResult<()> {
        self.pane_mut(side).load(bundle)?;
        let auto_rotate = self.auto_rotate;
        self.pane_mut(side).set_auto_rotate(auto_rotate);
        self.maybe_sync();
        Ok(())
    }

    /// Classify dropped files and load them into one pane.
    pub fn load_files(&mut self, side: Side, files: Vec<NamedFile>) -> ModelResult<()> {
        let bundle = match ModelBundle::classify(files) {
            Ok(bundle) => bundle,
            Err(e) => {
                self.pane_mut(side).error = Some(e.to_string());
                return Err(e);
            }
        };
        self.load(side, &bundle)
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Enable or disable linking. Enabling syncs right to left immediately.
    pub fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
        self.maybe_sync();
    }

    fn maybe_sync(&mut self) {
        if self.linked {
            self.sync_from(Side::Left);
        }
    }

    /// Copy the camera of `side` onto the other pane when linked.
    pub fn sync_from(&mut self, side: Side) -> bool {
        if !self.linked {
            return false;
        }
        let Some(camera) = self.pane(side).camera().cloned() else {
            return false;
        };
        self.pane_mut(side.other()).set_camera(&camera)
    }

    /// Update one pane's camera (user interaction) and propagate if linked.
    pub fn update_camera(&mut self, side: Side, camera: CameraState) {
        self.pane_mut(side).set_camera(&camera);
        self.sync_from(side);
    }

    /// Exchange the two cameras. Needs a camera on both sides.
    pub fn swap_cameras(&mut self) -> bool {
        let (Some(a), Some(b)) = (self.left.camera().cloned(), self.right.camera().cloned()) else {
            return false;
        };
        self.left.set_camera(&b);
        self.right.set_camera(&a);
        log::debug!("Swapped cameras");
        true
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    /// Flip auto-rotate on both panes together.
    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.auto_rotate = !self.auto_rotate;
        self.left.set_auto_rotate(self.auto_rotate);
        self.right.set_auto_rotate(self.auto_rotate);
        self.auto_rotate
    }

    pub fn meta_line(&self, side: Side) -> String {
        self.pane(side).meta_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> NamedFile {
        NamedFile::new(name, b"{}".to_vec())
    }

    #[test]
    fn test_classify() {
        assert!(matches!(ModelBundle::classify(vec![]), Err(ModelError::NoFiles)));
        assert!(matches!(
            ModelBundle::classify(vec![file("a.glb"), file("b.gltf")]),
            Ok(ModelBundle::Glb(f)) if f.name == "a.glb"
        ));
        assert!(matches!(
            ModelBundle::classify(vec![file("scene.bin"), file("Scene.GLTF")]),
            Ok(ModelBundle::Gltf { main, .. }) if main.name == "Scene.GLTF"
        ));
        assert!(matches!(
            ModelBundle::classify(vec![file("a.gltf"), file("b.OBJ")]),
            Ok(ModelBundle::Other3d(files)) if files.len() == 2
        ));
        assert!(matches!(
            ModelBundle::classify(vec![file("notes.txt")]),
            Err(ModelError::Unsupported(_))
        ));
    }

    #[test]
    fn test_gltf_bundle_resolves_to_data_url() {
        let bundle = ModelBundle::classify(vec![
            NamedFile::new("scene.gltf", br#"{"buffers":[{"uri":"scene.bin"}]}"#.to_vec()),
            NamedFile::new("scene.bin", vec![1, 2, 3]),
        ])
        .unwrap();
        let Ok(ModelSource::Url(url)) = bundle.resolve() else {
            panic!("expected a url");
        };
        assert!(url.starts_with("data:model/gltf+json;base64,"));
    }

    #[test]
    fn test_load_sets_default_camera() {
        let mut pane = ViewerPane::new();
        pane.load(&ModelBundle::Glb(file("a.glb"))).unwrap();
        assert_eq!(pane.camera(), Some(&CameraState::Orbit(OrbitCamera::default())));

        pane.load(&ModelBundle::Other3d(vec![file("a.stl")])).unwrap();
        assert_eq!(pane.kind(), Some(ViewerKind::Generic));
        assert!(matches!(pane.camera(), Some(CameraState::Vectors(_))));
    }

    #[test]
    fn test_failed_load_records_error() {
        let mut pane = ViewerPane::new();
        let bundle = ModelBundle::classify(vec![NamedFile::new(
            "scene.gltf",
            br#"{"images":[{"uri":"wood.png"}]}"#.to_vec(),
        )])
        .unwrap();
        assert!(pane.load(&bundle).is_err());
        assert!(pane.error().unwrap().contains("wood.png"));
        assert!(pane.source().is_none());
    }

    #[test]
    fn test_linked_sync() {
        let mut viewer = DualViewer::new();
        viewer.load(Side::Left, &ModelBundle::Glb(file("a.glb"))).unwrap();
        viewer.load(Side::Right, &ModelBundle::Glb(file("b.glb"))).unwrap();

        let moved = CameraState::Orbit(OrbitCamera {
            target: "0m 1m 0m".to_string(),
            orbit: "45deg 60deg 3m".to_string(),
            fov: String::new(),
        });
        viewer.update_camera(Side::Left, moved.clone());
        assert_ne!(viewer.pane(Side::Right).camera(), viewer.pane(Side::Left).camera());

        viewer.set_linked(true);
        let Some(CameraState::Orbit(right)) = viewer.pane(Side::Right).camera() else {
            panic!("expected orbit camera");
        };
        assert_eq!(right.orbit, "45deg 60deg 3m");
        // Empty attributes are not copied.
        assert_eq!(right.fov, "auto");
    }

    #[test]
    fn test_sync_ignores_mismatched_cameras() {
        let mut viewer = DualViewer::new();
        viewer.set_linked(true);
        viewer.load(Side::Left, &ModelBundle::Glb(file("a.glb"))).unwrap();
        viewer.load(Side::Right, &ModelBundle::Other3d(vec![file("b.obj")])).unwrap();
        assert!(!viewer.sync_from(Side::Left));
    }

    #[test]
    fn test_swap_cameras() {
        let mut viewer = DualViewer::new();
        assert!(!viewer.swap_cameras());

        viewer.load(Side::Left, &ModelBundle::Other3d(vec![file("a.obj")])).unwrap();
        viewer.load(Side::Right, &ModelBundle::Other3d(vec![file("b.obj")])).unwrap();
        let cam = VectorCamera {
            eye: [0.0, 5.0, 0.0],
            ..VectorCamera::default()
        };
        viewer.update_camera(Side::Left, CameraState::Vectors(cam));

        assert!(viewer.swap_cameras());
        assert_eq!(viewer.pane(Side::Right).camera(), Some(&CameraState::Vectors(cam)));
        assert_eq!(
            viewer.pane(Side::Left).camera(),
            Some(&CameraState::Vectors(VectorCamera::default()))
        );
    }

    #[test]
    fn test_auto_rotate_and_meta_line() {
        let mut viewer = DualViewer::new();
        assert_eq!(viewer.meta_line(Side::Left), "Auto-rotate: off");

        viewer.load(Side::Left, &ModelBundle::Url("https://example.com/models/My%20Bot.glb".into()))
            .unwrap();
        assert!(viewer.toggle_auto_rotate());
        assert_eq!(viewer.meta_line(Side::Left), "Source: My Bot.glb — Auto-rotate: on");
        assert!(viewer.pane(Side::Right).auto_rotate());
    }

    #[test]
    fn test_camera_json_shapes() {
        let orbit: CameraState = serde_json::from_str(
            r#"{"cameraTarget":"auto","cameraOrbit":"0deg 75deg auto","fieldOfView":"auto"}"#,
        )
        .unwrap();
        assert_eq!(orbit, CameraState::Orbit(OrbitCamera::default()));

        let vectors: CameraState =
            serde_json::from_str(r#"{"position":[1,2,3],"target":[0,0,0],"up":[0,1,0]}"#).unwrap();
        assert!(matches!(vectors, CameraState::Vectors(v) if v.eye == [1.0, 2.0, 3.0]));
    }
}
