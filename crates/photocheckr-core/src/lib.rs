//! PhotoCheckr Core Library
//!
//! Platform-agnostic data structures and logic for the PhotoCheckr
//! before/after comparison tool: annotation surfaces, view state, tabs,
//! saved projects, export layout, glTF packing and the dual model viewer.

pub mod data_url;
pub mod export;
pub mod gltf;
pub mod model_view;
pub mod project;
pub mod shapes;
pub mod storage;
pub mod surface;
pub mod tabs;
pub mod view;
pub mod workspace;

pub use data_url::{DataUrl, DataUrlError, ImageFormat};
pub use export::{PageGeometry, PageSource, collect_pages, export_file_name};
pub use gltf::{FileSet, GltfError, NamedFile};
pub use model_view::{CameraState, DualViewer, ModelBundle, ModelError, Side};
pub use project::{Project, ProjectError};
pub use shapes::{SerializableColor, Shape, ShapeId, ShapeStyle};
pub use storage::{PROJECT_KEY, Storage, StorageError};
pub use surface::{AnnotationSurface, DrawMode, MAX_UNDO_HISTORY};
pub use tabs::{Tab, TabError, TabManager};
pub use view::{SingleSource, SurfaceKind, ViewMode, ViewState};
pub use workspace::{ImageSlot, Workspace};
