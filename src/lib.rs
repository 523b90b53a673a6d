//! neeps scene editor
//!
//! A small real-time 3D scene editor: an entity-component scene graph, a wgpu
//! forward renderer with shadow mapping, YAML scene files and an imgui
//! inspector.
//!
//! ```no_run
//! use neeps::{config::EditorConfig, NeepsApp};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = EditorConfig::default().with_assets("./res");
//!     NeepsApp::new(config)?.run()
//! }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod scene;
pub mod ui;
pub mod wgpu_utils;

pub use app::NeepsApp;
pub use config::EditorConfig;
pub use scene::Scene;
