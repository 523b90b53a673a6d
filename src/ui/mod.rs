//! # User Interface
//!
//! Dear ImGui glue and the editor's panels.
//!
//! - [`UiManager`] - imgui context, winit platform and wgpu renderer
//! - [`panel`] - Hierarchy and inspector, drawn every frame
//! - [`windows`] - Resource browser and scene settings
//! - [`drag_drop`] - Pool index payloads shared by the browser and inspectors
//!
//! Extra windows implement [`EditorWindow`] and are registered with
//! [`Scene::add_window`].

pub mod drag_drop;
pub mod manager;
pub mod panel;
pub mod windows;

pub use manager::UiManager;
pub use windows::{ResourceBrowser, SettingsWindow};

use crate::scene::Scene;

/// A window drawn by [`Scene::render_ui`] every frame
pub trait EditorWindow {
    fn title(&self) -> &str;

    /// Builds the window; the scene may be edited freely
    fn render(&mut self, ui: &imgui::Ui, scene: &mut Scene);
}
