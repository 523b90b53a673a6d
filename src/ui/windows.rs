//! Editor windows registered with [`Scene::add_window`]

use std::path::PathBuf;

use imgui::{Condition, StyleColor, TreeNodeFlags};

use super::{drag_drop, EditorWindow};
use crate::{
    gfx::resources::{MESH_PAYLOAD, SHADER_PAYLOAD, TEXTURE_PAYLOAD},
    scene::{Scene, DEFAULT_SCENE_FILE},
};

const INVALID_COLOR: [f32; 4] = [1.0, 0.35, 0.35, 1.0];

/// Lists the resource pools as drag sources
///
/// Invalid entries are shown in red with their error as a tooltip. Selecting
/// a shader opens its source for editing.
#[derive(Default)]
pub struct ResourceBrowser {
    editing: Option<ShaderEdit>,
}

struct ShaderEdit {
    index: usize,
    source: String,
}

impl ResourceBrowser {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One selectable row; returns true when clicked
fn entry(ui: &imgui::Ui, label: &str, error: Option<&str>, tag: &str, index: usize) -> bool {
    let style = error.map(|_| ui.push_style_color(StyleColor::Text, INVALID_COLOR));
    let clicked = ui.selectable(label);
    drop(style);

    drag_drop::source(ui, tag, index, label);
    if let Some(error) = error {
        if ui.is_item_hovered() {
            ui.tooltip_text(error);
        }
    }
    clicked
}

impl EditorWindow for ResourceBrowser {
    fn title(&self) -> &str {
        "Resources"
    }

    fn render(&mut self, ui: &imgui::Ui, scene: &mut Scene) {
        let resources = &scene.resources;
        ui.window("Resources")
            .size([320.0, 400.0], Condition::FirstUseEver)
            .position([10.0, 420.0], Condition::FirstUseEver)
            .build(|| {
                if ui.collapsing_header("Shaders", TreeNodeFlags::DEFAULT_OPEN) {
                    for (index, shader) in resources.shaders.iter().enumerate() {
                        let _id = ui.push_id_usize(index);
                        let error = shader.error();
                        if entry(ui, shader.name(), error.as_deref(), SHADER_PAYLOAD, index) {
                            self.editing = Some(ShaderEdit {
                                index,
                                source: shader.source(),
                            });
                        }
                    }
                }

                if ui.collapsing_header("Textures", TreeNodeFlags::DEFAULT_OPEN) {
                    for (index, texture) in resources.textures.iter().enumerate() {
                        let _id = ui.push_id_usize(index);
                        let error = texture.error();
                        entry(ui, texture.name(), error.as_deref(), TEXTURE_PAYLOAD, index);
                    }
                }

                if ui.collapsing_header("Meshes", TreeNodeFlags::DEFAULT_OPEN) {
                    for (index, mesh) in resources.meshes.iter().enumerate() {
                        let _id = ui.push_id_usize(index);
                        entry(ui, mesh.name(), mesh.error(), MESH_PAYLOAD, index);
                    }
                }
            });

        let mut close = false;
        if let Some(edit) = &mut self.editing {
            let Some(shader) = resources.shaders.get(edit.index) else {
                self.editing = None;
                return;
            };
            ui.window(format!("Shader: {}", shader.name()))
                .size([520.0, 480.0], Condition::FirstUseEver)
                .build(|| {
                    if let Some(error) = shader.error() {
                        ui.text_colored(INVALID_COLOR, error);
                    }
                    ui.input_text_multiline("##source", &mut edit.source, [-1.0, -30.0])
                        .build();
                    if ui.button("Apply") {
                        shader.set_source(&edit.source);
                        log::info!("applied new source to shader '{}'", shader.name());
                    }
                    ui.same_line();
                    if ui.button("Reload") {
                        match shader.reload() {
                            Ok(()) => edit.source = shader.source(),
                            Err(e) => log::error!("{}", e),
                        }
                    }
                    ui.same_line();
                    close = ui.button("Close");
                });
        }
        if close {
            self.editing = None;
        }
    }
}

/// Background, ambient light, vsync and scene file controls
pub struct SettingsWindow {
    path: String,
}

impl SettingsWindow {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into().to_string_lossy().into_owned(),
        }
    }
}

impl Default for SettingsWindow {
    fn default() -> Self {
        Self::new(DEFAULT_SCENE_FILE)
    }
}

impl EditorWindow for SettingsWindow {
    fn title(&self) -> &str {
        "Scene Settings"
    }

    fn render(&mut self, ui: &imgui::Ui, scene: &mut Scene) {
        let mut save = false;
        let mut load = false;
        ui.window("Scene Settings")
            .size([320.0, 220.0], Condition::FirstUseEver)
            .position([340.0, 10.0], Condition::FirstUseEver)
            .build(|| {
                let settings = &mut scene.settings;
                ui.color_edit3("Background", &mut settings.background_color);
                ui.color_edit3("Ambient", &mut settings.ambient_color);
                imgui::Drag::new("Ambient Intensity")
                    .speed(0.005)
                    .range(0.0, 1.0)
                    .build(ui, &mut settings.ambient_intensity);
                ui.checkbox("VSync", &mut settings.vsync);

                ui.separator();
                ui.input_text("File", &mut self.path).build();
                save = ui.button("Save");
                ui.same_line();
                load = ui.button("Load");
                ui.text(format!("{:.1} FPS", ui.io().framerate));
            });

        if save {
            if let Err(e) = scene.save(&self.path) {
                log::error!("{}", e);
            }
        }
        if load {
            if let Err(e) = scene.load(&self.path) {
                log::error!("{}", e);
            }
        }
    }
}
