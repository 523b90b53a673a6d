use std::{rc::Rc, sync::Arc};

use serde_yaml::Mapping;

use crate::{
    error::LoadError,
    gfx::{
        geometry::Geometry,
        resources::{Mesh, Resources, MESH_PAYLOAD},
    },
    scene::{
        component::{component_any, Component, InspectorContext},
        object::ObjectId,
        record::{Record, RecordWriter},
    },
    ui::drag_drop,
};

use super::{read_material, Material, Renderer};

/// Draws a mesh from the scene's pool
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    owner: ObjectId,
    pub material: Material,
    pub mesh: Option<Rc<Mesh>>,
}

impl MeshRenderer {
    pub const NAME: &'static str = "MeshRenderer";

    pub fn new(owner: ObjectId) -> Self {
        Self {
            owner,
            material: Material::default(),
            mesh: None,
        }
    }

    pub fn with_mesh(mut self, mesh: Rc<Mesh>) -> Self {
        self.mesh = Some(mesh);
        self
    }
}

impl PartialEq for MeshRenderer {
    fn eq(&self, other: &Self) -> bool {
        let same_mesh = match (&self.mesh, &other.mesh) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_mesh && self.material == other.material
    }
}

impl Renderer for MeshRenderer {
    fn material(&self) -> &Material {
        &self.material
    }

    fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Nothing to draw until a valid mesh is assigned
    fn geometry(&self) -> Option<Arc<Geometry>> {
        self.mesh.as_ref()?.geometry().cloned()
    }
}

impl Component for MeshRenderer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }

    fn render_inspector(&mut self, ui: &imgui::Ui, ctx: &mut InspectorContext<'_>) {
        ui.text("Mesh:");
        ui.same_line();
        let caption = match &self.mesh {
            Some(mesh) if mesh.is_valid() => mesh.name().to_string(),
            Some(mesh) => format!("{} (invalid)", mesh.name()),
            None => "Drop Mesh Here".to_string(),
        };
        ui.button(&caption);
        if let Some(index) = drag_drop::accept_index(ui, MESH_PAYLOAD) {
            self.mesh = ctx.resources.meshes.get(index).cloned();
        }
        ui.separator();
        self.material.render_inspector(ui, ctx);
    }

    fn serialise(&self) -> Mapping {
        let record = RecordWriter::new(Self::NAME)
            .opt_str("mesh", self.mesh.as_deref().map(Mesh::name));
        self.material.write(record).finish()
    }

    fn deserialise(&mut self, record: &Mapping, resources: &Resources) -> Result<(), LoadError> {
        let material = read_material(Self::NAME, record, resources)?;
        let mesh = match Record::new(Self::NAME, record).opt_str("mesh")? {
            Some(name) => {
                let found = resources.mesh(name).cloned();
                if found.is_none() {
                    log::warn!("mesh '{}' is not loaded; leaving the slot empty", name);
                }
                found
            }
            None => None,
        };

        self.material = material;
        self.mesh = mesh;
        Ok(())
    }

    fn clone_box(&self, owner: ObjectId) -> Box<dyn Component> {
        Box::new(Self {
            owner,
            ..self.clone()
        })
    }

    fn as_renderer(&self) -> Option<&dyn Renderer> {
        Some(self)
    }

    fn as_renderer_mut(&mut self) -> Option<&mut dyn Renderer> {
        Some(self)
    }

    component_any!();
}
