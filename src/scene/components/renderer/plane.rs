use std::sync::Arc;

use serde_yaml::Mapping;

use crate::{
    error::LoadError,
    gfx::{
        geometry::{self, Geometry},
        resources::Resources,
    },
    scene::{
        component::{component_any, Component, InspectorContext},
        object::ObjectId,
        record::RecordWriter,
    },
};

use super::{read_material, Material, Renderer};

/// Draws the shared unit plane
#[derive(Debug, Clone)]
pub struct PlaneRenderer {
    owner: ObjectId,
    pub material: Material,
    geometry: Arc<Geometry>,
}

impl PlaneRenderer {
    pub const NAME: &'static str = "PlaneRenderer";

    pub fn new(owner: ObjectId) -> Self {
        Self {
            owner,
            material: Material::default(),
            geometry: geometry::plane(),
        }
    }
}

impl Renderer for PlaneRenderer {
    fn material(&self) -> &Material {
        &self.material
    }

    fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    fn geometry(&self) -> Option<Arc<Geometry>> {
        Some(self.geometry.clone())
    }
}

impl Component for PlaneRenderer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }

    fn render_inspector(&mut self, ui: &imgui::Ui, ctx: &mut InspectorContext<'_>) {
        self.material.render_inspector(ui, ctx);
    }

    fn serialise(&self) -> Mapping {
        self.material.write(RecordWriter::new(Self::NAME)).finish()
    }

    fn deserialise(&mut self, record: &Mapping, resources: &Resources) -> Result<(), LoadError> {
        self.material = read_material(Self::NAME, record, resources)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::CommandList;

    #[test]
    fn test_planes_share_geometry_distinct_from_cube() {
        let a = PlaneRenderer::new(ObjectId::from_raw(1)).geometry().unwrap();
        let b = PlaneRenderer::new(ObjectId::from_raw(2)).geometry().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_ne!(a.id(), geometry::cube().id());
    }

    #[test]
    fn test_render_binds_model_then_draws() {
        let plane = PlaneRenderer::new(ObjectId::from_raw(1));
        let world = cgmath::Matrix4::from_scale(3.0);
        let mut list = CommandList::new();
        plane.render(&mut list, &world);

        let records = list.draw_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].geometry_label, "Plane");
        assert_eq!(
            records[0].uniform("model"),
            Some(crate::gfx::UniformValue::Mat4(world))
        );
        assert!(records[0].uniform("normalMat").is_some());
    }
}
