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

/// Draws the shared unit cube
#[derive(Debug, Clone)]
pub struct CubeRenderer {
    owner: ObjectId,
    pub material: Material,
    geometry: Arc<Geometry>,
}

impl CubeRenderer {
    pub const NAME: &'static str = "CubeRenderer";

    pub fn new(owner: ObjectId) -> Self {
        Self {
            owner,
            material: Material::default(),
            geometry: geometry::cube(),
        }
    }
}

impl Renderer for CubeRenderer {
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

impl Component for CubeRenderer {
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

    #[test]
    fn test_every_cube_shares_one_geometry() {
        let cubes: Vec<_> = (0..64)
            .map(|i| CubeRenderer::new(ObjectId::from_raw(i)))
            .collect();
        let first = cubes[0].geometry().unwrap();

        for cube in &cubes {
            let geometry = cube.geometry().unwrap();
            assert!(Arc::ptr_eq(&geometry, &first));
            assert_eq!(geometry.id(), first.id());
        }
        assert_eq!(first.index_count(), 36);
    }
}
