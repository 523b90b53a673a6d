use cgmath::{Deg, Euler, Matrix4, One, Quaternion, Vector3};
use serde_yaml::Mapping;

use crate::{
    error::LoadError,
    gfx::resources::Resources,
    scene::{
        component::{component_any, Component, InspectorContext},
        object::ObjectId,
        record::{Record, RecordWriter},
    },
};

/// Local position, rotation and scale of an object
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    owner: ObjectId,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub const NAME: &'static str = "Transform";

    pub fn new(owner: ObjectId) -> Self {
        Self {
            owner,
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// `T * R * S`
    pub fn local_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Rotation as XYZ Euler angles in degrees, the form the inspector edits
    pub fn euler_degrees(&self) -> [f32; 3] {
        let euler = Euler::from(self.rotation);
        [
            Deg::from(euler.x).0,
            Deg::from(euler.y).0,
            Deg::from(euler.z).0,
        ]
    }

    pub fn set_euler_degrees(&mut self, [x, y, z]: [f32; 3]) {
        self.rotation = Quaternion::from(Euler::new(Deg(x), Deg(y), Deg(z)));
    }
}

impl Component for Transform {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }

    fn render_inspector(&mut self, ui: &imgui::Ui, _ctx: &mut InspectorContext<'_>) {
        let mut position: [f32; 3] = self.position.into();
        if imgui::Drag::new("Position")
            .speed(0.05)
            .build_array(ui, &mut position)
        {
            self.position = position.into();
        }

        let mut rotation = self.euler_degrees();
        if imgui::Drag::new("Rotation")
            .speed(0.5)
            .build_array(ui, &mut rotation)
        {
            self.set_euler_degrees(rotation);
        }

        let mut scale: [f32; 3] = self.scale.into();
        if imgui::Drag::new("Scale")
            .speed(0.02)
            .build_array(ui, &mut scale)
        {
            self.scale = scale.into();
        }
    }

    fn serialise(&self) -> Mapping {
        RecordWriter::new(Self::NAME)
            .vec3("position", self.position)
            .quat("rotation", self.rotation)
            .vec3("scale", self.scale)
            .finish()
    }

    fn deserialise(&mut self, record: &Mapping, _resources: &Resources) -> Result<(), LoadError> {
        let record = Record::new(Self::NAME, record);
        let position = record.vec3("position")?;
        let rotation = record.quat("rotation")?;
        let scale = record.vec3("scale")?;

        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
        Ok(())
    }

    fn clone_box(&self, owner: ObjectId) -> Box<dyn Component> {
        Box::new(Self {
            owner,
            ..self.clone()
        })
    }

    component_any!();
}
