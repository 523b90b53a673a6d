use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    #[default]
    Point = 0,
    Directional = 1,
}

impl TryFrom<i64> for LightType {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Point),
            1 => Ok(Self::Directional),
            other => Err(other),
        }
    }
}

/// Point or directional light placed by its owner's Transform
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    owner: ObjectId,
    pub light_type: LightType,
    pub color: Vector3<f32>,
    pub linear_attenuation: f32,
    pub quad_attenuation: f32,
}

impl Light {
    pub const NAME: &'static str = "Light";

    pub fn new(owner: ObjectId) -> Self {
        Self {
            owner,
            light_type: LightType::Point,
            color: Vector3::new(1.0, 1.0, 1.0),
            linear_attenuation: 0.0,
            quad_attenuation: 0.0,
        }
    }

    pub fn directional(owner: ObjectId) -> Self {
        Self {
            light_type: LightType::Directional,
            ..Self::new(owner)
        }
    }

    pub fn is_directional(&self) -> bool {
        self.light_type == LightType::Directional
    }
}

/// World translation of `world`
pub fn position(world: &Matrix4<f32>) -> Vector3<f32> {
    world.w.truncate()
}

/// World rotation of `world` applied to -Y
pub fn direction(world: &Matrix4<f32>) -> Vector3<f32> {
    let d = (world * Vector4::new(0.0, -1.0, 0.0, 0.0)).truncate();
    if d.magnitude2() > f32::EPSILON {
        d.normalize()
    } else {
        Vector3::new(0.0, -1.0, 0.0)
    }
}

impl Component for Light {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }

    fn render_inspector(&mut self, ui: &imgui::Ui, _ctx: &mut InspectorContext<'_>) {
        let mut kind = self.light_type as usize;
        if ui.combo_simple_string("Type", &mut kind, &["Point", "Directional"]) {
            self.light_type = if kind == 1 {
                LightType::Directional
            } else {
                LightType::Point
            };
        }

        let mut color: [f32; 3] = self.color.into();
        if ui.color_edit3("Color", &mut color) {
            self.color = color.into();
        }

        if self.light_type == LightType::Point {
            imgui::Drag::new("Linear Attenuation")
                .speed(0.001)
                .range(0.0, 10.0)
                .build(ui, &mut self.linear_attenuation);
            imgui::Drag::new("Quadratic Attenuation")
                .speed(0.001)
                .range(0.0, 10.0)
                .build(ui, &mut self.quad_attenuation);
        }
    }

    fn serialise(&self) -> Mapping {
        RecordWriter::new(Self::NAME)
            .i64("type", self.light_type as i64)
            .f32("linearAttenuation", self.linear_attenuation)
            .f32("quadAttenuation", self.quad_attenuation)
            .vec3("color", self.color)
            .finish()
    }

    fn deserialise(&mut self, record: &Mapping, _resources: &Resources) -> Result<(), LoadError> {
        let record = Record::new(Self::NAME, record);
        let light_type =
            LightType::try_from(record.i64("type")?).map_err(|value| LoadError::InvalidField {
                component: Self::NAME.to_string(),
                field: "type",
                reason: format!("{} is not a light type (0 point, 1 directional)", value),
            })?;

        let linear_attenuation = record.f32("linearAttenuation")?;
        let quad_attenuation = record.f32("quadAttenuation")?;
        let color = record.vec3("color")?;

        self.light_type = light_type;
        self.linear_attenuation = linear_attenuation;
        self.quad_attenuation = quad_attenuation;
        self.color = color;
        Ok(())
    }

    fn clone_box(&self, owner: ObjectId) -> Box<dyn Component> {
        Box::new(Self {
            owner,
            ..self.clone()
        })
    }

    fn as_light(&self) -> Option<&Light> {
        Some(self)
    }

    component_any!();
}
