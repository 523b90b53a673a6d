use cgmath::{perspective, Deg, Matrix4, SquareMatrix};
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

/// Maps OpenGL clip space (z in -1..1) onto wgpu's (z in 0..1)
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Smallest distance kept between the near and far planes
pub const MIN_DEPTH_RANGE: f32 = 0.01;
const MIN_NEAR: f32 = 0.001;

/// Perspective camera looking down its owner's -Z
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    owner: ObjectId,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub const NAME: &'static str = "Camera";

    pub fn new(owner: ObjectId) -> Self {
        Self {
            owner,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Rejects values the projection cannot be built from
    ///
    /// # Returns
    /// The offending field and why, or `Ok` when `0 < fov < 180`,
    /// `near > 0` and `far > near`.
    pub fn validate(fov: f32, near: f32, far: f32) -> Result<(), (&'static str, String)> {
        if !(fov > 0.0 && fov < 180.0) {
            return Err(("fov", format!("{} is not between 0 and 180 degrees", fov)));
        }
        if !(near > 0.0 && near.is_finite()) {
            return Err(("near", format!("{} is not a positive distance", near)));
        }
        if !(far > near && far.is_finite()) {
            return Err(("far", format!("{} is not beyond near ({})", far, near)));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        Self::validate(self.fov, self.near, self.far).is_ok()
    }

    /// Perspective projection; an unusable camera gets the default lens
    pub fn projection(&self, aspect: f32) -> Matrix4<f32> {
        let aspect = if aspect.is_finite() {
            aspect.max(f32::EPSILON)
        } else {
            1.0
        };
        let fallback;
        let lens = match Self::validate(self.fov, self.near, self.far) {
            Ok(()) => self,
            Err((field, reason)) => {
                log::warn!("camera {} has an invalid {}: {}", self.owner, field, reason);
                fallback = Self::new(self.owner);
                &fallback
            }
        };
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(lens.fov), aspect, lens.near, lens.far)
    }

    /// Pulls edited values back into the range `validate` accepts
    fn clamp(&mut self) {
        self.fov = self.fov.clamp(1.0, 179.0);
        self.near = self.near.max(MIN_NEAR);
        self.far = self.far.max(self.near + MIN_DEPTH_RANGE);
    }

    /// View matrix for a camera placed at `world`
    pub fn view(world: &Matrix4<f32>) -> Matrix4<f32> {
        world.invert().unwrap_or_else(Matrix4::identity)
    }
}

impl Component for Camera {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }

    fn render_inspector(&mut self, ui: &imgui::Ui, _ctx: &mut InspectorContext<'_>) {
        ui.slider("FOV", 10.0, 120.0, &mut self.fov);
        imgui::Drag::new("Near")
            .speed(0.01)
            .range(MIN_NEAR, (self.far - MIN_DEPTH_RANGE).max(MIN_NEAR))
            .flags(imgui::SliderFlags::ALWAYS_CLAMP)
            .build(ui, &mut self.near);
        imgui::Drag::new("Far")
            .speed(0.5)
            .range(self.near + MIN_DEPTH_RANGE, 10_000.0)
            .flags(imgui::SliderFlags::ALWAYS_CLAMP)
            .build(ui, &mut self.far);
        self.clamp();
    }

    fn serialise(&self) -> Mapping {
        RecordWriter::new(Self::NAME)
            .f32("fov", self.fov)
            .f32("near", self.near)
            .f32("far", self.far)
            .finish()
    }

    fn deserialise(&mut self, record: &Mapping, _resources: &Resources) -> Result<(), LoadError> {
        let record = Record::new(Self::NAME, record);
        let fov = record.f32("fov")?;
        let near = record.f32("near")?;
        let far = record.f32("far")?;
        Self::validate(fov, near, far).map_err(|(field, reason)| LoadError::InvalidField {
            component: Self::NAME.to_string(),
            field,
            reason,
        })?;

        self.fov = fov;
        self.near = near;
        self.far = far;
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
