//! Script components
//!
//! Scripts animate their owner through its other components. Each has a
//! `start` step that runs on the first update, and an object may carry any
//! number of them.

use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector3};
use serde_yaml::Mapping;

use crate::{
    error::LoadError,
    gfx::resources::Resources,
    scene::{
        component::{component_any, Component, InspectorContext, Siblings, UpdateContext},
        object::ObjectId,
        record::{Record, RecordWriter},
    },
};

use super::transform::Transform;

/// Rotates the owner's Transform about a fixed axis
#[derive(Debug, Clone, PartialEq)]
pub struct Spin {
    owner: ObjectId,
    pub axis: Vector3<f32>,
    /// Degrees per second
    pub speed: f32,
}

impl Spin {
    pub const NAME: &'static str = "Spin";

    pub fn new(owner: ObjectId) -> Self {
        Self {
            owner,
            axis: Vector3::new(0.0, 1.0, 0.0),
            speed: 45.0,
        }
    }
}

impl Component for Spin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }

    fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &UpdateContext) {
        if self.axis.magnitude2() <= f32::EPSILON {
            return;
        }
        let Some(transform) = siblings.get_mut::<Transform>() else {
            return;
        };
        let step = Quaternion::from_axis_angle(self.axis.normalize(), Deg(self.speed * ctx.delta_time));
        transform.rotation = (step * transform.rotation).normalize();
    }

    fn render_inspector(&mut self, ui: &imgui::Ui, _ctx: &mut InspectorContext<'_>) {
        let mut axis: [f32; 3] = self.axis.into();
        if imgui::Drag::new("Axis").speed(0.01).build_array(ui, &mut axis) {
            self.axis = axis.into();
        }
        imgui::Drag::new("Speed")
            .speed(1.0)
            .display_format("%.1f deg/s")
            .build(ui, &mut self.speed);
    }

    fn serialise(&self) -> Mapping {
        RecordWriter::new(Self::NAME)
            .vec3("axis", self.axis)
            .f32("speed", self.speed)
            .finish()
    }

    fn deserialise(&mut self, record: &Mapping, _resources: &Resources) -> Result<(), LoadError> {
        let record = Record::new(Self::NAME, record);
        let axis = record.vec3("axis")?;
        let speed = record.f32("speed")?;

        self.axis = axis;
        self.speed = speed;
        Ok(())
    }

    fn clone_box(&self, owner: ObjectId) -> Box<dyn Component> {
        Box::new(Self {
            owner,
            ..self.clone()
        })
    }

    fn is_unique(&self) -> bool {
        false
    }

    component_any!();
}

/// Moves the owner up and down around where it stood when the script started
#[derive(Debug, Clone, PartialEq)]
pub struct Bob {
    owner: ObjectId,
    pub amplitude: f32,
    /// Cycles per second
    pub frequency: f32,
    base: Option<Vector3<f32>>,
}

impl Bob {
    pub const NAME: &'static str = "Bob";

    pub fn new(owner: ObjectId) -> Self {
        Self {
            owner,
            amplitude: 0.5,
            frequency: 0.5,
            base: None,
        }
    }

    fn start(&mut self, transform: &Transform) {
        self.base = Some(transform.position);
    }
}

impl Component for Bob {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }

    fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &UpdateContext) {
        let Some(transform) = siblings.get_mut::<Transform>() else {
            return;
        };
        if self.base.is_none() {
            self.start(transform);
        }
        if let Some(base) = self.base {
            let phase = ctx.elapsed * self.frequency * std::f32::consts::TAU;
            transform.position = base + Vector3::unit_y() * (self.amplitude * phase.sin());
        }
    }

    fn render_inspector(&mut self, ui: &imgui::Ui, _ctx: &mut InspectorContext<'_>) {
        imgui::Drag::new("Amplitude")
            .speed(0.01)
            .build(ui, &mut self.amplitude);
        imgui::Drag::new("Frequency")
            .speed(0.01)
            .range(0.0, 20.0)
            .build(ui, &mut self.frequency);
        if ui.button("Restart") {
            self.base = None;
        }
    }

    fn serialise(&self) -> Mapping {
        RecordWriter::new(Self::NAME)
            .f32("amplitude", self.amplitude)
            .f32("frequency", self.frequency)
            .finish()
    }

    fn deserialise(&mut self, record: &Mapping, _resources: &Resources) -> Result<(), LoadError> {
        let record = Record::new(Self::NAME, record);
        let amplitude = record.f32("amplitude")?;
        let frequency = record.f32("frequency")?;

        self.amplitude = amplitude;
        self.frequency = frequency;
        Ok(())
    }

    /// The copy starts afresh from wherever its own owner stands
    fn clone_box(&self, owner: ObjectId) -> Box<dyn Component> {
        Box::new(Self {
            owner,
            base: None,
            ..self.clone()
        })
    }

    fn is_unique(&self) -> bool {
        false
    }

    component_any!();
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn run(component: &mut dyn Component, transform: &mut Transform, ctx: UpdateContext) {
        let mut list: Vec<Box<dyn Component>> = vec![Box::new(transform.clone())];
        component.update(&mut Siblings::new(&mut list, &mut []), &ctx);
        if let Some(updated) = list[0].as_any().downcast_ref::<Transform>() {
            *transform = updated.clone();
        }
    }

    #[test]
    fn test_bob_oscillates_around_start_position() {
        let owner = ObjectId::from_raw(1);
        let mut transform = Transform::new(owner);
        transform.position = Vector3::new(2.0, 1.0, 0.0);
        let mut bob = Bob::new(owner);
        bob.amplitude = 1.0;
        bob.frequency = 1.0;

        run(&mut bob, &mut transform, UpdateContext { delta_time: 0.25, elapsed: 0.25 });
        assert_relative_eq!(transform.position.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(transform.position.x, 2.0);

        run(&mut bob, &mut transform, UpdateContext { delta_time: 0.5, elapsed: 0.75 });
        assert_relative_eq!(transform.position.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_spin_without_transform_is_a_no_op() {
        let mut spin = Spin::new(ObjectId::from_raw(1));
        let ctx = UpdateContext { delta_time: 1.0, elapsed: 1.0 };
        spin.update(&mut Siblings::new(&mut [], &mut []), &ctx);
        assert_eq!(spin, Spin::new(ObjectId::from_raw(1)));
    }

    #[test]
    fn test_round_trips() {
        let resources = Resources::new();
        let mut spin = Spin::new(ObjectId::from_raw(1));
        spin.axis = Vector3::new(1.0, 0.0, 0.0);
        spin.speed = -30.0;
        let mut loaded = Spin::new(ObjectId::from_raw(1));
        loaded.deserialise(&spin.serialise(), &resources).unwrap();
        assert_eq!(loaded, spin);

        let mut bob = Bob::new(ObjectId::from_raw(1));
        bob.amplitude = 2.5;
        bob.frequency = 0.125;
        let mut loaded = Bob::new(ObjectId::from_raw(1));
        loaded.deserialise(&bob.serialise(), &resources).unwrap();
        assert_eq!(loaded, bob);
    }

    #[test]
    fn test_malformed_records_are_rejected() {
        let resources = Resources::new();

        let mut record = Spin::new(ObjectId::from_raw(1)).serialise();
        record.insert("axis".into(), "up".into());
        let mut spin = Spin::new(ObjectId::from_raw(1));
        spin.speed = 10.0;
        let err = spin.deserialise(&record, &resources).unwrap_err();
        assert!(matches!(err, LoadError::InvalidField { field: "axis", .. }));
        assert_eq!(spin.speed, 10.0);

        let mut record = Bob::new(ObjectId::from_raw(1)).serialise();
        record.insert("amplitude".into(), 3.into());
        record.remove("frequency");
        let mut bob = Bob::new(ObjectId::from_raw(1));
        let err = bob.deserialise(&record, &resources).unwrap_err();
        assert!(matches!(err, LoadError::MissingField { field: "frequency", .. }));
        assert_eq!(bob, Bob::new(ObjectId::from_raw(1)));
    }
}
