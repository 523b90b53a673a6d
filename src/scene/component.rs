//! # Components
//!
//! A [`Component`] is one capability attached to an object: a transform, a
//! light, a renderer, a script. The set is open. Adding a kind means
//! implementing the trait and registering a factory in the
//! [`ComponentRegistry`]; neither `Object` nor `Scene` changes.
//!
//! ## Sibling access
//!
//! Scripts need to mutate other components on the same object (a spinning
//! cube rotates its Transform). [`Object`](super::Object) splits its component
//! list around the one being updated and hands the rest over as
//! [`Siblings`], so no component ever holds a pointer to another.

use std::any::Any;

use serde_yaml::Mapping;

use crate::{error::LoadError, gfx::resources::Resources};

use super::{
    components::{light::Light, renderer::Renderer},
    object::ObjectId,
};

/// Per-frame input to [`Component::update`]
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateContext {
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Seconds since the scene started updating
    pub elapsed: f32,
}

/// What the inspector can reach besides the component itself
pub struct InspectorContext<'a> {
    /// Pools that drag-and-drop payload indices resolve against
    pub resources: &'a Resources,
}

/// The components of one object other than the one being updated
pub struct Siblings<'a> {
    before: &'a mut [Box<dyn Component>],
    after: &'a mut [Box<dyn Component>],
}

impl<'a> Siblings<'a> {
    pub fn new(before: &'a mut [Box<dyn Component>], after: &'a mut [Box<dyn Component>]) -> Self {
        Self { before, after }
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        self.before
            .iter()
            .chain(self.after.iter())
            .find_map(|c| c.as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find_map(|c| c.as_any_mut().downcast_mut::<T>())
    }
}

/// Common interface of every component kind
pub trait Component: Any {
    /// Serialisation discriminator, also shown in the inspector
    fn name(&self) -> &'static str;

    /// Object this component is attached to
    fn owner(&self) -> ObjectId;

    /// Advances the component by one frame
    fn update(&mut self, _siblings: &mut Siblings<'_>, _ctx: &UpdateContext) {}

    /// Draws the component's section of the inspector
    fn render_inspector(&mut self, ui: &imgui::Ui, ctx: &mut InspectorContext<'_>);

    /// Writes a record with `name` first, followed by the component's fields
    fn serialise(&self) -> Mapping;

    /// Reads back every field [`serialise`](Self::serialise) wrote
    ///
    /// Missing or ill-typed fields are errors, never defaulted. Optional
    /// resource names that are not in the pools leave the slot empty.
    fn deserialise(&mut self, record: &Mapping, resources: &Resources) -> Result<(), LoadError>;

    /// Deep copy attached to `owner`; shared resources stay shared
    fn clone_box(&self, owner: ObjectId) -> Box<dyn Component>;

    /// Whether an object may hold at most one component of this kind
    fn is_unique(&self) -> bool {
        true
    }

    fn as_renderer(&self) -> Option<&dyn Renderer> {
        None
    }

    fn as_renderer_mut(&mut self) -> Option<&mut dyn Renderer> {
        None
    }

    fn as_light(&self) -> Option<&Light> {
        None
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Creates a default component of one kind for the given owner
pub type ComponentFactory = fn(ObjectId) -> Box<dyn Component>;

/// Maps serialisation discriminators to component factories
///
/// Registration order is kept; the inspector's "Add Component" menu lists
/// kinds in that order.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    factories: Vec<(&'static str, ComponentFactory)>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing any earlier registration
    pub fn register(&mut self, name: &'static str, factory: ComponentFactory) {
        match self.factories.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = factory,
            None => self.factories.push((name, factory)),
        }
    }

    pub fn create(&self, name: &str, owner: ObjectId) -> Option<Box<dyn Component>> {
        self.factories
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, factory)| factory(owner))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.iter().any(|(n, _)| *n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.iter().map(|(n, _)| *n)
    }
}

/// Implements the `Any` plumbing every component needs
macro_rules! component_any {
    () => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}

pub(crate) use component_any;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::components::{self, transform::Transform};

    #[test]
    fn test_registry_creates_by_name() {
        let registry = components::builtin_registry();
        let owner = ObjectId::from_raw(7);

        let component = registry.create("Transform", owner).unwrap();
        assert_eq!(component.name(), "Transform");
        assert_eq!(component.owner(), owner);
        assert!(component.as_any().downcast_ref::<Transform>().is_some());
        assert!(registry.create("Teleporter", owner).is_none());
    }

    #[test]
    fn test_registry_keeps_order_and_replaces() {
        let mut registry = ComponentRegistry::new();
        registry.register("Transform", |owner| Box::new(Transform::new(owner)));
        registry.register("Light", |owner| Box::new(components::light::Light::new(owner)));
        registry.register("Transform", |owner| Box::new(Transform::new(owner)));

        assert_eq!(registry.names().collect::<Vec<_>>(), ["Transform", "Light"]);
    }

    #[test]
    fn test_siblings_skip_the_updated_component() {
        let owner = ObjectId::from_raw(1);
        let mut list: Vec<Box<dyn Component>> = vec![
            Box::new(Transform::new(owner)),
            Box::new(components::light::Light::new(owner)),
        ];
        let (before, rest) = list.split_at_mut(1);
        let (_light, after) = rest.split_first_mut().unwrap();
        let mut siblings = Siblings::new(before, after);

        assert!(siblings.get_mut::<Transform>().is_some());
        assert!(siblings.get::<components::light::Light>().is_none());
    }
}
