//! # Scene Objects
//!
//! An [`Object`] owns its components and its children. The parent relation
//! is implicit in the tree, and the transform hierarchy is the object
//! hierarchy: world matrices are composed while walking down from a root.
//! Dropping an object drops its whole subtree.

use std::fmt;

use cgmath::Matrix4;

use crate::error::SceneError;

use super::{
    component::{Component, Siblings, UpdateContext},
    components::{renderer::Renderer, transform::Transform},
};

/// Unique identity of an object within a scene
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh object ids
#[derive(Debug, Clone)]
pub struct ObjectIds {
    next: u64,
}

impl Default for ObjectIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl ObjectIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        self.next += 1;
        id
    }
}

pub struct Object {
    id: ObjectId,
    pub name: String,
    components: Vec<Box<dyn Component>>,
    children: Vec<Object>,
    /// Prototype this object was instantiated from
    pub blueprint: Option<ObjectId>,
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("name", &self.name)
            .field(
                "components",
                &self.components.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("children", &self.children)
            .field("blueprint", &self.blueprint)
            .finish()
    }
}

impl Object {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            components: Vec::new(),
            children: Vec::new(),
            blueprint: None,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn components(&self) -> &[Box<dyn Component>] {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut [Box<dyn Component>] {
        &mut self.components
    }

    pub fn children(&self) -> &[Object] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Object> {
        &mut self.children
    }

    pub fn add_child(&mut self, child: Object) {
        self.children.push(child);
    }

    /// Detaches a direct child and hands its subtree to the caller
    pub fn remove_child(&mut self, id: ObjectId) -> Option<Object> {
        let index = self.children.iter().position(|c| c.id == id)?;
        Some(self.children.remove(index))
    }

    /// Detaches a descendant at any depth
    pub fn remove_descendant(&mut self, id: ObjectId) -> Option<Object> {
        if let Some(child) = self.remove_child(id) {
            return Some(child);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.remove_descendant(id))
    }

    /// Attaches a component, refusing a second instance of a unique kind
    pub fn add_component(&mut self, component: Box<dyn Component>) -> Result<(), SceneError> {
        if component.is_unique() && self.components.iter().any(|c| c.name() == component.name()) {
            return Err(SceneError::DuplicateComponent(component.name().to_string()));
        }
        self.components.push(component);
        Ok(())
    }

    pub fn remove_component(&mut self, index: usize) -> Option<Box<dyn Component>> {
        (index < self.components.len()).then(|| self.components.remove(index))
    }

    /// First component of concrete type `T`
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.components
            .iter()
            .find_map(|c| c.as_any().downcast_ref::<T>())
    }

    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .find_map(|c| c.as_any_mut().downcast_mut::<T>())
    }

    /// First component with the renderer capability
    pub fn renderer(&self) -> Option<&dyn Renderer> {
        self.components.iter().find_map(|c| c.as_renderer())
    }

    pub fn renderer_mut(&mut self) -> Option<&mut dyn Renderer> {
        self.components
            .iter_mut()
            .find_map(|c| c.as_renderer_mut())
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.components.iter().any(|c| c.name() == name)
    }

    /// Deep copy of the subtree with fresh ids
    ///
    /// Every component is cloned for its new owner; shaders, textures and
    /// meshes stay shared.
    pub fn clone_with(&self, ids: &mut ObjectIds) -> Object {
        let id = ids.allocate();
        Object {
            id,
            name: self.name.clone(),
            components: self.components.iter().map(|c| c.clone_box(id)).collect(),
            children: self.children.iter().map(|c| c.clone_with(ids)).collect(),
            blueprint: self.blueprint,
        }
    }

    pub fn find(&self, id: ObjectId) -> Option<&Object> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Depth-first, parents before children
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Object)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Depth-first walk that also yields each object's world matrix
    ///
    /// The matrix is `None` for an object without a Transform; its children
    /// then inherit `parent` unchanged.
    pub fn walk_world<'a>(
        &'a self,
        parent: Matrix4<f32>,
        f: &mut impl FnMut(&'a Object, Option<Matrix4<f32>>),
    ) {
        let world = self
            .get_component::<Transform>()
            .map(|t| parent * t.local_matrix());
        f(self, world);
        for child in &self.children {
            child.walk_world(world.unwrap_or(parent), f);
        }
    }

    /// Runs every component's update, then the children's
    pub fn update(&mut self, ctx: &UpdateContext) {
        for i in 0..self.components.len() {
            let (before, rest) = self.components.split_at_mut(i);
            if let Some((component, after)) = rest.split_first_mut() {
                component.update(&mut Siblings::new(before, after), ctx);
            }
        }
        for child in &mut self.children {
            child.update(ctx);
        }
    }

    /// Number of objects in this subtree, itself included
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Object::subtree_len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use cgmath::{Deg, Quaternion, Rotation3, SquareMatrix, Vector3, Vector4};
    use rand::Rng;

    use super::*;
    use crate::{
        gfx::resources::{Shader, Texture},
        scene::components::{
            light::Light,
            renderer::{cube::CubeRenderer, RenderMode},
            script::Spin,
        },
    };

    fn with_transform(ids: &mut ObjectIds, name: &str, position: Vector3<f32>) -> Object {
        let mut object = Object::new(ids.allocate(), name);
        let mut transform = Transform::new(object.id());
        transform.position = position;
        object.add_component(Box::new(transform)).unwrap();
        object
    }

    #[test]
    fn test_add_component_rejects_duplicates() {
        let mut ids = ObjectIds::new();
        let mut object = with_transform(&mut ids, "Box", Vector3::new(0.0, 0.0, 0.0));
        let id = object.id();

        assert_eq!(
            object.add_component(Box::new(Transform::new(id))),
            Err(SceneError::DuplicateComponent("Transform".to_string()))
        );
        object.add_component(Box::new(Spin::new(id))).unwrap();
        object.add_component(Box::new(Spin::new(id))).unwrap();
        assert_eq!(object.components().len(), 3);
    }

    #[test]
    fn test_remove_child_detaches_subtree() {
        let mut ids = ObjectIds::new();
        let mut root = Object::new(ids.allocate(), "Root");
        let mut child = Object::new(ids.allocate(), "Child");
        let grandchild = Object::new(ids.allocate(), "Grandchild");
        let (child_id, grandchild_id) = (child.id(), grandchild.id());
        child.add_child(grandchild);
        root.add_child(child);

        assert!(root.remove_child(grandchild_id).is_none());
        let detached = root.remove_child(child_id).unwrap();
        assert!(root.children().is_empty());
        assert!(detached.find(grandchild_id).is_some());
    }

    #[test]
    fn test_clone_is_isomorphic_with_fresh_components() {
        let mut ids = ObjectIds::new();
        let shader = Rc::new(Shader::from_source("flat", ""));
        let texture = Rc::new(Texture::from_rgba("white", 1, 1, vec![255; 4]));

        let mut root = with_transform(&mut ids, "Root", Vector3::new(1.0, 0.0, 0.0));
        let mut cube = CubeRenderer::new(root.id());
        cube.material.shader = Some(shader.clone());
        cube.material.diffuse_texture = Some(texture.clone());
        cube.material.mode = RenderMode::TexMap;
        root.add_component(Box::new(cube)).unwrap();

        let mut child = with_transform(&mut ids, "Lamp", Vector3::new(0.0, 2.0, 0.0));
        child.add_component(Box::new(Light::new(child.id()))).unwrap();
        child.add_component(Box::new(Spin::new(child.id()))).unwrap();
        root.add_child(child);

        let copy = root.clone_with(&mut ids);

        fn shape(object: &Object) -> (Vec<&'static str>, Vec<(Vec<&'static str>, usize)>) {
            (
                object.components().iter().map(|c| c.name()).collect(),
                object
                    .children()
                    .iter()
                    .map(|c| (shape(c).0, c.children().len()))
                    .collect(),
            )
        }
        assert_eq!(shape(&root), shape(&copy));
        assert_ne!(root.id(), copy.id());
        assert_ne!(root.children()[0].id(), copy.children()[0].id());

        // No component instance is shared, and every copy names its new owner
        let mut originals = Vec::new();
        root.walk(&mut |o| {
            originals.extend(o.components().iter().map(|c| c.as_ref() as *const dyn Component as *const ()))
        });
        copy.walk(&mut |o| {
            for c in o.components() {
                assert_eq!(c.owner(), o.id());
                assert!(!originals.contains(&(c.as_ref() as *const dyn Component as *const ())));
            }
        });

        let cloned = copy.get_component::<CubeRenderer>().unwrap();
        assert!(Rc::ptr_eq(cloned.material.shader.as_ref().unwrap(), &shader));
        assert!(Rc::ptr_eq(cloned.material.diffuse_texture.as_ref().unwrap(), &texture));
        assert_eq!(cloned.material.mode, RenderMode::TexMap);
    }

    #[test]
    fn test_world_matrix_is_parent_times_local() {
        let mut ids = ObjectIds::new();
        let mut root = with_transform(&mut ids, "Root", Vector3::new(1.0, 0.0, 0.0));
        root.get_component_mut::<Transform>().unwrap().rotation =
            Quaternion::from_angle_y(Deg(90.0));

        // An object without a Transform passes its parent's matrix through
        let mut group = Object::new(ids.allocate(), "Group");
        let leaf = with_transform(&mut ids, "Leaf", Vector3::new(0.0, 0.0, 1.0));
        let leaf_id = leaf.id();
        group.add_child(leaf);
        root.add_child(group);

        let mut leaf_world = None;
        let mut group_world = Some(Matrix4::identity());
        root.walk_world(Matrix4::identity(), &mut |o, world| {
            if o.id() == leaf_id {
                leaf_world = world;
            } else if o.name == "Group" {
                group_world = world;
            }
        });

        assert!(group_world.is_none());
        let origin = leaf_world.unwrap() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(origin.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(origin.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_world_matrix_composes_random_chains() {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let mut ids = ObjectIds::new();
            let depth = rng.random_range(1..6);
            let mut locals = Vec::new();
            let mut chain: Option<Object> = None;

            // Build bottom-up so each new node becomes the parent of the last
            for _ in 0..depth {
                let mut node = with_transform(
                    &mut ids,
                    "Node",
                    Vector3::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0), 0.0),
                );
                let transform = node.get_component_mut::<Transform>().unwrap();
                transform.rotation = Quaternion::from_angle_z(Deg(rng.random_range(0.0..360.0)));
                transform.scale = Vector3::new(1.0, 1.0, 1.0) * rng.random_range(0.5..2.0);
                locals.push(transform.local_matrix());
                if let Some(previous) = chain.take() {
                    node.add_child(previous);
                }
                chain = Some(node);
            }

            let root = chain.unwrap();
            let expected = locals
                .iter()
                .rev()
                .fold(Matrix4::identity(), |acc, local| acc * local);
            let mut deepest = Matrix4::identity();
            root.walk_world(Matrix4::identity(), &mut |_, world| {
                deepest = world.unwrap();
            });

            let a: &[f32; 16] = expected.as_ref();
            let b: &[f32; 16] = deepest.as_ref();
            for (x, y) in a.iter().zip(b) {
                assert_relative_eq!(*x, *y, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_update_lets_scripts_reach_siblings() {
        let mut ids = ObjectIds::new();
        let mut object = with_transform(&mut ids, "Spinner", Vector3::new(0.0, 0.0, 0.0));
        let mut spin = Spin::new(object.id());
        spin.axis = Vector3::new(0.0, 1.0, 0.0);
        spin.speed = 90.0;
        object.add_component(Box::new(spin)).unwrap();

        object.update(&UpdateContext {
            delta_time: 1.0,
            elapsed: 1.0,
        });

        let rotation = object.get_component::<Transform>().unwrap().rotation;
        let expected = Quaternion::from_angle_y(Deg(90.0));
        assert_relative_eq!(rotation.s, expected.s, epsilon = 1e-5);
        assert_relative_eq!(rotation.v.y, expected.v.y, epsilon = 1e-5);
    }
}
