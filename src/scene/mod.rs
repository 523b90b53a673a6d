//! # Scene Graph
//!
//! Objects, their components, and the scene that owns them.
//!
//! ## Architecture Overview
//!
//! - **Components** ([`component`], [`components`]) - One trait, an open set
//!   of kinds, and a registry mapping discriminators to factories
//! - **Objects** ([`object`]) - Named tree nodes owning components and children
//! - **Scene** ([`scene`]) - The forest plus pools, settings and frame passes
//! - **Files** ([`serialise`], [`record`]) - YAML save and load
//!
//! ```no_run
//! use neeps::scene::{components::CubeRenderer, Scene};
//!
//! let mut scene = Scene::new();
//! scene.load_assets("./res");
//! let id = scene.create_object("Crate");
//! scene.add_component(id, CubeRenderer::NAME).unwrap();
//! scene.save("my.scene").unwrap();
//! ```

pub mod component;
pub mod components;
pub mod object;
pub mod record;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod serialise;

pub use component::{Component, ComponentRegistry, InspectorContext, Siblings, UpdateContext};
pub use object::{Object, ObjectId, ObjectIds};
pub use scene::{FrameStats, Scene, SceneSettings};
pub use serialise::DEFAULT_SCENE_FILE;
