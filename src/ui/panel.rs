//! Built-in editor panels
//!
//! The hierarchy and inspector are drawn every frame by
//! [`Scene::render_ui`]. Both collect what the user clicked into an action
//! and apply it once the frame's borrows of the forest have ended.

use imgui::{Condition, TreeNodeFlags};

use crate::scene::{InspectorContext, Object, ObjectId, Scene};

const PANEL_WIDTH: f32 = 320.0;

enum HierarchyAction {
    Select(ObjectId),
    AddRoot,
    AddChild(ObjectId),
    Duplicate(ObjectId),
    Delete(ObjectId),
    MakeBlueprint(ObjectId),
    Instantiate(usize),
}

enum InspectorAction {
    AddComponent(&'static str),
    RemoveComponent(usize),
}

/// Object tree with create, duplicate, delete and blueprint actions
pub fn hierarchy(ui: &imgui::Ui, scene: &mut Scene) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    let mut action = None;
    ui.window("Hierarchy")
        .size([PANEL_WIDTH, display_size[1] * 0.5], Condition::FirstUseEver)
        .position([10.0, 10.0], Condition::FirstUseEver)
        .build(|| {
            for object in &scene.objects {
                tree_node(ui, object, scene.inspected, &mut action);
            }
            if scene.objects.is_empty() {
                ui.text_disabled("Scene is empty");
            }

            ui.separator();
            if ui.button("Add Object") {
                action = Some(HierarchyAction::AddRoot);
            }
            if let Some(id) = scene.inspected {
                if ui.button("Add Child") {
                    action = Some(HierarchyAction::AddChild(id));
                }
                ui.same_line();
                if ui.button("Duplicate") {
                    action = Some(HierarchyAction::Duplicate(id));
                }
                ui.same_line();
                if ui.button("Delete") {
                    action = Some(HierarchyAction::Delete(id));
                }
                if ui.button("Make Blueprint") {
                    action = Some(HierarchyAction::MakeBlueprint(id));
                }
            }

            if !scene.blueprints.is_empty()
                && ui.collapsing_header("Blueprints", TreeNodeFlags::empty())
            {
                for (index, blueprint) in scene.blueprints.iter().enumerate() {
                    let _id = ui.push_id_usize(index);
                    ui.text(&blueprint.name);
                    ui.same_line();
                    if ui.small_button("Instantiate") {
                        action = Some(HierarchyAction::Instantiate(index));
                    }
                }
            }
        });

    if let Some(action) = action {
        apply_hierarchy_action(scene, action);
    }
}

fn tree_node(
    ui: &imgui::Ui,
    object: &Object,
    inspected: Option<ObjectId>,
    action: &mut Option<HierarchyAction>,
) {
    let mut flags = TreeNodeFlags::OPEN_ON_ARROW | TreeNodeFlags::SPAN_AVAIL_WIDTH;
    if object.children().is_empty() {
        flags |= TreeNodeFlags::LEAF;
    }
    if inspected == Some(object.id()) {
        flags |= TreeNodeFlags::SELECTED;
    }

    let label = format!("{}##{}", object.name, object.id().raw());
    let node = ui.tree_node_config(&label).flags(flags).push();
    if ui.is_item_clicked() {
        *action = Some(HierarchyAction::Select(object.id()));
    }
    if let Some(_node) = node {
        for child in object.children() {
            tree_node(ui, child, inspected, action);
        }
    }
}

fn apply_hierarchy_action(scene: &mut Scene, action: HierarchyAction) {
    let result = match action {
        HierarchyAction::Select(id) => {
            scene.inspected = Some(id);
            Ok(())
        }
        HierarchyAction::AddRoot => {
            scene.inspected = Some(scene.create_object("Object"));
            Ok(())
        }
        HierarchyAction::AddChild(parent) => scene
            .create_child(parent, "Object")
            .map(|id| scene.inspected = Some(id)),
        HierarchyAction::Duplicate(id) => scene
            .duplicate(id)
            .map(|copy| scene.inspected = Some(copy)),
        HierarchyAction::Delete(id) => {
            if let Some(removed) = scene.remove_object(id) {
                log::info!("deleted '{}' ({} objects)", removed.name, removed.subtree_len());
            }
            Ok(())
        }
        HierarchyAction::MakeBlueprint(id) => scene
            .make_blueprint(id)
            .map(|index| log::info!("stored blueprint {}", index)),
        HierarchyAction::Instantiate(index) => scene
            .instantiate_blueprint(index)
            .map(|id| scene.inspected = Some(id)),
    };
    if let Err(e) = result {
        log::warn!("hierarchy action failed: {}", e);
    }
}

/// Name and component editors for the inspected object
pub fn inspector(ui: &imgui::Ui, scene: &mut Scene) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }
    let Some(id) = scene.inspected else {
        return;
    };

    let kinds: Vec<&'static str> = scene.registry().names().collect();
    let mut action = None;

    // Split borrow: the forest is edited while the pools are only read
    let Some(object) = scene.objects.iter_mut().find_map(|o| o.find_mut(id)) else {
        scene.inspected = None;
        return;
    };
    let mut ctx = InspectorContext {
        resources: &scene.resources,
    };

    ui.window("Inspector")
        .size([PANEL_WIDTH, display_size[1] * 0.6], Condition::FirstUseEver)
        .position(
            [display_size[0] - PANEL_WIDTH - 10.0, 10.0],
            Condition::FirstUseEver,
        )
        .build(|| {
            ui.input_text("Name", &mut object.name).build();
            if let Some(blueprint) = object.blueprint {
                ui.text_disabled(format!("Instance of blueprint {}", blueprint));
            }
            ui.separator();

            for (index, component) in object.components_mut().iter_mut().enumerate() {
                let _id = ui.push_id_usize(index);
                if ui.collapsing_header(component.name(), TreeNodeFlags::DEFAULT_OPEN) {
                    component.render_inspector(ui, &mut ctx);
                    if ui.small_button("Remove") {
                        action = Some(InspectorAction::RemoveComponent(index));
                    }
                }
            }

            ui.separator();
            if ui.button("Add Component") {
                ui.open_popup("add_component");
            }
            ui.popup("add_component", || {
                for kind in &kinds {
                    if ui.selectable(kind) {
                        action = Some(InspectorAction::AddComponent(*kind));
                    }
                }
            });
        });

    match action {
        Some(InspectorAction::RemoveComponent(index)) => {
            if let Some(removed) = object.remove_component(index) {
                log::debug!("removed {} from {}", removed.name(), id);
            }
        }
        Some(InspectorAction::AddComponent(kind)) => {
            if let Err(e) = scene.add_component(id, kind) {
                log::warn!("cannot add {} to {}: {}", kind, id, e);
            }
        }
        None => {}
    }
}
