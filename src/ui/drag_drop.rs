//! Drag-and-drop of resource pool entries
//!
//! Payloads are a `usize` index into the pool named by the tag
//! ([`SHADER_PAYLOAD`](crate::gfx::resources::SHADER_PAYLOAD) and friends).

use imgui::DragDropFlags;

/// Makes the last item a drag source carrying `index` under `tag`
pub fn source(ui: &imgui::Ui, tag: &str, index: usize, preview: &str) {
    if let Some(tooltip) = ui.drag_drop_source_config(tag).begin_payload(index) {
        ui.text(preview);
        tooltip.end();
    }
}

/// Index dropped on the last item under `tag`, if any this frame
pub fn accept_index(ui: &imgui::Ui, tag: &str) -> Option<usize> {
    let target = ui.drag_drop_target()?;
    let index = match target.accept_payload::<usize, _>(tag, DragDropFlags::empty()) {
        Some(Ok(payload)) => Some(payload.data),
        Some(Err(e)) => {
            log::warn!("ignoring '{}' payload of the wrong type: {:?}", tag, e);
            None
        }
        None => None,
    };
    target.pop();
    index
}
