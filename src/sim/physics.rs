//! Per-frame integration and culling

use glam::Vec2;

use super::state::{FallingObject, ObjectId};

/// Advance every unsliced object by one frame, then drop objects that fell
/// past `cull_y` and sliced objects whose linger time is over.
///
/// Culling is garbage collection for missed objects, not a scoring event.
/// Returns the number of objects removed.
pub fn integrate(objects: &mut Vec<FallingObject>, cull_y: f32, now_ms: u64) -> usize {
    for obj in objects.iter_mut().filter(|o| !o.sliced) {
        obj.pos += obj.vel;
        obj.vel.y += obj.gravity;
    }

    let before = objects.len();
    objects.retain(|o| {
        if o.sliced {
            o.remove_at_ms.is_none_or(|t| now_ms < t)
        } else {
            o.pos.y < cull_y
        }
    });
    before - objects.len()
}

/// Newest unsliced object under `point`, if any
pub fn object_at(objects: &[FallingObject], point: Vec2) -> Option<ObjectId> {
    objects
        .iter()
        .rev()
        .find(|o| !o.sliced && o.contains_point(point))
        .map(|o| o.id)
}
