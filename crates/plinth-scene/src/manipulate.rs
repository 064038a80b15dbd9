//! Multi-pointer grab and drag for imported parts
//!
//! Pointers (the mouse cursor and every active touch) are tracked in a
//! [`DragState`] resource. A press casts a ray through the part colliders;
//! the closest hit becomes a grab, and while held the part follows the
//! pointer at its original pick depth. Two pointers holding the same part
//! scale it by the change in their screen-space distance.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::camera::MainCamera;
use crate::spawn::{ImportedContainer, ImportedPart, Manipulable, PartCollider};

pub struct ManipulatePlugin;

impl Plugin for ManipulatePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DragState>()
            .add_systems(Update, (begin_grabs, update_grabs, release_grabs).chain());
    }
}

/// One pointer that can hold a grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Mouse,
    Touch(u64),
}

/// An active hold of one pointer on one part.
#[derive(Debug, Clone, Copy)]
pub struct Grab {
    pub part: Entity,
    /// Distance along the pick ray at which the part was grabbed
    pub depth: f32,
    /// From the world-space hit point to the part origin at grab time
    pub offset: Vec3,
}

/// Reference measurements taken when a second pointer lands on a part.
#[derive(Debug, Clone, Copy)]
struct PinchBase {
    scale: Vec3,
    distance: f32,
}

/// All pointers currently holding parts.
#[derive(Resource, Default)]
pub struct DragState {
    grabs: HashMap<PointerKind, Grab>,
    pinch: HashMap<Entity, PinchBase>,
}

impl DragState {
    /// Record a grab unless the pointer is busy or the part refuses a
    /// second pointer. Returns whether the grab was taken.
    pub fn try_grab(&mut self, pointer: PointerKind, grab: Grab, multi_grab: bool) -> bool {
        if self.grabs.contains_key(&pointer) {
            return false;
        }
        if !multi_grab && self.grabs.values().any(|held| held.part == grab.part) {
            return false;
        }
        self.grabs.insert(pointer, grab);
        true
    }

    pub fn release(&mut self, pointer: PointerKind) {
        if let Some(grab) = self.grabs.remove(&pointer) {
            if self.pointers_on(grab.part) < 2 {
                self.pinch.remove(&grab.part);
            }
        }
    }

    pub fn is_grabbing(&self, pointer: PointerKind) -> bool {
        self.grabs.contains_key(&pointer)
    }

    pub fn pointers_on(&self, part: Entity) -> usize {
        self.grabs.values().filter(|grab| grab.part == part).count()
    }

    pub fn is_empty(&self) -> bool {
        self.grabs.is_empty()
    }

    /// Drop grabs whose parts no longer exist. Parts vanish mid-grab when
    /// the scene is cleared by a "New" import.
    fn retain_alive(&mut self, alive: impl Fn(Entity) -> bool) {
        self.grabs.retain(|_, grab| alive(grab.part));
        self.pinch.retain(|part, _| alive(*part));
    }
}

/// Slab test of a ray against an axis-aligned box.
///
/// Returns the entry distance along the ray, clamped to zero when the
/// origin starts inside the box.
pub fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = direction.recip();
    let t_low = (min - origin) * inv;
    let t_high = (max - origin) * inv;
    let t_near = t_low.min(t_high).max_element();
    let t_far = t_low.max(t_high).min_element();
    if t_far < t_near.max(0.0) {
        None
    } else {
        Some(t_near.max(0.0))
    }
}

/// Cast a ray against every part collider in part-local space and return
/// the closest hit: part, its multi-grab setting, ray distance, world hit.
fn pick_part(
    ray: Ray3d,
    parts: &Query<(Entity, &GlobalTransform, &PartCollider, &Manipulable), With<ImportedPart>>,
) -> Option<(Entity, bool, f32, Vec3)> {
    let mut closest: Option<(f32, Entity, bool, Vec3)> = None;

    for (entity, transform, collider, manipulable) in parts.iter() {
        let world_from_local = transform.affine();
        let local_from_world = world_from_local.inverse();
        let local_origin = local_from_world.transform_point3(ray.origin);
        let local_direction = local_from_world.transform_vector3(*ray.direction);

        let Some(local_t) = ray_aabb(local_origin, local_direction, collider.min(), collider.max())
        else {
            continue;
        };

        // Local distance is not comparable across parts with different
        // scales, so measure along the world ray instead.
        let local_hit = local_origin + local_direction * local_t;
        let world_hit = world_from_local.transform_point3(local_hit);
        let t = (world_hit - ray.origin).dot(*ray.direction);
        if t < 0.0 {
            continue;
        }

        if closest.is_none_or(|(best_t, ..)| t < best_t) {
            closest = Some((t, entity, manipulable.multi_grab, world_hit));
        }
    }

    closest.map(|(t, entity, multi_grab, hit)| (entity, multi_grab, t, hit))
}

fn begin_grabs(
    mut drag_state: ResMut<DragState>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    parts: Query<(Entity, &GlobalTransform, &PartCollider, &Manipulable), With<ImportedPart>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window>,
    mut contexts: EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if egui_wants_pointer {
        return;
    }

    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    let mut pressed: Vec<(PointerKind, Vec2)> = Vec::new();
    if mouse_button.just_pressed(MouseButton::Left) {
        if let Some(cursor) = windows.single().ok().and_then(|w| w.cursor_position()) {
            pressed.push((PointerKind::Mouse, cursor));
        }
    }
    for touch in touch_input.iter_just_pressed() {
        pressed.push((PointerKind::Touch(touch.id()), touch.position()));
    }

    for (pointer, screen_position) in pressed {
        let Ok(ray) = camera.viewport_to_world(camera_transform, screen_position) else {
            continue;
        };
        let Some((part, multi_grab, depth, hit)) = pick_part(ray, &parts) else {
            continue;
        };

        let part_origin = parts
            .get(part)
            .map(|(_, transform, ..)| transform.translation())
            .unwrap_or(hit);
        let grab = Grab {
            part,
            depth,
            offset: part_origin - hit,
        };
        if drag_state.try_grab(pointer, grab, multi_grab) {
            tracing::debug!(?pointer, ?part, depth, "grabbed part");
        }
    }
}

fn update_grabs(
    mut drag_state: ResMut<DragState>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut part_query: Query<(&mut Transform, &ImportedPart)>,
    container_query: Query<&Transform, (With<ImportedContainer>, Without<ImportedPart>)>,
    windows: Query<&Window>,
    touch_input: Res<Touches>,
) {
    if drag_state.is_empty() {
        return;
    }
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    let mut positions: HashMap<PointerKind, Vec2> = HashMap::new();
    if let Some(cursor) = windows.single().ok().and_then(|w| w.cursor_position()) {
        positions.insert(PointerKind::Mouse, cursor);
    }
    for touch in touch_input.iter() {
        positions.insert(PointerKind::Touch(touch.id()), touch.position());
    }

    // Group live pointers by the part they hold
    let mut held: HashMap<Entity, Vec<(Vec2, Grab)>> = HashMap::new();
    for (pointer, grab) in &drag_state.grabs {
        if let Some(screen_position) = positions.get(pointer) {
            held.entry(grab.part)
                .or_default()
                .push((*screen_position, *grab));
        }
    }

    for (part, pointers) in held {
        let Ok((mut transform, imported)) = part_query.get_mut(part) else {
            continue;
        };

        // Average the world-space targets of every pointer on this part
        let mut target = Vec3::ZERO;
        let mut contributing = 0;
        for (screen_position, grab) in &pointers {
            let Ok(ray) = camera.viewport_to_world(camera_transform, *screen_position) else {
                continue;
            };
            target += ray.origin + *ray.direction * grab.depth + grab.offset;
            contributing += 1;
        }
        if contributing == 0 {
            continue;
        }
        target /= contributing as f32;

        // Containers are never rotated or scaled, so part-local position is
        // the world target minus the container translation.
        let container_translation = container_query
            .get(imported.container)
            .map(|t| t.translation)
            .unwrap_or(Vec3::ZERO);
        transform.translation = target - container_translation;

        if pointers.len() >= 2 {
            let spread = pointers[0].0.distance(pointers[1].0);
            let base = drag_state.pinch.entry(part).or_insert(PinchBase {
                scale: transform.scale,
                distance: spread.max(1.0),
            });
            transform.scale = base.scale * (spread / base.distance).clamp(0.05, 20.0);
        } else {
            drag_state.pinch.remove(&part);
        }
    }
}

fn release_grabs(
    mut drag_state: ResMut<DragState>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    parts: Query<(), With<ImportedPart>>,
) {
    if mouse_button.just_released(MouseButton::Left) {
        drag_state.release(PointerKind::Mouse);
    }
    for touch in touch_input.iter_just_released() {
        drag_state.release(PointerKind::Touch(touch.id()));
    }
    for touch in touch_input.iter_just_canceled() {
        drag_state.release(PointerKind::Touch(touch.id()));
    }

    drag_state.retain_alive(|part| parts.get(part).is_ok());
}
