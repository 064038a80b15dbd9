//! Camera controls and orbit navigation

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::manipulate::{DragState, PointerKind};
use crate::spawn::SPAWN_OFFSET;

/// Camera controller settings
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub target_focus: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            distance: 3.5,
            target_distance: 3.5,
            azimuth: 0.0,
            elevation: 0.35,
            target: SPAWN_OFFSET,
            target_focus: SPAWN_OFFSET,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
        }
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .add_systems(Update, update_camera);
    }
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    drag_state: Res<DragState>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    // When egui or a grab owns the pointer, the camera leaves it alone
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    let mouse_grabbing = drag_state.is_grabbing(PointerKind::Mouse);

    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }

    // Orbit with left mouse drag
    if mouse_button.pressed(MouseButton::Left) && !egui_wants_pointer && !mouse_grabbing {
        settings.azimuth -= total_motion.x * settings.sensitivity;
        settings.elevation =
            (settings.elevation - total_motion.y * settings.sensitivity).clamp(-1.5, 1.5);
    }

    // Pan with right mouse drag, in the camera's vertical plane
    if mouse_button.pressed(MouseButton::Right) && !egui_wants_pointer {
        // Camera offset direction projected to the ground is (sin az, cos az),
        // so camera right is (cos az, -sin az)
        let right = Vec3::new(settings.azimuth.cos(), 0.0, -settings.azimuth.sin());
        let pan_speed = settings.distance * 0.002;
        // Mouse right -> pan right, mouse up -> pan up
        let pan = right * total_motion.x * pan_speed + Vec3::Y * total_motion.y * pan_speed;
        settings.target_focus -= pan;
    }

    // Zoom with scroll unless the pointer is over UI
    if !egui_wants_pointer {
        for scroll in mouse_wheel.read() {
            let zoom_factor = 1.0 - scroll.y * settings.zoom_speed * 0.3;
            settings.target_distance = (settings.target_distance * zoom_factor).clamp(0.2, 20.0);
        }
    } else {
        for _ in mouse_wheel.read() {}
    }

    // Single-finger orbit, skipping fingers that are dragging a part
    let free_touches: Vec<_> = touch_input
        .iter()
        .filter(|touch| !drag_state.is_grabbing(PointerKind::Touch(touch.id())))
        .collect();
    if free_touches.len() == 1 && !egui_wants_pointer {
        let delta = free_touches[0].delta();
        if delta != Vec2::ZERO {
            settings.azimuth -= delta.x * settings.sensitivity;
            settings.elevation =
                (settings.elevation - delta.y * settings.sensitivity).clamp(-1.5, 1.5);
        }
    }

    // Two free fingers pinch the camera distance
    if free_touches.len() == 2 {
        let (t1, t2) = (free_touches[0], free_touches[1]);
        let curr_dist = t1.position().distance(t2.position());
        let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
        let zoom_factor = prev_dist / curr_dist.max(1.0);
        settings.target_distance = (settings.target_distance * zoom_factor).clamp(0.2, 20.0);
    }

    // Smooth interpolation for zoom and target
    let dt = time.delta_secs();
    let lerp_factor = 1.0 - (-settings.smooth_factor * 60.0 * dt).exp();
    settings.distance =
        settings.distance + (settings.target_distance - settings.distance) * lerp_factor;
    settings.target = settings.target + (settings.target_focus - settings.target) * lerp_factor;

    // Spherical coordinates with Y up
    if let Ok(mut transform) = camera_query.single_mut() {
        let offset = Vec3::new(
            settings.distance * settings.azimuth.sin() * settings.elevation.cos(),
            settings.distance * settings.elevation.sin(),
            settings.distance * settings.azimuth.cos() * settings.elevation.cos(),
        );
        transform.translation = settings.target + offset;
        transform.look_at(settings.target, Vec3::Y);
    }
}
