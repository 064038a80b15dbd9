//! Plinth Scene - 3D viewing and manipulation of imported models
//!
//! This crate provides the Bevy side of the viewer: the orbit camera,
//! the static scene (lights, ground grid, world axes), instantiation of
//! decoded models, and multi-pointer grab manipulation of their parts.

pub mod camera;
pub mod manipulate;
pub mod setup;
pub mod spawn;

use bevy::prelude::*;

/// Plugin that sets up the full 3D scene stack
pub struct PlinthScenePlugin;

impl Plugin for PlinthScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(camera::CameraPlugin)
            .add_plugins(setup::SceneSetupPlugin)
            .add_plugins(manipulate::ManipulatePlugin);
    }
}

// Re-export commonly used types
pub use camera::{CameraSettings, MainCamera};
pub use manipulate::{DragState, PointerKind};
pub use spawn::{
    spawn_model, ImportedContainer, ImportedPart, Manipulable, PartCollider, SPAWN_OFFSET,
};
