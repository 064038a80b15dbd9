//! Bevy application setup

use std::path::PathBuf;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};

use plinth_scene::PlinthScenePlugin;

use crate::import::ImportPlugin;
use crate::picker::FilePickerPlugin;
use crate::ui::UiPlugin;

/// Run the Bevy application
pub fn run(startup_model: Option<PathBuf>) {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.15)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Plinth Model Viewer".to_string(),
                ..default()
            }),
            ..default()
        }))
        // The picking plugins must be added BEFORE EguiPlugin so it can
        // detect PickingPlugin and keep UI clicks out of the scene
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .add_plugins(FilePickerPlugin)
        .add_plugins(PlinthScenePlugin)
        .add_plugins(ImportPlugin { startup_model })
        .add_plugins(UiPlugin)
        .run();
}
