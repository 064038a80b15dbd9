//! Toolbar UI

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use crate::import::{ImportRequest, SceneObjects};
use crate::picker::PickerInFlight;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, toolbar);
    }
}

fn toolbar(
    mut contexts: EguiContexts,
    mut requests: MessageWriter<ImportRequest>,
    in_flight: Res<PickerInFlight>,
    objects: Res<SceneObjects>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("Plinth");
            ui.separator();

            if ui
                .add_enabled(!in_flight.0, egui::Button::new("New"))
                .on_hover_text("Clear the scene and import a model")
                .clicked()
            {
                requests.write(ImportRequest::New);
            }
            if ui
                .add_enabled(!in_flight.0, egui::Button::new("Add"))
                .on_hover_text("Import a model alongside the current ones")
                .clicked()
            {
                requests.write(ImportRequest::Add);
            }

            ui.separator();
            ui.label(format!("{} model(s) loaded", objects.0.len()));
            if in_flight.0 {
                ui.label("choosing a file...");
            }
        });
    });
}
