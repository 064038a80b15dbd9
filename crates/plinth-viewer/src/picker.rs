//! Native file picker glue
//!
//! The rfd dialog blocks, so it runs on its own thread and hands its
//! outcome back through a shared queue that a Bevy system drains every
//! frame. At most one dialog is open at a time; the in-flight flag is
//! owned by the import systems.

use std::collections::VecDeque;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use bevy::prelude::*;
use plinth_core::{read_selection, FileFilter, PickOutcome};

pub struct FilePickerPlugin;

impl Plugin for FilePickerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingPicks>()
            .init_resource::<PickerInFlight>();
    }
}

/// Outcomes produced by picker threads, drained on the main thread.
#[derive(Resource, Default)]
pub struct PendingPicks(pub Arc<Mutex<VecDeque<PickOutcome>>>);

/// Whether a dialog is open or a selection is still waiting to be drained.
#[derive(Resource, Default)]
pub struct PickerInFlight(pub bool);

/// Open the model file dialog on a background thread.
///
/// Whatever happens in the dialog, exactly one outcome lands in the queue.
/// A panic inside the dialog counts as a cancellation; the in-flight flag
/// must always get its outcome or the toolbar would stay disabled.
pub fn open_model_dialog(pending: &PendingPicks) {
    let queue = pending.0.clone();
    thread::spawn(move || {
        let picked = panic::catch_unwind(|| {
            let filter = FileFilter::models();
            let extensions: Vec<&str> = filter.extensions.iter().map(String::as_str).collect();
            rfd::FileDialog::new()
                .add_filter(&filter.name, &extensions)
                .pick_file()
        });

        let outcome = dialog_outcome(picked);
        if let Ok(mut outcomes) = queue.lock() {
            outcomes.push_back(outcome);
        }
    });
}

/// Collapse the dialog thread's result into a pick outcome.
fn dialog_outcome(picked: thread::Result<Option<PathBuf>>) -> PickOutcome {
    match picked {
        Ok(Some(path)) => read_selection(&path),
        Ok(None) => PickOutcome::Cancelled,
        Err(_) => {
            tracing::warn!("file dialog panicked, treating as cancelled");
            PickOutcome::Cancelled
        }
    }
}
