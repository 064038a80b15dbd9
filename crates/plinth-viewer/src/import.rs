//! Import requests and the systems that run the workflow
//!
//! "New" clears every imported container before opening the dialog,
//! "Add" keeps the scene and imports alongside it. While a dialog is open
//! further requests are ignored, so the two operations can never overlap.

use std::path::{Path, PathBuf};

use bevy::prelude::*;

use plinth_core::{
    clear_session, read_selection, run_import, DecodedModel, FileFilter, PickOutcome,
    SceneBackend, SceneSession,
};
use plinth_scene::spawn_model;

use crate::picker::{open_model_dialog, PendingPicks, PickerInFlight};

pub struct ImportPlugin {
    /// Model queued as if the user had picked it, before the first frame
    pub startup_model: Option<PathBuf>,
}

impl Plugin for ImportPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ImportRequest>()
            .init_resource::<SceneObjects>()
            .add_systems(Update, (handle_requests, drain_pick_results).chain());

        if let Some(path) = self.startup_model.clone() {
            app.add_systems(
                Startup,
                move |pending: Res<PendingPicks>, mut in_flight: ResMut<PickerInFlight>| {
                    tracing::info!(path = %path.display(), "queueing startup model");
                    let outcome = startup_outcome(&path);
                    if outcome.is_cancelled() {
                        tracing::warn!(path = %path.display(), "startup model will not be imported");
                    }
                    if let Ok(mut outcomes) = pending.0.lock() {
                        outcomes.push_back(outcome);
                        in_flight.0 = true;
                    }
                },
            );
        }
    }
}

/// Outcome for a model passed on the command line. Unlike the dialog, the
/// path never went through the picker filter, so check it here.
fn startup_outcome(path: &Path) -> PickOutcome {
    if !FileFilter::models().matches(path) {
        tracing::warn!(path = %path.display(), "startup model has an unsupported extension");
        return PickOutcome::Cancelled;
    }
    read_selection(path)
}

/// The two import operations offered by the toolbar.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportRequest {
    /// Clear the scene, then import one replacement
    New,
    /// Import into the scene as it is
    Add,
}

/// Session of imported containers, oldest first.
#[derive(Resource, Default)]
pub struct SceneObjects(pub SceneSession<Entity>);

/// Scene backend that spawns and despawns container entities.
struct BevySceneBackend<'w, 's, 'a> {
    commands: &'a mut Commands<'w, 's>,
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<StandardMaterial>,
}

impl SceneBackend for BevySceneBackend<'_, '_, '_> {
    type Container = Entity;

    fn instantiate(&mut self, model: &DecodedModel) -> Entity {
        spawn_model(self.commands, self.meshes, self.materials, model)
    }

    fn destroy(&mut self, container: Entity) {
        self.commands.entity(container).despawn();
    }
}

fn handle_requests(
    mut requests: MessageReader<ImportRequest>,
    mut in_flight: ResMut<PickerInFlight>,
    pending: Res<PendingPicks>,
    mut objects: ResMut<SceneObjects>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for request in requests.read() {
        if in_flight.0 {
            tracing::debug!(?request, "picker already open, ignoring request");
            continue;
        }

        if *request == ImportRequest::New {
            let mut backend = BevySceneBackend {
                commands: &mut commands,
                meshes: &mut meshes,
                materials: &mut materials,
            };
            clear_session(&mut backend, &mut objects.0);
        }

        open_model_dialog(&pending);
        in_flight.0 = true;
    }
}

fn drain_pick_results(
    pending: Res<PendingPicks>,
    mut in_flight: ResMut<PickerInFlight>,
    mut objects: ResMut<SceneObjects>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let outcome = {
        let Ok(mut outcomes) = pending.0.lock() else {
            return;
        };
        outcomes.pop_front()
    };
    let Some(outcome) = outcome else {
        return;
    };

    in_flight.0 = false;
    let mut backend = BevySceneBackend {
        commands: &mut commands,
        meshes: &mut meshes,
        materials: &mut materials,
    };
    run_import(outcome, &mut backend, &mut objects.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::SystemState;
    use plinth_core::decode_model;
    use std::io::Write;

    type BackendParams<'w, 's> = (
        Commands<'w, 's>,
        ResMut<'w, Assets<Mesh>>,
        ResMut<'w, Assets<StandardMaterial>>,
    );

    fn world_with_assets() -> World {
        let mut world = World::new();
        world.insert_resource(Assets::<Mesh>::default());
        world.insert_resource(Assets::<StandardMaterial>::default());
        world
    }

    #[test]
    fn clearing_despawns_every_container() {
        let mut world = world_with_assets();
        let mut session = SceneSession::new();
        let glb = plinth_core::fixtures::two_mesh_glb();

        let mut state: SystemState<BackendParams> = SystemState::new(&mut world);
        {
            let (mut commands, mut meshes, mut materials) = state.get_mut(&mut world);
            let mut backend = BevySceneBackend {
                commands: &mut commands,
                meshes: &mut meshes,
                materials: &mut materials,
            };
            run_import(PickOutcome::Selected(glb.clone()), &mut backend, &mut session);
            run_import(PickOutcome::Selected(glb), &mut backend, &mut session);
        }
        state.apply(&mut world);

        let containers = session.snapshot().to_vec();
        assert_eq!(containers.len(), 2);
        for container in &containers {
            assert!(world.get_entity(*container).is_ok());
        }

        {
            let (mut commands, mut meshes, mut materials) = state.get_mut(&mut world);
            let mut backend = BevySceneBackend {
                commands: &mut commands,
                meshes: &mut meshes,
                materials: &mut materials,
            };
            clear_session(&mut backend, &mut session);
        }
        state.apply(&mut world);

        assert!(session.is_empty());
        for container in &containers {
            assert!(world.get_entity(*container).is_err());
        }
    }

    #[test]
    fn instantiate_spawns_the_decoded_parts() {
        let mut world = world_with_assets();
        let model = decode_model(&plinth_core::fixtures::two_mesh_glb()).unwrap();

        let mut state: SystemState<BackendParams> = SystemState::new(&mut world);
        let container = {
            let (mut commands, mut meshes, mut materials) = state.get_mut(&mut world);
            let mut backend = BevySceneBackend {
                commands: &mut commands,
                meshes: &mut meshes,
                materials: &mut materials,
            };
            backend.instantiate(&model)
        };
        state.apply(&mut world);

        let children = world.get::<Children>(container).unwrap();
        assert_eq!(children.len(), 2);
    }

    fn app_with_import_resources(in_flight: bool) -> App {
        let mut app = App::new();
        app.insert_resource(Assets::<Mesh>::default());
        app.insert_resource(Assets::<StandardMaterial>::default());
        app.init_resource::<PendingPicks>();
        app.insert_resource(PickerInFlight(in_flight));
        app.init_resource::<SceneObjects>();
        app.add_message::<ImportRequest>();
        app
    }

    #[test]
    fn requests_are_ignored_while_a_pick_is_in_flight() {
        let mut app = app_with_import_resources(true);
        app.add_systems(Update, handle_requests);

        let containers: Vec<Entity> = (0..2)
            .map(|_| app.world_mut().spawn_empty().id())
            .collect();
        for container in &containers {
            app.world_mut()
                .resource_mut::<SceneObjects>()
                .0
                .append(*container);
        }

        app.world_mut().write_message(ImportRequest::New);
        app.update();

        // The session was not cleared and its containers still exist
        assert_eq!(app.world().resource::<SceneObjects>().0.len(), 2);
        for container in &containers {
            assert!(app.world().get_entity(*container).is_ok());
        }
        // No dialog was opened, so nothing landed in the queue
        let pending = app.world().resource::<PendingPicks>();
        assert!(pending.0.lock().unwrap().is_empty());
        assert!(app.world().resource::<PickerInFlight>().0);
    }

    #[test]
    fn draining_an_outcome_clears_the_in_flight_flag() {
        let mut app = app_with_import_resources(true);
        app.add_systems(Update, drain_pick_results);

        {
            let pending = app.world().resource::<PendingPicks>();
            pending.0.lock().unwrap().push_back(PickOutcome::Cancelled);
        }
        app.update();

        assert!(!app.world().resource::<PickerInFlight>().0);
        assert!(app.world().resource::<SceneObjects>().0.is_empty());
    }

    #[test]
    fn drained_selection_is_imported() {
        let mut app = app_with_import_resources(true);
        app.add_systems(Update, drain_pick_results);

        {
            let pending = app.world().resource::<PendingPicks>();
            pending
                .0
                .lock()
                .unwrap()
                .push_back(PickOutcome::Selected(plinth_core::fixtures::two_mesh_glb()));
        }
        app.update();

        assert!(!app.world().resource::<PickerInFlight>().0);
        let containers = app.world().resource::<SceneObjects>().0.snapshot().to_vec();
        assert_eq!(containers.len(), 1);
        let children = app.world().get::<Children>(containers[0]).unwrap();
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn startup_model_with_unsupported_extension_is_rejected() {
        let outcome = startup_outcome(Path::new("/tmp/model.obj"));
        assert!(outcome.is_cancelled());
    }

    #[test]
    fn startup_model_bytes_are_read() {
        let mut file = tempfile::Builder::new().suffix(".glb").tempfile().unwrap();
        file.write_all(&plinth_core::fixtures::two_mesh_glb()).unwrap();

        match startup_outcome(file.path()) {
            PickOutcome::Selected(bytes) => assert!(!bytes.is_empty()),
            PickOutcome::Cancelled => panic!("expected a selection"),
        }
    }
}
