//! The import and reset workflows
//!
//! Control flow is strictly linear per invocation: select, decode,
//! instantiate. Cancellation and decode failure both end the workflow
//! silently, leaving the session exactly as it was.

use crate::decode::{decode_model, DecodeError, DecodedModel};
use crate::pick::PickOutcome;
use crate::session::SceneSession;

/// Seam between the workflow and whichever engine owns the scene graph.
///
/// Implementations must create and destroy objects on the scene-owning
/// context; the workflow itself never touches engine state directly.
pub trait SceneBackend {
    /// Handle to an instantiated container object.
    type Container;

    /// Create a container for the decoded content and return its handle.
    fn instantiate(&mut self, model: &DecodedModel) -> Self::Container;

    /// Destroy a previously instantiated container.
    fn destroy(&mut self, container: Self::Container);
}

/// What a single pass through the workflow did.
#[derive(Debug)]
pub enum ImportOutcome {
    /// One container was instantiated and appended to the session
    Imported,
    /// The user made no selection; nothing changed
    Cancelled,
    /// Bytes were selected but did not decode; nothing changed
    Failed(DecodeError),
}

/// Run one import: decode the picked bytes and instantiate them.
///
/// On any failure the session is left untouched and no object is created.
pub fn run_import<B: SceneBackend>(
    outcome: PickOutcome,
    backend: &mut B,
    session: &mut SceneSession<B::Container>,
) -> ImportOutcome {
    let bytes = match outcome {
        PickOutcome::Selected(bytes) => bytes,
        PickOutcome::Cancelled => {
            tracing::debug!("import cancelled, no selection");
            return ImportOutcome::Cancelled;
        }
    };

    match decode_model(&bytes) {
        Ok(model) => {
            let container = backend.instantiate(&model);
            session.append(container);
            tracing::info!(
                model = %model.name,
                parts = model.nodes.len(),
                loaded = session.len(),
                "imported model"
            );
            ImportOutcome::Imported
        }
        Err(err) => {
            tracing::warn!(%err, "discarding undecodable model");
            ImportOutcome::Failed(err)
        }
    }
}

/// Destroy every container in the session and leave it empty.
pub fn clear_session<B: SceneBackend>(
    backend: &mut B,
    session: &mut SceneSession<B::Container>,
) {
    let containers = session.take_all();
    if !containers.is_empty() {
        tracing::info!(count = containers.len(), "clearing scene");
    }
    for container in containers {
        backend.destroy(container);
    }
}

/// The "New" operation: clear everything, then try to import one replacement.
///
/// The session is guaranteed empty before the import runs; if the import
/// yields nothing the session legitimately stays empty.
pub fn reset_and_import<B: SceneBackend>(
    outcome: PickOutcome,
    backend: &mut B,
    session: &mut SceneSession<B::Container>,
) -> ImportOutcome {
    clear_session(backend, session);
    run_import(outcome, backend, session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::two_mesh_glb;
    use std::collections::HashMap;

    /// Records instantiations and destructions instead of touching a scene.
    #[derive(Default)]
    struct MockScene {
        next_id: usize,
        child_counts: HashMap<usize, usize>,
        destroyed: Vec<usize>,
    }

    impl SceneBackend for MockScene {
        type Container = usize;

        fn instantiate(&mut self, model: &DecodedModel) -> usize {
            let id = self.next_id;
            self.next_id += 1;
            self.child_counts.insert(id, model.nodes.len());
            id
        }

        fn destroy(&mut self, container: usize) {
            self.child_counts.remove(&container);
            self.destroyed.push(container);
        }
    }

    fn import_valid(scene: &mut MockScene, session: &mut SceneSession<usize>) {
        let outcome = run_import(PickOutcome::Selected(two_mesh_glb()), scene, session);
        assert!(matches!(outcome, ImportOutcome::Imported));
    }

    #[test]
    fn successful_import_appends_exactly_one_container() {
        let mut scene = MockScene::default();
        let mut session = SceneSession::new();

        import_valid(&mut scene, &mut session);

        assert_eq!(session.len(), 1);
        // Child count matches the two top-level nodes in the file
        assert_eq!(scene.child_counts[&session.snapshot()[0]], 2);
    }

    #[test]
    fn cancelled_pick_leaves_session_untouched() {
        let mut scene = MockScene::default();
        let mut session = SceneSession::new();
        import_valid(&mut scene, &mut session);

        let outcome = run_import(PickOutcome::Cancelled, &mut scene, &mut session);

        assert!(matches!(outcome, ImportOutcome::Cancelled));
        assert_eq!(session.len(), 1);
        assert!(scene.destroyed.is_empty());
    }

    #[test]
    fn corrupted_bytes_leave_session_untouched() {
        let mut scene = MockScene::default();
        let mut session = SceneSession::new();
        import_valid(&mut scene, &mut session);

        let garbage = PickOutcome::Selected(b"corrupted but not empty".to_vec());
        let outcome = run_import(garbage, &mut scene, &mut session);

        assert!(matches!(outcome, ImportOutcome::Failed(_)));
        assert_eq!(session.len(), 1);
        assert!(scene.destroyed.is_empty());
    }

    #[test]
    fn reset_destroys_prior_objects_and_imports_one_replacement() {
        let mut scene = MockScene::default();
        let mut session = SceneSession::new();
        for _ in 0..3 {
            import_valid(&mut scene, &mut session);
        }

        let outcome = reset_and_import(
            PickOutcome::Selected(two_mesh_glb()),
            &mut scene,
            &mut session,
        );

        assert!(matches!(outcome, ImportOutcome::Imported));
        assert_eq!(session.len(), 1);
        assert_eq!(scene.destroyed, vec![0, 1, 2]);
    }

    #[test]
    fn reset_followed_by_cancel_leaves_session_empty() {
        let mut scene = MockScene::default();
        let mut session = SceneSession::new();
        for _ in 0..3 {
            import_valid(&mut scene, &mut session);
        }

        let outcome = reset_and_import(PickOutcome::Cancelled, &mut scene, &mut session);

        assert!(matches!(outcome, ImportOutcome::Cancelled));
        assert!(session.is_empty());
        assert_eq!(scene.destroyed.len(), 3);
    }
}
