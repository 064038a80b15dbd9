//! Plinth Core - model decoding and the import workflow
//!
//! This crate provides the engine-agnostic pieces of the viewer:
//! - glTF/GLB decoding into an in-memory model description
//! - The scene session that tracks every imported container
//! - The import and reset workflows, driven through a backend trait

pub mod decode;
pub mod pick;
pub mod session;
pub mod workflow;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use decode::{decode_model, DecodeError, DecodedMesh, DecodedModel, ModelNode};
pub use pick::{read_selection, FileFilter, PickOutcome};
pub use session::SceneSession;
pub use workflow::{clear_session, reset_and_import, run_import, ImportOutcome, SceneBackend};
