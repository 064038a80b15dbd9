//! File selection outcomes and filters
//!
//! The picker itself is platform glue owned by the viewer; this module holds
//! the outcome type it produces and the filter describing which model files
//! are accepted.

use std::path::Path;

/// Result of asking the user for a model file.
///
/// There is deliberately no error variant: an unreadable or empty file is
/// collapsed into [`PickOutcome::Cancelled`], and the import becomes a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// The user chose a readable, non-empty file
    Selected(Vec<u8>),
    /// Dialog dismissed, nothing chosen, or the path was unreadable
    Cancelled,
}

impl PickOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PickOutcome::Cancelled)
    }
}

/// File filter for the picker dialog.
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Display name (e.g., "glTF models")
    pub name: String,
    /// File extensions without dots
    pub extensions: Vec<String>,
}

impl FileFilter {
    /// The two variants of the glTF transmission format.
    pub fn models() -> Self {
        Self {
            name: "glTF models".to_string(),
            extensions: vec!["glb".to_string(), "gltf".to_string()],
        }
    }

    /// Case-insensitive extension check against this filter.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(extension))
    }
}

/// Read a picked path into a [`PickOutcome`].
///
/// Missing, unreadable, and empty files all collapse to `Cancelled`.
pub fn read_selection(path: &Path) -> PickOutcome {
    match std::fs::read(path) {
        Ok(bytes) if !bytes.is_empty() => PickOutcome::Selected(bytes),
        Ok(_) => {
            tracing::debug!(path = %path.display(), "selected file is empty");
            PickOutcome::Cancelled
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "selected file is unreadable");
            PickOutcome::Cancelled
        }
    }
}
