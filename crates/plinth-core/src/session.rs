//! Scene session - the registry of imported containers
//!
//! Replaces a process-wide mutable list with an explicitly owned value the
//! viewer holds as a resource. Destruction always goes through [`take_all`],
//! so the session can never keep a handle to an object that was destroyed.
//!
//! [`take_all`]: SceneSession::take_all

/// Ordered registry of the container handles created by prior imports.
#[derive(Debug)]
pub struct SceneSession<T> {
    containers: Vec<T>,
}

impl<T> SceneSession<T> {
    pub fn new() -> Self {
        Self {
            containers: Vec::new(),
        }
    }

    /// Record a freshly instantiated container. The session takes ownership.
    pub fn append(&mut self, container: T) {
        self.containers.push(container);
    }

    /// Empty the session, handing every handle back to the caller so it can
    /// destroy them. The clear and the hand-off are one operation.
    pub fn take_all(&mut self) -> Vec<T> {
        std::mem::take(&mut self.containers)
    }

    /// The current containers, oldest first.
    pub fn snapshot(&self) -> &[T] {
        &self.containers
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

impl<T> Default for SceneSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_preserve_order() {
        let mut session = SceneSession::new();
        session.append("a");
        session.append("b");
        session.append("c");
        assert_eq!(session.snapshot(), &["a", "b", "c"]);
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn take_all_leaves_the_session_empty() {
        let mut session = SceneSession::new();
        session.append(1);
        session.append(2);
        let taken = session.take_all();
        assert_eq!(taken, vec![1, 2]);
        assert!(session.is_empty());
        assert!(session.take_all().is_empty());
    }
}
