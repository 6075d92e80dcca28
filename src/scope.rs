use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Lifetime of a view. Everything subscribed within a scope stops once it is destroyed.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    token: CancellationToken,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A nested scope, destroyed together with its parent.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn destroy(&self) {
        self.token.cancel();
    }

    pub fn is_destroyed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn destroyed(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destroying_parent_destroys_children() {
        let parent = Scope::new();
        let child = parent.child();
        parent.destroy();
        assert!(child.is_destroyed());
    }

    #[test]
    fn destroying_child_leaves_parent_alive() {
        let parent = Scope::new();
        let child = parent.child();
        child.destroy();
        assert!(!parent.is_destroyed());
    }
}
