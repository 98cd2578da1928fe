//! Application state shared by all handlers.

use crate::repository::Repository;
use std::sync::Arc;
use todolist_auth::TokenSigner;
use todolist_core::environment::{Clock, SystemClock};

/// Shared dependencies of the HTTP handlers.
///
/// Cloned for every request; the clone is cheap (repository handles and
/// `Arc`s).
pub struct AppState<R> {
    /// User and todo storage.
    pub repo: R,
    /// Issues and verifies bearer tokens.
    pub signer: Arc<TokenSigner>,
    /// Time source for token validity and timestamps.
    pub clock: Arc<dyn Clock>,
}

impl<R: Repository> AppState<R> {
    /// Create state with the system clock.
    #[must_use]
    pub fn new(repo: R, signer: TokenSigner) -> Self {
        Self {
            repo,
            signer: Arc::new(signer),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

// Manual impl: `R: Clone` is enough, the clock needs no bound.
impl<R: Clone> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            signer: Arc::clone(&self.signer),
            clock: Arc::clone(&self.clock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    #[test]
    fn state_is_clone_and_shares_the_repository() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState<InMemoryRepository>>();

        let state = AppState::new(InMemoryRepository::new(), TokenSigner::new(Default::default()));
        let copy = state.clone();
        assert!(Arc::ptr_eq(&state.signer, &copy.signer));
    }
}
