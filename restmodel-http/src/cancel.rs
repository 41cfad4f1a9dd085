//! Provider-scoped request cancellation.
//!
//! One [`CancelSource`] belongs to one provider. Every request the provider
//! issues watches a [`CancelToken`] subscribed to that source, so a single
//! `cancel` aborts whatever is in flight. The source is never re-armed: once
//! cancelled, tokens handed out later observe the cancellation immediately.

use restmodel_model::Cancelled;
use tokio::sync::watch;

#[derive(Debug)]
pub struct CancelSource {
    state: watch::Sender<Cancelled>,
}

impl CancelSource {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Cancelled::No);
        Self { state }
    }

    /// Cancels the source. Only the first call takes effect; returns whether
    /// this call did.
    pub fn cancel(&self, message: Option<String>) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_cancelled() {
                return false;
            }
            *state = Cancelled::from(message);
            true
        })
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().is_cancelled()
    }

    /// The current cancellation state.
    pub fn state(&self) -> Cancelled {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            state: self.state.subscribe(),
        }
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    state: watch::Receiver<Cancelled>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().is_cancelled()
    }

    /// Resolves once the source is cancelled, immediately if it already is.
    pub async fn cancelled(&mut self) -> Cancelled {
        if let Ok(state) = self.state.wait_for(Cancelled::is_cancelled).await {
            return Cancelled::clone(&state);
        }

        // Source dropped without cancelling: nothing can cancel us anymore.
        std::future::pending().await
    }
}
