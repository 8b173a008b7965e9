//! Host fullscreen capability.
//!
//! The host's fullscreen mode is a singleton shared with other actors: the
//! user can leave it without going through the dashboard. Implementations
//! report such changes on the `subscribe` channel.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("the host denied the fullscreen request")]
    Denied,
    #[error("fullscreen is not available on this host")]
    Unsupported,
}

/// Fullscreen state reported by the host outside any request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenChange {
    pub active: bool,
}

#[async_trait]
pub trait FullscreenHost: Send + Sync {
    /// Ask the host to put the map region into fullscreen.
    async fn request_enter(&self) -> Result<(), HostError>;

    async fn request_exit(&self) -> Result<(), HostError>;

    fn subscribe(&self) -> broadcast::Receiver<FullscreenChange>;
}

/// Host that accepts or refuses every request according to a fixed policy.
///
/// Used by the HTTP adapter, where the browser reports escapes through
/// [`StaticHost::notify_exited`].
pub struct StaticHost {
    supported: bool,
    active: AtomicBool,
    changes: broadcast::Sender<FullscreenChange>,
}

impl StaticHost {
    pub fn new(supported: bool) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            supported,
            active: AtomicBool::new(false),
            changes,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// The host left fullscreen on its own (e.g. the user pressed Escape).
    pub fn notify_exited(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            // No subscribers just means nobody is listening any more
            let _ = self.changes.send(FullscreenChange { active: false });
        }
    }
}

#[async_trait]
impl FullscreenHost for StaticHost {
    async fn request_enter(&self) -> Result<(), HostError> {
        if !self.supported {
            return Err(HostError::Unsupported);
        }
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn request_exit(&self) -> Result<(), HostError> {
        if !self.supported {
            return Err(HostError::Unsupported);
        }
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<FullscreenChange> {
        self.changes.subscribe()
    }
}
