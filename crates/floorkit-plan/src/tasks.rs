//! Background work spawning.
//!
//! Image decoding and top-view baking never run on the render thread when a
//! [`TokioSpawner`] is used. Tasks publish their result into a shared slot
//! and then call the host's [`RepaintRequest`].

use floorkit_core::ExportError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Callback asking the host to schedule a new frame.
pub type RepaintRequest = Arc<dyn Fn() + Send + Sync>;

/// A repaint request that does nothing.
pub fn no_repaint() -> RepaintRequest {
    Arc::new(|| {})
}

/// Runs blocking work somewhere.
pub trait TaskSpawner: Send + Sync + fmt::Debug {
    fn spawn(&self, task: Box<dyn FnOnce() + Send + 'static>);

    /// True when spawned tasks complete before `spawn` returns.
    fn is_inline(&self) -> bool {
        false
    }
}

/// Runs tasks on the blocking thread pool of a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Spawner bound to the runtime the caller runs in, if any.
    pub fn current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        // The join handle is dropped; results travel through the task's slot
        drop(self.handle.spawn_blocking(task));
    }
}

/// Runs tasks immediately on the calling thread.
///
/// Used by print and export, which need every icon before painting, and by
/// tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineSpawner;

impl TaskSpawner for InlineSpawner {
    fn spawn(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        task();
    }

    fn is_inline(&self) -> bool {
        true
    }
}

/// Cooperative cancellation flag shared between an export and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with [`ExportError::Interrupted`] once cancelled.
    pub fn check(&self) -> Result<(), ExportError> {
        if self.is_cancelled() {
            Err(ExportError::Interrupted)
        } else {
            Ok(())
        }
    }
}
