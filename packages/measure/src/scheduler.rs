//! Frame scheduling and the per-frame debouncer used for re-measurement.
//!
//! Resize notifications can arrive many times per frame while a user drags a window edge. Re-measuring (and
//! re-rendering the wrapped view) more often than the display refreshes is wasted work, so notifications are funneled
//! through a [`FrameDebouncer`] which keeps at most one re-measurement queued on the next frame.

use std::{
    cell::Cell,
    fmt::{Debug, Formatter},
    rc::Rc,
};

/// A callback that runs once on the next frame
pub type FrameCallback = Box<dyn FnOnce() + 'static>;

/// Identifies a callback queued on a [`FrameScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(u64);

impl FrameToken {
    /// Create a token from a scheduler specific id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The scheduler specific id of this token
    pub const fn id(&self) -> u64 {
        self.0
    }
}

/// Runs callbacks on the next rendering frame.
///
/// The web implementation uses `requestAnimationFrame` (see [`WebFrameScheduler`](crate::web::WebFrameScheduler)).
/// Tests and non-browser renderers can drive frames by hand with
/// [`ManualFrameScheduler`](crate::testing::ManualFrameScheduler).
pub trait FrameScheduler {
    /// Queue `callback` for the next frame.
    fn schedule(&self, callback: FrameCallback) -> FrameToken;

    /// Cancel a queued callback. Cancelling a token that already ran or was already cancelled does nothing.
    fn cancel(&self, token: FrameToken);
}

impl<T: FrameScheduler + ?Sized> FrameScheduler for Rc<T> {
    fn schedule(&self, callback: FrameCallback) -> FrameToken {
        (**self).schedule(callback)
    }

    fn cancel(&self, token: FrameToken) {
        (**self).cancel(token)
    }
}

/// Coalesces a burst of requests into a single action on the next frame.
///
/// Every [`FrameDebouncer::request`] cancels the callback queued by the previous request before queuing its own, so
/// at most one action is outstanding at a time. Dropping the debouncer cancels the outstanding action.
pub struct FrameDebouncer {
    scheduler: Rc<dyn FrameScheduler>,
    state: Rc<DebounceState>,
}

#[derive(Default)]
struct DebounceState {
    pending: Cell<Option<FrameToken>>,
    // Bumped on every request and cancel. A callback only acts if its epoch is still current, so a scheduler that
    // loses a cancellation can never run a superseded action.
    epoch: Cell<u64>,
}

impl FrameDebouncer {
    /// Create a debouncer that queues its actions on `scheduler`
    pub fn new(scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            scheduler,
            state: Rc::new(DebounceState::default()),
        }
    }

    /// Run `action` on the next frame, replacing any action that is still waiting.
    pub fn request(&self, action: impl FnOnce() + 'static) {
        self.cancel();

        let epoch = self.state.epoch.get();
        let state = Rc::downgrade(&self.state);
        let token = self.scheduler.schedule(Box::new(move || {
            let Some(state) = state.upgrade() else {
                tracing::trace!("frame fired after its debouncer was dropped");
                return;
            };

            if state.epoch.get() != epoch {
                tracing::trace!("skipping a superseded frame callback");
                return;
            }

            state.pending.set(None);
            action();
        }));

        tracing::trace!(token = token.id(), "queued re-measurement for the next frame");
        self.state.pending.set(Some(token));
    }

    /// Cancel the waiting action, if any.
    pub fn cancel(&self) {
        self.state.epoch.set(self.state.epoch.get().wrapping_add(1));

        if let Some(token) = self.state.pending.take() {
            tracing::trace!(token = token.id(), "cancelled queued frame");
            self.scheduler.cancel(token);
        }
    }

    /// Returns true if an action is waiting for the next frame
    pub fn is_pending(&self) -> bool {
        self.state.pending.get().is_some()
    }
}

impl Drop for FrameDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl Debug for FrameDebouncer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDebouncer")
            .field("pending", &self.state.pending.get())
            .finish()
    }
}
