//! Deterministic stand-ins for the host environment.
//!
//! These let renderers without a browser, and tests, drive frames and resize notifications by hand.

use crate::{FrameCallback, FrameScheduler, FrameToken, MeasureError, ResizeListener, ResizeProbe};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

/// A [`FrameScheduler`] whose frames only advance when [`ManualFrameScheduler::tick`] is called.
#[derive(Default)]
pub struct ManualFrameScheduler {
    next_id: Cell<u64>,
    queue: RefCell<BTreeMap<FrameToken, FrameCallback>>,
}

impl ManualFrameScheduler {
    /// Create a scheduler with no queued frames
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame.
    ///
    /// Runs every callback that was queued before the tick started, in the order they were queued, and returns how
    /// many ran. Callbacks queued while the tick is running wait for the next tick.
    pub fn tick(&self) -> usize {
        let frame_end = self.next_id.get();
        let mut ran = 0;

        loop {
            let callback = {
                let mut queue = self.queue.borrow_mut();
                let first = queue.keys().next().copied();
                match first {
                    Some(token) if token.id() < frame_end => queue.remove(&token),
                    _ => None,
                }
            };

            let Some(callback) = callback else {
                break;
            };

            callback();
            ran += 1;
        }

        ran
    }

    /// The number of callbacks waiting for a frame
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn schedule(&self, callback: FrameCallback) -> FrameToken {
        let token = FrameToken::new(self.next_id.get());
        self.next_id.set(token.id() + 1);
        self.queue.borrow_mut().insert(token, callback);
        token
    }

    fn cancel(&self, token: FrameToken) {
        self.queue.borrow_mut().remove(&token);
    }
}

/// A [`ResizeProbe`] that fires resize notifications on demand.
///
/// Clones share the same listener list, so a test can keep one clone and hand the other to a controller.
#[derive(Clone)]
pub struct ManualProbe {
    inner: Rc<ProbeState>,
}

struct ProbeState {
    available: bool,
    listeners: RefCell<Vec<ResizeListener>>,
}

impl ManualProbe {
    /// A probe whose nested environment is ready
    pub fn new() -> Self {
        Self::with_availability(true)
    }

    /// A probe whose nested environment never becomes ready
    pub fn unavailable() -> Self {
        Self::with_availability(false)
    }

    fn with_availability(available: bool) -> Self {
        Self {
            inner: Rc::new(ProbeState {
                available,
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Deliver a resize notification to every attached listener
    pub fn resize(&self) {
        let listeners = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener.notify();
        }
    }

    /// The number of listeners currently attached
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Returns true if this exact listener is attached
    pub fn is_listening(&self, listener: &ResizeListener) -> bool {
        self.inner.listeners.borrow().contains(listener)
    }
}

impl Default for ManualProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeProbe for ManualProbe {
    fn attach(&mut self, listener: &ResizeListener) -> Result<(), MeasureError> {
        if !self.inner.available {
            return Err(MeasureError::SensorUnavailable(
                "the probe has no nested environment".to_string(),
            ));
        }

        self.inner.listeners.borrow_mut().push(listener.clone());
        Ok(())
    }

    fn detach(&mut self, listener: &ResizeListener) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|attached| attached != listener);
    }
}
