//! The per-instance measurement state machine behind a measured view.
//!
//! ```text
//! Unmounted --mount--> Measuring --first non-zero measurement--> Ready
//!                          |                                       |
//!                          +----------------unmount----------------+--> Destroyed
//! ```
//!
//! The controller is renderer agnostic: it is handed a container, a probe and a frame scheduler and reports every
//! change of its [`MeasureState`] through a callback.

use crate::{
    FrameDebouncer, FrameScheduler, MeasureResult, Measurement, ReaderPair, ResizeListener,
    ResizeProbe, ResizeSensor,
};
use std::{
    cell::RefCell,
    fmt::{Debug, Formatter},
    rc::Rc,
};

/// Where a measured view is in its lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Created but not attached to the document yet
    #[default]
    Unmounted,
    /// Attached, but every measurement so far was `0x0`
    Measuring,
    /// At least one measurement had some extent. The wrapped view is rendered
    Ready,
    /// Torn down. No further measurements or state changes happen
    Destroyed,
}

impl Phase {
    /// Returns true while the view is attached and measuring
    pub fn is_mounted(&self) -> bool {
        matches!(self, Phase::Measuring | Phase::Ready)
    }
}

/// A snapshot of a measured view's state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasureState {
    /// The latest measurement of the container
    pub measurement: Measurement,
    /// The lifecycle phase
    pub phase: Phase,
}

impl MeasureState {
    /// Returns true if the wrapped view should be rendered
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }
}

/// Owns the measurement state, the resize sensor and the pending frame of one measured view.
///
/// Clones share the same state. Callbacks from the sensor and the scheduler only hold weak references, and every one
/// of them checks that the view is still mounted before touching any state.
pub struct MeasureController<N: 'static> {
    inner: Rc<RefCell<Inner<N>>>,
}

struct Inner<N> {
    state: MeasureState,
    readers: ReaderPair<N>,
    container: Option<N>,
    sensor: Option<ResizeSensor>,
    debouncer: FrameDebouncer,
    on_change: Option<Rc<dyn Fn(MeasureState)>>,
}

impl<N: 'static> MeasureController<N> {
    /// Create an unmounted controller
    pub fn new(readers: ReaderPair<N>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state: MeasureState::default(),
                readers,
                container: None,
                sensor: None,
                debouncer: FrameDebouncer::new(scheduler),
                on_change: None,
            })),
        }
    }

    /// Call `on_change` whenever the measurement or phase changes while mounted.
    ///
    /// The callback is released when the controller is unmounted.
    pub fn on_change(&self, on_change: impl Fn(MeasureState) + 'static) {
        self.inner.borrow_mut().on_change = Some(Rc::new(on_change));
    }

    /// Attach to a container.
    ///
    /// This attaches the resize sensor and takes the first measurement synchronously. A probe without a nested
    /// environment is not an error: the view keeps its first measurement and never updates. A failing reader is
    /// returned as an error, although the controller stays mounted and will read again on the next resize.
    pub fn mount(
        &self,
        container: N,
        probe: impl ResizeProbe + 'static,
    ) -> MeasureResult<MeasureState> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state.phase != Phase::Unmounted {
                tracing::warn!(phase = ?inner.state.phase, "ignoring mount of a measured view that is not unmounted");
                return Ok(inner.state);
            }
            inner.state.phase = Phase::Measuring;
            inner.container = Some(container);
        }

        let mut sensor = ResizeSensor::new(probe, self.listener());
        if let Err(err) = sensor.attach() {
            tracing::warn!("{err}. The container will only be measured once");
        }
        self.inner.borrow_mut().sensor = Some(sensor);

        tracing::debug!("measured view mounted");
        let mounted = self.state();
        match self.remeasure() {
            // the first measurement was 0x0, report the phase change on its own
            Ok(Some(measured)) if measured == mounted => self.emit(mounted),
            Ok(_) => {}
            Err(err) => {
                self.emit(mounted);
                return Err(err);
            }
        }

        Ok(self.state())
    }

    /// Handle a resize notification by queueing one re-measurement on the next frame.
    ///
    /// Bursts of notifications within a frame collapse into a single re-measurement.
    pub fn notify_resize(&self) {
        let inner = self.inner.borrow();
        if !inner.state.phase.is_mounted() {
            tracing::trace!(phase = ?inner.state.phase, "ignoring resize notification");
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        inner.debouncer.request(move || {
            let Some(inner) = weak.upgrade() else {
                tracing::trace!("frame fired after its measured view was dropped");
                return;
            };

            if let Err(err) = (MeasureController { inner }).remeasure() {
                tracing::error!("failed to re-measure container: {err}");
            }
        });
    }

    /// Measure the container now.
    ///
    /// Returns `Ok(None)` without touching any state if the view is not mounted.
    pub fn remeasure(&self) -> MeasureResult<Option<MeasureState>> {
        let measured = {
            let inner = self.inner.borrow();
            let container = match (&inner.container, inner.state.phase.is_mounted()) {
                (Some(container), true) => container,
                _ => {
                    tracing::trace!(phase = ?inner.state.phase, "skipping measurement of an unmounted view");
                    return Ok(None);
                }
            };
            inner.readers.measure(container)?
        };

        let (state, on_change) = {
            let mut inner = self.inner.borrow_mut();
            let previous = inner.state;

            inner.state.measurement = measured;
            if inner.state.phase == Phase::Measuring && !measured.is_zero() {
                tracing::debug!(%measured, "container has a size, rendering the measured view");
                inner.state.phase = Phase::Ready;
            }

            match inner.state == previous {
                true => return Ok(Some(previous)),
                false => (inner.state, inner.on_change.clone()),
            }
        };

        tracing::trace!(measurement = %state.measurement, "container measured");
        if let Some(on_change) = on_change {
            on_change(state);
        }

        Ok(Some(state))
    }

    fn emit(&self, state: MeasureState) {
        let on_change = self.inner.borrow().on_change.clone();
        if let Some(on_change) = on_change {
            on_change(state);
        }
    }

    /// Detach from the container.
    ///
    /// The sensor listener is removed and the pending frame is cancelled before this returns. The controller cannot
    /// be mounted again.
    pub fn unmount(&self) {
        let sensor = {
            let mut inner = self.inner.borrow_mut();
            if inner.state.phase == Phase::Destroyed {
                return;
            }

            inner.state.phase = Phase::Destroyed;
            inner.debouncer.cancel();
            inner.on_change = None;
            inner.container = None;
            inner.sensor.take()
        };

        if let Some(mut sensor) = sensor {
            sensor.detach();
        }

        tracing::debug!("measured view unmounted");
    }

    /// The current state
    pub fn state(&self) -> MeasureState {
        self.inner.borrow().state
    }

    /// The latest measurement
    pub fn measurement(&self) -> Measurement {
        self.state().measurement
    }

    /// The lifecycle phase
    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    /// Returns true if a re-measurement is waiting for the next frame
    pub fn is_pending(&self) -> bool {
        self.inner.borrow().debouncer.is_pending()
    }

    /// Returns true if the resize sensor is attached and reporting
    pub fn is_sensing(&self) -> bool {
        self.inner
            .borrow()
            .sensor
            .as_ref()
            .is_some_and(ResizeSensor::is_attached)
    }

    fn listener(&self) -> ResizeListener {
        let weak = Rc::downgrade(&self.inner);
        ResizeListener::new(move || match weak.upgrade() {
            Some(inner) => MeasureController { inner }.notify_resize(),
            None => tracing::trace!("resize notification for a dropped measured view"),
        })
    }
}

impl<N: 'static> Clone for MeasureController<N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<N: 'static> Debug for MeasureController<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MeasureController")
            .field("state", &inner.state)
            .field("sensor", &inner.sensor)
            .field("debouncer", &inner.debouncer)
            .finish()
    }
}
