//! The resize sensor: a probe that reports every geometry change of the container it sits in.
//!
//! The DOM has no "element resized" event. Window `resize` only covers one of the many ways a container can change
//! size, so the sensor renders a hidden, full-size overlay that hosts a nested blank document instead. The nested
//! document's viewport tracks the overlay box, which tracks the container, so the nested window fires `resize` for
//! window resizes, content reflow and style changes alike.

use crate::MeasureError;
use std::{
    fmt::{Debug, Formatter},
    rc::Rc,
};

/// A resize callback with a stable identity.
///
/// A listener is created once per wrapper and the exact same listener is handed to [`ResizeProbe::detach`] that was
/// handed to [`ResizeProbe::attach`]. Listeners compare equal only to their own clones.
#[derive(Clone)]
pub struct ResizeListener {
    callback: Rc<dyn Fn()>,
}

impl ResizeListener {
    /// Create a new listener
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Deliver a resize notification
    pub fn notify(&self) {
        (self.callback)()
    }
}

impl PartialEq for ResizeListener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl Debug for ResizeListener {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeListener")
            .field("callback", &Rc::as_ptr(&self.callback))
            .finish()
    }
}

/// A host specific probe that forwards native resize notifications.
pub trait ResizeProbe {
    /// Start forwarding resize notifications to `listener`.
    ///
    /// Returns [`MeasureError::SensorUnavailable`] if the probe has no environment to listen to.
    fn attach(&mut self, listener: &ResizeListener) -> Result<(), MeasureError>;

    /// Stop forwarding notifications to `listener`. This must remove exactly the listener that was attached.
    fn detach(&mut self, listener: &ResizeListener);
}

/// Owns a probe and the one listener attached to it.
pub struct ResizeSensor {
    probe: Box<dyn ResizeProbe>,
    listener: ResizeListener,
    attached: bool,
}

impl ResizeSensor {
    /// Create a detached sensor
    pub fn new(probe: impl ResizeProbe + 'static, listener: ResizeListener) -> Self {
        Self {
            probe: Box::new(probe),
            listener,
            attached: false,
        }
    }

    /// Attach the listener to the probe. Attaching an attached sensor does nothing.
    pub fn attach(&mut self) -> Result<(), MeasureError> {
        if self.attached {
            return Ok(());
        }

        self.probe.attach(&self.listener)?;
        self.attached = true;
        Ok(())
    }

    /// Detach the listener from the probe. Detaching a detached sensor does nothing.
    pub fn detach(&mut self) {
        if std::mem::take(&mut self.attached) {
            self.probe.detach(&self.listener);
        }
    }

    /// Returns true while the listener is attached
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The listener this sensor attaches
    pub fn listener(&self) -> &ResizeListener {
        &self.listener
    }
}

impl Drop for ResizeSensor {
    fn drop(&mut self) {
        self.detach();
    }
}

impl Debug for ResizeSensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeSensor")
            .field("listener", &self.listener)
            .field("attached", &self.attached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualProbe;
    use std::cell::Cell;

    #[test]
    fn detach_removes_exactly_the_attached_listener() {
        let probe = ManualProbe::new();
        let bystander = ResizeListener::new(|| {});
        let mut other = probe.clone();
        other.attach(&bystander).unwrap();

        let hits = Rc::new(Cell::new(0));
        let listener = ResizeListener::new({
            let hits = hits.clone();
            move || hits.set(hits.get() + 1)
        });
        let mut sensor = ResizeSensor::new(probe.clone(), listener.clone());

        sensor.attach().unwrap();
        sensor.attach().unwrap();
        assert_eq!(probe.listener_count(), 2);

        probe.resize();
        assert_eq!(hits.get(), 1);

        sensor.detach();
        sensor.detach();
        assert!(!probe.is_listening(&listener));
        assert!(probe.is_listening(&bystander));

        probe.resize();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn dropping_a_sensor_detaches_it() {
        let probe = ManualProbe::new();
        let mut sensor = ResizeSensor::new(probe.clone(), ResizeListener::new(|| {}));
        sensor.attach().unwrap();
        assert_eq!(probe.listener_count(), 1);

        drop(sensor);
        assert_eq!(probe.listener_count(), 0);
    }

    #[test]
    fn unavailable_probes_stay_detached() {
        let probe = ManualProbe::unavailable();
        let mut sensor = ResizeSensor::new(probe.clone(), ResizeListener::new(|| {}));

        assert!(matches!(
            sensor.attach(),
            Err(MeasureError::SensorUnavailable(_))
        ));
        assert!(!sensor.is_attached());
        assert_eq!(probe.listener_count(), 0);
    }
}
