//! Browser bindings: measuring `web_sys` elements, frame scheduling and the `<object>` resize probe.

use crate::{
    Container, FrameCallback, FrameScheduler, FrameToken, MeasureError, Measurement, ReadError,
    ResizeListener, ResizeProbe,
};
use gloo::events::EventListener;
use rustc_hash::FxHashMap;
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Element, HtmlObjectElement, Window};

/// How long a frame lasts when the window has no `requestAnimationFrame`
pub const FALLBACK_FRAME_MS: u32 = 20;

impl Container for Element {
    fn own_size(&self) -> Result<Measurement, ReadError> {
        if !self.is_connected() {
            return Err(ReadError::Detached);
        }

        let rect = self.get_bounding_client_rect();
        Ok(Measurement::new(rect.width(), rect.height()))
    }

    fn parent_size(&self) -> Result<Measurement, ReadError> {
        if !self.is_connected() {
            return Err(ReadError::Detached);
        }

        self.parent_element().ok_or(ReadError::NoParent)?.own_size()
    }
}

/// Schedules callbacks with `requestAnimationFrame`, falling back to a short timer on windows without it.
///
/// Frames are requested from the window the container lives in once the scheduler is [bound](Self::bind) to it, and
/// from the global window before that. Creating the scheduler does not touch any window, so it can be created during
/// server rendering.
#[derive(Default)]
pub struct WebFrameScheduler {
    window: RefCell<Option<Window>>,
    next_id: Cell<u64>,
    frames: RefCell<FxHashMap<u64, PendingFrame>>,
}

struct PendingFrame {
    window: Window,
    handle: FrameHandle,
    fired: Rc<Cell<bool>>,
    _callback: Closure<dyn FnMut()>,
}

enum FrameHandle {
    Animation(i32),
    Timeout(i32),
}

impl Drop for PendingFrame {
    fn drop(&mut self) {
        if self.fired.get() {
            return;
        }

        match self.handle {
            FrameHandle::Animation(handle) => {
                if let Err(err) = self.window.cancel_animation_frame(handle) {
                    tracing::warn!("failed to cancel animation frame: {err:?}");
                }
            }
            FrameHandle::Timeout(handle) => self.window.clear_timeout_with_handle(handle),
        }
    }
}

impl WebFrameScheduler {
    /// Create a new scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Request frames from the window that owns `element` instead of the global window.
    ///
    /// Containers rendered into another frame then follow that frame's refresh cycle.
    pub fn bind(&self, element: &Element) {
        match window_of(element) {
            Some(window) => *self.window.borrow_mut() = Some(window),
            None => tracing::debug!("container has no window, keeping the global one"),
        }
    }

    fn window(&self) -> Window {
        self.window
            .borrow()
            .clone()
            .unwrap_or_else(gloo::utils::window)
    }
}

fn window_of(element: &Element) -> Option<Window> {
    element.owner_document()?.default_view()
}

fn has_animation_frames(window: &Window) -> bool {
    js_sys::Reflect::get(window, &JsValue::from_str("requestAnimationFrame"))
        .is_ok_and(|raf| raf.is_function())
}

impl FrameScheduler for WebFrameScheduler {
    fn schedule(&self, callback: FrameCallback) -> FrameToken {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let token = FrameToken::new(id);

        // Frames that already ran are released lazily. A frame can't drop its own closure while it is running.
        self.frames.borrow_mut().retain(|_, frame| !frame.fired.get());

        let fired = Rc::new(Cell::new(false));
        let run = Closure::once({
            let fired = fired.clone();
            move || {
                callback();
                fired.set(true);
            }
        });

        let window = self.window();
        let requested = match has_animation_frames(&window) {
            true => window
                .request_animation_frame(run.as_ref().unchecked_ref())
                .map(FrameHandle::Animation),
            false => {
                tracing::trace!("requestAnimationFrame is unavailable, falling back to a timer");
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        run.as_ref().unchecked_ref(),
                        FALLBACK_FRAME_MS as i32,
                    )
                    .map(FrameHandle::Timeout)
            }
        };

        match requested {
            Ok(handle) => {
                let frame = PendingFrame {
                    window,
                    handle,
                    fired,
                    _callback: run,
                };
                self.frames.borrow_mut().insert(id, frame);
            }
            Err(err) => tracing::error!("failed to request a frame: {err:?}"),
        }

        token
    }

    fn cancel(&self, token: FrameToken) {
        let frame = self.frames.borrow_mut().remove(&token.id());
        drop(frame);
    }
}

/// Listens to the nested window of the `<object data="about:blank">` element a measured view renders.
///
/// If the nested document has not loaded when the probe is attached, the probe starts listening on the element's
/// `load` event. Every later `load` moves the listener to the new nested window.
pub struct ObjectProbe {
    object: Option<HtmlObjectElement>,
    attached: Option<ResizeListener>,
    resize: Rc<RefCell<Option<EventListener>>>,
    load: Option<EventListener>,
}

impl ObjectProbe {
    /// The class of the probe element
    pub const CLASS: &'static str = "resize-sensor";

    /// Create a probe for an `<object>` element
    pub fn new(object: HtmlObjectElement) -> Self {
        Self::from_element(Some(object))
    }

    /// Find the probe element rendered directly inside `container`.
    ///
    /// If there is none, attaching the probe fails with [`MeasureError::SensorUnavailable`].
    pub fn find(container: &Element) -> Self {
        let object = container
            .query_selector(&format!(":scope > object.{}", Self::CLASS))
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlObjectElement>().ok());

        Self::from_element(object)
    }

    fn from_element(object: Option<HtmlObjectElement>) -> Self {
        Self {
            object,
            attached: None,
            resize: Rc::new(RefCell::new(None)),
            load: None,
        }
    }

    /// Returns true once the probe is listening to its nested window
    pub fn is_listening(&self) -> bool {
        self.resize.borrow().is_some()
    }
}

fn listen(object: &HtmlObjectElement, listener: &ResizeListener) -> Option<EventListener> {
    let nested = object.content_document()?.default_view()?;
    let listener = listener.clone();
    Some(EventListener::new(&nested, "resize", move |_| listener.notify()))
}

impl ResizeProbe for ObjectProbe {
    fn attach(&mut self, listener: &ResizeListener) -> Result<(), MeasureError> {
        let Some(object) = &self.object else {
            return Err(MeasureError::SensorUnavailable(format!(
                "no `object.{}` element was found in the container",
                Self::CLASS
            )));
        };

        self.attached = Some(listener.clone());

        match listen(object, listener) {
            Some(resize) => *self.resize.borrow_mut() = Some(resize),
            None => tracing::trace!("waiting for the resize sensor document to load"),
        }

        // the nested document is replaced whenever the object (re)loads
        let resize = self.resize.clone();
        let loaded = object.clone();
        let listener = listener.clone();
        self.load = Some(EventListener::new(object, "load", move |_| {
            match listen(&loaded, &listener) {
                Some(listening) => *resize.borrow_mut() = Some(listening),
                None => tracing::warn!(
                    "resize sensor loaded without a nested window. The container will only be measured once"
                ),
            }
        }));

        Ok(())
    }

    fn detach(&mut self, listener: &ResizeListener) {
        if self.attached.as_ref() != Some(listener) {
            tracing::warn!("refusing to detach a listener that is not attached to this probe");
            return;
        }

        self.attached = None;
        self.load = None;
        self.resize.borrow_mut().take();
    }
}
