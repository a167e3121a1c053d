//! The measuring wrapper: a component factory that injects the container size into a component's props.

use crate::{
    web::{ObjectProbe, WebFrameScheduler},
    FrameScheduler, MeasureController, MeasureState, Reader, ReaderPair, WithDimensions,
};
use dioxus::dioxus_core::{DynamicNode, Properties};
use dioxus::prelude::*;
use std::{
    fmt::{Debug, Formatter},
    rc::Rc,
};
use web_sys::Element as DomElement;

/// Inline style of the resize sensor. It covers the container, sits behind everything and never takes pointer input.
pub const SENSOR_STYLE: &str = "display: block; position: absolute; top: 0; left: 0; height: 100%; width: 100%; overflow: hidden; pointer-events: none; z-index: -1;";

/// Configuration for a measured view.
///
/// This follows the builder pattern and is fixed once a view is wrapped:
///
/// ```rust
/// # use dioxus::prelude::*;
/// # use dioxus_measure::{with_dimensions, MeasureIt};
/// #[derive(Props, Clone, PartialEq)]
/// struct PanelProps {
///     #[props(default)]
///     width: f64,
///     #[props(default)]
///     height: f64,
/// }
///
/// with_dimensions!(PanelProps { width: width, height: height });
///
/// fn Panel(props: PanelProps) -> Element {
///     rsx! { "{props.width} x {props.height}" }
/// }
///
/// // report the size the parent gives the wrapper, but ignore its padding
/// let panel = MeasureIt::parent_box()
///     .get_height(|container| {
///         let height = container.parent_element().map(|parent| parent.client_height());
///         height.unwrap_or_default() as f64
///     })
///     .wrap(Panel);
/// ```
#[derive(Clone)]
pub struct MeasureIt {
    readers: ReaderPair<DomElement>,
    scheduler: Option<Rc<dyn FrameScheduler>>,
}

impl MeasureIt {
    /// Measure the wrapper's own box
    pub fn new() -> Self {
        Self {
            readers: ReaderPair::self_box(),
            scheduler: None,
        }
    }

    /// Measure the box of the wrapper's parent
    pub fn parent_box() -> Self {
        Self {
            readers: ReaderPair::parent_box(),
            ..Self::new()
        }
    }

    /// Read the width with a custom function. The function receives the wrapper element.
    pub fn get_width(self, read: impl Fn(&DomElement) -> f64 + 'static) -> Self {
        Self {
            readers: self.readers.with_width(Reader::new(read)),
            ..self
        }
    }

    /// Read the height with a custom function. The function receives the wrapper element.
    pub fn get_height(self, read: impl Fn(&DomElement) -> f64 + 'static) -> Self {
        Self {
            readers: self.readers.with_height(Reader::new(read)),
            ..self
        }
    }

    /// Replace both readers
    pub fn readers(self, readers: ReaderPair<DomElement>) -> Self {
        Self { readers, ..self }
    }

    /// Queue re-measurements on a custom frame scheduler.
    ///
    /// Defaults to a [`WebFrameScheduler`] per measured view.
    pub fn scheduler(self, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            scheduler: Some(scheduler),
            ..self
        }
    }

    /// Wrap a component so it receives the size of its container
    pub fn wrap<P>(self, view: fn(P) -> Element) -> Measured<P>
    where
        P: Properties + WithDimensions + PartialEq,
    {
        Measured { config: self, view }
    }

    // The default scheduler is also returned on its own so it can be bound to the container's window on mount.
    fn frame_scheduler(&self) -> (Rc<dyn FrameScheduler>, Option<Rc<WebFrameScheduler>>) {
        match &self.scheduler {
            Some(scheduler) => (scheduler.clone(), None),
            None => {
                let frames = Rc::new(WebFrameScheduler::new());
                (frames.clone(), Some(frames))
            }
        }
    }
}

impl Default for MeasureIt {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for MeasureIt {
    fn eq(&self, other: &Self) -> bool {
        let same_scheduler = match (&self.scheduler, &other.scheduler) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };

        same_scheduler && self.readers == other.readers
    }
}

impl Debug for MeasureIt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasureIt")
            .field("readers", &self.readers)
            .field("custom_scheduler", &self.scheduler.is_some())
            .finish()
    }
}

/// Wrap `view` with the measuring wrapper described by `config`.
///
/// This is the same as [`MeasureIt::wrap`].
pub fn compose<P>(config: MeasureIt, view: fn(P) -> Element) -> Measured<P>
where
    P: Properties + WithDimensions + PartialEq,
{
    config.wrap(view)
}

/// A component wrapped with a measuring wrapper.
///
/// Every [`Measured::render`] call mounts an independent [`MeasuredView`] with its own measurement state.
pub struct Measured<P> {
    config: MeasureIt,
    view: fn(P) -> Element,
}

impl<P> Measured<P>
where
    P: Properties + WithDimensions + PartialEq,
{
    /// Render the wrapped component with `props`.
    ///
    /// The component only shows up once its container has a size. It then receives `props` with the measured
    /// dimensions merged in.
    pub fn render(&self, props: P) -> Element {
        let node = MeasuredViewProps {
            config: self.config.clone(),
            view: self.view,
            view_props: props,
        }
        .into_vcomponent(MeasuredView::<P>);

        rsx! {
            {DynamicNode::Component(node)}
        }
    }

    /// The configuration of the wrapper
    pub fn config(&self) -> &MeasureIt {
        &self.config
    }
}

impl<P> Clone for Measured<P> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            view: self.view,
        }
    }
}

impl<P> PartialEq for Measured<P> {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config && self.view as usize == other.view as usize
    }
}

impl<P> Debug for Measured<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Measured")
            .field("config", &self.config)
            .field("view", &std::any::type_name::<P>())
            .finish()
    }
}

/// The props of [`MeasuredView`]
#[derive(Props, Clone)]
pub struct MeasuredViewProps<P: Properties + WithDimensions + PartialEq> {
    /// How to measure the container
    pub config: MeasureIt,
    /// The wrapped component
    pub view: fn(P) -> Element,
    /// The props passed through to the wrapped component
    pub view_props: P,
}

impl<P: Properties + WithDimensions + PartialEq> PartialEq for MeasuredViewProps<P> {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.view as usize == other.view as usize
            && self.view_props == other.view_props
    }
}

/// Renders `view` with the measured size of its container.
///
/// The container always holds the hidden resize sensor. The wrapped component is rendered next to it once the
/// container has been measured with a non-zero width or height.
#[allow(non_snake_case)]
pub fn MeasuredView<P: Properties + WithDimensions + PartialEq>(
    props: MeasuredViewProps<P>,
) -> Element {
    let MeasuredViewProps {
        config,
        view,
        view_props,
    } = props;

    let state = use_signal(MeasureState::default);
    let (controller, frames) = use_hook(move || {
        let (scheduler, frames) = config.frame_scheduler();
        let controller = MeasureController::new(config.readers.clone(), scheduler);
        controller.on_change(move |next| {
            let mut state = state;
            // the signal may already be gone if the scope was dropped first
            if let Ok(mut current) = state.try_write() {
                *current = next;
            };
        });
        (controller, frames)
    });

    use_drop({
        let controller = controller.clone();
        move || controller.unmount()
    });

    let mount = move |event: MountedEvent| {
        let Some(container) = event.data().downcast::<DomElement>().cloned() else {
            tracing::warn!("measured views need a web renderer. The container will not be measured");
            return;
        };

        if let Some(frames) = &frames {
            frames.bind(&container);
        }

        let probe = ObjectProbe::find(&container);
        if let Err(err) = controller.mount(container, probe) {
            tracing::error!("failed to measure container: {err}");
        }
    };

    rsx! {
        div {
            class: "measure-it",
            onmounted: mount,
            {measured_node(state(), view_props, view)}
            object {
                class: ObjectProbe::CLASS,
                "data": "about:blank",
                style: SENSOR_STYLE,
                tabindex: "-1",
                aria_hidden: "true",
            }
        }
    }
}

fn measured_node<P>(state: MeasureState, props: P, view: fn(P) -> Element) -> Option<DynamicNode>
where
    P: Properties + WithDimensions,
{
    state.is_ready().then(|| {
        let props = props.with_dimensions(state.measurement);
        DynamicNode::Component(props.into_vcomponent(view))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Measurement, Phase};

    #[derive(Props, Clone, PartialEq)]
    struct LabelProps {
        text: String,
        #[props(default)]
        width: f64,
        #[props(default)]
        height: f64,
    }

    crate::with_dimensions!(LabelProps {
        width: width,
        height: height
    });

    #[allow(non_snake_case)]
    fn Label(props: LabelProps) -> Element {
        rsx! {
            span { "{props.text} {props.width}x{props.height}" }
        }
    }

    fn render_state(state: MeasureState) -> String {
        #[derive(Props, Clone, PartialEq)]
        struct HostProps {
            state: MeasureState,
        }

        #[allow(non_snake_case)]
        fn Host(props: HostProps) -> Element {
            let label = LabelProps {
                text: "chart".to_string(),
                width: 999.0,
                height: 999.0,
            };
            rsx! {
                div { {measured_node(props.state, label, Label)} }
            }
        }

        let mut dom = VirtualDom::new_with_props(Host, HostProps { state });
        dom.rebuild_in_place();
        dioxus_ssr::render(&dom)
    }

    #[test]
    fn measurement_wins_over_same_named_props() {
        let html = render_state(MeasureState {
            measurement: Measurement::new(120.0, 80.0),
            phase: Phase::Ready,
        });

        assert!(html.contains("<span>chart 120x80</span>"), "{html}");
        assert!(!html.contains("999"), "{html}");
    }

    #[test]
    fn nothing_renders_until_ready() {
        for phase in [Phase::Unmounted, Phase::Measuring, Phase::Destroyed] {
            let html = render_state(MeasureState {
                measurement: Measurement::new(120.0, 80.0),
                phase,
            });
            assert!(!html.contains("<span"), "{phase:?} rendered the view: {html}");
        }
    }

    #[test]
    fn one_sided_measurements_render() {
        let html = render_state(MeasureState {
            measurement: Measurement::new(0.0, 50.0),
            phase: Phase::Ready,
        });

        assert!(html.contains("<span>chart 0x50</span>"), "{html}");
    }

    #[test]
    fn configs_compare_by_reader_identity() {
        let config = MeasureIt::new();
        assert_eq!(config.clone(), config);
        assert_ne!(MeasureIt::new(), MeasureIt::new());

        let label = config.clone().wrap(Label);
        assert_eq!(label.clone(), label);
        assert_eq!(compose(config, Label), label);
    }
}
