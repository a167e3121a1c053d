#![cfg(all(feature = "web", target_arch = "wasm32"))]

use dioxus_measure::{
    web::{ObjectProbe, WebFrameScheduler, FALLBACK_FRAME_MS},
    Container, FrameScheduler, MeasureError, Measurement, ResizeListener, ResizeProbe,
    SENSOR_STYLE,
};
use futures_channel::oneshot;
use gloo::{
    events::EventListener,
    timers::callback::Timeout,
    utils::{body, document},
};
use std::{cell::Cell, rc::Rc};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlIFrameElement};

wasm_bindgen_test_configure!(run_in_browser);

fn sized_div(width: u32, height: u32) -> Element {
    let div = document().create_element("div").unwrap();
    resize(&div, width, height);
    body().append_child(&div).unwrap();
    div
}

fn resize(div: &Element, width: u32, height: u32) {
    div.set_attribute(
        "style",
        &format!("position: relative; width: {width}px; height: {height}px"),
    )
    .unwrap();
}

/// A container holding a sensor object, and a receiver that fires once the object has loaded
fn sensor_div(width: u32, height: u32) -> (Element, oneshot::Receiver<()>) {
    let div = sized_div(width, height);
    let object = document().create_element("object").unwrap();
    object.set_class_name(ObjectProbe::CLASS);
    object.set_attribute("style", SENSOR_STYLE).unwrap();
    object.set_attribute("data", "about:blank").unwrap();

    let (tx, loaded) = oneshot::channel();
    EventListener::once(&object, "load", move |_| {
        let _ = tx.send(());
    })
    .forget();

    div.append_child(&object).unwrap();
    (div, loaded)
}

fn counting(hits: &Rc<Cell<usize>>) -> ResizeListener {
    let hits = hits.clone();
    ResizeListener::new(move || hits.set(hits.get() + 1))
}

async fn sleep(millis: u32) {
    let (tx, rx) = oneshot::channel();
    let _timeout = Timeout::new(millis, move || {
        let _ = tx.send(());
    });
    let _ = rx.await;
}

async fn next_frame() {
    let (tx, rx) = oneshot::channel();
    let _frame = gloo::render::request_animation_frame(move |_| {
        let _ = tx.send(());
    });
    let _ = rx.await;
}

#[wasm_bindgen_test]
fn reads_the_bounding_box() {
    let div = sized_div(120, 80);
    assert_eq!(div.own_size(), Ok(Measurement::new(120.0, 80.0)));

    let child = document().create_element("span").unwrap();
    div.append_child(&child).unwrap();
    assert_eq!(child.parent_size(), Ok(Measurement::new(120.0, 80.0)));

    div.remove();
    assert!(div.own_size().is_err());
}

#[wasm_bindgen_test]
async fn cancelled_frames_never_run() {
    let scheduler = WebFrameScheduler::new();
    let ran = Rc::new(Cell::new(0));

    let kept = ran.clone();
    scheduler.schedule(Box::new(move || kept.set(kept.get() + 1)));
    let cancelled = ran.clone();
    let token = scheduler.schedule(Box::new(move || cancelled.set(cancelled.get() + 10)));
    scheduler.cancel(token);

    next_frame().await;
    next_frame().await;

    assert_eq!(ran.get(), 1);
}

#[wasm_bindgen_test]
async fn windows_without_animation_frames_use_a_timer() {
    let iframe: HtmlIFrameElement = document()
        .create_element("iframe")
        .unwrap()
        .dyn_into()
        .unwrap();
    body().append_child(&iframe).unwrap();

    let window = iframe.content_window().unwrap();
    js_sys::Reflect::set(
        &window,
        &JsValue::from_str("requestAnimationFrame"),
        &JsValue::UNDEFINED,
    )
    .unwrap();

    let nested = iframe.content_document().unwrap();
    let container = nested.create_element("div").unwrap();
    nested
        .document_element()
        .unwrap()
        .append_child(&container)
        .unwrap();

    let scheduler = WebFrameScheduler::new();
    scheduler.bind(&container);

    let ran = Rc::new(Cell::new(0));
    let kept = ran.clone();
    scheduler.schedule(Box::new(move || kept.set(kept.get() + 1)));
    let cancelled = ran.clone();
    let token = scheduler.schedule(Box::new(move || cancelled.set(cancelled.get() + 10)));
    scheduler.cancel(token);
    assert_eq!(ran.get(), 0);

    sleep(FALLBACK_FRAME_MS * 5).await;
    assert_eq!(ran.get(), 1);
}

#[wasm_bindgen_test]
fn probes_without_an_object_are_unavailable() {
    let div = sized_div(10, 10);
    let mut probe = ObjectProbe::find(&div);

    let listener = ResizeListener::new(|| {});
    assert!(matches!(
        probe.attach(&listener),
        Err(MeasureError::SensorUnavailable(_))
    ));
    assert!(!probe.is_listening());
}

#[wasm_bindgen_test]
async fn attaching_before_load_listens_once_loaded() {
    let (div, loaded) = sensor_div(100, 50);
    let hits = Rc::new(Cell::new(0));

    let mut probe = ObjectProbe::find(&div);
    probe.attach(&counting(&hits)).unwrap();

    let _ = loaded.await;
    assert!(probe.is_listening());

    resize(&div, 200, 50);
    sleep(100).await;
    assert!(hits.get() > 0);
}

#[wasm_bindgen_test]
async fn detaching_a_foreign_listener_keeps_the_probe_attached() {
    let (div, loaded) = sensor_div(100, 50);
    let _ = loaded.await;

    let hits = Rc::new(Cell::new(0));
    let attached = counting(&hits);
    let mut probe = ObjectProbe::find(&div);
    probe.attach(&attached).unwrap();
    assert!(probe.is_listening());

    probe.detach(&ResizeListener::new(|| {}));
    assert!(probe.is_listening());

    resize(&div, 160, 50);
    sleep(100).await;
    assert!(hits.get() > 0);

    probe.detach(&attached);
    assert!(!probe.is_listening());

    let before = hits.get();
    resize(&div, 220, 90);
    sleep(100).await;
    assert_eq!(hits.get(), before);
}
