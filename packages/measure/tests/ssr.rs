#![cfg(feature = "web")]
#![allow(non_snake_case)]

use dioxus::prelude::*;
use dioxus_measure::prelude::*;

#[derive(Props, Clone, PartialEq)]
struct ChartProps {
    title: String,
    #[props(default)]
    container_width: f64,
    #[props(default)]
    container_height: f64,
}

with_dimensions!(ChartProps {
    width: container_width,
    height: container_height
});

fn Chart(props: ChartProps) -> Element {
    rsx! {
        figure { "{props.title}: {props.container_width}px x {props.container_height}px" }
    }
}

fn render(app: fn() -> Element) -> String {
    let mut dom = VirtualDom::new(app);
    dom.rebuild_in_place();
    dioxus_ssr::render(&dom)
}

#[test]
fn server_render_only_contains_the_sensor() {
    fn App() -> Element {
        let chart = use_hook(|| MeasureIt::new().wrap(Chart));
        rsx! {
            {chart.render(ChartProps { title: "Sales".to_string(), container_width: 0.0, container_height: 0.0 })}
        }
    }

    let html = render(App);

    assert!(html.contains(r#"class="measure-it""#), "{html}");
    assert!(html.contains(r#"class="resize-sensor""#), "{html}");
    assert!(html.contains(r#"data="about:blank""#), "{html}");
    assert!(!html.contains("<figure"), "{html}");
}

#[test]
fn every_render_gets_its_own_wrapper() {
    fn App() -> Element {
        let chart = use_hook(|| compose(MeasureIt::parent_box(), Chart));
        rsx! {
            for title in ["Sales", "Costs"] {
                {chart.render(ChartProps { title: title.to_string(), container_width: 0.0, container_height: 0.0 })}
            }
        }
    }

    let html = render(App);

    assert_eq!(html.matches("resize-sensor").count(), 2, "{html}");
}
