use crate::constants::{PANEL_MARGIN_PX, PANEL_WIDTH_PX, PANEL_Z_INDEX};
use anyhow::anyhow;
use fnv::FnvHashMap;
use gloo_events::EventListener;
use sketch_core::{
    hex_to_rgb, rgb_to_hex, BindingHandle, Control, ControlKind, ControlValue, DebugPanel,
    FrameStats, SyncReport,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

const STATS_EVERY_N_FRAMES: u64 = 15;

struct ControlRow {
    row: web::HtmlElement,
    input: web::HtmlInputElement,
    readout: Option<web::HtmlElement>,
    _listener: EventListener,
}

/// DOM rendering of a [`DebugPanel`]. The node is created and owned here,
/// positioned inside the sketch container and removed on teardown.
pub struct PanelView {
    root: web::HtmlElement,
    stats: web::HtmlElement,
    rows: FnvHashMap<BindingHandle, ControlRow>,
}

fn element(document: &web::Document, tag: &str) -> anyhow::Result<web::HtmlElement> {
    document
        .create_element(tag)
        .map_err(|e| anyhow!("create <{tag}>: {:?}", e))?
        .dyn_into::<web::HtmlElement>()
        .map_err(|e| anyhow!("{:?}", e))
}

fn format_number(v: f32) -> String {
    format!("{}", v)
}

fn read_input(kind: ControlKind, input: &web::HtmlInputElement) -> Option<ControlValue> {
    match kind {
        ControlKind::Number(_) => input.value().trim().parse::<f32>().ok().map(ControlValue::Number),
        ControlKind::Color => hex_to_rgb(&input.value()).map(ControlValue::Color),
        ControlKind::Toggle => Some(ControlValue::Toggle(input.checked())),
    }
}

fn write_input(input: &web::HtmlInputElement, readout: Option<&web::HtmlElement>, value: ControlValue) {
    match value {
        ControlValue::Number(v) => {
            let text = format_number(v);
            input.set_value(&text);
            if let Some(r) = readout {
                r.set_text_content(Some(&text));
            }
        }
        ControlValue::Color(rgb) => input.set_value(&rgb_to_hex(rgb)),
        ControlValue::Toggle(on) => input.set_checked(on),
    }
}

impl PanelView {
    pub fn mount(
        document: &web::Document,
        container: &web::HtmlElement,
        panel: &Rc<RefCell<DebugPanel>>,
        top_px: f32,
    ) -> anyhow::Result<Self> {
        let root = element(document, "div")?;
        root.set_class_name("sketch-panel");
        let style = root.style();
        _ = style.set_property("position", "absolute");
        _ = style.set_property("top", &format!("{}px", top_px + PANEL_MARGIN_PX as f32));
        _ = style.set_property("right", &format!("{}px", PANEL_MARGIN_PX));
        _ = style.set_property("width", &format!("{}px", PANEL_WIDTH_PX));
        _ = style.set_property("z-index", &PANEL_Z_INDEX.to_string());
        _ = style.set_property("padding", "6px 8px");
        _ = style.set_property("background", "rgba(16, 18, 26, 0.85)");
        _ = style.set_property("color", "#e6e6e6");
        _ = style.set_property("font", "12px/1.5 ui-monospace, monospace");
        _ = style.set_property("border-radius", "4px");

        let title = element(document, "div")?;
        _ = title.style().set_property("font-weight", "bold");
        let stats = element(document, "div")?;
        _ = stats.style().set_property("opacity", "0.7");
        _ = root.append_child(&title);
        _ = root.append_child(&stats);

        let mut rows = FnvHashMap::default();
        {
            let model = panel.borrow();
            title.set_text_content(Some(model.title()));

            for control in model.controls_in(None) {
                let row = build_row(document, control, panel)?;
                _ = root.append_child(&row.row);
                rows.insert(control.handle(), row);
            }
            for folder in model.folders() {
                let section = element(document, "fieldset")?;
                _ = section.style().set_property("border", "1px solid #333");
                _ = section.style().set_property("margin", "4px 0");
                let legend = element(document, "legend")?;
                legend.set_text_content(Some(&folder.name));
                _ = section.append_child(&legend);
                for control in model.controls_in(Some(folder.id)) {
                    let row = build_row(document, control, panel)?;
                    _ = section.append_child(&row.row);
                    rows.insert(control.handle(), row);
                }
                _ = root.append_child(&section);
            }
            if !model.visible() {
                _ = style.set_property("display", "none");
            }
        }

        container
            .append_child(&root)
            .map_err(|e| anyhow!("append panel: {:?}", e))?;
        log::info!("[panel] mounted {} controls", rows.len());
        Ok(Self { root, stats, rows })
    }

    /// Push values pulled by [`DebugPanel::sync`] into the inputs and drop
    /// rows whose targets are gone.
    pub fn apply(&mut self, report: &SyncReport) {
        for (handle, value) in &report.updated {
            if let Some(row) = self.rows.get(handle) {
                write_input(&row.input, row.readout.as_ref(), *value);
            }
        }
        for handle in &report.detached {
            if let Some(row) = self.rows.remove(handle) {
                row.row.remove();
            }
        }
    }

    pub fn set_visible(&self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        _ = self.root.style().set_property("display", display);
    }

    pub fn show_stats(&self, stats: &FrameStats, playing: bool) {
        if playing && stats.frame_index % STATS_EVERY_N_FRAMES != 0 {
            return;
        }
        let mut text = format!("{:.1} fps | frame {}", stats.fps, stats.frame_index);
        if !playing {
            text.push_str(" | paused");
        }
        if stats.consecutive_errors > 0 {
            text.push_str(&format!(" | {} errors", stats.consecutive_errors));
        }
        self.stats.set_text_content(Some(&text));
    }

    /// Detach from the document. Input listeners drop with their rows.
    pub fn remove(&mut self) {
        self.rows.clear();
        self.root.remove();
    }
}

fn build_row(
    document: &web::Document,
    control: &Control,
    panel: &Rc<RefCell<DebugPanel>>,
) -> anyhow::Result<ControlRow> {
    let row = element(document, "label")?;
    let style = row.style();
    _ = style.set_property("display", "flex");
    _ = style.set_property("align-items", "center");
    _ = style.set_property("gap", "6px");

    let name = element(document, "span")?;
    name.set_text_content(Some(control.label()));
    _ = name.style().set_property("flex", "0 0 35%");
    _ = name.style().set_property("overflow", "hidden");
    _ = row.append_child(&name);

    let input = document
        .create_element("input")
        .map_err(|e| anyhow!("create <input>: {:?}", e))?
        .dyn_into::<web::HtmlInputElement>()
        .map_err(|e| anyhow!("{:?}", e))?;
    _ = input.style().set_property("flex", "1");
    let kind = control.kind();
    let mut readout = None;
    match kind {
        ControlKind::Number(range) if range.min.is_finite() && range.max.is_finite() => {
            input.set_type("range");
            input.set_min(&format_number(range.min));
            input.set_max(&format_number(range.max));
            input.set_step(&range.step.map(format_number).unwrap_or_else(|| "any".into()));
            let r = element(document, "span")?;
            _ = r.style().set_property("flex", "0 0 3.5em");
            _ = r.style().set_property("text-align", "right");
            readout = Some(r);
        }
        ControlKind::Number(range) => {
            input.set_type("number");
            input.set_step(&range.step.map(format_number).unwrap_or_else(|| "any".into()));
        }
        ControlKind::Color => input.set_type("color"),
        ControlKind::Toggle => input.set_type("checkbox"),
    }
    write_input(&input, readout.as_ref(), control.value());
    _ = row.append_child(&input);
    if let Some(r) = &readout {
        _ = row.append_child(r);
    }

    let handle = control.handle();
    let listener = {
        let panel = Rc::clone(panel);
        let input_el = input.clone();
        let readout = readout.clone();
        EventListener::new(&input, "input", move |_event| {
            let Some(value) = read_input(kind, &input_el) else {
                return;
            };
            let result = panel.borrow_mut().set(handle, value);
            match result {
                // reflect snapping/clamping back into the widget
                Ok(stored) => write_input(&input_el, readout.as_ref(), stored),
                Err(e) => log::warn!("[panel] {}", e),
            }
        })
    };

    Ok(ControlRow {
        row,
        input,
        readout,
        _listener: listener,
    })
}
