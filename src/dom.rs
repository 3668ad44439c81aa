use anyhow::anyhow;
use sketch_core::ContainerMetrics;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Host element measured by the viewport manager.
#[derive(Clone)]
pub struct DomContainer {
    element: web::HtmlElement,
}

impl DomContainer {
    pub fn new(element: web::HtmlElement) -> Self {
        Self { element }
    }
}

impl ContainerMetrics for DomContainer {
    fn css_size(&self) -> (f32, f32) {
        let rect = self.element.get_bounding_client_rect();
        (rect.width() as f32, rect.height() as f32)
    }

    fn device_pixel_ratio(&self) -> f32 {
        web::window()
            .map(|w| w.device_pixel_ratio() as f32)
            .unwrap_or(1.0)
    }

    fn origin(&self) -> (f32, f32) {
        let rect = self.element.get_bounding_client_rect();
        (rect.left() as f32, rect.top() as f32)
    }
}

/// `{ dom, storageKey?, headerOffset? }` passed to `mount`.
pub struct MountConfig {
    pub dom: web::HtmlElement,
    pub storage_key: Option<String>,
    pub header_offset: Option<f32>,
}

impl MountConfig {
    pub fn from_js(config: &JsValue) -> anyhow::Result<Self> {
        if !config.is_object() {
            return Err(anyhow!("mount config must be an object"));
        }
        let get = |name: &str| {
            js_sys::Reflect::get(config, &JsValue::from_str(name))
                .map_err(|e| anyhow!("reading config.{name}: {:?}", e))
        };
        let dom = get("dom")?
            .dyn_into::<web::HtmlElement>()
            .map_err(|_| anyhow!("config.dom must be an HTML element"))?;
        let storage_key = get("storageKey")?.as_string();
        let header_offset = get("headerOffset")?
            .as_f64()
            .map(|v| v as f32)
            .filter(|v| v.is_finite() && *v >= 0.0);
        Ok(Self {
            dom,
            storage_key,
            header_offset,
        })
    }
}

/// Append a canvas filling the container below any header offset.
pub fn create_canvas(
    document: &web::Document,
    container: &web::HtmlElement,
    header_offset: f32,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let canvas = document
        .create_element("canvas")
        .map_err(|e| anyhow!("create canvas: {:?}", e))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow!("{:?}", e))?;
    let style = canvas.style();
    _ = style.set_property("display", "block");
    _ = style.set_property("width", "100%");
    _ = style.set_property("height", &format!("calc(100% - {header_offset}px)"));
    _ = style.set_property("margin-top", &format!("{header_offset}px"));
    _ = style.set_property("touch-action", "none");
    if container.style().get_property_value("position").ok().as_deref() == Some("") {
        _ = container.style().set_property("position", "relative");
    }
    container
        .append_child(&canvas)
        .map_err(|e| anyhow!("append canvas: {:?}", e))?;
    Ok(canvas)
}
