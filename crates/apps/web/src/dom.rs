use runtime::{ScrollMetrics, ZIndex};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, HtmlTextAreaElement,
    MouseEvent, Window,
};

/// Containers owned by the three top-level views. Switching views removes
/// all of them.
pub(crate) const VIEW_IDS: [&str; 3] = ["images", "map", "notes"];

pub(crate) fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub(crate) fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub(crate) fn body() -> Result<HtmlElement, JsValue> {
    document()?
        .body()
        .ok_or_else(|| JsValue::from_str("no document body"))
}

pub(crate) fn by_id(id: &str) -> Option<Element> {
    web_sys::window()?.document()?.get_element_by_id(id)
}

pub(crate) fn html_by_id(id: &str) -> Option<HtmlElement> {
    by_id(id)?.dyn_into().ok()
}

pub(crate) fn create(doc: &Document, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
    let el: HtmlElement = doc.create_element(tag)?.dyn_into()?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Ok(el)
}

pub(crate) fn create_text(
    doc: &Document,
    tag: &str,
    class: &str,
    text: &str,
) -> Result<HtmlElement, JsValue> {
    let el = create(doc, tag, class)?;
    el.set_text_content(Some(text));
    Ok(el)
}

/// Deep-clones a hidden template element from the page.
pub(crate) fn clone_template(doc: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    let template = doc
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id} template")))?;
    let copy: HtmlElement = template.clone_node_with_deep(true)?.dyn_into()?;
    copy.remove_attribute("id")?;
    Ok(copy)
}

pub(crate) fn clear_views() -> Result<(), JsValue> {
    let doc = document()?;
    for id in VIEW_IDS {
        if let Some(el) = doc.get_element_by_id(id) {
            el.remove();
        }
    }
    Ok(())
}

pub(crate) fn set_px(el: &HtmlElement, prop: &str, value: f64) -> Result<(), JsValue> {
    el.style().set_property(prop, &format!("{value}px"))
}

pub(crate) fn set_z(el: &HtmlElement, z: ZIndex) -> Result<(), JsValue> {
    el.style().set_property("z-index", &z.0.to_string())
}

pub(crate) fn show(el: &HtmlElement) -> Result<(), JsValue> {
    el.style().set_property("display", "block")
}

/// Leading integer of a CSS length such as `"120px"`.
pub(crate) fn parse_px(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(raw.len(), |(i, _)| i);
    raw[..end].parse::<i64>().ok().map(|v| v as f64)
}

pub(crate) fn px_or(el: &HtmlElement, prop: &str, fallback: f64) -> f64 {
    el.style()
        .get_property_value(prop)
        .ok()
        .and_then(|v| parse_px(&v))
        .unwrap_or(fallback)
}

pub(crate) fn scroll_top() -> Result<f64, JsValue> {
    window()?.page_y_offset()
}

pub(crate) fn scroll_metrics() -> Result<ScrollMetrics, JsValue> {
    let win = window()?;
    let doc = document()?;
    let mut document_height = 0.0_f64;
    if let Some(root) = doc.document_element() {
        document_height = document_height
            .max(root.scroll_height() as f64)
            .max(root.client_height() as f64);
    }
    if let Some(body) = doc.body() {
        document_height = document_height
            .max(body.scroll_height() as f64)
            .max(body.offset_height() as f64);
    }
    Ok(ScrollMetrics {
        scroll_top: win.page_y_offset()?,
        window_height: win.inner_height()?.as_f64().unwrap_or(0.0),
        document_height,
    })
}

pub(crate) fn window_size() -> Result<(f64, f64), JsValue> {
    let win = window()?;
    Ok((
        win.inner_width()?.as_f64().unwrap_or(0.0),
        win.inner_height()?.as_f64().unwrap_or(0.0),
    ))
}

/// Current value of a textarea or input; text content for anything else.
pub(crate) fn form_value(el: &Element) -> String {
    if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        return area.value();
    }
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return input.value();
    }
    el.text_content().unwrap_or_default()
}

/// An event listener, removed from its target when dropped.
pub(crate) struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Option<Closure<dyn FnMut(Event)>>,
}

impl Listener {
    pub(crate) fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback: Some(callback),
        })
    }

    pub(crate) fn detach(&self) {
        let Some(callback) = &self.callback else {
            return;
        };
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.event, callback.as_ref().unchecked_ref())
        {
            tracing::debug!(event = self.event, error = ?err, "listener removal failed");
        }
    }

    /// Leaves the listener attached for the lifetime of the page.
    pub(crate) fn forget(mut self) {
        if let Some(callback) = self.callback.take() {
            callback.forget();
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Attaches a mouse handler. The handler lives as long as the returned
/// listener.
pub(crate) fn on_mouse(
    target: &EventTarget,
    event: &'static str,
    mut handler: impl FnMut(MouseEvent) + 'static,
) -> Result<Listener, JsValue> {
    Listener::new(target, event, move |e: Event| {
        if let Ok(mouse) = e.dyn_into::<MouseEvent>() {
            handler(mouse);
        }
    })
}

/// Callbacks owned by one piece of UI: a view, a bubble or a popup.
#[derive(Default)]
pub(crate) struct Listeners {
    listeners: Vec<Listener>,
    callbacks: Vec<Closure<dyn FnMut()>>,
}

impl Listeners {
    pub(crate) fn push(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub(crate) fn push_callback(&mut self, callback: Closure<dyn FnMut()>) {
        self.callbacks.push(callback);
    }

    pub(crate) fn extend(&mut self, mut other: Listeners) {
        self.listeners.append(&mut other.listeners);
        self.callbacks.append(&mut other.callbacks);
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len() + self.callbacks.len()
    }

    /// Detaches everything now and frees the closures once the current
    /// event has finished, since one of them may be the caller.
    pub(crate) fn retire(self) {
        if self.len() == 0 {
            return;
        }
        for listener in &self.listeners {
            listener.detach();
        }
        spawn_local(async move { drop(self) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_px_reads_leading_integer() {
        assert_eq!(parse_px("120px"), Some(120.0));
        assert_eq!(parse_px(" -35px "), Some(-35.0));
        assert_eq!(parse_px("12.75px"), Some(12.0));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(parse_px(""), None);
    }
}
