use std::cell::RefCell;
use std::rc::Rc;

use entities::Entity;
use journal::highlight_first;
use runtime::Page;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, MouseEvent};

use crate::{adopt_view_listeners, clear_views, dom, gallery, state_gone, with_state};

/// The open note popup and the callbacks wired to it.
pub(crate) struct NotePopup {
    element: HtmlElement,
    listeners: dom::Listeners,
}

impl NotePopup {
    fn dismiss(self) {
        self.element.remove();
        self.listeners.retire();
    }
}

/// Shows the saved note as a tooltip while the pointer rests on one of the
/// highlighted spans inside `overview`.
pub(crate) fn wire_highlights(
    name: &str,
    overview: &Element,
    listeners: &mut dom::Listeners,
) -> Result<(), JsValue> {
    let spans = overview.query_selector_all(".highlight")?;
    let name: Rc<str> = Rc::from(name);
    for i in 0..spans.length() {
        let Some(span) = spans.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let tooltip: Rc<RefCell<Option<HtmlElement>>> = Rc::default();
        {
            let (name, tooltip) = (name.clone(), tooltip.clone());
            listeners.push(dom::on_mouse(&span, "mouseenter", move |e| {
                match show_tooltip(&name, &e) {
                    Ok(Some(el)) => {
                        if let Some(stale) = tooltip.replace(Some(el)) {
                            stale.remove();
                        }
                    }
                    Ok(None) => {}
                    Err(err) => tracing::warn!(error = ?err, "note tooltip failed"),
                }
            })?);
        }
        listeners.push(dom::on_mouse(&span, "mouseleave", move |_| {
            if let Some(el) = tooltip.borrow_mut().take() {
                el.remove();
            }
        })?);
    }
    Ok(())
}

fn show_tooltip(name: &str, e: &MouseEvent) -> Result<Option<HtmlElement>, JsValue> {
    let Some(highlight) = e
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.text_content())
    else {
        return Ok(None);
    };
    let found = with_state(|s| {
        let note = s.journal.annotations().note(name, &highlight)?.to_string();
        Some((note, s.session.stacking.issue(), s.config.tooltip_offset_px))
    })
    .flatten();
    let Some((note, z, offset)) = found else {
        return Ok(None);
    };

    let doc = dom::document()?;
    let tooltip = dom::create_text(&doc, "div", "note", &note)?;
    dom::set_px(&tooltip, "top", e.page_y() as f64 - dom::scroll_top()? + offset)?;
    dom::set_px(&tooltip, "left", e.page_x() as f64 + offset)?;
    dom::set_z(&tooltip, z)?;
    dom::show(&tooltip)?;
    dom::body()?.append_child(&tooltip)?;
    Ok(Some(tooltip))
}

/// Offers the note popup when text was selected inside a bubble.
pub(crate) fn capture_selection(e: &MouseEvent) -> Result<(), JsValue> {
    let selected = match dom::window()?.get_selection()? {
        Some(selection) => String::from(selection.to_string()),
        None => return Ok(()),
    };
    if selected.is_empty() {
        return Ok(());
    }
    let Some(target) = e.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return Ok(());
    };
    let Some(bubble) = target.closest(".bubble")? else {
        return Ok(());
    };
    let name = bubble
        .query_selector(".bubble-title")?
        .and_then(|title| title.text_content())
        .unwrap_or_default();
    if name.is_empty() {
        return Ok(());
    }
    open_note_popup(&bubble, &name, &selected, e)
}

fn open_note_popup(bubble: &Element, name: &str, selected: &str, e: &MouseEvent) -> Result<(), JsValue> {
    let doc = dom::document()?;
    let popup = dom::clone_template(&doc, "noteTemplate")?;
    if let Some(highlight) = popup.query_selector(".highlightText")? {
        highlight.set_text_content(Some(selected));
    }

    let (z, offset) = with_state(|s| (s.session.stacking.issue(), s.config.tooltip_offset_px))
        .ok_or_else(state_gone)?;
    dom::set_px(&popup, "top", e.page_y() as f64 - dom::scroll_top()? - offset)?;
    dom::set_px(&popup, "left", e.page_x() as f64 - offset)?;
    dom::set_z(&popup, z)?;

    let mut listeners = dom::Listeners::default();
    listeners.push(dom::on_mouse(&popup, "mouseleave", |_| dismiss_popup())?);
    if let Some(cancel) = popup.query_selector(".cancel")? {
        listeners.push(dom::on_mouse(&cancel, "click", |_| dismiss_popup())?);
    }
    if let Some(save) = popup.query_selector(".save")? {
        let (popup_el, bubble, name) = (popup.clone(), bubble.clone(), name.to_string());
        listeners.push(dom::on_mouse(&save, "click", move |_| {
            if let Err(err) = save_note(&popup_el, &bubble, &name) {
                tracing::warn!(%name, error = ?err, "note not saved");
            }
            dismiss_popup();
        })?);
    }

    dom::body()?.append_child(&popup)?;
    dom::show(&popup)?;
    let replaced = with_state(|s| {
        s.note_popup.replace(NotePopup {
            element: popup,
            listeners,
        })
    })
    .flatten();
    if let Some(previous) = replaced {
        previous.dismiss();
    }
    Ok(())
}

/// Closes the open note popup, if any. Safe to call from its own handlers.
fn dismiss_popup() {
    if let Some(popup) = with_state(|s| s.note_popup.take()).flatten() {
        popup.dismiss();
    }
}

fn save_note(popup: &HtmlElement, bubble: &Element, name: &str) -> Result<(), JsValue> {
    let highlight = popup
        .query_selector(".highlightText")?
        .and_then(|el| el.text_content())
        .unwrap_or_default();
    let note = popup
        .query_selector(".noteText")?
        .map(|el| dom::form_value(&el))
        .unwrap_or_default();

    let saved = with_state(|s| s.journal.add_note(name, &highlight, &note)).ok_or_else(state_gone)?;
    if let Some(overview) = bubble.query_selector(".overview")? {
        // The new span only gets its tooltip once the bubble is rebuilt.
        overview.set_inner_html(&highlight_first(&overview.inner_html(), &highlight));
    }
    saved.map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Every annotated entity, alphabetically, with its highlights and notes.
pub(crate) fn render_notes_view() -> Result<(), JsValue> {
    let entries = with_state(|s| {
        s.session.show(Page::Notes);
        let annotations = s.journal.annotations();
        annotations
            .entity_names()
            .filter_map(|name| {
                let found = s.entities.lookup(name)?;
                let notes: Vec<(String, String)> = annotations
                    .notes_for(name)?
                    .iter()
                    .map(|(h, n)| (h.to_string(), n.to_string()))
                    .collect();
                Some((name.to_string(), found.entity.clone(), notes))
            })
            .collect::<Vec<(String, Entity, Vec<(String, String)>)>>()
    })
    .ok_or_else(state_gone)?;

    clear_views()?;
    let doc = dom::document()?;
    let view = dom::create(&doc, "div", "notes")?;
    view.set_id("notes");
    let mut listeners = dom::Listeners::default();
    for (name, entity, notes) in &entries {
        let block = dom::create(&doc, "div", "")?;
        gallery::append_tile(&block, name, entity, &mut listeners)?;
        for (highlight, note) in notes {
            block.append_child(&dom::create_text(&doc, "div", "highlightText", highlight)?.into())?;
            block.append_child(&dom::create_text(&doc, "div", "noteText", note)?.into())?;
            block.append_child(&doc.create_element("br")?.into())?;
        }
        block.append_child(&dom::create(&doc, "div", "cb")?.into())?;
        view.append_child(&block)?;
        view.append_child(&doc.create_element("hr")?.into())?;
    }
    adopt_view_listeners(listeners);
    dom::body()?.append_child(&view)?;
    Ok(())
}
