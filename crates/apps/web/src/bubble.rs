use entities::{Entity, LinkPartition, attribute_rows};
use foundation::{DomId, Size, overview_to_html, place_bubble};
use journal::apply_annotations;
use runtime::{FetchTicket, OpenOutcome, ZIndex};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement, MouseEvent};

use crate::{ExplorerState, dom, fetch, gallery, notes, state_gone, with_state};

/// Opens the bubble for `name`, or raises it if it is already open.
pub(crate) fn open(name: &str, entity: &Entity) -> Result<HtmlElement, JsValue> {
    let outcome = with_state(|s| {
        let ExplorerState {
            bubbles, session, ..
        } = s;
        bubbles.open(name, &mut session.stacking)
    })
    .ok_or_else(state_gone)?;

    match outcome {
        OpenOutcome::Promoted { z } => {
            let id = DomId::from_name(name);
            if let Some(el) = dom::html_by_id(id.as_str()) {
                dom::set_z(&el, z)?;
                return Ok(el);
            }
            // Registered but missing from the page: forget it and build anew.
            close(&id);
            open(name, entity)
        }
        OpenOutcome::Created { z, ticket } => {
            let id = ticket.id.clone();
            build(name, entity, z, ticket).inspect_err(|_| close(&id))
        }
    }
}

/// Opens the bubble and positions it beside the pointer on the placement
/// grid.
pub(crate) fn open_near(
    name: &str,
    entity: &Entity,
    page_x: f64,
    page_y: f64,
) -> Result<(), JsValue> {
    let bubble = open(name, entity)?;
    let (width, height) = dom::window_size()?;
    let rules = with_state(|s| s.config.placement()).ok_or_else(state_gone)?;
    let placement = place_bubble(
        page_x,
        page_y,
        Size::new(bubble.offset_width() as f64, bubble.offset_height() as f64),
        Size::new(width, height),
        rules,
    );
    dom::set_px(&bubble, "left", placement.left)?;
    dom::set_px(&bubble, "top", placement.top)
}

/// Removes the bubble and releases its callbacks. Safe to call from one of
/// the bubble's own handlers.
pub(crate) fn close(id: &DomId) {
    let listeners = with_state(|s| s.release_bubble(id)).flatten();
    if let Some(listeners) = listeners {
        listeners.retire();
    }
    if let Some(el) = dom::by_id(id.as_str()) {
        el.remove();
    }
}

/// Attaches `listeners` to the bubble `ticket` was issued for, or releases
/// them if that bubble has closed in the meantime.
fn adopt_bubble_listeners(ticket: &FetchTicket, listeners: dom::Listeners) {
    let stale = with_state(move |s| s.attach_bubble_listeners(ticket, listeners)).flatten();
    if let Some(stale) = stale {
        stale.retire();
    }
}

fn build(name: &str, entity: &Entity, z: ZIndex, ticket: FetchTicket) -> Result<HtmlElement, JsValue> {
    let doc = dom::document()?;
    let bubble = dom::clone_template(&doc, "bubbleTemplate")?;
    bubble.set_id(ticket.id.as_str());
    dom::set_z(&bubble, z)?;

    if let Some(title) = bubble.query_selector(".bubble-title")? {
        title.set_text_content(Some(name));
    }
    let mut listeners = wire_controls(&bubble, &ticket.id)?;

    let body = bubble
        .query_selector(".bubble-body")?
        .ok_or_else(|| JsValue::from_str("bubble template has no .bubble-body"))?;
    render_details(&doc, &body, name, entity, &mut listeners)?;

    dom::body()?.append_child(&bubble)?;
    dom::show(&bubble)?;
    tracing::debug!(%name, z = z.0, callbacks = listeners.len(), "bubble rendered");
    adopt_bubble_listeners(&ticket, listeners);

    load_links(name.to_string(), ticket, body);
    Ok(bubble)
}

fn wire_controls(bubble: &HtmlElement, id: &DomId) -> Result<dom::Listeners, JsValue> {
    let mut listeners = dom::Listeners::default();
    if let Some(close_btn) = bubble.query_selector(".bubble-close")? {
        let id = id.clone();
        listeners.push(dom::on_mouse(&close_btn, "click", move |_| close(&id))?);
    }
    if let Some(header) = bubble.query_selector(".bubble-header")? {
        let id = id.clone();
        listeners.push(dom::on_mouse(&header, "mousedown", move |_| {
            with_state(|s| s.session.drag.begin(id.clone()));
        })?);
        listeners.push(dom::on_mouse(&header, "mouseup", |_| {
            with_state(|s| s.session.drag.end());
        })?);
    }
    let id = id.clone();
    listeners.push(dom::on_mouse(bubble, "mousedown", move |_| {
        let raised = with_state(|s| {
            let ExplorerState {
                bubbles, session, ..
            } = s;
            bubbles.promote_on_press(&id, &mut session.stacking)
        })
        .flatten();
        if let (Some(z), Some(el)) = (raised, dom::html_by_id(id.as_str())) {
            if let Err(err) = dom::set_z(&el, z) {
                tracing::warn!(%id, error = ?err, "bubble not raised");
            }
        }
    })?);
    Ok(listeners)
}

/// Moves the dragged bubble, if any, by the pointer delta.
pub(crate) fn on_pointer_move(e: &MouseEvent) {
    let step = with_state(|s| {
        s.session
            .drag
            .pointer_moved(e.page_x() as f64, e.page_y() as f64)
    })
    .flatten();
    let Some((id, dx, dy)) = step else {
        return;
    };
    let Some(el) = dom::html_by_id(id.as_str()) else {
        return;
    };
    let top = dom::px_or(&el, "top", el.offset_top() as f64) + dy;
    let left = dom::px_or(&el, "left", el.offset_left() as f64) + dx;
    let moved = dom::set_px(&el, "top", top).and_then(|()| dom::set_px(&el, "left", left));
    if let Err(err) = moved {
        tracing::warn!(%id, error = ?err, "bubble drag step failed");
    }
}

fn render_details(
    doc: &Document,
    body: &Element,
    name: &str,
    entity: &Entity,
    listeners: &mut dom::Listeners,
) -> Result<(), JsValue> {
    let Some((image_url, overview_html)) = with_state(|s| {
        let image_url = entity.image().map(|file| s.config.image_url(file));
        let overview_html = entity.overview().map(|text| {
            apply_annotations(
                s.journal.annotations().notes_for(name),
                &overview_to_html(text),
            )
        });
        (image_url, overview_html)
    }) else {
        return Err(state_gone());
    };

    if let Some(url) = image_url {
        let img = dom::create(doc, "img", "fl")?;
        img.set_attribute("src", &url)?;
        body.append_child(&img)?;
    }

    let rows = attribute_rows(entity);
    if !rows.is_empty() {
        let list = doc.create_element("ul")?;
        for row in rows {
            let item = doc.create_element("li")?;
            item.append_child(&dom::create_text(doc, "b", "", &format!("{}:", row.label))?.into())?;
            item.append_child(&doc.create_text_node(&format!(" {}", row.value)))?;
            list.append_child(&item)?;
        }
        let info = dom::create(doc, "div", "info")?;
        info.append_child(&list)?;
        body.append_child(&info)?;
    }
    body.append_child(&dom::create(doc, "div", "cb")?.into())?;

    if let Some(html) = overview_html {
        body.append_child(&dom::create_text(doc, "h2", "", "Overview")?.into())?;
        let overview = dom::create(doc, "div", "overview")?;
        overview.set_inner_html(&html);
        notes::wire_highlights(name, &overview, listeners)?;
        body.append_child(&overview)?;
    }
    Ok(())
}

fn load_links(name: String, ticket: FetchTicket, body: Element) {
    let Some(url) = with_state(|s| format!("{}{}", s.config.data_prefix, ticket.id.links_file()))
    else {
        return;
    };
    spawn_local(async move {
        let links = match fetch::fetch_links(&url).await {
            Ok(links) => links,
            Err(err) => {
                tracing::warn!(%url, error = %err, "links unavailable");
                return;
            }
        };
        if with_state(|s| s.bubbles.is_current(&ticket)) != Some(true) {
            tracing::debug!(id = %ticket.id, "bubble closed before its links arrived");
            return;
        }
        let mut listeners = dom::Listeners::default();
        if let Err(err) = render_links(&body, &links.partition(&name), &mut listeners) {
            tracing::warn!(%name, error = ?err, "link render failed");
        }
        adopt_bubble_listeners(&ticket, listeners);
    });
}

fn render_links(
    body: &Element,
    partition: &LinkPartition,
    listeners: &mut dom::Listeners,
) -> Result<(), JsValue> {
    render_link_section(body, "Primary Links", &partition.primary, listeners)?;
    render_link_section(body, "Secondary Links", &partition.secondary, listeners)
}

fn render_link_section(
    body: &Element,
    heading: &str,
    names: &[String],
    listeners: &mut dom::Listeners,
) -> Result<(), JsValue> {
    if names.is_empty() {
        return Ok(());
    }
    let resolved = with_state(|s| {
        s.entities
            .resolve_all(names.iter().map(String::as_str))
            .into_iter()
            .map(|r| (r.name.to_string(), r.entity.clone()))
            .collect::<Vec<_>>()
    })
    .ok_or_else(state_gone)?;

    let doc = dom::document()?;
    body.append_child(&dom::create_text(&doc, "h2", "", heading)?.into())?;
    for (name, entity) in &resolved {
        gallery::append_tile(body, name, entity, listeners)?;
    }
    body.append_child(&dom::create(&doc, "div", "cb")?.into())?;
    Ok(())
}
