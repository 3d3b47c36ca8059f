use std::cell::RefCell;
use std::rc::Rc;

use entities::Entity;
use foundation::DomId;
use gloo_timers::callback::Timeout;
use runtime::{LazyQueue, Page, ScrollOutcome, plan_gallery};
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event};

use crate::{adopt_view_listeners, bubble, clear_views, dom, state_gone, with_state};

/// Deferred tiles of the image gallery, fed in pages while the user scrolls.
pub(crate) struct GalleryFeed {
    queue: LazyQueue<(String, Entity)>,
    listener: dom::Listener,
}

/// Pending hover-open for one tile. Replacing or dropping the timer cancels
/// it.
#[derive(Default)]
struct HoverSlot {
    timer: Option<Timeout>,
    existed_before: bool,
}

pub(crate) fn render_active() -> Result<(), JsValue> {
    let entries = with_state(|s| {
        s.session.show(Page::Gallery);
        s.session
            .active
            .and_then(|kind| s.entities.collection(kind))
            .map(|c| {
                c.iter()
                    .map(|(name, e)| (name.to_string(), e.clone()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    })
    .ok_or_else(state_gone)?;
    render_gallery(entries)
}

/// Gallery of visited entities, most recent first, each shown once.
pub(crate) fn render_history() -> Result<(), JsValue> {
    let entries = with_state(|s| {
        s.session.show(Page::History);
        s.journal
            .history()
            .recent_distinct()
            .into_iter()
            .filter_map(|name| {
                let found = s.entities.lookup(name)?;
                Some((found.name.to_string(), found.entity.clone()))
            })
            .collect::<Vec<_>>()
    })
    .ok_or_else(state_gone)?;
    render_gallery(entries)
}

fn render_gallery(entries: Vec<(String, Entity)>) -> Result<(), JsValue> {
    let page_size = with_state(|s| s.config.page_size).ok_or_else(state_gone)?;
    clear_views()?;

    let doc = dom::document()?;
    let images = dom::create(&doc, "div", "images")?;
    images.set_id("images");

    let plan = plan_gallery(entries, page_size, |(_, e)| e.has_image());
    let mut listeners = dom::Listeners::default();
    for (name, entity) in &plan.initial {
        append_tile(&images, name, entity, &mut listeners)?;
    }
    adopt_view_listeners(listeners);
    tracing::debug!(
        rendered = plan.initial.len(),
        deferred = plan.deferred.len(),
        "gallery rendered"
    );

    if !plan.deferred.is_empty() {
        let listener = dom::Listener::new(&dom::window()?.into(), "scroll", |_e: Event| on_scroll())?;
        with_state(|s| {
            s.gallery = Some(GalleryFeed {
                queue: plan.deferred,
                listener,
            })
        });
    }
    dom::body()?.append_child(&images)?;
    Ok(())
}

fn on_scroll() {
    let Ok(metrics) = dom::scroll_metrics() else {
        return;
    };
    let present = dom::by_id("images").is_some();
    let outcome = with_state(|s| {
        let (threshold, page) = (s.config.scroll_threshold_px, s.config.page_size);
        let feed = s.gallery.as_mut()?;
        Some(feed.queue.on_scroll(metrics, threshold, page, present))
    })
    .flatten();

    match outcome {
        None | Some(ScrollOutcome::Idle) => {}
        Some(ScrollOutcome::Detach) => detach_feed(),
        Some(ScrollOutcome::Render { batch, exhausted }) => {
            if let Some(images) = dom::by_id("images") {
                let mut listeners = dom::Listeners::default();
                for (name, entity) in &batch {
                    if let Err(err) = append_tile(&images, name, entity, &mut listeners) {
                        tracing::warn!(%name, error = ?err, "tile render failed");
                    }
                }
                adopt_view_listeners(listeners);
            }
            if exhausted {
                detach_feed();
            }
        }
    }
}

/// Stops the lazy feed. Safe to call from inside its own scroll handler.
pub(crate) fn detach_feed() {
    let Some(feed) = with_state(|s| s.gallery.take()).flatten() else {
        return;
    };
    let mut retired = dom::Listeners::default();
    retired.push(feed.listener);
    retired.retire();
}

/// Appends an image tile for `entity` to `target` and hands its listeners
/// to `listeners`. Entities without an image produce no tile.
pub(crate) fn append_tile(
    target: &Element,
    name: &str,
    entity: &Entity,
    listeners: &mut dom::Listeners,
) -> Result<(), JsValue> {
    let Some(image) = entity.image() else {
        return Ok(());
    };
    let (url, delay) = with_state(|s| (s.config.image_url(image), s.config.hover_delay_ms))
        .ok_or_else(state_gone)?;

    let doc = dom::document()?;
    let tile = dom::create(&doc, "div", "image")?;
    tile.style()
        .set_property("background-image", &format!("url(\"{url}\")"))?;

    let name: Rc<str> = Rc::from(name);
    let entity = Rc::new(entity.clone());
    let hover = Rc::new(RefCell::new(HoverSlot::default()));

    {
        let (name, entity) = (name.clone(), entity.clone());
        listeners.push(dom::on_mouse(&tile, "click", move |_| {
            open_pinned(&name, &entity)
        })?);
    }
    {
        let (name, hover) = (name.clone(), hover.clone());
        listeners.push(dom::on_mouse(&tile, "mouseover", move |e| {
            let id = DomId::from_name(&name);
            let existed_before = with_state(|s| s.bubbles.contains(&id)).unwrap_or(false);
            let (page_x, page_y) = (e.page_x() as f64, e.page_y() as f64);
            let (name, entity) = (name.clone(), entity.clone());
            let timer = Timeout::new(delay, move || {
                if let Err(err) = bubble::open_near(&name, &entity, page_x, page_y) {
                    tracing::warn!(name = %name, error = ?err, "hover bubble failed");
                }
            });
            let mut slot = hover.borrow_mut();
            slot.existed_before = existed_before;
            slot.timer = Some(timer);
        })?);
    }
    listeners.push(dom::on_mouse(&tile, "mouseout", move |_| {
        let (timer, existed_before) = {
            let mut slot = hover.borrow_mut();
            (slot.timer.take(), slot.existed_before)
        };
        drop(timer);
        let id = DomId::from_name(&name);
        let drop_bubble =
            with_state(|s| s.bubbles.should_drop_on_leave(&id, existed_before)).unwrap_or(false);
        if drop_bubble {
            bubble::close(&id);
        }
    })?);

    target.append_child(&tile)?;
    Ok(())
}

/// Opens a bubble that stays put until its close control is used, and
/// records the visit.
pub(crate) fn open_pinned(name: &str, entity: &Entity) {
    if let Err(err) = bubble::open(name, entity) {
        tracing::warn!(%name, error = ?err, "bubble open failed");
        return;
    }
    let id = DomId::from_name(name);
    let recorded = with_state(|s| {
        s.bubbles.pin(&id);
        s.journal.record_visit(name)
    });
    if let Some(Err(err)) = recorded {
        tracing::warn!(%name, error = %err, "visit not persisted");
    }
}
