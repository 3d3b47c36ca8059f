use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use entities::{CollectionKind, EntityStore};
use foundation::DomId;
use journal::Journal;
use runtime::{BubbleRegistry, FetchTicket, StackingOrder, ViewMode, ViewSession};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod bubble;
mod config;
mod dom;
mod fetch;
mod gallery;
mod logging;
mod map;
mod notes;
mod storage;

pub use config::{ConfigError, ExplorerConfig, MapConfig};
use storage::ExplorerStore;

// Guard to prevent double-initialization of global state (relevant during hot reload).
static INITIALIZED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

struct ExplorerState {
    config: ExplorerConfig,
    entities: EntityStore,
    journal: Journal<ExplorerStore>,
    session: ViewSession,
    bubbles: BubbleRegistry,

    // Lazy tail of the current image gallery and its scroll listener.
    gallery: Option<gallery::GalleryFeed>,
    // Tile and marker callbacks of the page currently shown.
    view_listeners: dom::Listeners,
    // Controls, highlight spans and link tiles of each open bubble.
    bubble_listeners: BTreeMap<DomId, dom::Listeners>,
    note_popup: Option<notes::NotePopup>,
}

impl ExplorerState {
    fn new(config: ExplorerConfig) -> Self {
        Self {
            journal: Journal::open(ExplorerStore::new(), config.journal_keys()),
            session: ViewSession::new(config.first_z_index),
            entities: EntityStore::new(),
            bubbles: BubbleRegistry::new(),
            gallery: None,
            view_listeners: dom::Listeners::default(),
            bubble_listeners: BTreeMap::new(),
            note_popup: None,
            config,
        }
    }

    fn apply_config(&mut self, config: ExplorerConfig) {
        if config.journal_keys() != self.config.journal_keys() {
            self.journal = Journal::open(ExplorerStore::new(), config.journal_keys());
        }
        if self.bubbles.is_empty() {
            self.session.stacking = StackingOrder::starting_at(config.first_z_index);
        }
        self.config = config;
    }

    /// Forgets a bubble and hands back the callbacks it owned.
    fn release_bubble(&mut self, id: &DomId) -> Option<dom::Listeners> {
        self.bubbles.close(id);
        if self.session.drag.target() == Some(id) {
            self.session.drag.end();
        }
        self.bubble_listeners.remove(id)
    }

    /// Files `listeners` under the bubble `ticket` belongs to. They come back
    /// unfiled when that bubble is gone.
    fn attach_bubble_listeners(
        &mut self,
        ticket: &FetchTicket,
        listeners: dom::Listeners,
    ) -> Option<dom::Listeners> {
        if !self.bubbles.is_current(ticket) {
            return Some(listeners);
        }
        self.bubble_listeners
            .entry(ticket.id.clone())
            .or_default()
            .extend(listeners);
        None
    }
}

thread_local! {
    static STATE: RefCell<ExplorerState> = RefCell::new(ExplorerState::new(ExplorerConfig::default()));
}

/// Runs `f` against the explorer state. Returns `None` during teardown or if
/// the state is already borrowed further up the stack, so callers never
/// panic from inside an event handler.
fn with_state<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut ExplorerState) -> R,
{
    STATE
        .try_with(|state| match state.try_borrow_mut() {
            Ok(mut state) => Some(f(&mut state)),
            Err(_) => {
                tracing::error!("explorer state re-entered");
                None
            }
        })
        .ok()
        .flatten()
}

fn state_gone() -> JsValue {
    JsValue::from_str("explorer state unavailable")
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = info.to_string();
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Avoid double-initialization (can happen during hot-reload edge cases).
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    init_panic_hook();
    logging::init();

    let doc = dom::document()?;
    dom::on_mouse(&doc, "mousemove", |e| bubble::on_pointer_move(&e))?.forget();
    dom::on_mouse(&doc, "mouseup", |e| {
        with_state(|s| s.session.drag.end());
        if let Err(err) = notes::capture_selection(&e) {
            tracing::warn!(error = ?err, "note capture failed");
        }
    })?
    .forget();

    load_collections();
    Ok(())
}

fn load_collections() {
    let Some(prefix) = with_state(|s| s.config.data_prefix.clone()) else {
        return;
    };
    for kind in CollectionKind::LOOKUP_ORDER {
        let url = format!("{prefix}{}", kind.data_file());
        spawn_local(async move {
            match fetch::fetch_collection(&url).await {
                Ok(collection) => {
                    let rerender = with_state(|s| {
                        s.entities.load(kind, collection);
                        s.session.refresh_on_load(kind)
                    });
                    if rerender == Some(true) {
                        show_collection(kind);
                    }
                }
                Err(err) => tracing::error!(%url, error = %err, "collection unavailable"),
            }
        });
    }
}

/// Tears down the page currently shown: its containers, its tile and
/// marker callbacks and any lazy gallery feed.
fn clear_views() -> Result<(), JsValue> {
    gallery::detach_feed();
    if let Some(listeners) = with_state(|s| std::mem::take(&mut s.view_listeners)) {
        listeners.retire();
    }
    dom::clear_views()
}

/// Hands the callbacks of a freshly rendered page to the state.
fn adopt_view_listeners(listeners: dom::Listeners) {
    tracing::debug!(callbacks = listeners.len(), "page callbacks attached");
    with_state(move |s| s.view_listeners.extend(listeners));
}

/// Replaces the explorer configuration with the fields given in `json`;
/// omitted fields take their defaults.
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let config =
        ExplorerConfig::from_json(json).map_err(|err| JsValue::from_str(&err.to_string()))?;
    with_state(|s| s.apply_config(config)).ok_or_else(state_gone)
}

/// Startup view: topics in the image gallery.
#[wasm_bindgen]
pub fn init() -> Result<(), JsValue> {
    with_state(|s| s.session.active = Some(CollectionKind::Topics)).ok_or_else(state_gone)?;
    image_view()
}

/// Makes `kind` the active collection and re-renders the current view if
/// that collection has loaded. Otherwise the view follows once it arrives.
#[wasm_bindgen]
pub fn show_entities(kind: &str) -> Result<(), JsValue> {
    let kind = CollectionKind::parse(kind)
        .ok_or_else(|| JsValue::from_str(&format!("unknown collection {kind:?}")))?;
    with_state(|s| s.session.active = Some(kind)).ok_or_else(state_gone)?;
    show_collection(kind);
    Ok(())
}

fn show_collection(kind: CollectionKind) {
    let Some((loaded, view)) = with_state(|s| (s.entities.is_loaded(kind), s.session.view)) else {
        return;
    };
    if !loaded {
        tracing::debug!(collection = kind.as_str(), "collection not loaded yet");
        return;
    }
    let result = match view.unwrap_or(ViewMode::Image) {
        ViewMode::Image => image_view(),
        ViewMode::Map => map_view(),
    };
    if let Err(err) = result {
        tracing::warn!(collection = kind.as_str(), error = ?err, "view render failed");
    }
}

#[wasm_bindgen]
pub fn image_view() -> Result<(), JsValue> {
    gallery::render_active()
}

#[wasm_bindgen]
pub fn map_view() -> Result<(), JsValue> {
    map::render_active()
}

#[wasm_bindgen]
pub fn notes_view() -> Result<(), JsValue> {
    notes::render_notes_view()
}

#[wasm_bindgen]
pub fn history_view() -> Result<(), JsValue> {
    gallery::render_history()
}

/// `"lat, lng, zoom"` of the map view, or `None` when no map is showing.
#[wasm_bindgen]
pub fn map_info() -> Option<String> {
    map::current_info()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use runtime::OpenOutcome;

    #[test]
    fn apply_config_restarts_stacking_when_no_bubbles_are_open() {
        let mut state = ExplorerState::new(ExplorerConfig::default());
        assert_eq!(state.session.stacking.peek_next(), 100);

        let cfg = ExplorerConfig::from_json(r#"{"first_z_index": 500}"#).unwrap();
        state.apply_config(cfg);
        assert_eq!(state.session.stacking.peek_next(), 500);
        assert_eq!(state.config.first_z_index, 500);
    }

    fn open_bubble(state: &mut ExplorerState, name: &str) -> FetchTicket {
        let ExplorerState {
            bubbles, session, ..
        } = state;
        match bubbles.open(name, &mut session.stacking) {
            OpenOutcome::Created { ticket, .. } => ticket,
            other => panic!("expected a new bubble, got {other:?}"),
        }
    }

    #[test]
    fn closing_a_bubble_releases_its_callbacks() {
        let mut state = ExplorerState::new(ExplorerConfig::default());
        let ticket = open_bubble(&mut state, "Rome");
        assert!(state
            .attach_bubble_listeners(&ticket, dom::Listeners::default())
            .is_none());
        state.session.drag.begin(ticket.id.clone());

        assert!(state.release_bubble(&ticket.id).is_some());
        assert!(state.bubble_listeners.is_empty());
        assert!(!state.bubbles.contains(&ticket.id));
        assert!(state.session.drag.target().is_none());
        assert!(state.release_bubble(&ticket.id).is_none());
    }

    #[test]
    fn callbacks_for_a_closed_bubble_are_handed_back() {
        let mut state = ExplorerState::new(ExplorerConfig::default());
        let stale = open_bubble(&mut state, "Rome");
        state.release_bubble(&stale.id);
        let fresh = open_bubble(&mut state, "Rome");

        assert!(state
            .attach_bubble_listeners(&stale, dom::Listeners::default())
            .is_some());
        assert!(state.bubble_listeners.is_empty());
        assert!(state
            .attach_bubble_listeners(&fresh, dom::Listeners::default())
            .is_none());
        assert_eq!(state.bubble_listeners.len(), 1);
    }

    #[test]
    fn apply_config_keeps_stacking_while_bubbles_are_open() {
        let mut state = ExplorerState::new(ExplorerConfig::default());
        let ExplorerState {
            bubbles, session, ..
        } = &mut state;
        bubbles.open("Rome", &mut session.stacking);

        let cfg = ExplorerConfig::from_json(r#"{"first_z_index": 500}"#).unwrap();
        state.apply_config(cfg);
        assert_eq!(state.session.stacking.peek_next(), 101);
    }
}
