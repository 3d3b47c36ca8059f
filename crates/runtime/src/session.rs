use entities::CollectionKind;
use foundation::DomId;

/// Stacking position of a floating window (CSS `z-index`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZIndex(pub u32);

/// Monotonic z-index source. Values are never reused within a session.
#[derive(Debug)]
pub struct StackingOrder {
    next: u32,
}

impl StackingOrder {
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    pub fn issue(&mut self) -> ZIndex {
        let z = ZIndex(self.next);
        self.next = self.next.saturating_add(1);
        z
    }

    /// The value the next `issue` will hand out.
    pub fn peek_next(&self) -> u32 {
        self.next
    }

    /// `true` when `z` is the most recently issued value.
    pub fn is_top(&self, z: ZIndex) -> bool {
        z.0.saturating_add(1) == self.next
    }
}

impl Default for StackingOrder {
    fn default() -> Self {
        Self::starting_at(100)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewMode {
    Image,
    Map,
}

/// Page currently filling the main area.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Page {
    Gallery,
    Map,
    History,
    Notes,
}

/// Single drag slot for floating windows.
///
/// Pointer deltas are computed against the previous move event; the very
/// first move only records the position.
#[derive(Debug, Default)]
pub struct DragState {
    target: Option<DomId>,
    last_pointer: Option<(f64, f64)>,
}

impl DragState {
    pub fn begin(&mut self, id: DomId) {
        self.target = Some(id);
    }

    pub fn end(&mut self) {
        self.target = None;
    }

    pub fn target(&self) -> Option<&DomId> {
        self.target.as_ref()
    }

    /// Records the pointer and returns the drag target with the delta to
    /// apply, if a drag is active.
    pub fn pointer_moved(&mut self, x: f64, y: f64) -> Option<(DomId, f64, f64)> {
        let Some((last_x, last_y)) = self.last_pointer.replace((x, y)) else {
            return None;
        };
        let target = self.target.clone()?;
        Some((target, x - last_x, y - last_y))
    }
}

/// Per-page interaction context shared by every interactive component.
#[derive(Debug, Default)]
pub struct ViewSession {
    pub stacking: StackingOrder,
    pub drag: DragState,
    pub active: Option<CollectionKind>,
    /// Last gallery-or-map choice; collection switches re-render with it.
    pub view: Option<ViewMode>,
    pub page: Option<Page>,
}

impl ViewSession {
    pub fn new(first_z_index: u32) -> Self {
        Self {
            stacking: StackingOrder::starting_at(first_z_index),
            ..Self::default()
        }
    }

    /// Records the page being shown. History is a gallery, so it also
    /// selects the image view mode; the notes page leaves the mode alone.
    pub fn show(&mut self, page: Page) {
        self.page = Some(page);
        match page {
            Page::Gallery | Page::History => self.view = Some(ViewMode::Image),
            Page::Map => self.view = Some(ViewMode::Map),
            Page::Notes => {}
        }
    }

    /// Whether a collection finishing its load should replace the page:
    /// only when it is the active one and the page shows that collection.
    pub fn refresh_on_load(&self, kind: CollectionKind) -> bool {
        self.active == Some(kind) && matches!(self.page, Some(Page::Gallery | Page::Map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stacking_order_is_strictly_increasing() {
        let mut s = StackingOrder::default();
        let a = s.issue();
        let b = s.issue();
        assert_eq!(a, ZIndex(100));
        assert!(b > a);
        assert!(s.is_top(b));
        assert!(!s.is_top(a));
        assert_eq!(s.peek_next(), 102);
    }

    #[test]
    fn drag_tracks_deltas_only_while_active() {
        let mut d = DragState::default();
        assert_eq!(d.pointer_moved(10.0, 10.0), None);

        d.begin(DomId::from_name("Acme"));
        assert_eq!(
            d.pointer_moved(15.0, 7.0),
            Some((DomId::from_name("Acme"), 5.0, -3.0))
        );

        d.end();
        assert_eq!(d.pointer_moved(20.0, 20.0), None);
        assert!(d.target().is_none());
    }

    #[test]
    fn first_move_of_a_drag_only_records_position() {
        let mut d = DragState::default();
        d.begin(DomId::from_name("Acme"));
        assert_eq!(d.pointer_moved(50.0, 50.0), None);
        assert!(d.pointer_moved(51.0, 50.0).is_some());
    }

    #[test]
    fn history_page_switches_to_image_mode() {
        let mut session = ViewSession::new(100);
        session.show(Page::Map);
        assert_eq!(session.view, Some(ViewMode::Map));

        session.show(Page::History);
        assert_eq!(session.view, Some(ViewMode::Image));
        assert_eq!(session.page, Some(Page::History));
    }

    #[test]
    fn notes_page_keeps_the_last_view_mode() {
        let mut session = ViewSession::new(100);
        session.show(Page::Map);
        session.show(Page::Notes);
        assert_eq!(session.view, Some(ViewMode::Map));
    }

    #[test]
    fn late_load_only_refreshes_collection_pages() {
        let mut session = ViewSession::new(100);
        session.active = Some(CollectionKind::People);
        assert!(!session.refresh_on_load(CollectionKind::People));

        session.show(Page::Gallery);
        assert!(session.refresh_on_load(CollectionKind::People));
        assert!(!session.refresh_on_load(CollectionKind::Topics));

        session.show(Page::Map);
        assert!(session.refresh_on_load(CollectionKind::People));

        session.show(Page::Notes);
        assert!(!session.refresh_on_load(CollectionKind::People));
        session.show(Page::History);
        assert!(!session.refresh_on_load(CollectionKind::People));
    }
}
