use std::collections::VecDeque;

/// Items waiting to be rendered once the user scrolls near the bottom.
#[derive(Debug)]
pub struct LazyQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for LazyQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

/// Scroll geometry sampled from the window at event time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub window_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn near_bottom(&self, threshold_px: f64) -> bool {
        self.scroll_top + self.window_height >= self.document_height - threshold_px
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScrollOutcome<T> {
    /// Not close enough to the bottom yet.
    Idle,
    /// Render `batch`; when `exhausted` the listener should be removed.
    Render { batch: Vec<T>, exhausted: bool },
    /// The gallery is gone; remove the listener.
    Detach,
}

impl<T> LazyQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn take_page(&mut self, page_size: usize) -> Vec<T> {
        let n = page_size.min(self.items.len());
        self.items.drain(..n).collect()
    }

    pub fn on_scroll(
        &mut self,
        metrics: ScrollMetrics,
        threshold_px: f64,
        page_size: usize,
        container_present: bool,
    ) -> ScrollOutcome<T> {
        if !metrics.near_bottom(threshold_px) {
            return ScrollOutcome::Idle;
        }
        if !container_present {
            return ScrollOutcome::Detach;
        }
        let batch = self.take_page(page_size);
        ScrollOutcome::Render {
            batch,
            exhausted: self.items.is_empty(),
        }
    }
}

/// What a gallery shows up front and what it defers.
#[derive(Debug)]
pub struct GalleryPlan<T> {
    pub initial: Vec<T>,
    pub deferred: LazyQueue<T>,
}

/// Splits `items` into an initial page and a lazy tail. Items rejected by
/// `renderable` are dropped entirely: they neither count toward the page
/// nor take a deferred slot.
pub fn plan_gallery<T, I, F>(items: I, page_size: usize, renderable: F) -> GalleryPlan<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> bool,
{
    let mut initial = Vec::new();
    let mut deferred = LazyQueue::new();
    for item in items.into_iter().filter(|i| renderable(i)) {
        if initial.len() < page_size {
            initial.push(item);
        } else {
            deferred.push(item);
        }
    }
    GalleryPlan { initial, deferred }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bottom() -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: 4_500.0,
            window_height: 800.0,
            document_height: 5_500.0,
        }
    }

    #[test]
    fn imageless_items_never_render_or_queue() {
        let items: Vec<(u32, bool)> = (0..130).map(|i| (i, i % 2 == 0)).collect();
        let plan = plan_gallery(items, 50, |(_, has_image)| *has_image);
        assert_eq!(plan.initial.len(), 50);
        assert_eq!(plan.deferred.len(), 15);
        assert!(plan.initial.iter().all(|(_, img)| *img));
    }

    #[test]
    fn hundred_fifty_items_render_in_two_steps() {
        let mut plan = plan_gallery(0..150, 100, |_| true);
        assert_eq!(plan.initial.len(), 100);
        assert_eq!(plan.deferred.len(), 50);

        match plan.deferred.on_scroll(bottom(), 300.0, 100, true) {
            ScrollOutcome::Render { batch, exhausted } => {
                assert_eq!(batch, (100..150).collect::<Vec<_>>());
                assert!(exhausted);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(plan.deferred.is_empty());
    }

    #[test]
    fn scroll_far_from_bottom_is_idle() {
        let mut q = LazyQueue::new();
        q.push(1);
        let metrics = ScrollMetrics {
            scroll_top: 0.0,
            ..bottom()
        };
        assert_eq!(q.on_scroll(metrics, 300.0, 100, true), ScrollOutcome::Idle);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn threshold_edge_counts_as_near_bottom() {
        let m = ScrollMetrics {
            scroll_top: 4_400.0,
            window_height: 800.0,
            document_height: 5_500.0,
        };
        assert!(m.near_bottom(300.0));
        assert!(!m.near_bottom(299.0));
    }

    #[test]
    fn missing_container_detaches() {
        let mut q = LazyQueue::new();
        q.push(1);
        assert_eq!(q.on_scroll(bottom(), 300.0, 100, false), ScrollOutcome::Detach);
    }

    #[test]
    fn large_tail_pages_until_exhausted() {
        let mut plan = plan_gallery(0..350, 100, |_| true);
        let mut rounds = 0;
        loop {
            rounds += 1;
            match plan.deferred.on_scroll(bottom(), 300.0, 100, true) {
                ScrollOutcome::Render { exhausted: true, batch } => {
                    assert_eq!(batch.len(), 50);
                    break;
                }
                ScrollOutcome::Render { batch, .. } => assert_eq!(batch.len(), 100),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(rounds, 3);
    }
}
