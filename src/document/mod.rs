//! The document component: every displayed page plus the lazy loader

mod lazy_loader;

use log::{debug, trace};

use crate::fetch::FetchResponse;
use crate::layout::PageRange;
use crate::page::{PageController, PageStatus};
use crate::scope::{
    Component, Context, LinkTarget, Message, MessageKind, PageAvailability, Subscription,
};
use crate::support::Support;

pub use lazy_loader::{LOAD_DEBOUNCE, LazyLoader, ScrollDirection};

const DOCUMENT_MESSAGES: &[MessageKind] = &[
    MessageKind::Ready,
    MessageKind::PageAvailable,
    MessageKind::PageFocus,
    MessageKind::BeforeZoom,
    MessageKind::Zoom,
    MessageKind::Scroll,
    MessageKind::ScrollEnd,
    MessageKind::TextEnabledChange,
    MessageKind::LinksEnabledChange,
];

/// Owns the page controllers and applies the lazy loader's decisions to them
pub struct DocumentComponent {
    range: PageRange,
    pages: Vec<PageController>,
    loader: LazyLoader,
    autoload_first_page: bool,
}

impl DocumentComponent {
    /// `pages[slot]` must show document page `range.page_of(slot)`
    pub fn new(
        pages: Vec<PageController>,
        range: PageRange,
        support: &Support,
        autoload_first_page: bool,
    ) -> Self {
        Self {
            range,
            loader: LazyLoader::new(range, support),
            pages,
            autoload_first_page,
        }
    }

    pub fn pages(&self) -> &[PageController] {
        &self.pages
    }

    /// Controller of a 1-indexed document page
    pub fn page(&self, page: usize) -> Option<&PageController> {
        self.range.slot_of(page).and_then(|slot| self.pages.get(slot))
    }

    pub fn page_status(&self, page: usize) -> Option<PageStatus> {
        self.page(page).map(PageController::status)
    }

    pub fn loader(&self) -> &LazyLoader {
        &self.loader
    }

    /// Hand a completed page asset to its page
    pub fn deliver(&mut self, response: &FetchResponse, cx: &mut Context<'_>) -> bool {
        let Some(slot) = response.page.and_then(|page| self.range.slot_of(page)) else {
            return false;
        };
        match self.pages.get_mut(slot) {
            Some(page) => page.deliver(response, cx),
            None => false,
        }
    }

    /// Advance the debounce and polling timers
    pub fn tick(&mut self, cx: &mut Context<'_>) {
        let now = cx.now();
        self.loader.fire_due(now);
        self.load_queued(cx);
    }

    pub fn click_link(
        &mut self,
        page: usize,
        index: usize,
        cx: &mut Context<'_>,
    ) -> Option<LinkTarget> {
        let slot = self.range.slot_of(page)?;
        self.pages.get_mut(slot)?.click_link(index, cx)
    }

    /// Initiate at most one load, skipping pages that will not load
    fn load_queued(&mut self, cx: &mut Context<'_>) {
        let now = cx.now();
        while let Some(slot) = self.loader.next_due(now) {
            let Some(page) = self.pages.get_mut(slot) else {
                continue;
            };
            if !page.load(cx).started() {
                continue;
            }
            self.loader.started(now);
            // overlap the next page's fetch with the wait
            if let Some(next) = self.loader.queued().next() {
                if let Some(page) = self.pages.get_mut(next) {
                    page.preload(cx);
                }
            }
            break;
        }
    }

    pub fn unload_unnecessary_pages(&mut self, range_length: usize, cx: &mut Context<'_>) {
        let candidates = self.loader.unload_candidates(range_length);
        trace!("Unloading outside range {range_length}: {} candidates", candidates.len());
        for slot in candidates {
            if let Some(page) = self.pages.get_mut(slot) {
                page.unload(cx);
            }
        }
    }

    fn handle_available(&mut self, availability: PageAvailability, cx: &mut Context<'_>) {
        for page in &mut self.pages {
            page.handle_available(availability);
        }
        let now = cx.now();
        match availability {
            PageAvailability::Page(page) => {
                let Some(slot) = self.range.slot_of(page) else {
                    return;
                };
                let (low, high) = self.loader.calculate_range(self.loader.page_load_range());
                if (low..=high).contains(&slot) || self.loader.visible().contains(&slot) {
                    debug!("Page {page} became available, queueing");
                    self.loader.enqueue(slot, now);
                    self.load_queued(cx);
                }
            }
            PageAvailability::UpTo(_) | PageAvailability::All => self.loader.schedule(now),
        }
    }
}

impl Component for DocumentComponent {
    fn name(&self) -> &'static str {
        "document"
    }

    fn messages(&self) -> Subscription {
        Subscription::Only(DOCUMENT_MESSAGES)
    }

    fn on_message(&mut self, message: &Message, cx: &mut Context<'_>) {
        let now = cx.now();
        match message {
            Message::Ready { .. } => {
                if self.autoload_first_page {
                    self.loader.enqueue(self.loader.current(), now);
                    for slot in self.loader.visible().to_vec() {
                        self.loader.enqueue(slot, now);
                    }
                    self.load_queued(cx);
                }
                self.loader.schedule(now);
            }
            Message::PageAvailable(availability) => self.handle_available(*availability, cx),
            Message::PageFocus(snapshot) => {
                self.loader.update_layout(snapshot);
                self.loader.schedule(now);
            }
            Message::Zoom(snapshot) => {
                self.loader.update_layout(&snapshot.layout());
                self.loader.schedule(now);
            }
            Message::BeforeZoom(_) => {
                let range = 2 * self.loader.visible().len();
                self.unload_unnecessary_pages(range, cx);
            }
            Message::Scroll(_) => self.loader.begin_scroll(),
            Message::ScrollEnd(_) => {
                self.unload_unnecessary_pages(self.loader.page_load_range(), cx);
                self.loader.end_scroll(now);
            }
            Message::TextEnabledChange { enabled } => {
                for page in &mut self.pages {
                    page.set_text_enabled(*enabled, cx);
                }
            }
            Message::LinksEnabledChange { enabled } => {
                for page in &mut self.pages {
                    page.set_links_enabled(*enabled);
                }
            }
            _ => {}
        }
    }

    fn destroy(&mut self, cx: &mut Context<'_>) {
        self.loader.cancel();
        for page in &mut self.pages {
            page.destroy(cx);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ViewerConfig;
    use crate::layout::{LayoutSnapshot, ScrollPosition};
    use crate::scope::Scope;
    use crate::test_utils::{
        DOC_URL, DocumentFixture, MemoryFetcher, MessageLog, build_pages, page_setup, svg_url,
        test_scope_with,
    };

    struct Harness {
        scope: Scope,
        clock: ManualClock,
        fetcher: Arc<MemoryFetcher>,
        document: Rc<RefCell<DocumentComponent>>,
        log: MessageLog,
    }

    impl Harness {
        fn new(count: usize) -> Self {
            let fetcher = DocumentFixture::new(count).serve();
            let clock = ManualClock::new();
            let mut scope =
                test_scope_with(ViewerConfig::new(DOC_URL), fetcher.clone(), clock.clone());
            let document = Rc::new(RefCell::new(DocumentComponent::new(
                build_pages(count, &page_setup()),
                PageRange::new(0, count),
                &Support::default(),
                true,
            )));
            scope.add_component(document.clone());
            let log = MessageLog::new();
            scope.add_component(log.component());
            Self {
                scope,
                clock,
                fetcher,
                document,
                log,
            }
        }

        fn focus(&mut self, page: usize, visible: &[usize]) {
            let num_pages = self.document.borrow().pages().len();
            self.scope.broadcast(Message::PageFocus(LayoutSnapshot {
                page,
                num_pages,
                visible_pages: visible.to_vec(),
                fully_visible_pages: visible.to_vec(),
            }));
        }

        /// Deliver fetches and run timers in `step` ms increments
        fn run(&mut self, ms: u64, step: u64) {
            let mut elapsed = 0;
            while elapsed <= ms {
                let responses = self.scope.fetch_mut().poll();
                let document = Rc::clone(&self.document);
                self.scope.with_context(|cx| {
                    let mut document = document.borrow_mut();
                    for response in &responses {
                        document.deliver(response, cx);
                    }
                    document.tick(cx);
                });
                self.clock.advance_ms(step);
                elapsed += step;
            }
        }

        fn status(&self, page: usize) -> PageStatus {
            self.document.borrow().page_status(page).unwrap()
        }
    }

    #[test]
    fn ready_loads_the_current_page_first() {
        let mut h = Harness::new(10);
        h.focus(1, &[1, 2]);
        h.scope.broadcast(Message::Ready {
            page: 1,
            num_pages: 10,
        });
        h.scope.ready();

        h.run(0, 10);

        assert_eq!(h.log.loaded_pages(), vec![1]);
        // the next queued page is fetched ahead but not shown yet
        assert_eq!(h.status(2), PageStatus::NotLoaded);
        assert_eq!(h.fetcher.fetch_count(&svg_url(2)), 1);
    }

    #[test]
    fn loads_are_spaced_by_the_polling_interval() {
        let mut h = Harness::new(10);
        h.focus(1, &[1]);
        h.scope.broadcast(Message::Ready {
            page: 1,
            num_pages: 10,
        });
        h.scope.ready();

        h.run(40, 10);
        assert_eq!(h.log.loaded_pages().len(), 1);

        h.run(1_000, 10);
        assert_eq!(h.log.loaded_pages(), (1..=10).collect::<Vec<_>>());
        for page in 1..=10 {
            assert_eq!(h.fetcher.fetch_count(&svg_url(page)), 1);
        }
    }

    #[test]
    fn scroll_cancels_queued_loads() {
        let mut h = Harness::new(10);
        h.scope.ready();
        h.focus(1, &[1]);
        h.run(150, 10);
        let loaded = h.log.loaded_pages().len();
        assert!(loaded >= 1);

        h.scope.broadcast(Message::Scroll(ScrollPosition::default()));

        assert_eq!(h.document.borrow().loader().queued().count(), 0);
        h.run(50, 10);
        assert_eq!(h.log.loaded_pages().len(), loaded);
    }

    #[test]
    fn focus_during_a_scroll_waits_for_scrollend() {
        let mut h = Harness::new(10);
        h.scope.ready();
        h.focus(1, &[1]);
        h.run(150, 10);
        let loaded = h.log.loaded_pages().len();

        h.scope.broadcast(Message::Scroll(ScrollPosition::default()));
        h.focus(6, &[6]);

        assert!(!h.document.borrow().loader().is_scheduled());
        h.run(300, 10);
        assert_eq!(h.log.loaded_pages().len(), loaded);
        assert_eq!(h.status(6), PageStatus::NotLoaded);

        h.scope.broadcast(Message::ScrollEnd(ScrollPosition::default()));
        h.run(200, 10);

        assert_eq!(h.status(6), PageStatus::Loaded);
    }

    #[test]
    fn focus_after_ready_schedules_a_pass() {
        let mut h = Harness::new(4);
        h.scope.ready();

        h.focus(2, &[2]);

        let document = h.document.borrow();
        assert!(document.loader().is_scheduled());
        assert_eq!(document.loader().current(), 1);
    }

    #[test]
    fn scrollend_unloads_far_pages() {
        let mut h = Harness::new(80);
        h.scope.ready();
        h.focus(1, &[1]);
        h.run(5_000, 10);
        assert_eq!(h.status(60), PageStatus::Loaded);
        assert_eq!(h.status(70), PageStatus::NotLoaded);

        h.focus(80, &[80]);
        h.scope.broadcast(Message::ScrollEnd(ScrollPosition::default()));

        // 32 either side of slot 79, shifted into the document: 15..=79
        assert_eq!(h.status(1), PageStatus::NotLoaded);
        assert_eq!(h.status(15), PageStatus::NotLoaded);
        assert_eq!(h.status(16), PageStatus::Loaded);
        assert!(h.log.unloaded_pages().contains(&1));
    }

    #[test]
    fn beforezoom_keeps_only_twice_the_visible_count() {
        let mut h = Harness::new(12);
        h.scope.ready();
        h.focus(6, &[6]);
        h.run(2_000, 10);
        assert_eq!(h.log.loaded_pages().len(), 12);

        let snapshot = crate::layout::ZoomSnapshot {
            zoom: 2.0,
            prev_zoom: 1.0,
            zoom_mode: None,
            can_zoom_in: true,
            can_zoom_out: true,
            page: 6,
            num_pages: 12,
            visible_pages: vec![6],
            fully_visible_pages: vec![6],
            is_draggable: false,
        };
        h.scope.broadcast(Message::BeforeZoom(snapshot));

        // range 2 around slot 5: 3..=7
        let mut unloaded = h.log.unloaded_pages();
        unloaded.sort_unstable();
        assert_eq!(unloaded, vec![1, 2, 3, 9, 10, 11, 12]);
    }

    #[test]
    fn available_page_is_queued_when_in_range() {
        let fetcher = DocumentFixture::new(4).serve();
        let clock = ManualClock::new();
        let mut scope = test_scope_with(ViewerConfig::new(DOC_URL), fetcher, clock);
        let mut setup = page_setup();
        setup.converting = true;
        let document = Rc::new(RefCell::new(DocumentComponent::new(
            build_pages(4, &setup),
            PageRange::new(0, 4),
            &Support::default(),
            true,
        )));
        scope.add_component(document.clone());
        scope.ready();

        scope.broadcast(Message::PageAvailable(PageAvailability::Page(2)));

        let document = document.borrow();
        assert_eq!(document.page_status(2), Some(PageStatus::Loading));
        assert_eq!(document.page_status(1), Some(PageStatus::Converting));
    }
}
