//! Which pages to load next, and which to let go
//!
//! Works in slots (0-based positions among displayed pages). The loader only
//! decides; the document component applies its decisions to the pages.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::layout::{LayoutSnapshot, PageRange, constrain_range};
use crate::support::Support;
use crate::timing::{Debounce, Timeout};

/// Coalescing window for focus and zoom bursts
pub const LOAD_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    Backward,
    #[default]
    None,
    Forward,
}

impl ScrollDirection {
    fn between(previous: usize, current: usize) -> Self {
        match current.cmp(&previous) {
            std::cmp::Ordering::Less => Self::Backward,
            std::cmp::Ordering::Equal => Self::None,
            std::cmp::Ordering::Greater => Self::Forward,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LazyLoader {
    range: PageRange,
    current: usize,
    visible: Vec<usize>,
    direction: ScrollDirection,
    page_load_range: usize,
    interval: Duration,
    queue: VecDeque<usize>,
    next_load: Timeout,
    debounce: Debounce,
    scrolling: bool,
}

impl LazyLoader {
    pub fn new(range: PageRange, support: &Support) -> Self {
        Self {
            range,
            current: 0,
            visible: vec![0],
            direction: ScrollDirection::None,
            page_load_range: support.max_page_load_range().min(range.count),
            interval: support.page_load_interval(),
            queue: VecDeque::new(),
            next_load: Timeout::new(),
            debounce: Debounce::new(LOAD_DEBOUNCE),
            scrolling: false,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn page_load_range(&self) -> usize {
        self.page_load_range
    }

    pub fn queued(&self) -> impl Iterator<Item = usize> + '_ {
        self.queue.iter().copied()
    }

    /// Track a new focus; pages outside the displayed range are ignored
    pub fn update_layout(&mut self, snapshot: &LayoutSnapshot) {
        let Some(current) = self.range.slot_of(snapshot.page) else {
            return;
        };
        self.direction = ScrollDirection::between(self.current, current);
        self.current = current;
        self.visible = snapshot
            .visible_pages
            .iter()
            .filter_map(|page| self.range.slot_of(*page))
            .collect();
    }

    /// Slots within `range_length` of the current slot, inclusive and
    /// shifted to stay inside the document
    pub fn calculate_range(&self, range_length: usize) -> (usize, usize) {
        let current = self.current as isize;
        let range_length = range_length as isize;
        constrain_range(
            current - range_length,
            current + range_length,
            self.range.count.saturating_sub(1) as isize,
        )
    }

    /// Current slot, then visible slots in index order, then the speculative
    /// range outward from the current slot, scroll direction first
    pub fn load_order(&self) -> Vec<usize> {
        let mut order = vec![self.current];
        let mut visible = self.visible.clone();
        visible.sort_unstable();
        for slot in visible {
            if !order.contains(&slot) {
                order.push(slot);
            }
        }

        let (low, high) = self.calculate_range(self.page_load_range);
        let forward = (self.current + 1)..=high;
        let backward = (low..self.current).rev();
        let expansion: Vec<usize> = if self.direction == ScrollDirection::Backward {
            backward.chain(forward).collect()
        } else {
            forward.chain(backward).collect()
        };
        for slot in expansion {
            if !order.contains(&slot) {
                order.push(slot);
            }
        }
        order
    }

    /// Slots to unload: outside the range around the current slot and not
    /// visible. A zero range means the full speculative range.
    pub fn unload_candidates(&self, range_length: usize) -> Vec<usize> {
        let range_length = if range_length == 0 {
            self.page_load_range
        } else {
            range_length
        };
        let (low, high) = self.calculate_range(range_length);
        (0..self.range.count)
            .filter(|slot| (*slot < low || *slot > high) && !self.visible.contains(slot))
            .collect()
    }

    /// Debounced `load_necessary_pages`; held back while a scroll gesture runs
    pub fn schedule(&mut self, now: Instant) {
        if !self.scrolling {
            self.debounce.trigger(now);
        }
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// A scroll gesture is under way: drop queued work until it ends
    pub fn begin_scroll(&mut self) {
        self.scrolling = true;
        self.debounce.cancel();
        self.cancel();
    }

    pub fn end_scroll(&mut self, now: Instant) {
        self.scrolling = false;
        self.schedule(now);
    }

    pub fn is_scheduled(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Drop queued loads and the pending initiation
    pub fn cancel(&mut self) {
        if !self.queue.is_empty() {
            trace!("Cancelled {} queued page loads", self.queue.len());
        }
        self.queue.clear();
        self.next_load.clear();
    }

    /// Rebuild the queue and start polling now
    pub fn load_necessary_pages(&mut self, now: Instant) {
        self.cancel();
        self.queue.extend(self.load_order());
        debug!(
            "Load pass around slot {} ({:?}): {} queued",
            self.current,
            self.direction,
            self.queue.len()
        );
        self.next_load.set(now, Duration::ZERO);
    }

    /// Queue one slot behind whatever is already waiting
    pub fn enqueue(&mut self, slot: usize, now: Instant) {
        if !self.queue.contains(&slot) {
            self.queue.push_back(slot);
        }
        if !self.next_load.is_set() {
            self.next_load.set(now, Duration::ZERO);
        }
    }

    /// Run a debounced pass if one is due
    pub fn fire_due(&mut self, now: Instant) -> bool {
        if self.debounce.fire_due(now) {
            self.load_necessary_pages(now);
            return true;
        }
        false
    }

    /// Next slot to try, if the polling interval has elapsed
    pub fn next_due(&mut self, now: Instant) -> Option<usize> {
        let deadline = self.next_load.deadline()?;
        if now < deadline {
            return None;
        }
        let slot = self.queue.pop_front();
        if slot.is_none() {
            self.next_load.clear();
        }
        slot
    }

    /// A load was initiated; wait out the interval before the next one
    pub fn started(&mut self, now: Instant) {
        if self.queue.is_empty() {
            self.next_load.clear();
        } else {
            self.next_load.set(now, self.interval);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_load.deadline()
    }
}
