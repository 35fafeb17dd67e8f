//! The shared layout base and the strategy contract

use super::geometry::{SlotRange, VisibilityIndex};
use super::state::{Padding, PageState, ScrollPosition, ViewportSize, ZoomState};
use super::LayoutMode;
use crate::metadata::PageSize;

/// Space around every page box, in pixels
pub const PAGE_PADDING: Padding = Padding::uniform(10.0);

/// State every strategy works against, in viewport pixels
#[derive(Debug, Clone)]
pub struct LayoutBase {
    pub pages: Vec<PageState>,
    pub viewport: ViewportSize,
    pub scroll: ScrollPosition,
    pub content_width: f64,
    pub content_height: f64,
    pub zoom: ZoomState,
    /// Focused slot
    pub current: usize,
    pub visible: SlotRange,
    pub fully_visible: Option<SlotRange>,
    pub index: VisibilityIndex,
}

impl LayoutBase {
    pub fn new(sizes: &[PageSize], viewport: ViewportSize) -> Self {
        let pages = sizes
            .iter()
            .enumerate()
            .map(|(index, size)| PageState::new(index, size.width, size.height, PAGE_PADDING))
            .collect();
        Self {
            pages,
            viewport,
            scroll: ScrollPosition::default(),
            content_width: 0.0,
            content_height: 0.0,
            zoom: ZoomState::default(),
            current: 0,
            visible: SlotRange::single(0),
            fully_visible: None,
            index: VisibilityIndex::default(),
        }
    }

    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn last_slot(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn max_actual_width(&self) -> f64 {
        self.pages.iter().map(|p| p.actual_width).fold(0.0, f64::max)
    }

    pub fn max_actual_height(&self) -> f64 {
        self.pages.iter().map(|p| p.actual_height).fold(0.0, f64::max)
    }

    /// Resize every page box for the current zoom
    pub fn scale_pages(&mut self) {
        let zoom = self.zoom.zoom;
        for page in &mut self.pages {
            page.scale(zoom);
        }
    }

    pub fn max_scroll(&self) -> ScrollPosition {
        ScrollPosition::new(
            (self.content_width - self.viewport.width).max(0.0),
            (self.content_height - self.viewport.height).max(0.0),
        )
    }

    pub fn clamp_scroll(&self, position: ScrollPosition) -> ScrollPosition {
        let max = self.max_scroll();
        ScrollPosition::new(
            finite_or_zero(position.left).clamp(0.0, max.left),
            finite_or_zero(position.top).clamp(0.0, max.top),
        )
    }

    pub fn is_draggable(&self) -> bool {
        const EPSILON: f64 = 0.5;
        self.content_width > self.viewport.width + EPSILON
            || self.content_height > self.viewport.height + EPSILON
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Geometry-dependent behavior of one layout mode.
///
/// Defaults implement a continuously scrolling layout; presentation
/// strategies override the paging-related methods.
pub trait LayoutStrategy {
    fn mode(&self) -> LayoutMode;

    /// Position every page for `base.zoom` and set the content size
    fn arrange(&self, base: &mut LayoutBase);

    fn zoom_auto_value(&self, base: &LayoutBase, fit_width: f64, fit_height: f64) -> f64;

    fn fit_width_value(&self, base: &LayoutBase) -> f64 {
        (base.viewport.width - PAGE_PADDING.horizontal()).max(1.0) / base.max_actual_width().max(1.0)
    }

    fn fit_height_value(&self, base: &LayoutBase) -> f64 {
        (base.viewport.height - PAGE_PADDING.vertical()).max(1.0) / base.max_actual_height().max(1.0)
    }

    /// Whether the current page is set explicitly rather than derived from scroll
    fn is_paged(&self) -> bool {
        false
    }

    /// Scroll axis used to find the leading page
    fn is_vertical(&self) -> bool {
        true
    }

    fn current_page(&self, base: &LayoutBase) -> usize {
        let leading = base.index.leading_page(base.scroll, self.is_vertical());
        leading.clamp(base.visible.start, base.visible.end)
    }

    fn next_page(&self, base: &LayoutBase, slot: usize) -> usize {
        (slot + 1).min(base.last_slot())
    }

    fn previous_page(&self, _base: &LayoutBase, slot: usize) -> usize {
        slot.saturating_sub(1)
    }

    /// Snap a slot to the first slot shown with it
    fn align_page(&self, slot: usize) -> usize {
        slot
    }

    fn visible_range(&self, base: &LayoutBase) -> SlotRange {
        base.index.visible_range(base.scroll, base.viewport)
    }

    fn fully_visible_range(&self, base: &LayoutBase) -> Option<SlotRange> {
        base.index.fully_visible_range(base.scroll, base.viewport)
    }

    fn scroll_position_for_page(&self, base: &LayoutBase, slot: usize) -> ScrollPosition {
        let page = &base.pages[slot];
        ScrollPosition::new(base.scroll.left, page.y0)
    }
}

/// Center `extent` within `available`, never negative
pub(crate) fn centered(available: f64, extent: f64) -> f64 {
    ((available - extent) / 2.0).max(0.0)
}
