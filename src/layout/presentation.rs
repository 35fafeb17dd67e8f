//! Presentation layouts: one page (or one spread) at a time

use super::LayoutMode;
use super::geometry::SlotRange;
use super::state::ScrollPosition;
use super::strategy::{LayoutBase, LayoutStrategy, PAGE_PADDING, centered};

/// Shows the current page, or the current two-page spread, centered in the
/// viewport. Every page shares the same origin; only the current one is
/// visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresentationLayout {
    two_page: bool,
}

impl PresentationLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn two_page() -> Self {
        Self { two_page: true }
    }

    fn spread(&self, base: &LayoutBase, slot: usize) -> SlotRange {
        let start = self.align_page(slot).min(base.last_slot());
        if self.two_page {
            SlotRange::new(start, (start + 1).min(base.last_slot()))
        } else {
            SlotRange::single(start)
        }
    }

    fn step(&self) -> usize {
        if self.two_page { 2 } else { 1 }
    }
}

impl LayoutStrategy for PresentationLayout {
    fn mode(&self) -> LayoutMode {
        if self.two_page {
            LayoutMode::PresentationTwoPage
        } else {
            LayoutMode::Presentation
        }
    }

    fn arrange(&self, base: &mut LayoutBase) {
        base.scale_pages();
        let viewport = base.viewport;
        let mut content_width = viewport.width;
        let mut content_height = viewport.height;

        let mut slot = 0;
        while slot < base.pages.len() {
            let spread = self.spread(base, slot);
            let spread_width: f64 = spread.iter().map(|s| base.pages[s].width).sum();
            let spread_height = spread.iter().map(|s| base.pages[s].height).fold(0.0, f64::max);
            content_width = content_width.max(spread_width);
            content_height = content_height.max(spread_height);

            let mut x = centered(viewport.width, spread_width);
            for s in spread.iter() {
                let page = &mut base.pages[s];
                let y = centered(viewport.height, page.height);
                page.place(x, y);
                page.row_index = slot / self.step();
                x += page.width;
            }
            slot = spread.end + 1;
        }

        base.content_width = content_width;
        base.content_height = content_height;
    }

    fn zoom_auto_value(&self, _base: &LayoutBase, fit_width: f64, fit_height: f64) -> f64 {
        fit_width.min(fit_height)
    }

    fn fit_width_value(&self, base: &LayoutBase) -> f64 {
        let per_spread = if self.two_page { 2.0 } else { 1.0 };
        (base.viewport.width - per_spread * PAGE_PADDING.horizontal()).max(1.0)
            / (per_spread * base.max_actual_width()).max(1.0)
    }

    fn is_paged(&self) -> bool {
        true
    }

    fn current_page(&self, base: &LayoutBase) -> usize {
        self.align_page(base.current).min(base.last_slot())
    }

    fn next_page(&self, base: &LayoutBase, slot: usize) -> usize {
        let next = self.align_page(slot) + self.step();
        if next > base.last_slot() {
            self.align_page(slot)
        } else {
            next
        }
    }

    fn previous_page(&self, _base: &LayoutBase, slot: usize) -> usize {
        self.align_page(slot).saturating_sub(self.step())
    }

    fn align_page(&self, slot: usize) -> usize {
        if self.two_page { slot - slot % 2 } else { slot }
    }

    fn visible_range(&self, base: &LayoutBase) -> SlotRange {
        self.spread(base, base.current)
    }

    fn fully_visible_range(&self, base: &LayoutBase) -> Option<SlotRange> {
        let spread = self.spread(base, base.current);
        let fits = spread.iter().all(|slot| {
            let page = &base.pages[slot];
            page.x0 >= base.scroll.left
                && page.y0 >= base.scroll.top
                && page.x1 <= base.scroll.left + base.viewport.width
                && page.y1 <= base.scroll.top + base.viewport.height
        });
        fits.then_some(spread)
    }

    fn scroll_position_for_page(&self, _base: &LayoutBase, _slot: usize) -> ScrollPosition {
        ScrollPosition::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::state::ViewportSize;
    use crate::metadata::PageSize;

    fn base(count: usize) -> LayoutBase {
        let sizes = vec![
            PageSize {
                width: 100.0,
                height: 100.0,
            };
            count
        ];
        let mut base = LayoutBase::new(&sizes, ViewportSize::new(400.0, 300.0));
        base.zoom.zoom = 1.0;
        base
    }

    #[test]
    fn current_page_is_explicit() {
        let mut base = base(5);
        let layout = PresentationLayout::new();
        layout.arrange(&mut base);
        base.current = 3;

        assert_eq!(layout.current_page(&base), 3);
        assert_eq!(layout.visible_range(&base), SlotRange::single(3));
        assert_eq!(layout.fully_visible_range(&base), Some(SlotRange::single(3)));
        assert_eq!(base.pages[3].x0, base.pages[0].x0);
    }

    #[test]
    fn two_page_steps_by_spreads() {
        let mut base = base(5);
        let layout = PresentationLayout::two_page();
        layout.arrange(&mut base);

        assert_eq!(layout.next_page(&base, 0), 2);
        assert_eq!(layout.next_page(&base, 3), 4);
        assert_eq!(layout.next_page(&base, 4), 4);
        assert_eq!(layout.previous_page(&base, 3), 0);
        assert_eq!(layout.align_page(3), 2);

        base.current = 2;
        assert_eq!(layout.visible_range(&base), SlotRange::new(2, 3));
        base.current = 4;
        assert_eq!(layout.visible_range(&base), SlotRange::single(4));
    }

    #[test]
    fn spreads_sit_side_by_side() {
        let mut base = base(4);
        PresentationLayout::two_page().arrange(&mut base);

        assert_eq!(base.pages[1].x0, base.pages[0].x1);
        assert_eq!(base.pages[0].x0, (400.0 - 240.0) / 2.0);
        assert_eq!(base.pages[2].x0, base.pages[0].x0);
        let rows: Vec<usize> = base.pages.iter().map(|p| p.row_index).collect();
        assert_eq!(rows, vec![0, 0, 1, 1]);
    }
}
