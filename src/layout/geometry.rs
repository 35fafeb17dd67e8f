//! Visible-range queries over page geometry
//!
//! Page boxes are ordered by index but not strictly monotone on either axis
//! (rows of different heights, wrapped rows). Running maxima of the far
//! edges and running minima of the near edges are monotone, which is what
//! the binary searches need.

use super::state::{PageState, ScrollPosition, ViewportSize};

/// Inclusive range of page slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    pub start: usize,
    pub end: usize,
}

impl SlotRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(slot: usize) -> Self {
        Self::new(slot, slot)
    }

    pub fn contains(&self, slot: usize) -> bool {
        slot >= self.start && slot <= self.end
    }

    pub fn count(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }
}

#[derive(Debug, Clone, Default)]
struct Axis {
    /// running max of the far edge
    far_max: Vec<f64>,
    /// running min (from the end) of the near edge
    near_min: Vec<f64>,
    /// running max of the near edge
    near_max: Vec<f64>,
}

impl Axis {
    fn build(near: impl Iterator<Item = f64>, far: impl Iterator<Item = f64>) -> Self {
        let near: Vec<f64> = near.collect();
        let far: Vec<f64> = far.collect();
        Self {
            far_max: running(&far, f64::max),
            near_min: running_rev(&near, f64::min),
            near_max: running(&near, f64::max),
        }
    }

    /// Slots that overlap `[low, high)` on this axis
    fn overlapping(&self, low: f64, high: f64) -> (usize, usize) {
        let start = self.far_max.partition_point(|far| *far <= low);
        let end = self.near_min.partition_point(|near| *near < high);
        (start, end)
    }

    /// Slots lying entirely within `[low, high]` on this axis
    fn contained(&self, low: f64, high: f64) -> (usize, usize) {
        let start = self.near_max.partition_point(|near| *near < low);
        let end = self.far_max.partition_point(|far| *far <= high);
        (start, end)
    }
}

fn running(values: &[f64], f: fn(f64, f64) -> f64) -> Vec<f64> {
    let mut acc = f64::NAN;
    values
        .iter()
        .map(|value| {
            acc = if acc.is_nan() { *value } else { f(acc, *value) };
            acc
        })
        .collect()
}

fn running_rev(values: &[f64], f: fn(f64, f64) -> f64) -> Vec<f64> {
    let mut out = values.to_vec();
    let mut acc = f64::NAN;
    for value in out.iter_mut().rev() {
        acc = if acc.is_nan() { *value } else { f(acc, *value) };
        *value = acc;
    }
    out
}

/// Search structure rebuilt whenever page geometry changes
#[derive(Debug, Clone, Default)]
pub struct VisibilityIndex {
    x: Axis,
    y: Axis,
    mid_y: Vec<f64>,
    mid_x: Vec<f64>,
    len: usize,
}

impl VisibilityIndex {
    pub fn build(pages: &[PageState]) -> Self {
        let x = Axis::build(pages.iter().map(|p| p.x0), pages.iter().map(|p| p.x1));
        let y = Axis::build(pages.iter().map(|p| p.y0), pages.iter().map(|p| p.y1));
        let mid_y = running(
            &pages.iter().map(|p| p.y0 + p.height / 2.0).collect::<Vec<_>>(),
            f64::max,
        );
        let mid_x = running(
            &pages.iter().map(|p| p.x0 + p.width / 2.0).collect::<Vec<_>>(),
            f64::max,
        );
        Self {
            x,
            y,
            mid_y,
            mid_x,
            len: pages.len(),
        }
    }

    /// Pages intersecting the viewport, clamped to the document.
    ///
    /// When nothing intersects (scrolled into a gap) the nearest page is used.
    pub fn visible_range(&self, scroll: ScrollPosition, viewport: ViewportSize) -> SlotRange {
        if self.len == 0 {
            return SlotRange::single(0);
        }
        let (x_start, x_end) = self.x.overlapping(scroll.left, scroll.left + viewport.width);
        let (y_start, y_end) = self.y.overlapping(scroll.top, scroll.top + viewport.height);
        self.clamp(x_start.max(y_start), x_end.min(y_end))
    }

    /// Pages entirely inside the viewport; `None` when no page fits
    pub fn fully_visible_range(
        &self,
        scroll: ScrollPosition,
        viewport: ViewportSize,
    ) -> Option<SlotRange> {
        if self.len == 0 {
            return None;
        }
        let (x_start, x_end) = self.x.contained(scroll.left, scroll.left + viewport.width);
        let (y_start, y_end) = self.y.contained(scroll.top, scroll.top + viewport.height);
        let start = x_start.max(y_start);
        let end = x_end.min(y_end);
        (start < end).then(|| SlotRange::new(start, end - 1))
    }

    /// First page that is at least half visible at the leading edge
    pub fn leading_page(&self, scroll: ScrollPosition, vertical: bool) -> usize {
        let (mids, edge) = if vertical {
            (&self.mid_y, scroll.top)
        } else {
            (&self.mid_x, scroll.left)
        };
        let slot = mids.partition_point(|mid| *mid < edge);
        slot.min(self.len.saturating_sub(1))
    }

    fn clamp(&self, start: usize, end_exclusive: usize) -> SlotRange {
        let last = self.len - 1;
        if start >= end_exclusive {
            return SlotRange::single(start.min(last));
        }
        SlotRange::new(start.min(last), (end_exclusive - 1).min(last))
    }
}

/// Shift `[low, high]` to lie within `[0, max]` without changing its length
/// where possible.
pub fn constrain_range(low: isize, high: isize, max: isize) -> (usize, usize) {
    let len = high - low;
    let (mut low, mut high) = (low, high);
    if low < 0 {
        low = 0;
        high = len.min(max);
    }
    if high > max {
        high = max;
        low = (max - len).max(0);
    }
    (low.max(0) as usize, high.max(0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::state::Padding;

    fn column(heights: &[f64], gap: f64) -> Vec<PageState> {
        let mut y = 0.0;
        heights
            .iter()
            .enumerate()
            .map(|(index, height)| {
                let mut page = PageState::new(index, 100.0, *height, Padding::default());
                page.scale(1.0);
                page.place(0.0, y);
                page.row_index = index;
                y += height + gap;
                page
            })
            .collect()
    }

    #[test]
    fn visible_and_fully_visible_in_a_column() {
        let pages = column(&[100.0; 10], 10.0);
        let index = VisibilityIndex::build(&pages);
        let viewport = ViewportSize::new(100.0, 250.0);

        // viewport spans y 105..355: pages 0 (0..100) not visible, 1..=3 visible
        let scroll = ScrollPosition::new(0.0, 105.0);

        assert_eq!(index.visible_range(scroll, viewport), SlotRange::new(1, 3));
        assert_eq!(
            index.fully_visible_range(scroll, viewport),
            Some(SlotRange::new(1, 2))
        );
    }

    #[test]
    fn gap_scroll_falls_back_to_nearest_page() {
        let pages = column(&[100.0; 3], 50.0);
        let index = VisibilityIndex::build(&pages);

        let range = index.visible_range(ScrollPosition::new(0.0, 101.0), ViewportSize::new(100.0, 20.0));

        assert_eq!(range, SlotRange::single(1));
    }

    #[test]
    fn leading_page_needs_half_visibility() {
        let pages = column(&[100.0; 5], 0.0);
        let index = VisibilityIndex::build(&pages);

        assert_eq!(index.leading_page(ScrollPosition::new(0.0, 40.0), true), 0);
        assert_eq!(index.leading_page(ScrollPosition::new(0.0, 60.0), true), 1);
        assert_eq!(index.leading_page(ScrollPosition::new(0.0, 10_000.0), true), 4);
    }

    #[test]
    fn constrain_range_preserves_length() {
        assert_eq!(constrain_range(1, 3, 4), (1, 3));
        assert_eq!(constrain_range(-2, 2, 9), (0, 4));
        assert_eq!(constrain_range(7, 11, 9), (5, 9));
        assert_eq!(constrain_range(-5, 20, 9), (0, 9));
    }
}
