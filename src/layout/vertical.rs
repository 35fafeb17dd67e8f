//! Vertically scrolling layouts

use super::LayoutMode;
use super::state::ScrollPosition;
use super::strategy::{LayoutBase, LayoutStrategy, centered};

/// Pages flow into rows as wide as the viewport allows.
///
/// With `single_column` every page gets its own row.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalLayout {
    single_column: bool,
}

impl VerticalLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single_column() -> Self {
        Self {
            single_column: true,
        }
    }

    /// Slots grouped by row
    fn rows(&self, base: &LayoutBase) -> Vec<Vec<usize>> {
        let mut rows: Vec<Vec<usize>> = Vec::new();
        let mut row_width = 0.0;
        for page in &base.pages {
            let fits = !self.single_column && row_width + page.width <= base.viewport.width;
            match rows.last_mut() {
                Some(row) if fits => row.push(page.index),
                _ => {
                    rows.push(vec![page.index]);
                    row_width = 0.0;
                }
            }
            row_width += page.width;
        }
        rows
    }
}

impl LayoutStrategy for VerticalLayout {
    fn mode(&self) -> LayoutMode {
        if self.single_column {
            LayoutMode::VerticalSingleColumn
        } else {
            LayoutMode::Vertical
        }
    }

    fn arrange(&self, base: &mut LayoutBase) {
        base.scale_pages();
        let rows = self.rows(base);

        let row_widths: Vec<f64> = rows
            .iter()
            .map(|row| row.iter().map(|slot| base.pages[*slot].width).sum())
            .collect();
        let content_width = row_widths
            .iter()
            .copied()
            .fold(base.viewport.width, f64::max);

        let mut y = 0.0;
        for (row_index, (row, row_width)) in rows.iter().zip(&row_widths).enumerate() {
            let mut x = centered(content_width, *row_width);
            let mut row_height: f64 = 0.0;
            for slot in row {
                let page = &mut base.pages[*slot];
                page.place(x, y);
                page.row_index = row_index;
                x += page.width;
                row_height = row_height.max(page.height);
            }
            y += row_height;
        }

        base.content_width = content_width;
        base.content_height = y;
    }

    fn zoom_auto_value(&self, _base: &LayoutBase, fit_width: f64, _fit_height: f64) -> f64 {
        fit_width.min(1.0)
    }

    fn next_page(&self, base: &LayoutBase, slot: usize) -> usize {
        let row = base.pages[slot].row_index;
        base.pages[slot..]
            .iter()
            .find(|page| page.row_index > row)
            .map_or(base.last_slot(), |page| page.index)
    }

    fn previous_page(&self, base: &LayoutBase, slot: usize) -> usize {
        let row = base.pages[slot].row_index;
        if row == 0 {
            return 0;
        }
        base.pages
            .iter()
            .find(|page| page.row_index == row - 1)
            .map_or(0, |page| page.index)
    }

    fn scroll_position_for_page(&self, base: &LayoutBase, slot: usize) -> ScrollPosition {
        let page = &base.pages[slot];
        let left = if base.content_width > base.viewport.width {
            page.x0 + (page.width - base.viewport.width) / 2.0
        } else {
            0.0
        };
        ScrollPosition::new(left, page.y0)
    }
}
