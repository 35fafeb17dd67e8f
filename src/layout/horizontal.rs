//! Horizontally scrolling layout

use super::LayoutMode;
use super::state::ScrollPosition;
use super::strategy::{LayoutBase, LayoutStrategy, centered};

/// One row of pages, scrolled left to right
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalLayout;

impl LayoutStrategy for HorizontalLayout {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Horizontal
    }

    fn arrange(&self, base: &mut LayoutBase) {
        base.scale_pages();
        let tallest = base.pages.iter().map(|p| p.height).fold(0.0, f64::max);
        let content_height = tallest.max(base.viewport.height);

        let mut x = 0.0;
        for page in &mut base.pages {
            let y = centered(content_height, page.height);
            page.place(x, y);
            page.row_index = 0;
            x += page.width;
        }

        base.content_width = x.max(base.viewport.width);
        base.content_height = content_height;
    }

    /// Landscape documents may zoom past actual size to fill the viewport
    fn zoom_auto_value(&self, base: &LayoutBase, fit_width: f64, fit_height: f64) -> f64 {
        if base.max_actual_width() > base.max_actual_height() {
            fit_width.min(fit_height)
        } else {
            fit_height.min(1.0)
        }
    }

    fn is_vertical(&self) -> bool {
        false
    }

    fn scroll_position_for_page(&self, base: &LayoutBase, slot: usize) -> ScrollPosition {
        ScrollPosition::new(base.pages[slot].x0, base.scroll.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::state::ViewportSize;
    use crate::metadata::PageSize;

    #[test]
    fn pages_line_up_and_center_vertically() {
        let sizes = [
            PageSize {
                width: 100.0,
                height: 100.0,
            },
            PageSize {
                width: 100.0,
                height: 300.0,
            },
        ];
        let mut base = LayoutBase::new(&sizes, ViewportSize::new(150.0, 200.0));
        base.zoom.zoom = 1.0;

        HorizontalLayout.arrange(&mut base);

        assert_eq!(base.pages[1].x0, base.pages[0].x1);
        assert_eq!(base.content_height, 320.0);
        assert_eq!(base.pages[0].y0, 100.0);
        assert_eq!(base.content_width, 240.0);
        assert!(base.pages.iter().all(|p| p.row_index == 0));
    }

    #[test]
    fn landscape_auto_zoom_can_exceed_actual_size() {
        let sizes = [PageSize {
            width: 300.0,
            height: 100.0,
        }];
        let base = LayoutBase::new(&sizes, ViewportSize::new(1000.0, 1000.0));

        assert_eq!(HorizontalLayout.zoom_auto_value(&base, 3.2, 9.8), 3.2);
    }
}
