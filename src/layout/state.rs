//! Geometry and zoom state shared by every layout strategy

use super::zoom::ZoomMode;

/// Host viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Scroll offset of the viewport's top-left corner in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    pub left: f64,
    pub top: f64,
}

impl ScrollPosition {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Geometry of one displayed page.
///
/// `x0..x1`/`y0..y1` are viewport pixels including padding; `actual_*` are
/// document points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageState {
    pub index: usize,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub width: f64,
    pub height: f64,
    pub actual_width: f64,
    pub actual_height: f64,
    pub padding: Padding,
    pub row_index: usize,
}

impl PageState {
    pub fn new(index: usize, actual_width: f64, actual_height: f64, padding: Padding) -> Self {
        Self {
            index,
            actual_width,
            actual_height,
            padding,
            ..Self::default()
        }
    }

    /// Size the box for `zoom`, keeping its origin
    pub fn scale(&mut self, zoom: f64) {
        self.width = self.actual_width * zoom + self.padding.horizontal();
        self.height = self.actual_height * zoom + self.padding.vertical();
        self.x1 = self.x0 + self.width;
        self.y1 = self.y0 + self.height;
    }

    pub fn place(&mut self, x0: f64, y0: f64) {
        self.x0 = x0;
        self.y0 = y0;
        self.x1 = x0 + self.width;
        self.y1 = y0 + self.height;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    pub zoom: f64,
    pub prev_zoom: f64,
    /// `None` for an explicit numeric zoom
    pub zoom_mode: Option<ZoomMode>,
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            prev_zoom: 0.0,
            zoom_mode: None,
            can_zoom_in: false,
            can_zoom_out: false,
        }
    }
}

/// Payload of `pagefocus`. Page numbers are 1-indexed document pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    pub page: usize,
    pub num_pages: usize,
    pub visible_pages: Vec<usize>,
    pub fully_visible_pages: Vec<usize>,
}

/// Payload of `beforezoom` and `zoom`
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomSnapshot {
    pub zoom: f64,
    pub prev_zoom: f64,
    pub zoom_mode: Option<ZoomMode>,
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
    pub page: usize,
    pub num_pages: usize,
    pub visible_pages: Vec<usize>,
    pub fully_visible_pages: Vec<usize>,
    pub is_draggable: bool,
}

impl ZoomSnapshot {
    pub fn layout(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            page: self.page,
            num_pages: self.num_pages,
            visible_pages: self.visible_pages.clone(),
            fully_visible_pages: self.fully_visible_pages.clone(),
        }
    }
}

/// Displayed slice of the document.
///
/// Components index pages by slot (0-based position among displayed pages);
/// messages carry 1-indexed document page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRange {
    /// 0-indexed document page of slot 0
    pub first: usize,
    pub count: usize,
}

impl PageRange {
    pub fn new(first: usize, count: usize) -> Self {
        Self { first, count }
    }

    /// 1-indexed document page number of a slot
    pub fn page_of(&self, slot: usize) -> usize {
        self.first + slot + 1
    }

    /// Slot of a 1-indexed document page, if it is displayed
    pub fn slot_of(&self, page: usize) -> Option<usize> {
        let slot = page.checked_sub(self.first + 1)?;
        (slot < self.count).then_some(slot)
    }

    pub fn last_page(&self) -> usize {
        self.first + self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_box_includes_padding() {
        let mut page = PageState::new(0, 100.0, 200.0, Padding::uniform(5.0));
        page.place(10.0, 20.0);
        page.scale(2.0);

        assert_eq!(page.width, 210.0);
        assert_eq!(page.height, 410.0);
        assert_eq!(page.x1, page.x0 + page.width);
        assert_eq!(page.y1, 430.0);
    }

    #[test]
    fn page_range_maps_slots_to_document_pages() {
        let range = PageRange::new(1, 3);

        assert_eq!(range.page_of(0), 2);
        assert_eq!(range.slot_of(2), Some(0));
        assert_eq!(range.slot_of(4), Some(2));
        assert_eq!(range.slot_of(1), None);
        assert_eq!(range.slot_of(5), None);
        assert_eq!(range.last_page(), 4);
    }
}
