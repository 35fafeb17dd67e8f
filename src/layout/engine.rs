//! The layout component

use std::str::FromStr;

use log::{debug, info};

use super::geometry::VisibilityIndex;
use super::state::{LayoutSnapshot, PageRange, PageState, ScrollPosition, ViewportSize, ZoomSnapshot, ZoomState};
use super::strategy::{LayoutBase, LayoutStrategy};
use super::zoom::{
    PresetValues, ZoomMode, ZoomThresholds, ZoomValue, build_zoom_levels, clamp_zoom,
    next_zoom_level,
};
use super::LayoutMode;
use crate::config::ViewerConfig;
use crate::error::ConfigError;
use crate::metadata::PageSize;
use crate::scope::{Component, Context, LinkTarget, Message, MessageKind, Subscription};

const ZOOM_EPSILON: f64 = 1e-9;

const LAYOUT_MESSAGES: &[MessageKind] = &[
    MessageKind::Resize,
    MessageKind::Scroll,
    MessageKind::ScrollEnd,
    MessageKind::LinkClick,
];

/// Where `scroll_to` should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    /// 1-indexed document page, clamped to the displayed range
    Page(usize),
    Next,
    Previous,
    First,
    Last,
}

impl FromStr for ScrollTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "next" => Ok(Self::Next),
            "previous" | "prev" => Ok(Self::Previous),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            other => other
                .parse()
                .map(Self::Page)
                .map_err(|_| ConfigError::InvalidScrollTarget(s.to_string())),
        }
    }
}

/// Owns page geometry, zoom and focus for one layout mode.
///
/// Recreated from scratch when the layout mode changes.
pub struct LayoutEngine {
    strategy: Box<dyn LayoutStrategy>,
    base: LayoutBase,
    range: PageRange,
    configured_levels: Vec<f64>,
    zoom_levels: Vec<f64>,
    presets: PresetValues,
    thresholds: ZoomThresholds,
    min_zoom: f64,
    max_zoom: f64,
    arranged: bool,
    focus: Option<LayoutSnapshot>,
}

impl LayoutEngine {
    pub fn new(
        mode: LayoutMode,
        config: &ViewerConfig,
        sizes: &[PageSize],
        range: PageRange,
        viewport: ViewportSize,
    ) -> Self {
        let mut engine = Self {
            strategy: mode.strategy(),
            base: LayoutBase::new(sizes, viewport),
            range,
            configured_levels: config.sorted_zoom_levels(),
            zoom_levels: Vec::new(),
            presets: PresetValues {
                fit_width: 1.0,
                fit_height: 1.0,
                auto: 1.0,
            },
            thresholds: config.zoom_thresholds,
            min_zoom: config.min_zoom_value(),
            max_zoom: config.max_zoom_value(),
            arranged: false,
            focus: None,
        };
        engine.refresh_presets();
        engine
    }

    pub fn mode(&self) -> LayoutMode {
        self.strategy.mode()
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.base.zoom
    }

    pub fn zoom_levels(&self) -> &[f64] {
        &self.zoom_levels
    }

    pub fn presets(&self) -> PresetValues {
        self.presets
    }

    pub fn pages(&self) -> &[PageState] {
        &self.base.pages
    }

    pub fn page_range(&self) -> PageRange {
        self.range
    }

    pub fn viewport(&self) -> ViewportSize {
        self.base.viewport
    }

    pub fn scroll_position(&self) -> ScrollPosition {
        self.base.scroll
    }

    pub fn content_size(&self) -> (f64, f64) {
        (self.base.content_width, self.base.content_height)
    }

    /// 1-indexed document page in focus
    pub fn current_page(&self) -> usize {
        self.range.page_of(self.base.current)
    }

    pub fn is_draggable(&self) -> bool {
        self.base.is_draggable()
    }

    /// Preset a numeric zoom coincides with under the current geometry
    pub fn zoom_mode_for(&self, zoom: f64) -> Option<ZoomMode> {
        self.presets.mode_for(zoom, self.thresholds.preset)
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        let range = self.range;
        LayoutSnapshot {
            page: range.page_of(self.base.current),
            num_pages: self.base.num_pages(),
            visible_pages: self.base.visible.iter().map(|slot| range.page_of(slot)).collect(),
            fully_visible_pages: self
                .base
                .fully_visible
                .map(|fully| fully.iter().map(|slot| range.page_of(slot)).collect())
                .unwrap_or_default(),
        }
    }

    pub fn zoom_snapshot(&self) -> ZoomSnapshot {
        let layout = self.snapshot();
        let zoom = self.base.zoom;
        ZoomSnapshot {
            zoom: zoom.zoom,
            prev_zoom: zoom.prev_zoom,
            zoom_mode: zoom.zoom_mode,
            can_zoom_in: zoom.can_zoom_in,
            can_zoom_out: zoom.can_zoom_out,
            page: layout.page,
            num_pages: layout.num_pages,
            visible_pages: layout.visible_pages,
            fully_visible_pages: layout.fully_visible_pages,
            is_draggable: self.base.is_draggable(),
        }
    }

    /// First arrangement: apply the initial zoom, then go to the initial page
    pub fn init(&mut self, zoom: ZoomValue, page: usize, cx: &mut Context<'_>) {
        self.set_zoom(zoom, cx);
        if page != self.range.page_of(0) {
            self.scroll_to(ScrollTarget::Page(page), cx);
        }
    }

    pub fn set_zoom(&mut self, value: ZoomValue, cx: &mut Context<'_>) {
        self.refresh_presets();
        let current = self.base.zoom;
        let (target, mode) = self.resolve_zoom(value);
        let zoom = clamp_zoom(target, self.min_zoom, self.max_zoom);
        let changed = !self.arranged
            || (zoom - current.zoom).abs() > ZOOM_EPSILON
            || mode != current.zoom_mode;

        if changed {
            let mut before = self.zoom_snapshot();
            before.prev_zoom = current.zoom;
            before.zoom = zoom;
            before.zoom_mode = mode;
            cx.broadcast(Message::BeforeZoom(before));
            self.base.zoom.prev_zoom = current.zoom;
        }
        self.base.zoom.zoom = zoom;
        self.base.zoom.zoom_mode = mode;

        let viewport_relative = matches!(value, ZoomValue::Mode(_) | ZoomValue::Continue);
        self.apply_zoom(current.zoom, viewport_relative);
        self.update_zoom_flags();
        self.refresh(None);

        if changed {
            info!(
                "Zoom {:.3} -> {zoom:.3} ({})",
                current.zoom,
                mode.map_or("explicit", ZoomMode::as_str)
            );
            cx.broadcast(Message::Zoom(self.zoom_snapshot()));
        }
        self.emit_focus(cx);
    }

    pub fn scroll_to(&mut self, target: ScrollTarget, cx: &mut Context<'_>) {
        let count = self.base.num_pages();
        if count == 0 {
            return;
        }
        let slot = match target {
            ScrollTarget::Page(page) => page.saturating_sub(self.range.first + 1).min(count - 1),
            ScrollTarget::Next => self.strategy.next_page(&self.base, self.base.current),
            ScrollTarget::Previous => self.strategy.previous_page(&self.base, self.base.current),
            ScrollTarget::First => 0,
            ScrollTarget::Last => count - 1,
        };
        let slot = self.strategy.align_page(slot);
        debug!("Scrolling to slot {slot} ({target:?})");

        if self.strategy.is_paged() {
            self.base.current = slot;
        }
        let position = self.strategy.scroll_position_for_page(&self.base, slot);
        self.base.scroll = self.base.clamp_scroll(position);
        self.refresh(Some(slot));
        self.emit_focus(cx);
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64, cx: &mut Context<'_>) {
        let scroll = self.base.scroll;
        self.base.scroll = self
            .base
            .clamp_scroll(ScrollPosition::new(scroll.left + dx, scroll.top + dy));
        self.refresh(None);
        self.emit_focus(cx);
    }

    /// Record a host-reported scroll offset without notifying anyone
    pub fn set_scroll_position(&mut self, position: ScrollPosition) {
        self.base.scroll = self.base.clamp_scroll(position);
    }

    pub fn handle_scroll(&mut self, position: ScrollPosition, cx: &mut Context<'_>) {
        self.set_scroll_position(position);
        self.refresh(None);
        self.emit_focus(cx);
    }

    pub fn handle_resize(&mut self, size: ViewportSize, cx: &mut Context<'_>) {
        if !size.is_valid() || size == self.base.viewport {
            return;
        }
        debug!("Viewport resized to {}x{}", size.width, size.height);
        self.base.viewport = size;
        self.set_zoom(ZoomValue::Continue, cx);
    }

    /// Re-measure and re-arrange with the current zoom mode
    pub fn update_layout(&mut self, cx: &mut Context<'_>) {
        self.set_zoom(ZoomValue::Continue, cx);
    }

    fn resolve_zoom(&self, value: ZoomValue) -> (f64, Option<ZoomMode>) {
        let current = self.base.zoom;
        match value {
            ZoomValue::Level(level) => (level, self.zoom_mode_for(level)),
            ZoomValue::Mode(mode) => (self.presets.value(mode), Some(mode)),
            ZoomValue::In | ZoomValue::Out => {
                match next_zoom_level(&self.zoom_levels, current.zoom, value == ZoomValue::In) {
                    Some(level) => (level, self.zoom_mode_for(level)),
                    None => (current.zoom, current.zoom_mode),
                }
            }
            ZoomValue::Continue => match current.zoom_mode {
                Some(mode) => (self.presets.value(mode), Some(mode)),
                None => (current.zoom, None),
            },
        }
    }

    fn refresh_presets(&mut self) {
        let fit_width = self.strategy.fit_width_value(&self.base);
        let fit_height = self.strategy.fit_height_value(&self.base);
        let auto = self.strategy.zoom_auto_value(&self.base, fit_width, fit_height);
        self.presets = PresetValues {
            fit_width,
            fit_height,
            auto,
        };
        self.zoom_levels = build_zoom_levels(
            &self.configured_levels,
            &self.presets,
            self.thresholds,
            self.min_zoom,
            self.max_zoom,
        );
    }

    /// Re-arrange for the new zoom and move the scroll offset with it.
    ///
    /// Viewport-relative zooms keep the top-left offset proportional;
    /// explicit zooms keep the viewport center on the same content.
    fn apply_zoom(&mut self, prev_zoom: f64, viewport_relative: bool) {
        self.strategy.arrange(&mut self.base);
        self.arranged = true;

        let scroll = self.base.scroll;
        let viewport = self.base.viewport;
        let ratio = if prev_zoom > 0.0 {
            self.base.zoom.zoom / prev_zoom
        } else {
            1.0
        };
        let position = if viewport_relative {
            ScrollPosition::new(scroll.left * ratio, scroll.top * ratio)
        } else {
            ScrollPosition::new(
                (scroll.left + viewport.width / 2.0) * ratio - viewport.width / 2.0,
                (scroll.top + viewport.height / 2.0) * ratio - viewport.height / 2.0,
            )
        };
        self.base.scroll = self.base.clamp_scroll(position);
    }

    fn update_zoom_flags(&mut self) {
        let zoom = self.base.zoom.zoom;
        self.base.zoom.can_zoom_in = zoom < self.max_zoom - ZOOM_EPSILON
            && next_zoom_level(&self.zoom_levels, zoom, true).is_some();
        self.base.zoom.can_zoom_out = zoom > self.min_zoom + ZOOM_EPSILON
            && next_zoom_level(&self.zoom_levels, zoom, false).is_some();
    }

    /// Recompute visible ranges and the focused page.
    ///
    /// An explicitly targeted slot wins over the scroll-derived page while it
    /// is visible.
    fn refresh(&mut self, explicit: Option<usize>) {
        if self.base.pages.is_empty() {
            return;
        }
        self.base.index = VisibilityIndex::build(&self.base.pages);
        self.base.visible = self.strategy.visible_range(&self.base);
        self.base.fully_visible = self.strategy.fully_visible_range(&self.base);
        self.base.current = match explicit {
            Some(slot) if self.base.visible.contains(slot) => slot,
            _ => self.strategy.current_page(&self.base),
        };
    }

    /// Broadcast `pagefocus` when the focused page or visible set changed
    fn emit_focus(&mut self, cx: &mut Context<'_>) {
        let snapshot = self.snapshot();
        let unchanged = self.focus.as_ref().is_some_and(|focus| {
            focus.page == snapshot.page && focus.visible_pages == snapshot.visible_pages
        });
        if unchanged {
            return;
        }
        debug!(
            "Page focus {} (visible {:?})",
            snapshot.page, snapshot.visible_pages
        );
        self.focus = Some(snapshot.clone());
        cx.broadcast(Message::PageFocus(snapshot));
    }
}

impl Component for LayoutEngine {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn messages(&self) -> Subscription {
        Subscription::Only(LAYOUT_MESSAGES)
    }

    fn on_message(&mut self, message: &Message, cx: &mut Context<'_>) {
        match message {
            Message::Resize(size) => self.handle_resize(*size, cx),
            Message::Scroll(position) | Message::ScrollEnd(position) => {
                self.handle_scroll(*position, cx);
            }
            Message::LinkClick(LinkTarget::Internal { page }) => {
                self.scroll_to(ScrollTarget::Page(*page), cx);
            }
            _ => {}
        }
    }
}
