//! Clickable link boxes over a page

use super::{LayerPoll, PageLayer};
use crate::fetch::FetchResponse;
use crate::metadata::{LinkSpec, PageSize};
use crate::page::render::Displayable;
use crate::scope::{Context, LinkTarget};

/// A link hotspot in page-relative units (0.0..=1.0 of the page size)
#[derive(Debug, Clone, PartialEq)]
pub struct LinkBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub target: LinkTarget,
}

impl LinkBox {
    /// `None` for links with neither a destination nor a uri
    fn from_spec(link: &LinkSpec, size: PageSize) -> Option<Self> {
        let target = match (&link.destination, &link.uri) {
            (Some(destination), _) => LinkTarget::Internal {
                page: destination.pagenum,
            },
            (None, Some(uri)) => LinkTarget::External { uri: uri.clone() },
            (None, None) => return None,
        };
        let [x0, y0, x1, y1] = link.bbox;
        let (width, height) = (size.width.max(f64::EPSILON), size.height.max(f64::EPSILON));
        Some(Self {
            left: x0.min(x1) / width,
            top: y0.min(y1) / height,
            width: (x1 - x0).abs() / width,
            height: (y1 - y0).abs() / height,
            target,
        })
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

/// The link overlay of one page. Built once; shown while the page is loaded.
#[derive(Debug, Clone)]
pub struct LinkLayer {
    boxes: Vec<LinkBox>,
    enabled: bool,
    shown: bool,
}

impl LinkLayer {
    pub fn new(links: &[LinkSpec], size: PageSize, enabled: bool) -> Self {
        Self {
            boxes: links
                .iter()
                .filter_map(|link| LinkBox::from_spec(link, size))
                .collect(),
            enabled,
            shown: false,
        }
    }

    pub fn boxes(&self) -> &[LinkBox] {
        &self.boxes
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.enabled, enabled) != enabled
    }

    /// Whether clicks currently reach the links
    pub fn is_active(&self) -> bool {
        self.enabled && self.shown
    }

    /// Target of the link at a page-relative point, topmost (last) first
    pub fn hit(&self, x: f64, y: f64) -> Option<&LinkTarget> {
        if !self.is_active() {
            return None;
        }
        self.boxes
            .iter()
            .rev()
            .find(|link| link.contains(x, y))
            .map(|link| &link.target)
    }

    pub fn target(&self, index: usize) -> Option<&LinkTarget> {
        if !self.is_active() {
            return None;
        }
        self.boxes.get(index).map(|link| &link.target)
    }
}

/// Nothing to fetch: the boxes come from the metadata
impl PageLayer for LinkLayer {
    fn preload(&mut self, _cx: &mut Context<'_>) {}

    fn load(&mut self, _cx: &mut Context<'_>) -> LayerPoll {
        self.shown = true;
        LayerPoll::Ready
    }

    fn deliver(&mut self, _response: &FetchResponse, _cx: &mut Context<'_>) -> Option<LayerPoll> {
        None
    }

    fn unload(&mut self, _cx: &mut Context<'_>) {
        self.shown = false;
    }

    fn destroy(&mut self, _cx: &mut Context<'_>) {
        self.shown = false;
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn node(&self) -> Option<&Displayable> {
        None
    }
}
