//! Page layers: the pieces a page is assembled from
//!
//! Each asset layer owns one request (`FetchSlot`) and, once displayed, one
//! materialized node. Layers never talk to each other; the page controller
//! decides when they load and reads their readiness.

mod image;
mod links;
mod slot;
mod svg;
mod text;

use std::rc::Rc;

use log::debug;

use super::render::{Displayable, Renderer};
use crate::error::AssetError;
use crate::fetch::{AssetKind, FetchResponse};
use crate::scope::{Context, Message};

pub use image::ImageFormat;
pub use links::{LinkBox, LinkLayer};
pub use slot::FetchSlot;
pub use svg::{SvgAssets, SvgFormat};
pub use text::TextLayer;

/// Turns a fetched body into a displayable node
pub trait AssetFormat {
    fn kind(&self) -> AssetKind;

    fn materialize(&self, page: usize, body: &[u8], renderer: &dyn Renderer) -> Displayable;
}

/// Progress of a layer towards being displayed
#[derive(Debug, Clone, PartialEq)]
pub enum LayerPoll {
    Ready,
    Pending,
    Failed(AssetError),
}

/// Lifecycle shared by every page layer
pub trait PageLayer {
    /// Set up the container; no network I/O
    fn prepare(&mut self) {}

    /// Start fetching without displaying anything
    fn preload(&mut self, cx: &mut Context<'_>);

    /// Display the layer, fetching first if needed
    fn load(&mut self, cx: &mut Context<'_>) -> LayerPoll;

    /// Accept a completed fetch. `None` if the response is not for this layer.
    fn deliver(&mut self, response: &FetchResponse, cx: &mut Context<'_>) -> Option<LayerPoll>;

    /// Stop showing the layer and drop in-flight work
    fn unload(&mut self, cx: &mut Context<'_>);

    fn destroy(&mut self, cx: &mut Context<'_>);

    /// Displayed (or nothing to display)
    fn is_ready(&self) -> bool;

    fn node(&self) -> Option<&Displayable>;
}

#[derive(Debug, Clone)]
struct Node {
    displayable: Displayable,
    hidden: bool,
}

/// A layer backed by one fetched asset
pub struct AssetLayer<F> {
    format: F,
    page: usize,
    url: String,
    renderer: Rc<dyn Renderer>,
    remove_on_unload: bool,
    prepared: bool,
    slot: FetchSlot,
    node: Option<Node>,
    wants_display: bool,
}

impl<F: AssetFormat> AssetLayer<F> {
    pub fn new(
        format: F,
        page: usize,
        url: String,
        renderer: Rc<dyn Renderer>,
        remove_on_unload: bool,
    ) -> Self {
        Self {
            format,
            page,
            url,
            renderer,
            remove_on_unload,
            prepared: false,
            slot: FetchSlot::Idle,
            node: None,
            wants_display: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_fetching(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    fn show_fetched(&mut self) -> bool {
        let Some(body) = self.slot.take_body() else {
            return false;
        };
        let displayable = self.format.materialize(self.page, &body, self.renderer.as_ref());
        self.node = Some(Node {
            displayable,
            hidden: false,
        });
        true
    }
}

impl<F: AssetFormat> PageLayer for AssetLayer<F> {
    fn prepare(&mut self) {
        self.prepared = true;
    }

    fn preload(&mut self, cx: &mut Context<'_>) {
        self.prepare();
        if self.node.is_none() {
            self.slot.start(&self.url, self.format.kind(), self.page, cx);
        }
    }

    fn load(&mut self, cx: &mut Context<'_>) -> LayerPoll {
        self.prepare();
        self.wants_display = true;
        if let Some(node) = &mut self.node {
            node.hidden = false;
            return LayerPoll::Ready;
        }
        if self.show_fetched() {
            return LayerPoll::Ready;
        }
        self.slot.start(&self.url, self.format.kind(), self.page, cx);
        LayerPoll::Pending
    }

    fn deliver(&mut self, response: &FetchResponse, cx: &mut Context<'_>) -> Option<LayerPoll> {
        match self.slot.accept(response)? {
            Ok(()) if self.wants_display && self.show_fetched() => Some(LayerPoll::Ready),
            Ok(()) => Some(LayerPoll::Pending),
            Err(error) => {
                debug!("Page {} {} failed: {error}", self.page, self.format.kind().as_str());
                cx.broadcast(Message::AssetError(error.clone()));
                Some(LayerPoll::Failed(error))
            }
        }
    }

    fn unload(&mut self, cx: &mut Context<'_>) {
        self.wants_display = false;
        self.slot.abort(cx);
        if self.remove_on_unload {
            self.node = None;
        } else if let Some(node) = &mut self.node {
            node.hidden = true;
        }
    }

    fn destroy(&mut self, cx: &mut Context<'_>) {
        self.wants_display = false;
        self.slot.abort(cx);
        self.node = None;
    }

    fn is_ready(&self) -> bool {
        self.node.as_ref().is_some_and(|node| !node.hidden)
    }

    fn node(&self) -> Option<&Displayable> {
        self.node
            .as_ref()
            .filter(|node| !node.hidden)
            .map(|node| &node.displayable)
    }
}
