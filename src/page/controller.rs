//! Per-page lifecycle: status, layers and the messages a page emits

use std::rc::Rc;

use log::{debug, info, warn};

use super::element::{
    CLASS_CONVERTING, CLASS_ERROR, CLASS_LINKS_DISABLED, CLASS_LOADING, CLASS_TEXT_DISABLED,
    PageElement,
};
use super::layers::{
    AssetLayer, ImageFormat, LayerPoll, LinkLayer, PageLayer, SvgAssets, SvgFormat, TextLayer,
};
use super::render::{Displayable, Renderer};
use super::status::{LoadOutcome, PageStatus};
use crate::error::AssetError;
use crate::fetch::{AssetKind, AssetUrls, FetchResponse};
use crate::metadata::{LinkSpec, PageSize};
use crate::scope::{Context, LinkTarget, Message, PageAvailability};

/// How a page is built
#[derive(Clone)]
pub struct PageSetup {
    pub urls: Rc<AssetUrls>,
    pub svg: Option<Rc<SvgAssets>>,
    pub renderer: Rc<dyn Renderer>,
    pub remove_on_unload: bool,
    pub text_enabled: bool,
    pub links_enabled: bool,
    pub converting: bool,
}

/// One displayed page.
///
/// Owns a content layer (vector, or raster when vector is unsupported), a
/// text overlay and a link overlay.
pub struct PageController {
    page: usize,
    status: PageStatus,
    element: PageElement,
    content: Box<dyn PageLayer>,
    text: TextLayer,
    links: LinkLayer,
}

impl PageController {
    /// `page` is the 1-indexed document page
    pub fn new(page: usize, size: PageSize, links: &[LinkSpec], setup: &PageSetup) -> Self {
        let content: Box<dyn PageLayer> = match &setup.svg {
            Some(assets) => Box::new(AssetLayer::new(
                SvgFormat::new(Rc::clone(assets)),
                page,
                setup.urls.resolve(AssetKind::Svg, Some(page)),
                Rc::clone(&setup.renderer),
                setup.remove_on_unload,
            )),
            None => Box::new(AssetLayer::new(
                ImageFormat,
                page,
                setup.urls.resolve(AssetKind::Image, Some(page)),
                Rc::clone(&setup.renderer),
                setup.remove_on_unload,
            )),
        };
        let text = TextLayer::new(
            page,
            setup.urls.resolve(AssetKind::Text, Some(page)),
            Rc::clone(&setup.renderer),
            setup.remove_on_unload,
            setup.text_enabled,
        );

        let mut element = PageElement::new();
        element.toggle_class(CLASS_TEXT_DISABLED, !setup.text_enabled);
        element.toggle_class(CLASS_LINKS_DISABLED, !setup.links_enabled);
        let status = if setup.converting {
            element.add_class(CLASS_CONVERTING);
            PageStatus::Converting
        } else {
            PageStatus::NotLoaded
        };

        Self {
            page,
            status,
            element,
            content,
            text,
            links: LinkLayer::new(links, size, setup.links_enabled),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn element(&self) -> &PageElement {
        &self.element
    }

    pub fn links(&self) -> &LinkLayer {
        &self.links
    }

    pub fn content_node(&self) -> Option<&Displayable> {
        self.content.node()
    }

    pub fn text_node(&self) -> Option<&Displayable> {
        self.text.node()
    }

    /// Start fetching content and text ahead of display
    pub fn preload(&mut self, cx: &mut Context<'_>) {
        self.content.prepare();
        if self.status == PageStatus::NotLoaded {
            self.content.preload(cx);
            self.text.preload(cx);
        }
    }

    pub fn load(&mut self, cx: &mut Context<'_>) -> LoadOutcome {
        match self.status {
            PageStatus::Converting | PageStatus::Error => LoadOutcome::Skipped,
            PageStatus::Loaded => LoadOutcome::AlreadyLoaded,
            PageStatus::Loading => LoadOutcome::InFlight,
            PageStatus::NotLoaded => {
                debug!("Loading page {}", self.page);
                self.status = PageStatus::Loading;
                self.element.add_class(CLASS_LOADING);
                let content = self.content.load(cx);
                let text = self.text.load(cx);
                if content == LayerPoll::Ready && text == LayerPoll::Ready {
                    self.check_loaded(cx);
                }
                LoadOutcome::Started
            }
        }
    }

    /// Route a completed fetch to the layer that asked for it
    pub fn deliver(&mut self, response: &FetchResponse, cx: &mut Context<'_>) -> bool {
        let poll = match self.content.deliver(response, cx) {
            Some(poll) => poll,
            None => match self.text.deliver(response, cx) {
                Some(poll) => poll,
                None => return false,
            },
        };
        match poll {
            LayerPoll::Ready => self.check_loaded(cx),
            LayerPoll::Pending => {}
            LayerPoll::Failed(error) => self.fail(error, cx),
        }
        true
    }

    pub fn unload(&mut self, cx: &mut Context<'_>) {
        match self.status {
            PageStatus::Loaded => {
                self.drop_layers(cx);
                self.status = PageStatus::NotLoaded;
                debug!("Unloaded page {}", self.page);
                cx.broadcast(Message::PageUnload { page: self.page });
            }
            PageStatus::Loading => {
                self.drop_layers(cx);
                self.element.remove_class(CLASS_LOADING);
                self.status = PageStatus::NotLoaded;
            }
            // cancels preloads
            PageStatus::NotLoaded => self.drop_layers(cx),
            PageStatus::Converting | PageStatus::Error => {}
        }
    }

    pub fn handle_available(&mut self, availability: PageAvailability) {
        if self.status == PageStatus::Converting && availability.covers(self.page) {
            self.status = PageStatus::NotLoaded;
            self.element.remove_class(CLASS_CONVERTING);
        }
    }

    pub fn set_text_enabled(&mut self, enabled: bool, cx: &mut Context<'_>) {
        if !self.text.set_enabled(enabled, cx) {
            return;
        }
        self.element.toggle_class(CLASS_TEXT_DISABLED, !enabled);
        if enabled && matches!(self.status, PageStatus::Loading | PageStatus::Loaded) {
            self.text.load(cx);
        }
        // disabling, or a preloaded overlay, can complete a pending load
        self.check_loaded(cx);
    }

    pub fn set_links_enabled(&mut self, enabled: bool) {
        if self.links.set_enabled(enabled) {
            self.element.toggle_class(CLASS_LINKS_DISABLED, !enabled);
        }
    }

    /// Activate a link by index; broadcasts `linkclick`
    pub fn click_link(&mut self, index: usize, cx: &mut Context<'_>) -> Option<LinkTarget> {
        let target = self.links.target(index)?.clone();
        cx.broadcast(Message::LinkClick(target.clone()));
        Some(target)
    }

    pub fn destroy(&mut self, cx: &mut Context<'_>) {
        self.content.destroy(cx);
        self.text.destroy(cx);
        self.links.destroy(cx);
    }

    fn drop_layers(&mut self, cx: &mut Context<'_>) {
        self.content.unload(cx);
        self.text.unload(cx);
        self.links.unload(cx);
    }

    fn check_loaded(&mut self, cx: &mut Context<'_>) {
        if self.status != PageStatus::Loading || !self.content.is_ready() || !self.text.is_ready() {
            return;
        }
        self.status = PageStatus::Loaded;
        self.element.remove_class(CLASS_LOADING);
        self.links.load(cx);
        debug!("Page {} loaded", self.page);
        cx.broadcast(Message::PageLoad { page: self.page });
    }

    fn fail(&mut self, error: AssetError, cx: &mut Context<'_>) {
        match self.status {
            PageStatus::Loading => {
                warn!("Page {} failed: {error}", self.page);
                self.content.unload(cx);
                self.text.unload(cx);
                self.status = PageStatus::Error;
                self.element.remove_class(CLASS_LOADING);
                self.element.add_class(CLASS_ERROR);
                cx.broadcast(Message::PageFail {
                    page: self.page,
                    error,
                });
            }
            // a text overlay arriving late on a loaded page; the page stays up
            PageStatus::Loaded => info!("Page {} text overlay failed: {error}", self.page),
            _ => debug!("Page {} preload failed: {error}", self.page),
        }
    }
}
