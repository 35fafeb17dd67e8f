use std::rc::Rc;

use super::{AssetFormat, AssetLayer, LayerPoll, PageLayer};
use crate::content::process_text_layer;
use crate::fetch::{AssetKind, FetchResponse};
use crate::page::render::{Displayable, PageContent, Renderer};
use crate::scope::Context;

#[derive(Debug, Clone, Copy, Default)]
struct TextFormat;

impl AssetFormat for TextFormat {
    fn kind(&self) -> AssetKind {
        AssetKind::Text
    }

    fn materialize(&self, page: usize, body: &[u8], _renderer: &dyn Renderer) -> Displayable {
        let html = process_text_layer(&String::from_utf8_lossy(body));
        Displayable {
            page,
            content: PageContent::Text(html),
        }
    }
}

/// Selectable text overlay.
///
/// While disabled it fetches nothing and never holds up a page load.
pub struct TextLayer {
    inner: AssetLayer<TextFormat>,
    enabled: bool,
}

impl TextLayer {
    pub fn new(
        page: usize,
        url: String,
        renderer: Rc<dyn Renderer>,
        remove_on_unload: bool,
        enabled: bool,
    ) -> Self {
        Self {
            inner: AssetLayer::new(TextFormat, page, url, renderer, remove_on_unload),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true if the flag changed. Disabling drops the overlay.
    pub fn set_enabled(&mut self, enabled: bool, cx: &mut Context<'_>) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        if !enabled {
            self.inner.unload(cx);
        }
        true
    }
}

impl PageLayer for TextLayer {
    fn prepare(&mut self) {
        self.inner.prepare();
    }

    fn preload(&mut self, cx: &mut Context<'_>) {
        if self.enabled {
            self.inner.preload(cx);
        }
    }

    fn load(&mut self, cx: &mut Context<'_>) -> LayerPoll {
        if self.enabled {
            self.inner.load(cx)
        } else {
            LayerPoll::Ready
        }
    }

    fn deliver(&mut self, response: &FetchResponse, cx: &mut Context<'_>) -> Option<LayerPoll> {
        self.inner.deliver(response, cx)
    }

    fn unload(&mut self, cx: &mut Context<'_>) {
        self.inner.unload(cx);
    }

    fn destroy(&mut self, cx: &mut Context<'_>) {
        self.inner.destroy(cx);
    }

    fn is_ready(&self) -> bool {
        !self.enabled || self.inner.is_ready()
    }

    fn node(&self) -> Option<&Displayable> {
        if self.enabled { self.inner.node() } else { None }
    }
}
