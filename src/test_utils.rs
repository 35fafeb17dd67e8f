//! Fixtures shared by unit and integration tests

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::ManualClock;
use crate::config::ViewerConfig;
use crate::fetch::{AssetTemplates, AssetUrls, FetchFailure, FetchPool, Fetcher};
use crate::metadata::{LinkSpec, PageSize};
use crate::page::{PageController, PageSetup, RetainedRenderer, SvgAssets};
use crate::scope::{
    Component, ComponentRef, Context, Message, MessageKind, Registry, Scope, Subscription,
};

pub const DOC_URL: &str = "mem://doc/";

/// In-memory asset server.
///
/// Unknown URLs answer 404. Every call to `fetch` is counted per URL.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    failures: Mutex<HashMap<String, FetchFailure>>,
    counts: Mutex<HashMap<String, usize>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, body: Vec<u8>) {
        let url = url.into();
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&url);
        self.bodies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url, body);
    }

    /// Make every fetch of `url` fail with `failure`
    pub fn fail(&self, url: impl Into<String>, failure: FetchFailure) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.into(), failure);
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Total fetches of URLs containing `needle`
    pub fn fetch_count_matching(&self, needle: &str) -> usize {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(url, _)| url.contains(needle))
            .map(|(_, count)| count)
            .sum()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        *self
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(url.to_string())
            .or_default() += 1;

        if let Some(failure) = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
        {
            return Err(failure.clone());
        }
        self.bodies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
            .ok_or_else(|| FetchFailure::new("not found").with_status(404))
    }
}

/// Records every message broadcast on a scope
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Rc<RefCell<Vec<Message>>>,
}

struct LogComponent {
    messages: Rc<RefCell<Vec<Message>>>,
}

impl Component for LogComponent {
    fn name(&self) -> &'static str {
        "message-log"
    }

    fn messages(&self) -> Subscription {
        Subscription::All
    }

    fn on_message(&mut self, message: &Message, _cx: &mut Context<'_>) {
        self.messages.borrow_mut().push(message.clone());
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A component feeding this log; add it to a scope
    pub fn component(&self) -> ComponentRef {
        Rc::new(RefCell::new(LogComponent {
            messages: Rc::clone(&self.messages),
        }))
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<MessageKind> {
        self.messages.borrow().iter().map(Message::kind).collect()
    }

    pub fn count(&self, kind: MessageKind) -> usize {
        self.messages
            .borrow()
            .iter()
            .filter(|message| message.kind() == kind)
            .count()
    }

    pub fn last(&self, kind: MessageKind) -> Option<Message> {
        self.messages
            .borrow()
            .iter()
            .rev()
            .find(|message| message.kind() == kind)
            .cloned()
    }

    /// Pages of every `pageload`, in order
    pub fn loaded_pages(&self) -> Vec<usize> {
        self.messages
            .borrow()
            .iter()
            .filter_map(|message| match message {
                Message::PageLoad { page } => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Pages of every `pageunload`, in order
    pub fn unloaded_pages(&self) -> Vec<usize> {
        self.messages
            .borrow()
            .iter()
            .filter_map(|message| match message {
                Message::PageUnload { page } => Some(*page),
                _ => None,
            })
            .collect()
    }
}

/// A scope over an empty in-memory fetcher and a manual clock
pub fn test_scope(config: ViewerConfig) -> Scope {
    test_scope_with(config, Arc::new(MemoryFetcher::new()), ManualClock::new())
}

pub fn test_scope_with(
    config: ViewerConfig,
    fetcher: Arc<MemoryFetcher>,
    clock: ManualClock,
) -> Scope {
    let registry = Registry::new(fetcher.clone()).with_clock(Rc::new(clock));
    let pool = FetchPool::inline(fetcher, config.cache_size, config.retries);
    Scope::new(Rc::new(config), Rc::new(registry), pool)
}

pub fn uniform_sizes(count: usize, width: f64, height: f64) -> Vec<PageSize> {
    vec![PageSize { width, height }; count]
}

/// Builder for a converted document served from `DOC_URL`
#[derive(Debug, Clone)]
pub struct DocumentFixture {
    pages: usize,
    size: PageSize,
    links: Vec<LinkSpec>,
    stylesheet: String,
    missing: Vec<usize>,
}

impl DocumentFixture {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            size: PageSize {
                width: 100.0,
                height: 100.0,
            },
            links: Vec::new(),
            stylesheet: ".page{font-family:g_font_1}".to_string(),
            missing: Vec::new(),
        }
    }

    pub fn page_size(mut self, width: f64, height: f64) -> Self {
        self.size = PageSize { width, height };
        self
    }

    pub fn link(mut self, link: LinkSpec) -> Self {
        self.links.push(link);
        self
    }

    /// Leave this page's vector asset off the server
    pub fn missing_page(mut self, page: usize) -> Self {
        self.missing.push(page);
        self
    }

    pub fn info_json(&self) -> Vec<u8> {
        let value = serde_json::json!({
            "numpages": self.pages,
            "dimensions": {"width": self.size.width, "height": self.size.height},
            "links": self.links,
        });
        value.to_string().into_bytes()
    }

    pub fn install(&self, fetcher: &MemoryFetcher) {
        fetcher.insert(format!("{DOC_URL}info.json"), self.info_json());
        fetcher.insert(
            format!("{DOC_URL}stylesheet.css"),
            self.stylesheet.clone().into_bytes(),
        );
        for page in 1..=self.pages {
            if !self.missing.contains(&page) {
                fetcher.insert(
                    svg_url(page),
                    format!("<svg><text>page {page}</text></svg>").into_bytes(),
                );
            }
            fetcher.insert(
                format!("{DOC_URL}page-{page}.png"),
                format!("png {page}").into_bytes(),
            );
            fetcher.insert(
                text_url(page),
                format!("<div class=\"page-text\"><span>page {page}</span></div>").into_bytes(),
            );
        }
    }

    /// A fetcher already serving this document
    pub fn serve(&self) -> Arc<MemoryFetcher> {
        let fetcher = Arc::new(MemoryFetcher::new());
        self.install(&fetcher);
        fetcher
    }
}

pub fn svg_url(page: usize) -> String {
    format!("{DOC_URL}page-{page}.svg")
}

pub fn text_url(page: usize) -> String {
    format!("{DOC_URL}text-{page}.html")
}

/// Page setup for pages served from `DOC_URL`: vector content, text and
/// links enabled, nodes hidden on unload
pub fn page_setup() -> PageSetup {
    let urls = match AssetUrls::new(DOC_URL, String::new(), AssetTemplates::default()) {
        Ok(urls) => urls,
        Err(e) => panic!("fixture url: {e}"),
    };
    let base = urls.base().clone();
    PageSetup {
        urls: Rc::new(urls),
        svg: Some(Rc::new(SvgAssets {
            base,
            query: String::new(),
            stylesheet: String::new(),
        })),
        renderer: Rc::new(RetainedRenderer),
        remove_on_unload: false,
        text_enabled: true,
        links_enabled: true,
        converting: false,
    }
}

/// `count` 100x100 pages starting at document page 1
pub fn build_pages(count: usize, setup: &PageSetup) -> Vec<PageController> {
    (1..=count)
        .map(|page| {
            PageController::new(
                page,
                PageSize {
                    width: 100.0,
                    height: 100.0,
                },
                &[],
                setup,
            )
        })
        .collect()
}
