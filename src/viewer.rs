//! The viewer: public commands, host input and document startup
//!
//! A `Viewer` owns one scope. Startup fetches the metadata and stylesheet,
//! then builds the pages, the layout and the document component and marks
//! the scope ready. Everything after that is driven by `tick`: sensor timers,
//! fetch completions and the document's loading schedule.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{debug, error, info, trace};

use crate::config::ViewerConfig;
use crate::content::namespace_stylesheet;
use crate::document::DocumentComponent;
use crate::error::{AssetError, ConfigError, ViewerError};
use crate::fetch::{AssetKind, AssetTask, AssetUrls, FetchPool, FetchResponse};
use crate::layout::{
    LayoutEngine, LayoutMode, LayoutSnapshot, PageRange, ScrollPosition, ScrollTarget,
    ViewportSize, ZoomSnapshot, ZoomValue,
};
use crate::metadata::{DocumentMetadata, PageSize, sort_page_links};
use crate::page::{Displayable, PageController, PageSetup, PageStatus, SvgAssets};
use crate::scope::{
    Component, ComponentId, Context, LinkTarget, Message, MessageKind, PageAvailability, Registry,
    Scope, Subscription,
};
use crate::sensors::{Dragger, Resizer, Scroller};

static NEXT_VIEWER: AtomicUsize = AtomicUsize::new(1);

pub type Listener = Box<dyn FnMut(&Message)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    /// Built, `load` not called yet
    Created,
    /// Waiting for metadata and stylesheet
    Loading,
    Ready,
    /// Startup assets could not be loaded
    Failed,
    Destroyed,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, MessageKind, Listener)>,
}

/// Forwards public bus messages to host listeners
struct EventRelay {
    listeners: Rc<RefCell<Listeners>>,
}

impl Component for EventRelay {
    fn name(&self) -> &'static str {
        "viewer-events"
    }

    fn messages(&self) -> Subscription {
        Subscription::Only(MessageKind::PUBLIC)
    }

    fn on_message(&mut self, message: &Message, _cx: &mut Context<'_>) {
        let kind = message.kind();
        let mut listeners = self.listeners.borrow_mut();
        for (_, wanted, listener) in &mut listeners.entries {
            if *wanted == kind {
                listener(message);
            }
        }
    }
}

struct StartupAsset {
    task: AssetTask,
    body: Option<Arc<Vec<u8>>>,
}

struct Startup {
    metadata: StartupAsset,
    stylesheet: StartupAsset,
}

/// Components that exist once the document is ready
struct Mounted {
    metadata: DocumentMetadata,
    range: PageRange,
    sizes: Vec<PageSize>,
    layout_id: ComponentId,
    layout: Rc<RefCell<LayoutEngine>>,
    document: Rc<RefCell<DocumentComponent>>,
}

pub struct Viewer {
    config: Rc<ViewerConfig>,
    scope: Scope,
    urls: Rc<AssetUrls>,
    namespace: String,
    state: ViewerState,
    startup: Option<Startup>,
    mounted: Option<Mounted>,
    viewport: ViewportSize,
    layout_mode: LayoutMode,
    text_enabled: bool,
    links_enabled: bool,
    scroller: Scroller,
    resizer: Resizer,
    dragger: Dragger,
    listeners: Rc<RefCell<Listeners>>,
}

impl Viewer {
    /// Validate `config` and set up an idle viewer; call `load` to start
    pub fn new(
        config: ViewerConfig,
        registry: Rc<Registry>,
        viewport: ViewportSize,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if !viewport.is_valid() {
            return Err(ConfigError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let urls = AssetUrls::new(&config.url, config.query_string(), config.templates.clone())?;
        let utilities = registry.utilities();
        let support = utilities.support;
        let fetch = FetchPool::from_config(Arc::clone(&utilities.fetcher), &config);

        let config = Rc::new(config);
        let mut scope = Scope::new(Rc::clone(&config), registry, fetch);
        let listeners = Rc::new(RefCell::new(Listeners::default()));
        scope.add_component(Rc::new(RefCell::new(EventRelay {
            listeners: Rc::clone(&listeners),
        })));

        let namespace = format!("docview-{}", NEXT_VIEWER.fetch_add(1, Ordering::Relaxed));
        debug!("Created viewer {namespace} for {}", urls.base());

        Ok(Self {
            scope,
            urls: Rc::new(urls),
            namespace,
            state: ViewerState::Created,
            startup: None,
            mounted: None,
            viewport,
            layout_mode: config.layout,
            text_enabled: config.enable_text_selection,
            links_enabled: config.enable_links,
            scroller: Scroller::new(&support),
            resizer: Resizer::new(viewport),
            dragger: Dragger::new(config.enable_dragging),
            listeners,
            config,
        })
    }

    /// Request the metadata and stylesheet. Calling it again is a no-op.
    pub fn load(&mut self) -> Result<(), ViewerError> {
        self.ensure_alive()?;
        if self.state != ViewerState::Created {
            return Ok(());
        }
        info!("Loading document from {}", self.urls.base());

        let metadata_url = self.urls.resolve(AssetKind::Metadata, None);
        let stylesheet_url = self.urls.resolve(AssetKind::Stylesheet, None);
        let fetch = self.scope.fetch_mut();
        let metadata = fetch.submit(metadata_url, AssetKind::Metadata, None);
        let stylesheet = fetch.submit(stylesheet_url, AssetKind::Stylesheet, None);

        self.startup = Some(Startup {
            metadata: StartupAsset {
                task: metadata,
                body: None,
            },
            stylesheet: StartupAsset {
                task: stylesheet,
                body: None,
            },
        });
        self.state = ViewerState::Loading;
        Ok(())
    }

    /// Advance timers and hand out finished fetches.
    ///
    /// Hosts call this from their event loop; nothing happens between calls.
    pub fn tick(&mut self) {
        if self.state == ViewerState::Destroyed {
            return;
        }
        let now = self.now();

        if let Some(message) = self.resizer.tick(now) {
            if let Message::Resize(size) = message {
                self.viewport = size;
            }
            if self.mounted.is_some() {
                self.scope.broadcast(message);
            }
        }
        for message in self.scroller.tick(now) {
            self.scope.broadcast(message);
        }

        for response in self.scope.fetch_mut().poll() {
            self.handle_response(response);
        }

        if let Some(mounted) = &self.mounted {
            let document = Rc::clone(&mounted.document);
            self.scope.with_context(|cx| document.borrow_mut().tick(cx));
        }
        self.follow_scroll();
    }

    /// Register a listener for a public event
    pub fn on(&mut self, kind: MessageKind, listener: impl FnMut(&Message) + 'static) -> ListenerId {
        let mut listeners = self.listeners.borrow_mut();
        listeners.next_id += 1;
        let id = ListenerId(listeners.next_id);
        if !kind.is_public() {
            debug!("Listener for internal event {kind} will never fire");
        }
        listeners.entries.push((id, kind, Box::new(listener)));
        id
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _, _)| *entry != id);
        listeners.entries.len() != before
    }

    pub fn zoom(&mut self, value: ZoomValue) -> Result<(), ViewerError> {
        self.with_layout(|layout, cx| layout.set_zoom(value, cx))
    }

    pub fn scroll_to(&mut self, target: ScrollTarget) -> Result<(), ViewerError> {
        self.with_layout(|layout, cx| layout.scroll_to(target, cx))
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> Result<(), ViewerError> {
        self.with_layout(|layout, cx| layout.scroll_by(dx, dy, cx))
    }

    /// Re-measure the viewport and re-apply the current zoom
    pub fn update_layout(&mut self) -> Result<(), ViewerError> {
        self.with_layout(|layout, cx| layout.update_layout(cx))
    }

    /// Swap the layout, keeping the current page and zoom
    pub fn set_layout(&mut self, mode: LayoutMode) -> Result<(), ViewerError> {
        self.ensure_alive()?;
        let Some(mounted) = &self.mounted else {
            self.layout_mode = mode;
            return Ok(());
        };
        if mounted.layout.borrow().mode() == mode {
            return Ok(());
        }

        let (zoom, page) = {
            let old = mounted.layout.borrow();
            let state = old.zoom_state();
            let zoom = state
                .zoom_mode
                .map_or(ZoomValue::Level(state.zoom), ZoomValue::Mode);
            (zoom, old.current_page())
        };
        let old_id = mounted.layout_id;
        let layout = Rc::new(RefCell::new(LayoutEngine::new(
            mode,
            &self.config,
            &mounted.sizes,
            mounted.range,
            self.viewport,
        )));

        self.scope.destroy_component(old_id);
        let layout_id = self.scope.add_component(layout.clone());
        if let Some(mounted) = self.mounted.as_mut() {
            mounted.layout = Rc::clone(&layout);
            mounted.layout_id = layout_id;
        }
        self.layout_mode = mode;
        info!("Layout changed to {}", mode.as_str());

        self.scope.with_context(|cx| {
            layout.borrow_mut().init(zoom, page, cx);
            cx.broadcast(Message::LayoutChange { layout: mode });
        });
        self.follow_scroll();
        Ok(())
    }

    pub fn enable_text_selection(&mut self) -> Result<(), ViewerError> {
        self.set_text_selection(true)
    }

    pub fn disable_text_selection(&mut self) -> Result<(), ViewerError> {
        self.set_text_selection(false)
    }

    pub fn enable_links(&mut self) -> Result<(), ViewerError> {
        self.set_links(true)
    }

    pub fn disable_links(&mut self) -> Result<(), ViewerError> {
        self.set_links(false)
    }

    pub fn enable_dragging(&mut self) {
        self.dragger.set_enabled(true);
    }

    pub fn disable_dragging(&mut self) {
        self.dragger.set_enabled(false);
    }

    /// Tear everything down. Further commands return `ViewerError::Destroyed`.
    pub fn destroy(&mut self) {
        if self.state == ViewerState::Destroyed {
            return;
        }
        info!("Destroying viewer {}", self.namespace);
        self.scope.ready();
        self.scope.broadcast(Message::Destroy);
        self.scope.destroy();
        self.startup = None;
        self.mounted = None;
        self.dragger.end();
        self.state = ViewerState::Destroyed;
    }

    /// Host viewport size change; settles after a short debounce
    pub fn resize(&mut self, size: ViewportSize) -> Result<(), ViewerError> {
        self.ensure_alive()?;
        if !size.is_valid() {
            return Err(ConfigError::InvalidViewport {
                width: size.width,
                height: size.height,
            }
            .into());
        }
        let now = self.now();
        self.resizer.on_resize(size, now);
        Ok(())
    }

    /// Host scroll offset change (user scrolling)
    pub fn native_scroll(&mut self, position: ScrollPosition) -> Result<(), ViewerError> {
        self.ensure_alive()?;
        let Some(mounted) = &self.mounted else {
            return Ok(());
        };
        let position = {
            let mut layout = mounted.layout.borrow_mut();
            layout.set_scroll_position(position);
            layout.scroll_position()
        };
        let now = self.now();
        for message in self.scroller.on_scroll(position, now) {
            self.scope.broadcast(message);
        }
        Ok(())
    }

    /// Pointer down; `false` when dragging is off or there is nothing to drag
    pub fn drag_start(&mut self, x: f64, y: f64) -> bool {
        self.is_draggable() && self.dragger.start(x, y)
    }

    pub fn drag_move(&mut self, x: f64, y: f64) -> Result<(), ViewerError> {
        match self.dragger.move_to(x, y) {
            Some((dx, dy)) => self.scroll_by(dx, dy),
            None => Ok(()),
        }
    }

    pub fn drag_end(&mut self) {
        self.dragger.end();
    }

    /// Activate the `index`th link of a page
    pub fn click_link(&mut self, page: usize, index: usize) -> Result<Option<LinkTarget>, ViewerError> {
        self.ensure_alive()?;
        let Some(mounted) = &self.mounted else {
            return Ok(None);
        };
        let document = Rc::clone(&mounted.document);
        let target = self
            .scope
            .with_context(|cx| document.borrow_mut().click_link(page, index, cx));
        self.follow_scroll();
        Ok(target)
    }

    /// Conversion progress reported by the host
    pub fn page_available(&mut self, availability: PageAvailability) -> Result<(), ViewerError> {
        self.ensure_alive()?;
        debug!("Pages available: {availability:?}");
        self.scope.broadcast(Message::PageAvailable(availability));
        Ok(())
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ViewerState::Ready
    }

    /// Suffix applied to this viewer's font names
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn metadata(&self) -> Option<&DocumentMetadata> {
        self.mounted.as_ref().map(|mounted| &mounted.metadata)
    }

    /// Number of displayed pages
    pub fn num_pages(&self) -> Option<usize> {
        self.mounted.as_ref().map(|mounted| mounted.range.count)
    }

    pub fn page_range(&self) -> Option<PageRange> {
        self.mounted.as_ref().map(|mounted| mounted.range)
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn current_page(&self) -> Option<usize> {
        self.mounted
            .as_ref()
            .map(|mounted| mounted.layout.borrow().current_page())
    }

    pub fn layout_snapshot(&self) -> Option<LayoutSnapshot> {
        self.mounted
            .as_ref()
            .map(|mounted| mounted.layout.borrow().snapshot())
    }

    pub fn zoom_snapshot(&self) -> Option<ZoomSnapshot> {
        self.mounted
            .as_ref()
            .map(|mounted| mounted.layout.borrow().zoom_snapshot())
    }

    pub fn scroll_position(&self) -> Option<ScrollPosition> {
        self.mounted
            .as_ref()
            .map(|mounted| mounted.layout.borrow().scroll_position())
    }

    pub fn content_size(&self) -> Option<(f64, f64)> {
        self.mounted
            .as_ref()
            .map(|mounted| mounted.layout.borrow().content_size())
    }

    pub fn is_draggable(&self) -> bool {
        self.dragger.is_enabled()
            && self
                .mounted
                .as_ref()
                .is_some_and(|mounted| mounted.layout.borrow().is_draggable())
    }

    pub fn is_text_selection_enabled(&self) -> bool {
        self.text_enabled
    }

    pub fn are_links_enabled(&self) -> bool {
        self.links_enabled
    }

    pub fn page_status(&self, page: usize) -> Option<PageStatus> {
        self.mounted
            .as_ref()
            .and_then(|mounted| mounted.document.borrow().page_status(page))
    }

    /// Run `f` against a page's controller
    pub fn with_page<R>(&self, page: usize, f: impl FnOnce(&PageController) -> R) -> Option<R> {
        let mounted = self.mounted.as_ref()?;
        let document = mounted.document.borrow();
        document.page(page).map(f)
    }

    /// Materialized content of a page, if it is currently shown
    pub fn page_content(&self, page: usize) -> Option<Displayable> {
        self.with_page(page, |controller| controller.content_node().cloned())
            .flatten()
    }

    /// No fetches in flight, no loads queued and no scroll gesture open
    pub fn is_settled(&mut self) -> bool {
        if self.state == ViewerState::Loading {
            return false;
        }
        let loader_idle = self.mounted.as_ref().is_none_or(|mounted| {
            let document = mounted.document.borrow();
            let loader = document.loader();
            loader.queued().next().is_none() && !loader.is_scheduled()
        });
        loader_idle && !self.scroller.is_scrolling() && self.scope.fetch_mut().pending_count() == 0
    }

    fn now(&self) -> Instant {
        self.scope.utilities().clock.now()
    }

    fn ensure_alive(&self) -> Result<(), ViewerError> {
        if self.state == ViewerState::Destroyed {
            Err(ViewerError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn with_layout(
        &mut self,
        f: impl FnOnce(&mut LayoutEngine, &mut Context<'_>),
    ) -> Result<(), ViewerError> {
        self.ensure_alive()?;
        let Some(mounted) = &self.mounted else {
            debug!("Ignoring layout command before the document is ready");
            return Ok(());
        };
        let layout = Rc::clone(&mounted.layout);
        self.scope.with_context(|cx| f(&mut layout.borrow_mut(), cx));
        self.follow_scroll();
        Ok(())
    }

    /// Report offset changes the viewer made itself as scroll activity
    fn follow_scroll(&mut self) {
        let Some(mounted) = &self.mounted else {
            return;
        };
        let position = mounted.layout.borrow().scroll_position();
        if position == self.scroller.position() {
            return;
        }
        let now = self.now();
        for message in self.scroller.on_scroll(position, now) {
            self.scope.broadcast(message);
        }
    }

    fn set_text_selection(&mut self, enabled: bool) -> Result<(), ViewerError> {
        self.ensure_alive()?;
        if self.text_enabled == enabled {
            return Ok(());
        }
        self.text_enabled = enabled;
        if self.mounted.is_some() {
            self.scope.broadcast(Message::TextEnabledChange { enabled });
        }
        Ok(())
    }

    fn set_links(&mut self, enabled: bool) -> Result<(), ViewerError> {
        self.ensure_alive()?;
        if self.links_enabled == enabled {
            return Ok(());
        }
        self.links_enabled = enabled;
        if self.mounted.is_some() {
            self.scope.broadcast(Message::LinksEnabledChange { enabled });
        }
        Ok(())
    }

    fn handle_response(&mut self, response: FetchResponse) {
        match response.kind {
            AssetKind::Metadata | AssetKind::Stylesheet => self.handle_startup(response),
            AssetKind::Svg | AssetKind::Image | AssetKind::Text => {
                let Some(mounted) = &self.mounted else {
                    return;
                };
                let document = Rc::clone(&mounted.document);
                let delivered = self
                    .scope
                    .with_context(|cx| document.borrow_mut().deliver(&response, cx));
                if !delivered {
                    trace!("No page took {}", response.url);
                }
            }
        }
    }

    fn handle_startup(&mut self, response: FetchResponse) {
        let Some(startup) = self.startup.as_mut() else {
            return;
        };
        let asset = if response.id == startup.metadata.task.id {
            &mut startup.metadata
        } else if response.id == startup.stylesheet.task.id {
            &mut startup.stylesheet
        } else {
            return;
        };
        match response.result {
            Ok(body) => asset.body = Some(body),
            Err(error) => {
                self.fail(error);
                return;
            }
        }

        let bodies = match &self.startup {
            Some(Startup {
                metadata: StartupAsset {
                    body: Some(metadata),
                    ..
                },
                stylesheet: StartupAsset {
                    body: Some(stylesheet),
                    ..
                },
            }) => Some((Arc::clone(metadata), Arc::clone(stylesheet))),
            _ => None,
        };
        if let Some((metadata, stylesheet)) = bodies {
            self.startup = None;
            self.mount(&metadata, &stylesheet);
        }
    }

    fn fail(&mut self, error: AssetError) {
        error!("Failed to load document: {error}");
        if let Some(startup) = self.startup.take() {
            let fetch = self.scope.fetch_mut();
            fetch.cancel(&startup.metadata.task);
            fetch.cancel(&startup.stylesheet.task);
        }
        self.state = ViewerState::Failed;
        self.scope.ready();
        self.scope.broadcast(Message::AssetError(error.clone()));
        self.scope.broadcast(Message::Fail {
            error: error.to_string(),
        });
    }

    fn mount(&mut self, metadata: &[u8], stylesheet: &[u8]) {
        let metadata_url = self.urls.resolve(AssetKind::Metadata, None);
        let metadata = match DocumentMetadata::from_slice(metadata) {
            Ok(metadata) => metadata,
            Err(e) => {
                return self.fail(AssetError::new(metadata_url, format!("invalid metadata: {e}")));
            }
        };
        let Some((start, end)) = self.config.page_range(metadata.numpages) else {
            return self.fail(AssetError::new(
                metadata_url,
                format!("no pages to show out of {}", metadata.numpages),
            ));
        };

        let config = Rc::clone(&self.config);
        let utilities = self.scope.utilities().clone();
        let range = PageRange::new(start, end - start + 1);
        let links = sort_page_links(&metadata.links, metadata.numpages, start + 1, end + 1);

        let stylesheet = namespace_stylesheet(&String::from_utf8_lossy(stylesheet), &self.namespace);
        let svg = utilities.support.svg.then(|| {
            Rc::new(SvgAssets {
                base: self.urls.base().clone(),
                query: self.urls.query().to_string(),
                stylesheet,
            })
        });
        let setup = PageSetup {
            urls: Rc::clone(&self.urls),
            svg,
            renderer: Rc::clone(&utilities.renderer),
            remove_on_unload: config
                .remove_on_unload
                .unwrap_or_else(|| utilities.support.remove_on_unload()),
            text_enabled: self.text_enabled,
            links_enabled: self.links_enabled,
            converting: !config.conversion_is_complete,
        };

        let sizes: Vec<PageSize> = (0..range.count)
            .map(|slot| metadata.page_size(range.page_of(slot)))
            .collect();
        let pages: Vec<PageController> = (0..range.count)
            .map(|slot| {
                let page = range.page_of(slot);
                PageController::new(page, sizes[slot], &links[page - 1], &setup)
            })
            .collect();

        let layout = Rc::new(RefCell::new(LayoutEngine::new(
            self.layout_mode,
            &config,
            &sizes,
            range,
            self.viewport,
        )));
        let document = Rc::new(RefCell::new(DocumentComponent::new(
            pages,
            range,
            &utilities.support,
            config.autoload_first_page,
        )));
        let layout_id = self.scope.add_component(layout.clone());
        self.scope.add_component(document.clone());

        for name in config.plugins.keys() {
            let component = format!("plugin-{name}");
            if self.scope.create_component(&component).is_some() {
                debug!("Attached {component}");
            }
        }

        let (zoom, page) = (config.zoom, config.page);
        self.scope
            .with_context(|cx| layout.borrow_mut().init(zoom, page, cx));
        if config.conversion_is_complete {
            self.scope
                .broadcast(Message::PageAvailable(PageAvailability::All));
        }

        let (position, current_page) = {
            let layout = layout.borrow();
            (layout.scroll_position(), layout.current_page())
        };
        self.scroller.sync(position);
        self.mounted = Some(Mounted {
            metadata,
            range,
            sizes,
            layout_id,
            layout,
            document,
        });
        self.state = ViewerState::Ready;

        info!(
            "Document ready: {} of {} pages, starting at page {current_page}",
            range.count,
            self.metadata().map_or(0, |metadata| metadata.numpages),
        );
        self.scope.ready();
        self.scope.broadcast(Message::Ready {
            page: current_page,
            num_pages: range.count,
        });
    }
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("namespace", &self.namespace)
            .field("state", &self.state)
            .field("layout", &self.layout_mode)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::test_utils::{DOC_URL, DocumentFixture};

    fn viewer(config: ViewerConfig) -> (Viewer, ManualClock) {
        let clock = ManualClock::new();
        let fetcher = DocumentFixture::new(5).serve();
        let registry = Registry::new(fetcher).with_clock(Rc::new(clock.clone()));
        let viewer = Viewer::new(config, Rc::new(registry), ViewportSize::new(800.0, 600.0))
            .unwrap();
        (viewer, clock)
    }

    #[test]
    fn rejects_invalid_viewport() {
        let registry = Rc::new(Registry::new(DocumentFixture::new(1).serve()));
        let result = Viewer::new(
            ViewerConfig::new(DOC_URL),
            registry,
            ViewportSize::new(0.0, 600.0),
        );
        assert!(matches!(result, Err(ConfigError::InvalidViewport { .. })));
    }

    #[test]
    fn namespaces_are_unique() {
        let (a, _) = viewer(ViewerConfig::new(DOC_URL));
        let (b, _) = viewer(ViewerConfig::new(DOC_URL));
        assert_ne!(a.namespace(), b.namespace());
    }

    #[test]
    fn commands_before_ready_are_ignored() {
        let (mut viewer, _) = viewer(ViewerConfig::new(DOC_URL));
        viewer.zoom(ZoomValue::Level(2.0)).unwrap();
        viewer.set_layout(LayoutMode::Horizontal).unwrap();

        assert_eq!(viewer.state(), ViewerState::Created);
        assert_eq!(viewer.layout_mode(), LayoutMode::Horizontal);
        assert!(viewer.zoom_snapshot().is_none());
    }

    #[test]
    fn load_is_idempotent() {
        let (mut viewer, _) = viewer(ViewerConfig::new(DOC_URL));
        viewer.load().unwrap();
        viewer.load().unwrap();
        viewer.tick();

        assert!(viewer.is_ready());
        assert_eq!(viewer.num_pages(), Some(5));
    }

    #[test]
    fn destroyed_viewer_rejects_commands() {
        let (mut viewer, _) = viewer(ViewerConfig::new(DOC_URL));
        viewer.destroy();

        assert!(matches!(viewer.load(), Err(ViewerError::Destroyed)));
        assert!(matches!(
            viewer.scroll_to(ScrollTarget::Next),
            Err(ViewerError::Destroyed)
        ));
        viewer.tick();
        assert_eq!(viewer.state(), ViewerState::Destroyed);
    }

    #[test]
    fn listeners_can_be_removed() {
        let (mut viewer, _) = viewer(ViewerConfig::new(DOC_URL));
        let seen = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&seen);
        let id = viewer.on(MessageKind::Ready, move |_| *counter.borrow_mut() += 1);

        assert!(viewer.off(id));
        assert!(!viewer.off(id));
        viewer.load().unwrap();
        viewer.tick();
        assert_eq!(*seen.borrow(), 0);
    }
}
