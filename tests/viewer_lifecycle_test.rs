use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use docview::clock::ManualClock;
use docview::fetch::FetchFailure;
use docview::page::CLASS_TEXT_DISABLED;
use docview::test_utils::{DOC_URL, DocumentFixture, MemoryFetcher, svg_url};
use docview::{
    Message, MessageKind, PageAvailability, PageStatus, Registry, Viewer, ViewerConfig,
    ViewerError, ViewerState, ViewportSize,
};

fn open(fetcher: Arc<MemoryFetcher>, config: ViewerConfig) -> (Viewer, ManualClock) {
    let clock = ManualClock::new();
    let registry = Registry::new(fetcher).with_clock(Rc::new(clock.clone()));
    let viewer = Viewer::new(config, Rc::new(registry), ViewportSize::new(800.0, 600.0))
        .expect("valid viewer config");
    (viewer, clock)
}

fn settle(viewer: &mut Viewer, clock: &ManualClock) {
    for _ in 0..200 {
        viewer.tick();
        clock.advance_ms(25);
    }
}

fn record(viewer: &mut Viewer, kind: MessageKind) -> Rc<RefCell<Vec<Message>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    viewer.on(kind, move |message| sink.borrow_mut().push(message.clone()));
    seen
}

#[test]
fn test_ready_then_every_page_loads() {
    let (mut viewer, clock) = open(DocumentFixture::new(5).serve(), ViewerConfig::new(DOC_URL));
    let ready = record(&mut viewer, MessageKind::Ready);
    let loads = record(&mut viewer, MessageKind::PageLoad);

    viewer.load().unwrap();
    viewer.tick();
    assert_eq!(viewer.state(), ViewerState::Ready);
    assert_eq!(
        ready.borrow().as_slice(),
        &[Message::Ready {
            page: 1,
            num_pages: 5
        }]
    );

    settle(&mut viewer, &clock);

    let pages: Vec<usize> = loads
        .borrow()
        .iter()
        .filter_map(|message| match message {
            Message::PageLoad { page } => Some(*page),
            _ => None,
        })
        .collect();
    assert_eq!(pages.first(), Some(&1), "the focused page loads first");
    for page in 1..=5 {
        assert_eq!(viewer.page_status(page), Some(PageStatus::Loaded));
        assert!(viewer.page_content(page).is_some());
    }
    assert!(viewer.is_settled());
}

#[test]
fn test_each_asset_is_fetched_once() {
    let fetcher = DocumentFixture::new(4).serve();
    let (mut viewer, clock) = open(Arc::clone(&fetcher), ViewerConfig::new(DOC_URL));

    viewer.load().unwrap();
    settle(&mut viewer, &clock);

    assert_eq!(fetcher.fetch_count(&format!("{DOC_URL}info.json")), 1);
    for page in 1..=4 {
        assert_eq!(fetcher.fetch_count(&svg_url(page)), 1, "page {page}");
    }
    assert_eq!(fetcher.fetch_count_matching(".png"), 0);
}

#[test]
fn test_missing_metadata_fails_the_viewer() {
    let fetcher = Arc::new(MemoryFetcher::new());
    let (mut viewer, _clock) = open(fetcher, ViewerConfig::new(DOC_URL));
    let fails = record(&mut viewer, MessageKind::Fail);
    let asset_errors = record(&mut viewer, MessageKind::AssetError);

    viewer.load().unwrap();
    viewer.tick();

    assert_eq!(viewer.state(), ViewerState::Failed);
    assert_eq!(fails.borrow().len(), 1);
    match asset_errors.borrow().first() {
        Some(Message::AssetError(error)) => assert_eq!(error.status, Some(404)),
        other => panic!("expected an asset error, got {other:?}"),
    }
    assert_eq!(viewer.num_pages(), None);
}

#[test]
fn test_malformed_metadata_fails_the_viewer() {
    let fetcher = DocumentFixture::new(2).serve();
    fetcher.insert(format!("{DOC_URL}info.json"), b"{not json".to_vec());
    let (mut viewer, _clock) = open(fetcher, ViewerConfig::new(DOC_URL));
    let fails = record(&mut viewer, MessageKind::Fail);

    viewer.load().unwrap();
    viewer.tick();

    assert_eq!(viewer.state(), ViewerState::Failed);
    match fails.borrow().first() {
        Some(Message::Fail { error }) => assert!(error.contains("invalid metadata"), "{error}"),
        other => panic!("expected fail, got {other:?}"),
    }
}

#[test]
fn test_missing_page_ends_in_error() {
    let fetcher = DocumentFixture::new(3).missing_page(2).serve();
    let (mut viewer, clock) = open(fetcher, ViewerConfig::new(DOC_URL));
    let failures = record(&mut viewer, MessageKind::PageFail);

    viewer.load().unwrap();
    settle(&mut viewer, &clock);

    assert_eq!(viewer.page_status(1), Some(PageStatus::Loaded));
    assert_eq!(viewer.page_status(2), Some(PageStatus::Error));
    assert_eq!(viewer.page_status(3), Some(PageStatus::Loaded));
    let failed: Vec<usize> = failures
        .borrow()
        .iter()
        .filter_map(|message| match message {
            Message::PageFail { page, .. } => Some(*page),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![2]);
}

#[test]
fn test_page_range_limits_displayed_pages() {
    let fetcher = DocumentFixture::new(10).serve();
    let mut config = ViewerConfig::new(DOC_URL);
    config.page_start = Some(3);
    config.page_end = Some(5);
    config.page = 4;
    let (mut viewer, clock) = open(Arc::clone(&fetcher), config);
    let ready = record(&mut viewer, MessageKind::Ready);

    viewer.load().unwrap();
    settle(&mut viewer, &clock);

    assert_eq!(viewer.num_pages(), Some(3));
    assert!(matches!(
        ready.borrow().first(),
        Some(Message::Ready { num_pages: 3, .. })
    ));
    assert_eq!(viewer.page_status(2), None);
    assert_eq!(viewer.page_status(6), None);
    for page in 3..=5 {
        assert_eq!(viewer.page_status(page), Some(PageStatus::Loaded));
    }
    assert_eq!(fetcher.fetch_count(&svg_url(1)), 0);
    assert_eq!(fetcher.fetch_count(&svg_url(6)), 0);
}

#[test]
fn test_converting_pages_wait_for_availability() {
    let fetcher = DocumentFixture::new(4).serve();
    let mut config = ViewerConfig::new(DOC_URL);
    config.conversion_is_complete = false;
    let (mut viewer, clock) = open(Arc::clone(&fetcher), config);

    viewer.load().unwrap();
    settle(&mut viewer, &clock);
    assert_eq!(viewer.page_status(1), Some(PageStatus::Converting));
    assert_eq!(fetcher.fetch_count_matching(".svg"), 0);

    viewer.page_available(PageAvailability::Page(1)).unwrap();
    settle(&mut viewer, &clock);
    assert_eq!(viewer.page_status(1), Some(PageStatus::Loaded));
    assert_eq!(viewer.page_status(2), Some(PageStatus::Converting));

    viewer.page_available(PageAvailability::UpTo(3)).unwrap();
    settle(&mut viewer, &clock);
    assert_eq!(viewer.page_status(2), Some(PageStatus::Loaded));
    assert_eq!(viewer.page_status(3), Some(PageStatus::Loaded));
    assert_eq!(viewer.page_status(4), Some(PageStatus::Converting));
}

#[test]
fn test_raster_fallback_without_vector_support() {
    let fetcher = DocumentFixture::new(2).serve();
    let clock = ManualClock::new();
    let registry = Registry::new(fetcher.clone())
        .with_clock(Rc::new(clock.clone()))
        .with_support(docview::Support {
            svg: false,
            constrained: false,
        });
    let mut viewer = Viewer::new(
        ViewerConfig::new(DOC_URL),
        Rc::new(registry),
        ViewportSize::new(800.0, 600.0),
    )
    .unwrap();

    viewer.load().unwrap();
    settle(&mut viewer, &clock);

    assert_eq!(viewer.page_status(1), Some(PageStatus::Loaded));
    assert_eq!(fetcher.fetch_count_matching(".svg"), 0);
    assert_eq!(fetcher.fetch_count(&format!("{DOC_URL}page-1.png")), 1);
}

#[test]
fn test_text_selection_toggle_reaches_pages() {
    let (mut viewer, clock) = open(DocumentFixture::new(2).serve(), ViewerConfig::new(DOC_URL));
    viewer.load().unwrap();
    settle(&mut viewer, &clock);

    viewer.disable_text_selection().unwrap();
    assert!(!viewer.is_text_selection_enabled());
    assert_eq!(
        viewer.with_page(1, |page| page.element().has_class(CLASS_TEXT_DISABLED)),
        Some(true)
    );

    viewer.enable_text_selection().unwrap();
    assert_eq!(
        viewer.with_page(1, |page| page.element().has_class(CLASS_TEXT_DISABLED)),
        Some(false)
    );
}

#[test]
fn test_destroy_notifies_and_rejects_commands() {
    let (mut viewer, clock) = open(DocumentFixture::new(2).serve(), ViewerConfig::new(DOC_URL));
    let destroyed = record(&mut viewer, MessageKind::Destroy);
    viewer.load().unwrap();
    settle(&mut viewer, &clock);

    viewer.destroy();
    viewer.destroy();

    assert_eq!(destroyed.borrow().len(), 1);
    assert_eq!(viewer.state(), ViewerState::Destroyed);
    assert!(matches!(
        viewer.enable_links(),
        Err(ViewerError::Destroyed)
    ));
    assert_eq!(viewer.page_status(1), None);
}

#[test]
fn test_failing_fetcher_status_is_reported() {
    let fetcher = DocumentFixture::new(1).serve();
    fetcher.fail(
        format!("{DOC_URL}stylesheet.css"),
        FetchFailure::new("server error").with_status(500),
    );
    let (mut viewer, _clock) = open(fetcher, ViewerConfig::new(DOC_URL));
    let asset_errors = record(&mut viewer, MessageKind::AssetError);

    viewer.load().unwrap();
    viewer.tick();

    assert_eq!(viewer.state(), ViewerState::Failed);
    assert!(matches!(
        asset_errors.borrow().first(),
        Some(Message::AssetError(error)) if error.status == Some(500)
    ));
}
