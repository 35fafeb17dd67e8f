use std::cell::RefCell;
use std::fs::File;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, info, warn};
use simplelog::{Config, WriteLogger};

use docview::fetch::FsFetcher;
use docview::panic_handler::initialize_panic_handler;
use docview::{
    LayoutMode, Message, MessageKind, Registry, ScrollTarget, Support, Viewer, ViewerConfig,
    ViewportSize, ZoomValue,
};

/// Load a converted document and report what the viewer would show
#[derive(Debug, Parser)]
#[command(name = "docview", version, about)]
struct Cli {
    /// Directory or URL holding info.json, stylesheet.css and the page assets
    url: Option<String>,

    /// YAML viewer config; command-line flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    layout: Option<LayoutMode>,

    /// Zoom level or mode (auto, fit-width, fit-height, in, out)
    #[arg(short, long)]
    zoom: Option<ZoomValue>,

    /// Page to open at (1-indexed)
    #[arg(short, long)]
    page: Option<usize>,

    /// Scroll here once the document is ready (page number, next, previous, first, last)
    #[arg(long)]
    scroll_to: Option<ScrollTarget>,

    #[arg(long, default_value_t = 1024.0)]
    width: f64,

    #[arg(long, default_value_t = 768.0)]
    height: f64,

    /// Background fetch threads; 0 fetches on the main thread
    #[arg(long)]
    workers: Option<usize>,

    /// Use the memory-constrained loading profile
    #[arg(long)]
    constrained: bool,

    /// Give up waiting for pages after this many milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    #[arg(long, default_value = "docview.log")]
    log_file: PathBuf,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn viewer_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ViewerConfig::default(),
        };
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(zoom) = self.zoom {
            config.zoom = zoom;
        }
        if let Some(page) = self.page {
            config.page = page;
        }
        if let Some(workers) = self.workers {
            config.fetch_workers = workers;
        }
        if config.url.is_empty() {
            bail!("no document given; pass a URL or set `url` in the config");
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    initialize_panic_handler();
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(level, Config::default(), File::create(&cli.log_file)?)?;
    info!("Starting docview");

    let config = cli.viewer_config()?;
    let support = if cli.constrained {
        Support::constrained()
    } else {
        Support::default()
    };
    let registry = Rc::new(Registry::new(Arc::new(FsFetcher)).with_support(support));
    let viewport = ViewportSize::new(cli.width, cli.height);
    let mut viewer = Viewer::new(config, registry, viewport)?;

    let failure: Rc<RefCell<Option<String>>> = Rc::default();
    {
        let failure = Rc::clone(&failure);
        viewer.on(MessageKind::Fail, move |message| {
            if let Message::Fail { error } = message {
                *failure.borrow_mut() = Some(error.clone());
            }
        });
    }
    viewer.on(MessageKind::PageFail, |message| {
        if let Message::PageFail { page, error } = message {
            eprintln!("page {page} failed: {error}");
        }
    });

    viewer.load()?;
    let deadline = Instant::now() + Duration::from_millis(cli.timeout_ms);
    let mut scrolled = cli.scroll_to.is_none();
    loop {
        viewer.tick();
        if let Some(error) = failure.borrow().as_ref() {
            bail!("failed to load document: {error}");
        }
        if viewer.is_ready() && !scrolled {
            if let Some(target) = cli.scroll_to {
                viewer.scroll_to(target)?;
            }
            scrolled = true;
        }
        if viewer.is_ready() && viewer.is_settled() {
            break;
        }
        if Instant::now() >= deadline {
            warn!("Timed out waiting for the viewer to settle");
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    print_summary(&viewer);
    viewer.destroy();
    Ok(())
}

fn print_summary(viewer: &Viewer) {
    let Some(zoom) = viewer.zoom_snapshot() else {
        println!("document not ready");
        return;
    };
    println!(
        "layout {} | zoom {:.3} ({}) | page {}/{}",
        viewer.layout_mode().as_str(),
        zoom.zoom,
        zoom.zoom_mode.map_or("explicit", |mode| mode.as_str()),
        zoom.page,
        zoom.num_pages,
    );
    println!("visible: {:?}", zoom.visible_pages);

    let Some(range) = viewer.page_range() else {
        return;
    };
    for slot in 0..range.count {
        let page = range.page_of(slot);
        if let Some(status) = viewer.page_status(page) {
            println!("  page {page:>4}: {status}");
        }
    }
}
