//! Messages carried by the scope bus

use crate::error::AssetError;
use crate::layout::{LayoutMode, LayoutSnapshot, ScrollPosition, ViewportSize, ZoomSnapshot};

/// Discriminant of a `Message`, used for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    Ready,
    PageAvailable,
    PageFocus,
    PageLoad,
    PageUnload,
    PageFail,
    BeforeZoom,
    Zoom,
    Resize,
    ScrollStart,
    Scroll,
    ScrollEnd,
    AssetError,
    Fail,
    LinkClick,
    LayoutChange,
    TextEnabledChange,
    LinksEnabledChange,
    Destroy,
}

impl MessageKind {
    /// Events surfaced to viewer listeners
    pub const PUBLIC: &'static [MessageKind] = &[
        MessageKind::Ready,
        MessageKind::PageFocus,
        MessageKind::PageLoad,
        MessageKind::PageUnload,
        MessageKind::PageFail,
        MessageKind::Zoom,
        MessageKind::BeforeZoom,
        MessageKind::Resize,
        MessageKind::Scroll,
        MessageKind::ScrollStart,
        MessageKind::ScrollEnd,
        MessageKind::AssetError,
        MessageKind::Fail,
        MessageKind::LinkClick,
        MessageKind::LayoutChange,
        MessageKind::Destroy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::PageAvailable => "pageavailable",
            Self::PageFocus => "pagefocus",
            Self::PageLoad => "pageload",
            Self::PageUnload => "pageunload",
            Self::PageFail => "pagefail",
            Self::BeforeZoom => "beforezoom",
            Self::Zoom => "zoom",
            Self::Resize => "resize",
            Self::ScrollStart => "scrollstart",
            Self::Scroll => "scroll",
            Self::ScrollEnd => "scrollend",
            Self::AssetError => "asseterror",
            Self::Fail => "fail",
            Self::LinkClick => "linkclick",
            Self::LayoutChange => "layoutchange",
            Self::TextEnabledChange => "textenabledchange",
            Self::LinksEnabledChange => "linksenabledchange",
            Self::Destroy => "destroy",
        }
    }

    pub fn is_public(self) -> bool {
        Self::PUBLIC.contains(&self)
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pages just became available server-side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAvailability {
    All,
    /// A single page (1-indexed)
    Page(usize),
    /// Every page up to and including this one (1-indexed)
    UpTo(usize),
}

impl PageAvailability {
    pub fn covers(self, page: usize) -> bool {
        match self {
            Self::All => true,
            Self::Page(p) => p == page,
            Self::UpTo(p) => page <= p,
        }
    }
}

/// Where a clicked link leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    External { uri: String },
    /// 1-indexed destination page
    Internal { page: usize },
}

/// A bus message with its payload. Page numbers are 1-indexed.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Ready { page: usize, num_pages: usize },
    PageAvailable(PageAvailability),
    PageFocus(LayoutSnapshot),
    PageLoad { page: usize },
    PageUnload { page: usize },
    PageFail { page: usize, error: AssetError },
    BeforeZoom(ZoomSnapshot),
    Zoom(ZoomSnapshot),
    Resize(ViewportSize),
    ScrollStart(ScrollPosition),
    Scroll(ScrollPosition),
    ScrollEnd(ScrollPosition),
    AssetError(AssetError),
    Fail { error: String },
    LinkClick(LinkTarget),
    LayoutChange { layout: LayoutMode },
    TextEnabledChange { enabled: bool },
    LinksEnabledChange { enabled: bool },
    Destroy,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Ready { .. } => MessageKind::Ready,
            Self::PageAvailable(_) => MessageKind::PageAvailable,
            Self::PageFocus(_) => MessageKind::PageFocus,
            Self::PageLoad { .. } => MessageKind::PageLoad,
            Self::PageUnload { .. } => MessageKind::PageUnload,
            Self::PageFail { .. } => MessageKind::PageFail,
            Self::BeforeZoom(_) => MessageKind::BeforeZoom,
            Self::Zoom(_) => MessageKind::Zoom,
            Self::Resize(_) => MessageKind::Resize,
            Self::ScrollStart(_) => MessageKind::ScrollStart,
            Self::Scroll(_) => MessageKind::Scroll,
            Self::ScrollEnd(_) => MessageKind::ScrollEnd,
            Self::AssetError(_) => MessageKind::AssetError,
            Self::Fail { .. } => MessageKind::Fail,
            Self::LinkClick(_) => MessageKind::LinkClick,
            Self::LayoutChange { .. } => MessageKind::LayoutChange,
            Self::TextEnabledChange { .. } => MessageKind::TextEnabledChange,
            Self::LinksEnabledChange { .. } => MessageKind::LinksEnabledChange,
            Self::Destroy => MessageKind::Destroy,
        }
    }
}

/// What a component wants to hear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subscription {
    #[default]
    None,
    /// Wildcard channel
    All,
    Only(&'static [MessageKind]),
}

impl Subscription {
    pub fn accepts(self, kind: MessageKind) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Only(kinds) => kinds.contains(&kind),
        }
    }
}
