//! The rendering seam
//!
//! Turning page content into something on screen is the host's business;
//! the viewer hands processed content to a `Renderer` and keeps whatever it
//! returns as the page's materialized node.

use std::sync::Arc;

/// Processed page content, ready to display
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    Svg(String),
    Raster(Arc<Vec<u8>>),
    /// Text overlay markup
    Text(String),
}

/// A materialized page layer
#[derive(Debug, Clone, PartialEq)]
pub struct Displayable {
    /// 1-indexed document page
    pub page: usize,
    pub content: PageContent,
}

pub trait Renderer {
    fn render(&self, page: usize, content: PageContent) -> Displayable;
}

/// Keeps content as-is; the host reads it back from the page layers
#[derive(Debug, Default, Clone, Copy)]
pub struct RetainedRenderer;

impl Renderer for RetainedRenderer {
    fn render(&self, page: usize, content: PageContent) -> Displayable {
        Displayable { page, content }
    }
}
