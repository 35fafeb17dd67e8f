use std::sync::Arc;

use super::AssetFormat;
use crate::fetch::AssetKind;
use crate::page::render::{Displayable, PageContent, Renderer};

/// Raster fallback for hosts that cannot show vector pages
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFormat;

impl AssetFormat for ImageFormat {
    fn kind(&self) -> AssetKind {
        AssetKind::Image
    }

    fn materialize(&self, page: usize, body: &[u8], renderer: &dyn Renderer) -> Displayable {
        renderer.render(page, PageContent::Raster(Arc::new(body.to_vec())))
    }
}
