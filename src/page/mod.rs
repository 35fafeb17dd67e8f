//! Pages and their layers

mod controller;
mod element;
mod layers;
mod render;
mod status;

pub use controller::{PageController, PageSetup};
pub use element::{
    CLASS_CONVERTING, CLASS_ERROR, CLASS_LINKS_DISABLED, CLASS_LOADING, CLASS_TEXT_DISABLED,
    PageElement,
};
pub use layers::{
    AssetFormat, AssetLayer, FetchSlot, ImageFormat, LayerPoll, LinkBox, LinkLayer, PageLayer,
    SvgAssets, SvgFormat, TextLayer,
};
pub use render::{Displayable, PageContent, Renderer, RetainedRenderer};
pub use status::{LoadOutcome, PageStatus};
