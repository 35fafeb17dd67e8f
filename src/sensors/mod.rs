//! Host input adapters
//!
//! Sensors turn raw host events into normalized bus messages. They never
//! touch the bus themselves; the viewer broadcasts what they return.

mod dragger;
mod resizer;
mod scroller;

pub use dragger::Dragger;
pub use resizer::{RESIZE_DEBOUNCE, Resizer};
pub use scroller::{SCROLL_THROTTLE, Scroller};
