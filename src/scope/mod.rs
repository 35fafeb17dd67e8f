//! Per-viewer message bus, component registry and lifecycle

mod bus;
mod message;
mod registry;

pub use bus::{Component, ComponentId, Context, Scope};
pub use message::{LinkTarget, Message, MessageKind, PageAvailability, Subscription};
pub use registry::{ComponentRef, Registry, Utilities};
