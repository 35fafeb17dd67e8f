use std::time::{Duration, Instant};

use crate::layout::ViewportSize;
use crate::scope::Message;
use crate::timing::Debounce;

pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Debounces host size changes into `resize`
#[derive(Debug, Clone)]
pub struct Resizer {
    debounce: Debounce,
    current: ViewportSize,
    pending: Option<ViewportSize>,
}

impl Resizer {
    pub fn new(initial: ViewportSize) -> Self {
        Self {
            debounce: Debounce::new(RESIZE_DEBOUNCE),
            current: initial,
            pending: None,
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.current
    }

    pub fn on_resize(&mut self, size: ViewportSize, now: Instant) {
        if !size.is_valid() {
            return;
        }
        if size == self.current && self.pending.is_none() {
            return;
        }
        self.pending = Some(size);
        self.debounce.trigger(now);
    }

    pub fn tick(&mut self, now: Instant) -> Option<Message> {
        if !self.debounce.fire_due(now) {
            return None;
        }
        let size = self.pending.take()?;
        if size == self.current {
            return None;
        }
        self.current = size;
        Some(Message::Resize(size))
    }
}
