/// Pointer drags become scroll deltas while dragging is enabled
#[derive(Debug, Clone, Default)]
pub struct Dragger {
    enabled: bool,
    last: Option<(f64, f64)>,
}

impl Dragger {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.last = None;
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    /// Returns false when dragging is disabled
    pub fn start(&mut self, x: f64, y: f64) -> bool {
        if !self.enabled {
            return false;
        }
        self.last = Some((x, y));
        true
    }

    /// Scroll delta for a pointer move: content follows the pointer
    pub fn move_to(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (last_x, last_y) = self.last.replace((x, y))?;
        Some((last_x - x, last_y - y))
    }

    pub fn end(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_moves_scroll_opposite_to_pointer() {
        let mut dragger = Dragger::new(true);

        assert!(dragger.start(100.0, 100.0));
        assert_eq!(dragger.move_to(90.0, 70.0), Some((10.0, 30.0)));
        assert_eq!(dragger.move_to(95.0, 70.0), Some((-5.0, 0.0)));

        dragger.end();
        assert_eq!(dragger.move_to(0.0, 0.0), None);
    }

    #[test]
    fn disabled_dragger_ignores_pointer() {
        let mut dragger = Dragger::new(false);

        assert!(!dragger.start(1.0, 1.0));
        assert_eq!(dragger.move_to(5.0, 5.0), None);
    }
}
