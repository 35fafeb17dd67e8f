use std::time::{Duration, Instant};

use crate::layout::ScrollPosition;
use crate::scope::Message;
use crate::support::Support;
use crate::timing::{Throttle, Timeout};

pub const SCROLL_THROTTLE: Duration = Duration::from_millis(200);

/// Raw scroll offsets in; `scrollstart`, throttled `scroll` and `scrollend` out
#[derive(Debug, Clone)]
pub struct Scroller {
    throttle: Throttle,
    end: Timeout,
    end_wait: Duration,
    position: ScrollPosition,
    scrolling: bool,
}

impl Scroller {
    pub fn new(support: &Support) -> Self {
        Self {
            throttle: Throttle::new(SCROLL_THROTTLE),
            end: Timeout::new(),
            end_wait: support.scroll_end_timeout(),
            position: ScrollPosition::default(),
            scrolling: false,
        }
    }

    pub fn position(&self) -> ScrollPosition {
        self.position
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Track an offset change the viewer made itself; emits nothing
    pub fn sync(&mut self, position: ScrollPosition) {
        self.position = position;
    }

    pub fn on_scroll(&mut self, position: ScrollPosition, now: Instant) -> Vec<Message> {
        let mut out = Vec::new();
        if position == self.position && !self.scrolling {
            return out;
        }
        self.position = position;
        if !self.scrolling {
            self.scrolling = true;
            out.push(Message::ScrollStart(position));
        }
        if self.throttle.call(now) {
            out.push(Message::Scroll(position));
        }
        self.end.set(now, self.end_wait);
        out
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Message> {
        let mut out = Vec::new();
        if self.throttle.fire_due(now) {
            out.push(Message::Scroll(self.position));
        }
        if self.end.fire_due(now) {
            self.throttle.cancel();
            self.scrolling = false;
            out.push(Message::ScrollEnd(self.position));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::MessageKind;

    fn kinds(messages: &[Message]) -> Vec<MessageKind> {
        messages.iter().map(Message::kind).collect()
    }

    #[test]
    fn burst_yields_start_leading_trailing_and_end() {
        let start = Instant::now();
        let ms = |n| start + Duration::from_millis(n);
        let mut scroller = Scroller::new(&Support::default());

        let first = scroller.on_scroll(ScrollPosition::new(0.0, 10.0), ms(0));
        assert_eq!(kinds(&first), vec![MessageKind::ScrollStart, MessageKind::Scroll]);

        assert!(scroller.on_scroll(ScrollPosition::new(0.0, 20.0), ms(50)).is_empty());
        assert!(scroller.on_scroll(ScrollPosition::new(0.0, 30.0), ms(100)).is_empty());
        assert!(scroller.tick(ms(150)).is_empty());

        let trailing = scroller.tick(ms(200));
        assert_eq!(trailing, vec![Message::Scroll(ScrollPosition::new(0.0, 30.0))]);

        // 250 ms after the last raw event
        assert!(scroller.tick(ms(340)).is_empty());
        let end = scroller.tick(ms(350));
        assert_eq!(end, vec![Message::ScrollEnd(ScrollPosition::new(0.0, 30.0))]);
        assert!(!scroller.is_scrolling());
    }

    #[test]
    fn constrained_hosts_wait_longer_for_scrollend() {
        let start = Instant::now();
        let mut scroller = Scroller::new(&Support::constrained());

        scroller.on_scroll(ScrollPosition::new(0.0, 5.0), start);

        assert!(scroller.tick(start + Duration::from_millis(300)).is_empty());
        assert_eq!(
            kinds(&scroller.tick(start + Duration::from_millis(500))),
            vec![MessageKind::ScrollEnd]
        );
    }

    #[test]
    fn unchanged_offset_is_ignored() {
        let mut scroller = Scroller::new(&Support::default());
        scroller.sync(ScrollPosition::new(0.0, 40.0));

        assert!(
            scroller
                .on_scroll(ScrollPosition::new(0.0, 40.0), Instant::now())
                .is_empty()
        );
    }
}
