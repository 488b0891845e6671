use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

/// The filter text box with settled-change tracking: edits mark the box
/// dirty, and the owner refreshes only once a quiet period has passed with
/// no further keystrokes.
#[derive(Default)]
pub struct FilterBox {
    input: Input,
    dirty_since: Option<Instant>,
}

impl FilterBox {
    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn visual_cursor(&self) -> usize {
        self.input.visual_cursor()
    }

    /// Feed a key to the underlying input. Returns true when the widget
    /// consumed the key; value edits restart the settle clock.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        match self.input.handle_event(&Event::Key(key)) {
            Some(change) => {
                if change.value {
                    self.touch_at(Instant::now());
                }
                true
            }
            None => false,
        }
    }

    fn touch_at(&mut self, now: Instant) {
        self.dirty_since = Some(now);
    }

    /// True once per edit burst, as soon as the quiet period has elapsed.
    pub fn take_settled(&mut self, delay: Duration) -> bool {
        self.take_settled_at(Instant::now(), delay)
    }

    fn take_settled_at(&mut self, now: Instant, delay: Duration) -> bool {
        match self.dirty_since {
            Some(since) if now.duration_since(since) >= delay => {
                self.dirty_since = None;
                true
            }
            _ => false,
        }
    }

    /// Consume any pending edit immediately (Enter skips the settle wait).
    pub fn flush(&mut self) -> bool {
        self.dirty_since.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(400);

    #[test]
    fn test_clean_box_never_settles() {
        let mut filter = FilterBox::default();
        assert!(!filter.take_settled_at(Instant::now(), DELAY));
    }

    #[test]
    fn test_settles_only_after_quiet_period() {
        let mut filter = FilterBox::default();
        let t0 = Instant::now();
        filter.touch_at(t0);

        assert!(!filter.take_settled_at(t0 + Duration::from_millis(100), DELAY));
        assert!(filter.take_settled_at(t0 + DELAY, DELAY));
        // Consumed: no second notification for the same burst
        assert!(!filter.take_settled_at(t0 + Duration::from_secs(5), DELAY));
    }

    #[test]
    fn test_new_keystroke_restarts_the_clock() {
        let mut filter = FilterBox::default();
        let t0 = Instant::now();
        filter.touch_at(t0);
        filter.touch_at(t0 + Duration::from_millis(300));

        assert!(!filter.take_settled_at(t0 + Duration::from_millis(450), DELAY));
        assert!(filter.take_settled_at(t0 + Duration::from_millis(700), DELAY));
    }

    #[test]
    fn test_flush_consumes_pending_edit() {
        let mut filter = FilterBox::default();
        assert!(!filter.flush());

        filter.touch_at(Instant::now());
        assert!(filter.flush());
        assert!(!filter.take_settled_at(Instant::now() + DELAY, DELAY));
    }
}
