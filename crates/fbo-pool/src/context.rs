//! Which display's context is current on this thread.
//!
//! GL makes a context current per thread, so this is tracked in thread-local
//! state rather than on the display.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DISPLAY_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_DISPLAY: Cell<Option<DisplayId>> = const { Cell::new(None) };
}

/// Process-unique identifier of a display and its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayId(u64);

impl DisplayId {
    pub(crate) fn next() -> Self {
        DisplayId(NEXT_DISPLAY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Record that `display`'s context was made current on this thread
/// (`None`: no context is current).
pub fn make_current(display: Option<DisplayId>) {
    CURRENT_DISPLAY.with(|cell| cell.set(display));
}

pub fn current() -> Option<DisplayId> {
    CURRENT_DISPLAY.with(|cell| cell.get())
}

pub fn is_current(display: DisplayId) -> bool {
    current() == Some(display)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_display_is_per_thread() {
        let id = DisplayId::next();
        make_current(Some(id));
        assert!(is_current(id));

        let other_thread = std::thread::spawn(move || is_current(id)).join().unwrap();
        assert!(!other_thread);

        make_current(None);
        assert!(!is_current(id));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(DisplayId::next(), DisplayId::next());
    }
}
