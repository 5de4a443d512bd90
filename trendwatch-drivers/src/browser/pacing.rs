use std::time::Duration;
use tokio::time::sleep;

/// Fixed delays between UI steps. The page and its dialogs animate and load
/// lazily, so each step waits a set amount before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After navigation, before touching the DOM.
    pub page_load: Duration,
    /// After removing the sticky overlay.
    pub after_overlay: Duration,
    /// After scrolling a link into view, before clicking it.
    pub after_scroll: Duration,
    /// After closing the detail dialog.
    pub after_close: Duration,
    /// Before each translation call.
    pub before_translate: Duration,
    /// Between two trend items.
    pub between_items: Duration,
    /// Upper bound on waiting for the detail dialog to open.
    pub dialog_timeout: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(3),
            after_overlay: Duration::from_secs(1),
            after_scroll: Duration::from_millis(500),
            after_close: Duration::from_secs(1),
            before_translate: Duration::from_millis(300),
            between_items: Duration::from_millis(500),
            dialog_timeout: Duration::from_secs(10),
        }
    }
}

impl Pacing {
    /// No delays at all; the dialog wait keeps a short bound.
    pub fn none() -> Self {
        Self {
            page_load: Duration::ZERO,
            after_overlay: Duration::ZERO,
            after_scroll: Duration::ZERO,
            after_close: Duration::ZERO,
            before_translate: Duration::ZERO,
            between_items: Duration::ZERO,
            dialog_timeout: Duration::from_millis(250),
        }
    }
}

/// Sleep for `d`, skipping the timer entirely for zero durations.
pub async fn pause(d: Duration) {
    if !d.is_zero() {
        sleep(d).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_site_timings() {
        let p = Pacing::default();
        assert_eq!(p.page_load, Duration::from_secs(3));
        assert_eq!(p.after_scroll, Duration::from_millis(500));
        assert_eq!(p.dialog_timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn zero_pause_returns_immediately() {
        let t0 = std::time::Instant::now();
        pause(Duration::ZERO).await;
        assert!(t0.elapsed() < Duration::from_millis(50));
    }
}
