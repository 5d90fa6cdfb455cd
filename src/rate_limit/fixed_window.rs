use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::Rejection;

struct WindowState {
    window_start: Instant,
    count: u32,
}

/// Fixed-window counter shared by all anonymous callers.
///
/// Windows are consecutive, non-sliding intervals anchored at creation
/// time; rollover happens lazily on the next acquisition attempt, under
/// the same lock as the count update.
pub struct FixedWindow {
    permit_limit: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

impl FixedWindow {
    pub fn new(permit_limit: u32, window: Duration) -> Self {
        Self {
            permit_limit,
            window,
            state: Mutex::new(WindowState { window_start: Instant::now(), count: 0 }),
        }
    }

    /// Take one permit from the current window; no queueing.
    pub async fn acquire(&self) -> Result<(), Rejection> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        // Advance by whole windows so boundaries stay anchored
        while now >= state.window_start + self.window {
            state.window_start += self.window;
            state.count = 0;
        }

        if state.count < self.permit_limit {
            state.count += 1;
            return Ok(());
        }

        Err(Rejection { retry_after: (state.window_start + self.window) - now })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sixth_request_in_window_is_rejected() {
        let window = FixedWindow::new(5, Duration::from_secs(60));
        for _ in 0..5 {
            window.acquire().await.expect("permit available");
        }

        let rejection = window.acquire().await.unwrap_err();
        assert!(rejection.retry_after <= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn window_rollover_restores_all_permits() {
        let window = FixedWindow::new(5, Duration::from_secs(60));
        for _ in 0..5 {
            window.acquire().await.unwrap();
        }
        assert!(window.acquire().await.is_err());

        tokio::time::advance(Duration::from_secs(60)).await;
        for _ in 0..5 {
            window.acquire().await.expect("fresh window permit");
        }
        assert!(window.acquire().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn long_idle_period_advances_whole_windows() {
        let window = FixedWindow::new(5, Duration::from_secs(60));
        tokio::time::advance(Duration::from_secs(60 * 10 + 30)).await;

        for _ in 0..5 {
            window.acquire().await.unwrap();
        }
        let rejection = window.acquire().await.unwrap_err();
        // 30 seconds into the current window, 30 remain
        assert_eq!(rejection.retry_after, Duration::from_secs(30));
    }
}
