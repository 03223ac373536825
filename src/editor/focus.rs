/// Debounces focus loss so a quick blur/focus pair never reaches the host.
///
/// Focus gain applies immediately. Focus loss is reported by
/// [`take_ready`](Self::take_ready) once `delay_ms` has passed without an
/// intervening gain. Times are milliseconds from any monotonic origin.
#[derive(Debug, Clone)]
pub struct FocusDebouncer {
    delay_ms: u64,
    focused: bool,
    pending_blur: Option<u64>,
}

/// Default blur delay in milliseconds.
pub const DEFAULT_BLUR_DELAY_MS: u64 = 200;

impl FocusDebouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            focused: true,
            pending_blur: None,
        }
    }

    /// Record a focus gain. Returns `true` if the debounced state changed.
    pub const fn focus_gained(&mut self) -> bool {
        self.pending_blur = None;
        let changed = !self.focused;
        self.focused = true;
        changed
    }

    /// Record a focus loss at `now_ms`.
    pub const fn focus_lost(&mut self, now_ms: u64) {
        if self.focused && self.pending_blur.is_none() {
            self.pending_blur = Some(now_ms);
        }
    }

    /// Report a blur whose delay has elapsed.
    pub fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(queued_at) = self.pending_blur else {
            return false;
        };
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending_blur = None;
            self.focused = false;
            true
        } else {
            false
        }
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub const fn is_pending(&self) -> bool {
        self.pending_blur.is_some()
    }
}

impl Default for FocusDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_DELAY_MS)
    }
}
