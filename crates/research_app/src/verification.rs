/// Holds the bot-verification token and the pending-refresh slot.
///
/// The token lives here as well as in the session snapshot so the
/// controller can read it synchronously at send time. Invalidation only
/// schedules a refresh; the controller delivers it on its next pump tick,
/// so the embedder callback never runs in the middle of a disconnect
/// transition.
#[derive(Debug, Default)]
pub struct VerificationGate {
    enabled: bool,
    token: String,
    refresh_pending: bool,
}

impl VerificationGate {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            token: String::new(),
            refresh_pending: false,
        }
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// Token to attach to a start command, or `None` when verification is
    /// disabled or no token has been provided yet.
    pub fn token_for_start(&self) -> Option<String> {
        if self.enabled && !self.token.is_empty() {
            Some(self.token.clone())
        } else {
            None
        }
    }

    /// Drops the token and, when verification is enabled, schedules a
    /// refresh request for the next pump tick.
    pub fn invalidate(&mut self) {
        self.token.clear();
        if self.enabled {
            self.refresh_pending = true;
        }
    }

    /// Consumes the pending refresh request, if any.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_pending)
    }
}
