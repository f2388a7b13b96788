use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks which of several overlapping searches is the most recent one.
///
/// A shell that lets the user fire a new lookup before the previous one
/// resolved gets no ordering guarantee from the network: a slow earlier
/// request may complete after a faster later one. Each lookup calls
/// [`SearchSession::begin`] before dispatching and checks
/// [`SearchSession::is_current`] when its result arrives; a stale
/// generation means the result must be discarded. In-flight requests are
/// not cancelled.
#[derive(Debug, Default)]
pub struct SearchSession {
    latest: AtomicU64,
}

/// Token identifying one lookup within a [`SearchSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new lookup, invalidating every earlier generation.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Whether `generation` is still the newest lookup.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::Relaxed) == generation.0
    }
}
