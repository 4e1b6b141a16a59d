use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Drapeau d'annulation partagé (Ctrl-C → boucle de frames).
///
/// # Example
/// ```
/// use tr_player::cancel::CancelToken;
/// let token = CancelToken::new();
/// let handler_side = token.clone();
/// handler_side.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
