//! Request handles and cancellation tokens

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Unique identifier for asset requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Which resource a request is for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Metadata,
    Stylesheet,
    Svg,
    Image,
    Text,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Stylesheet => "stylesheet",
            Self::Svg => "svg",
            Self::Image => "image",
            Self::Text => "text",
        }
    }
}

/// Shared abort flag between a task handle and the worker serving it
#[derive(Clone, Debug, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Handle for one submitted request.
///
/// Dropping the handle does not cancel the request; pass it to
/// `FetchPool::cancel` for that.
#[derive(Clone, Debug)]
pub struct AssetTask {
    pub id: RequestId,
    pub kind: AssetKind,
    pub url: String,
    pub(crate) token: AbortToken,
}

impl AssetTask {
    pub fn is_aborted(&self) -> bool {
        self.token.is_aborted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_clones_share_abort_state() {
        let token = AbortToken::new();
        let worker_side = token.clone();
        assert!(!worker_side.is_aborted());

        token.abort();

        assert!(worker_side.is_aborted());
    }
}
