//! One asset request owned by a page layer

use std::sync::Arc;

use log::trace;

use crate::error::AssetError;
use crate::fetch::{AssetKind, AssetTask, FetchResponse};
use crate::scope::Context;

/// Request state of a single page asset.
///
/// A fetched body is kept until the layer materializes it, so a preload
/// followed by a load only fetches once.
#[derive(Debug, Default)]
pub enum FetchSlot {
    #[default]
    Idle,
    Pending(AssetTask),
    Fetched(Arc<Vec<u8>>),
}

impl FetchSlot {
    /// Submit a request unless one is pending or already answered
    pub fn start(&mut self, url: &str, kind: AssetKind, page: usize, cx: &mut Context<'_>) {
        if matches!(self, Self::Idle) {
            let task = cx.fetch().submit(url, kind, Some(page));
            trace!("Page {page} {} requested as {:?}", kind.as_str(), task.id);
            *self = Self::Pending(task);
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Take the body if it has arrived
    pub fn take_body(&mut self) -> Option<Arc<Vec<u8>>> {
        match std::mem::take(self) {
            Self::Fetched(body) => Some(body),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Consume a completion if it answers this slot's request.
    ///
    /// A success leaves the body in the slot; a failure resets it to idle.
    pub fn accept(&mut self, response: &FetchResponse) -> Option<Result<(), AssetError>> {
        let Self::Pending(task) = self else {
            return None;
        };
        if task.id != response.id {
            return None;
        }
        match &response.result {
            Ok(body) => {
                *self = Self::Fetched(Arc::clone(body));
                Some(Ok(()))
            }
            Err(error) => {
                *self = Self::Idle;
                Some(Err(error.clone()))
            }
        }
    }

    /// Abort any pending request and forget any fetched body
    pub fn abort(&mut self, cx: &mut Context<'_>) {
        if let Self::Pending(task) = std::mem::take(self) {
            trace!("Aborting {:?} ({})", task.id, task.url);
            cx.fetch().cancel(&task);
        }
    }
}
