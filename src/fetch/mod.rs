//! Asset fetching
//!
//! Loaders submit requests to the per-viewer `FetchPool` and receive the
//! results through the viewer's polling loop.

mod cache;
mod fetcher;
mod pool;
mod task;
mod urls;

pub use cache::AssetCache;
pub use fetcher::{FetchFailure, Fetcher, FsFetcher, fetch_with_retry};
pub use pool::{FetchPool, FetchResponse};
pub use task::{AbortToken, AssetKind, AssetTask, RequestId};
pub use urls::{AssetTemplates, AssetUrls};
