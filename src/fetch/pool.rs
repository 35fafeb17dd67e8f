//! Fetch pool - manages fetch workers, pending requests and the asset cache

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use flume::{Receiver, Sender};
use log::{debug, trace};

use super::cache::AssetCache;
use super::fetcher::{Fetcher, fetch_with_retry};
use super::task::{AbortToken, AssetKind, AssetTask, RequestId};
use crate::config::ViewerConfig;
use crate::error::AssetError;

type FetchResult = Result<Arc<Vec<u8>>, AssetError>;

/// Request sent to fetch workers
#[derive(Debug)]
enum FetchRequest {
    Fetch {
        id: RequestId,
        url: String,
        token: AbortToken,
    },
    Shutdown,
}

#[derive(Debug)]
struct Completed {
    id: RequestId,
    result: FetchResult,
}

#[derive(Debug)]
struct PendingRequest {
    kind: AssetKind,
    page: Option<usize>,
    url: String,
    token: AbortToken,
}

/// A finished request, handed back by `FetchPool::poll`
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub id: RequestId,
    pub kind: AssetKind,
    /// 1-indexed page the asset belongs to, if any
    pub page: Option<usize>,
    pub url: String,
    pub result: FetchResult,
}

enum Mode {
    /// Fetch on submit; results are handed out on the next poll
    Inline { completed: VecDeque<Completed> },
    Workers {
        request_tx: Sender<FetchRequest>,
        response_rx: Receiver<Completed>,
        num_workers: usize,
    },
}

/// Runs asset requests and hands completions back to the viewer thread.
///
/// Every request gets an abort token. Cancelling a request aborts the token,
/// forgets the pending entry (a late completion is dropped on poll) and evicts
/// its cache entry, so the next request for that URL goes to the fetcher.
pub struct FetchPool {
    fetcher: Arc<dyn Fetcher>,
    retries: u32,
    cache: Arc<Mutex<AssetCache>>,
    mode: Mode,
    next_request_id: u64,
    pending: HashMap<RequestId, PendingRequest>,
}

impl FetchPool {
    /// Pool that fetches synchronously on submit
    pub fn inline(fetcher: Arc<dyn Fetcher>, cache_size: usize, retries: u32) -> Self {
        Self {
            fetcher,
            retries,
            cache: Arc::new(Mutex::new(AssetCache::new(cache_size))),
            mode: Mode::Inline {
                completed: VecDeque::new(),
            },
            next_request_id: 1,
            pending: HashMap::new(),
        }
    }

    /// Pool backed by `num_workers` background threads
    pub fn spawn(
        fetcher: Arc<dyn Fetcher>,
        cache_size: usize,
        retries: u32,
        num_workers: usize,
    ) -> Self {
        let cache = Arc::new(Mutex::new(AssetCache::new(cache_size)));

        // flume receivers can be cloned, so workers share one request queue
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        let num_workers = num_workers.max(1);
        for _ in 0..num_workers {
            let rx = request_rx.clone();
            let tx = response_tx.clone();
            let fetcher = Arc::clone(&fetcher);
            let cache = Arc::clone(&cache);

            std::thread::spawn(move || {
                fetch_worker(fetcher.as_ref(), retries, &rx, &tx, &cache);
            });
        }

        Self {
            fetcher,
            retries,
            cache,
            mode: Mode::Workers {
                request_tx,
                response_rx,
                num_workers,
            },
            next_request_id: 1,
            pending: HashMap::new(),
        }
    }

    /// Inline or threaded, per `fetch_workers`
    pub fn from_config(fetcher: Arc<dyn Fetcher>, config: &ViewerConfig) -> Self {
        if config.fetch_workers == 0 {
            Self::inline(fetcher, config.cache_size, config.retries)
        } else {
            Self::spawn(
                fetcher,
                config.cache_size,
                config.retries,
                config.fetch_workers,
            )
        }
    }

    pub fn submit(&mut self, url: impl Into<String>, kind: AssetKind, page: Option<usize>) -> AssetTask {
        let url = url.into();
        let id = self.next_id();
        let token = AbortToken::new();
        debug!("Request {id:?}: {} {url}", kind.as_str());

        self.pending.insert(
            id,
            PendingRequest {
                kind,
                page,
                url: url.clone(),
                token: token.clone(),
            },
        );

        match &mut self.mode {
            Mode::Inline { completed } => {
                let result = fetch_cached(
                    self.fetcher.as_ref(),
                    self.retries,
                    &url,
                    &token,
                    &self.cache,
                );
                completed.push_back(Completed { id, result });
            }
            Mode::Workers { request_tx, .. } => {
                let _ = request_tx.send(FetchRequest::Fetch {
                    id,
                    url: url.clone(),
                    token: token.clone(),
                });
            }
        }

        AssetTask {
            id,
            kind,
            url,
            token,
        }
    }

    /// Abort a request; its completion will never be handed out
    pub fn cancel(&mut self, task: &AssetTask) {
        task.token.abort();
        if self.pending.remove(&task.id).is_some() {
            debug!("Cancelled {:?}: {}", task.id, task.url);
        }
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .evict(&task.url);
    }

    /// Collect finished requests that are still wanted
    pub fn poll(&mut self) -> Vec<FetchResponse> {
        let mut finished = Vec::new();
        match &mut self.mode {
            Mode::Inline { completed } => finished.extend(completed.drain(..)),
            Mode::Workers { response_rx, .. } => {
                while let Ok(completed) = response_rx.try_recv() {
                    finished.push(completed);
                }
            }
        }

        let mut responses = Vec::with_capacity(finished.len());
        for Completed { id, result } in finished {
            let Some(request) = self.pending.remove(&id) else {
                trace!("Dropping completion of cancelled {id:?}");
                continue;
            };
            if request.token.is_aborted() {
                continue;
            }
            responses.push(FetchResponse {
                id,
                kind: request.kind,
                page: request.page,
                url: request.url,
                result,
            });
        }
        responses
    }

    pub fn is_pending(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether any request for the given page and kind is outstanding
    pub fn has_pending(&self, page: usize, kind: AssetKind) -> bool {
        self.pending
            .values()
            .any(|request| request.page == Some(page) && request.kind == kind)
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    /// Abort everything and stop the workers
    pub fn shutdown(&mut self) {
        for request in self.pending.values() {
            request.token.abort();
        }
        self.pending.clear();
        match &mut self.mode {
            Mode::Inline { completed } => completed.clear(),
            Mode::Workers {
                request_tx,
                num_workers,
                ..
            } => {
                for _ in 0..*num_workers {
                    let _ = request_tx.send(FetchRequest::Shutdown);
                }
                *num_workers = 0;
            }
        }
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for FetchPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn fetch_worker(
    fetcher: &dyn Fetcher,
    retries: u32,
    requests: &Receiver<FetchRequest>,
    responses: &Sender<Completed>,
    cache: &Mutex<AssetCache>,
) {
    for request in requests {
        match request {
            FetchRequest::Fetch { id, url, token } => {
                if token.is_aborted() {
                    continue;
                }
                let result = fetch_cached(fetcher, retries, &url, &token, cache);
                if token.is_aborted() {
                    continue;
                }
                if responses.send(Completed { id, result }).is_err() {
                    break;
                }
            }
            FetchRequest::Shutdown => break,
        }
    }
}

fn fetch_cached(
    fetcher: &dyn Fetcher,
    retries: u32,
    url: &str,
    token: &AbortToken,
    cache: &Mutex<AssetCache>,
) -> FetchResult {
    let cached = cache.lock().unwrap_or_else(PoisonError::into_inner).get(url);
    if let Some(body) = cached {
        return Ok(body);
    }

    let result = fetch_with_retry(fetcher, url, retries, token);
    if let Ok(body) = &result {
        if !token.is_aborted() {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(url.to_string(), Arc::clone(body));
        }
    }
    result
}
