//! Suggestion worker
//!
//! Runs key enumeration off the caller's thread. Callers talk to the worker
//! through a pair of channels: requests go in, at most one response per
//! request comes back out. Requests are processed strictly in arrival order.

use keyloom_common::error::{KeyloomError, Result};
use keyloom_common::protocol::{SuggestRequest, SuggestResponse};
use tokio::sync::mpsc;

use crate::keygen::KeyGenerator;

/// Upper bound on the number of entries in each returned key set. Excess
/// entries are dropped from the tail after ranking.
pub const MAX_KEYS: usize = 11_000;

/// Rank a key set: ascending string length (shorter keys first), stable for
/// equal lengths, capped at [`MAX_KEYS`].
fn rank(mut keys: Vec<String>) -> Vec<String> {
    keys.sort_by_key(|key| key.len());
    keys.truncate(MAX_KEYS);
    keys
}

/// Compute the response for one request, or `None` when the request carries
/// no collections and must be dropped without a reply.
pub fn build_response(
    generator: &impl KeyGenerator,
    request: &SuggestRequest,
) -> Option<SuggestResponse> {
    if request.collections.is_empty() {
        tracing::trace!(id = request.id, "dropping suggestion request without collections");
        return None;
    }

    let base = request.base_collection.as_deref();

    let base_keys = rank(generator.collection_keys(&request.collections, base));

    let request_keys = if request.disable_request_keys {
        None
    } else {
        Some(rank(generator.request_keys(&request.collections, base)))
    };

    let collection_join_keys = if request.disable_collection_join_keys {
        None
    } else {
        Some(rank(generator.collection_join_keys(&request.collections)))
    };

    Some(SuggestResponse {
        id: request.id,
        base_keys,
        request_keys,
        collection_join_keys,
    })
}

/// Handle to a spawned suggestion worker.
///
/// Sending is fire-and-forget; responses arrive on the single shared
/// receiver and carry the originating request id.
pub struct SuggestHandle {
    requests: mpsc::UnboundedSender<SuggestRequest>,
    responses: mpsc::UnboundedReceiver<SuggestResponse>,
}

impl SuggestHandle {
    /// Enqueue a request. Fails only when the worker is gone.
    pub fn send(&self, request: SuggestRequest) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| KeyloomError::Channel("Suggestion worker is not running".into()))
    }

    /// Receive the next response. `None` means the worker has stopped.
    pub async fn recv(&mut self) -> Option<SuggestResponse> {
        self.responses.recv().await
    }
}

/// The suggestion worker task.
pub struct SuggestWorker;

impl SuggestWorker {
    /// Spawn the worker on the current tokio runtime and return its handle.
    pub fn spawn<G>(generator: G) -> SuggestHandle
    where
        G: KeyGenerator + Send + 'static,
    {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<SuggestRequest>();
        let (response_tx, response_rx) = mpsc::unbounded_channel::<SuggestResponse>();

        tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let Some(response) = build_response(&generator, &request) else {
                    continue;
                };

                if response_tx.send(response).is_err() {
                    break;
                }
            }

            tracing::debug!("suggestion worker stopped");
        });

        SuggestHandle {
            requests: request_tx,
            responses: response_rx,
        }
    }
}

/// Synchronous facade over the worker for callers without a runtime.
pub struct BlockingSuggestClient {
    handle: SuggestHandle,
    runtime: tokio::runtime::Runtime,
}

impl BlockingSuggestClient {
    pub fn new<G>(generator: G) -> Self
    where
        G: KeyGenerator + Send + 'static,
    {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create async runtime");
        let handle = {
            let _guard = runtime.enter();
            SuggestWorker::spawn(generator)
        };

        Self { handle, runtime }
    }

    /// Send one request and wait for its response.
    ///
    /// Requests without collections return `Ok(None)` immediately, matching
    /// the worker's silent drop; waiting for a reply that will never come
    /// would block forever.
    pub fn suggest(&mut self, request: SuggestRequest) -> Result<Option<SuggestResponse>> {
        if request.collections.is_empty() {
            return Ok(None);
        }

        let id = request.id;
        self.handle.send(request)?;

        self.runtime.block_on(async {
            while let Some(response) = self.handle.recv().await {
                if response.id == id {
                    return Ok(Some(response));
                }
                // A stale response from an earlier fire-and-forget send.
                tracing::trace!(id = response.id, "discarding unmatched suggestion response");
            }

            Err(KeyloomError::Channel(
                "Suggestion worker stopped before replying".into(),
            ))
        })
    }
}
