//! The asynchronous call result bridge.
//!
//! An async native call hands back an [`AsyncCallHandle`] immediately and
//! finishes some frames later. Nothing notifies us; the handle has to be
//! polled. This module turns that polling into a future:
//!
//! ```text
//! native call ──→ handle ──→ CallResults::register() ──→ CallResult<T>
//!                                      │                       │ .await
//!            host loop ──→ CallResults::pump() ──(done)──→ resolves once
//! ```
//!
//! Every call is `Pending → Completed(success | failure) → consumed once`.
//! There is no retry and no cancellation. Dropping a [`CallResult`] only
//! abandons interest: the handle is still collected at its next completion
//! and the result discarded.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use platkit_native::{CallState, CallbackResult, NativeUtils};
use platkit_types::AsyncCallHandle;
use tokio::sync::oneshot;

/// Polls the native completion state of `handle`.
pub fn is_complete<N: NativeUtils + ?Sized>(native: &N, handle: AsyncCallHandle) -> CallState {
    native.is_api_call_completed(handle)
}

/// Fetches and decodes the result of a completed call.
///
/// Returns `None` if the native layer has nothing to copy, flags the call as
/// failed, or the bytes don't decode as `T`.
pub fn get_result<T, N>(native: &N, handle: AsyncCallHandle) -> Option<T>
where
    T: CallbackResult,
    N: NativeUtils + ?Sized,
{
    // Sized to T's native layout. Freed on every return path below.
    let mut scratch = vec![0u8; T::SIZE];

    let failed = native.api_call_result(handle, &mut scratch, T::CALLBACK_ID)?;
    if failed {
        tracing::debug!(%handle, callback = T::CALLBACK_ID, "native call reported failure");
        return None;
    }
    T::decode(&scratch)
}

// ---------------------------------------------------------------------------
// CallResult
// ---------------------------------------------------------------------------

/// A typed result that resolves once its native call completes.
///
/// Resolves to `None` when the call failed, when its result didn't decode,
/// or when the registry was dropped first.
#[derive(Debug)]
pub struct CallResult<T> {
    handle: AsyncCallHandle,
    rx: oneshot::Receiver<Option<T>>,
}

impl<T> CallResult<T> {
    /// The native handle this future is waiting on.
    pub fn handle(&self) -> AsyncCallHandle {
        self.handle
    }
}

impl<T> Future for CallResult<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|res| res.ok().flatten())
    }
}

// ---------------------------------------------------------------------------
// CallResults
// ---------------------------------------------------------------------------

type Completer<N> = Box<dyn FnOnce(&N) + Send>;

/// Registry of in-flight async calls.
pub struct CallResults<N> {
    native: Arc<N>,
    pending: Mutex<HashMap<AsyncCallHandle, Completer<N>>>,
}

impl<N: NativeUtils> CallResults<N> {
    pub fn new(native: Arc<N>) -> Self {
        Self {
            native,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Starts tracking `handle` and returns the future its result will be
    /// delivered to.
    ///
    /// Registering the same handle twice replaces the first registration;
    /// the first future then resolves to `None`.
    pub fn register<T: CallbackResult>(&self, handle: AsyncCallHandle) -> CallResult<T> {
        let (tx, rx) = oneshot::channel();
        let completer: Completer<N> = Box::new(move |native: &N| {
            let result = get_result::<T, N>(native, handle);
            if tx.send(result).is_err() {
                tracing::trace!(%handle, "call result abandoned by its consumer");
            }
        });
        self.pending.lock().insert(handle, completer);
        tracing::trace!(%handle, callback = T::CALLBACK_ID, "call result registered");
        CallResult { handle, rx }
    }

    /// Polls every pending call once and resolves the completed ones.
    ///
    /// Returns how many calls were resolved.
    pub fn pump(&self) -> usize {
        let finished: Vec<Completer<N>> = {
            let mut pending = self.pending.lock();
            let handles: Vec<AsyncCallHandle> = pending.keys().copied().collect();
            handles
                .into_iter()
                .filter(|handle| is_complete(&*self.native, *handle).is_done())
                .filter_map(|handle| pending.remove(&handle))
                .collect()
        };

        // Completers run outside the lock.
        let resolved = finished.len();
        for complete in finished {
            complete(self.native.as_ref());
        }
        resolved
    }

    /// Number of calls still waiting for completion.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}
