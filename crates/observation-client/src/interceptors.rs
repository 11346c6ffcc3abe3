//! Request/response interceptor chain
//!
//! Handlers are stored in slots that are never re-indexed: ejecting one
//! leaves a tombstone, so every id handed out by [`InterceptorManager::add`]
//! keeps pointing at the interceptor it was issued for.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::request::RequestConfig;

type FulfilledFn<V> = dyn Fn(V) -> BoxFuture<'static, Result<V>> + Send + Sync;
type RejectedFn<V> = dyn Fn(Error) -> BoxFuture<'static, Result<V>> + Send + Sync;

/// Stable handle to a registered interceptor
pub type InterceptorId = usize;

/// A success handler paired with an optional failure handler
pub struct Interceptor<V> {
    on_fulfilled: Arc<FulfilledFn<V>>,
    on_rejected: Option<Arc<RejectedFn<V>>>,
}

impl<V: Send + 'static> Interceptor<V> {
    /// Interceptor that transforms (or rejects) successful values
    pub fn new<F, Fut>(on_fulfilled: F) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        Self {
            on_fulfilled: Arc::new(move |value| on_fulfilled(value).boxed()),
            on_rejected: None,
        }
    }

    /// Interceptor that only handles failures; successes pass through
    pub fn on_error<R, Fut>(on_rejected: R) -> Self
    where
        R: Fn(Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        Self::new(|value| async move { Ok(value) }).with_rejected(on_rejected)
    }

    /// Attach a failure handler. It may recover with `Ok` or keep the chain
    /// rejected by returning `Err`.
    pub fn with_rejected<R, Fut>(mut self, on_rejected: R) -> Self
    where
        R: Fn(Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.on_rejected = Some(Arc::new(move |err| on_rejected(err).boxed()));
        self
    }

    pub fn has_rejected(&self) -> bool {
        self.on_rejected.is_some()
    }

    /// Run one link of the chain: fulfilled values go to `on_fulfilled`,
    /// errors go to `on_rejected` or pass through untouched.
    pub(crate) async fn apply(&self, state: Result<V>) -> Result<V> {
        match state {
            Ok(value) => (self.on_fulfilled)(value).await,
            Err(err) => match &self.on_rejected {
                Some(on_rejected) => on_rejected(err).await,
                None => Err(err),
            },
        }
    }
}

impl<V> Clone for Interceptor<V> {
    fn clone(&self) -> Self {
        Self {
            on_fulfilled: Arc::clone(&self.on_fulfilled),
            on_rejected: self.on_rejected.clone(),
        }
    }
}

/// Ordered, append-only list of interceptors
pub struct InterceptorManager<V> {
    handlers: Mutex<Vec<Option<Interceptor<V>>>>,
}

impl<V: Send + 'static> InterceptorManager<V> {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Register an interceptor; the returned id is its slot index
    pub fn add(&self, interceptor: Interceptor<V>) -> InterceptorId {
        let mut handlers = self.lock();
        handlers.push(Some(interceptor));
        handlers.len() - 1
    }

    /// Remove an interceptor. Unknown or already ejected ids are ignored.
    pub fn eject(&self, id: InterceptorId) {
        if let Some(slot) = self.lock().get_mut(id) {
            *slot = None;
        }
    }

    /// Visit live interceptors in registration order
    pub fn for_each(&self, mut f: impl FnMut(&Interceptor<V>)) {
        for interceptor in self.lock().iter().flatten() {
            f(interceptor);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the live handlers, so a chain can run without holding the lock
    pub(crate) fn snapshot(&self) -> Vec<Interceptor<V>> {
        let mut live = Vec::new();
        self.for_each(|interceptor| live.push(interceptor.clone()));
        live
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Option<Interceptor<V>>>> {
        // A handler never runs while the lock is held, so poisoning can only
        // come from a panic inside Vec operations; the data is still usable.
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<V: Send + 'static> Default for InterceptorManager<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// The two interceptor chains of a client
pub struct Interceptors {
    /// Run in registration order before the request is sent
    pub request: InterceptorManager<RequestConfig>,
    /// Run in registration order on the decoded response (or its error)
    pub response: InterceptorManager<Value>,
}

impl Interceptors {
    pub(crate) fn new() -> Self {
        Self {
            request: InterceptorManager::new(),
            response: InterceptorManager::new(),
        }
    }
}

/// Run `state` through each interceptor in turn
pub(crate) async fn run_chain<V: Send + 'static>(
    interceptors: &[Interceptor<V>],
    mut state: Result<V>,
) -> Result<V> {
    for interceptor in interceptors {
        state = interceptor.apply(state).await;
    }
    state
}
