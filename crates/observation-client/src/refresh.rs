//! Automatic token refresh on 401
//!
//! When an authenticated request comes back 401 and a refresh token is held,
//! the token pair is refreshed once and the request is replayed. Concurrent
//! 401s share a single refresh: the first one performs it, the rest wait on a
//! watch channel for its outcome.

use std::sync::{Mutex, MutexGuard, Weak};

use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::{bearer_token, ClientInner, ObservationClient};
use crate::error::{Error, Result};
use crate::interceptors::Interceptor;
use crate::request::RequestConfig;

/// `None` while the refresh runs, then whether it succeeded
type Outcome = Option<bool>;

/// Tracks the refresh currently in flight, if any
pub(crate) struct RefreshCoordinator {
    in_flight: Mutex<Option<watch::Receiver<Outcome>>>,
}

enum Flight<'a> {
    /// This caller performs the refresh
    Leader(RefreshGuard<'a>),
    /// Another caller is refreshing; wait for it
    Follower(watch::Receiver<Outcome>),
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self {
            in_flight: Mutex::new(None),
        }
    }

    /// Join the in-flight refresh or start a new one. Check and set happen
    /// under one lock with no await in between.
    fn begin(&self) -> Flight<'_> {
        let mut in_flight = self.lock();
        if let Some(rx) = in_flight.as_ref() {
            return Flight::Follower(rx.clone());
        }

        let (tx, rx) = watch::channel(None);
        *in_flight = Some(rx);
        Flight::Leader(RefreshGuard {
            coordinator: self,
            tx: Some(tx),
        })
    }

    #[cfg(test)]
    fn is_refreshing(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<watch::Receiver<Outcome>>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Clears the in-flight slot when the refresh ends, including when the
/// leader's future is dropped before finishing.
struct RefreshGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    tx: Option<watch::Sender<Outcome>>,
}

impl RefreshGuard<'_> {
    fn complete(mut self, succeeded: bool) {
        *self.coordinator.lock() = None;
        if let Some(tx) = self.tx.take() {
            // No followers is fine
            let _ = tx.send(Some(succeeded));
        }
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if self.tx.is_some() {
            // Dropping the sender wakes followers with a closed channel
            *self.coordinator.lock() = None;
        }
    }
}

/// Response interceptor implementing the refresh-and-replay policy
#[derive(Clone)]
pub(crate) struct RefreshTokenInterceptor {
    client: Weak<ClientInner>,
}

impl RefreshTokenInterceptor {
    pub(crate) fn new(client: Weak<ClientInner>) -> Self {
        Self { client }
    }

    pub(crate) fn into_interceptor(self) -> Interceptor<Value> {
        Interceptor::on_error(move |err| {
            let this = self.clone();
            async move { this.handle(err).await }
        })
    }

    async fn handle(&self, err: Error) -> Result<Value> {
        let Some(inner) = self.client.upgrade() else {
            return Err(err);
        };
        let client = ObservationClient::from_inner(inner);

        let Some(request) = retryable_request(&err, client.has_refresh_token()) else {
            return Err(err);
        };
        let request = request.clone();

        // A refresh already landed after this request was sent
        let sent_with = bearer_token(&request.headers).map(str::to_owned);
        if sent_with.is_some() && sent_with != client.access_token() {
            debug!(url = %request.url, "Token changed since request was sent, replaying");
            return client.replay(request).await;
        }

        // Bound to a local so the flight guard drops before `client`
        let refresh = &client.inner().refresh;
        let outcome = match refresh.begin() {
            Flight::Follower(mut rx) => {
                debug!(url = %request.url, "Waiting for in-flight token refresh");
                let succeeded = matches!(
                    rx.wait_for(Option::is_some).await.map(|outcome| *outcome),
                    Ok(Some(true))
                );
                if succeeded {
                    client.replay(request).await
                } else {
                    Err(err)
                }
            }
            Flight::Leader(guard) => {
                debug!(url = %request.url, "Access token rejected, refreshing");
                match client.refresh_access_token().await {
                    Ok(_) => {
                        guard.complete(true);
                        client.replay(request).await
                    }
                    Err(refresh_err) => {
                        guard.complete(false);
                        warn!(error = %refresh_err, "Token refresh failed");
                        Err(err)
                    }
                }
            }
        };
        #[allow(clippy::let_and_return)]
        outcome
    }
}

/// The request to replay, if `err` qualifies for the refresh policy:
/// a 401 on an authenticated request that has not been retried yet, with a
/// refresh token available.
fn retryable_request(err: &Error, has_refresh_token: bool) -> Option<&RequestConfig> {
    let Error::Authentication(failure) = err else {
        return None;
    };
    if failure.status != StatusCode::UNAUTHORIZED || !has_refresh_token {
        return None;
    }
    let request = failure.request.as_ref()?;
    if !request.authenticated || request.retried {
        return None;
    }
    Some(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorBody, HttpFailure};
    use reqwest::header::HeaderMap;
    use reqwest::Method;

    fn auth_error(status: StatusCode, authenticated: bool, retried: bool) -> Error {
        let request = RequestConfig {
            method: Method::GET,
            url: "https://x.test/api/v1/user/info/".parse().unwrap(),
            headers: HeaderMap::new(),
            body: None,
            authenticated,
            retried,
        };
        Error::from_response(HttpFailure {
            status,
            url: request.url.to_string(),
            headers: HeaderMap::new(),
            body: ErrorBody::Empty,
            request: Some(request),
        })
    }

    #[test]
    fn test_401_on_fresh_authenticated_request_is_retryable() {
        let err = auth_error(StatusCode::UNAUTHORIZED, true, false);
        assert!(retryable_request(&err, true).is_some());
    }

    #[test]
    fn test_not_retryable_without_refresh_token() {
        let err = auth_error(StatusCode::UNAUTHORIZED, true, false);
        assert!(retryable_request(&err, false).is_none());
    }

    #[test]
    fn test_retried_request_is_not_retried_again() {
        let err = auth_error(StatusCode::UNAUTHORIZED, true, true);
        assert!(retryable_request(&err, true).is_none());
    }

    #[test]
    fn test_forbidden_and_public_requests_are_not_retried() {
        let err = auth_error(StatusCode::FORBIDDEN, true, false);
        assert!(retryable_request(&err, true).is_none());

        let err = auth_error(StatusCode::UNAUTHORIZED, false, false);
        assert!(retryable_request(&err, true).is_none());
    }

    #[test]
    fn test_other_errors_are_not_retryable() {
        let err = auth_error(StatusCode::NOT_FOUND, true, false);
        assert!(retryable_request(&err, true).is_none());
        assert!(retryable_request(&Error::NotAuthenticated, true).is_none());
    }

    #[tokio::test]
    async fn test_second_caller_follows_in_flight_refresh() {
        let coordinator = RefreshCoordinator::new();
        let Flight::Leader(guard) = coordinator.begin() else {
            panic!("first caller should lead");
        };
        let Flight::Follower(mut rx) = coordinator.begin() else {
            panic!("second caller should follow");
        };
        assert!(coordinator.is_refreshing());

        guard.complete(true);

        let outcome = *rx.wait_for(Option::is_some).await.unwrap();
        assert_eq!(outcome, Some(true));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_dropped_leader_releases_followers() {
        let coordinator = RefreshCoordinator::new();
        let leader = coordinator.begin();
        let Flight::Follower(mut rx) = coordinator.begin() else {
            panic!("second caller should follow");
        };

        drop(leader);

        assert!(rx.wait_for(Option::is_some).await.is_err());
        assert!(!coordinator.is_refreshing());
        assert!(matches!(coordinator.begin(), Flight::Leader(_)));
    }
}
