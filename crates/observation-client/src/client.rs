//! Request gateway
//!
//! Every API call goes through [`ObservationClient::request`] or
//! [`ObservationClient::public_request`]: URL resolution, the response
//! cache, header injection, the interceptor chain and response
//! classification all live here.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::cache::CacheStore;
use crate::config::ClientOptions;
use crate::error::{Error, ErrorBody, HttpFailure, Result};
use crate::interceptors::{run_chain, Interceptors};
use crate::refresh::{RefreshCoordinator, RefreshTokenInterceptor};
use crate::request::{parse_base_url, resolve_url, CachePolicy, RequestConfig, RequestOptions};
use crate::resources::{
    Badges, Challenges, Countries, Exports, Groups, Languages, Locations, Lookups, Media, Nia,
    Observations, RegionSpeciesLists, Regions, Sessions, Species, Transects, Users,
};
use crate::transport::{HttpResponse, ReqwestTransport, Transport};

const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Default)]
pub(crate) struct TokenState {
    pub(crate) access_token: Option<String>,
    pub(crate) refresh_token: Option<String>,
}

pub(crate) struct ClientInner {
    pub(crate) options: ClientOptions,
    pub(crate) base_url: Url,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) tokens: RwLock<TokenState>,
    language: RwLock<String>,
    pub(crate) interceptors: Interceptors,
    pub(crate) refresh: RefreshCoordinator,
}

/// Client for the observation platform API
///
/// Cloning is cheap; clones share tokens, cache and interceptors.
#[derive(Clone)]
pub struct ObservationClient {
    inner: Arc<ClientInner>,
}

impl ObservationClient {
    /// Create a client using the default reqwest transport
    pub fn new(options: ClientOptions) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(options, Arc::new(transport))
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(options: ClientOptions, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = parse_base_url(options.resolved_base_url())?;
        let auto_refresh = options.auto_refresh;

        let inner = Arc::new(ClientInner {
            options,
            base_url,
            transport,
            tokens: RwLock::new(TokenState::default()),
            language: RwLock::new(DEFAULT_LANGUAGE.to_string()),
            interceptors: Interceptors::new(),
            refresh: RefreshCoordinator::new(),
        });

        if auto_refresh {
            let refresh = RefreshTokenInterceptor::new(Arc::downgrade(&inner));
            inner.interceptors.response.add(refresh.into_interceptor());
        }

        debug!(base_url = %inner.base_url, "Created observation client");
        Ok(Self { inner })
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &ClientInner {
        &self.inner
    }

    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Base URL selected at construction, without a trailing slash
    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str().trim_end_matches('/')
    }

    /// Root of the v1 resource API, e.g. `https://waarneming.nl/api/v1`
    pub fn api_base_url(&self) -> String {
        format!("{}/api/v1", self.base_url())
    }

    /// Set the language sent as `Accept-Language` on every later request
    pub fn set_language(&self, language: impl Into<String>) {
        *write(&self.inner.language) = language.into();
    }

    pub fn language(&self) -> String {
        read(&self.inner.language).clone()
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        write(&self.inner.tokens).access_token = Some(token.into());
    }

    pub fn set_refresh_token(&self, token: impl Into<String>) {
        write(&self.inner.tokens).refresh_token = Some(token.into());
    }

    pub fn clear_tokens(&self) {
        *write(&self.inner.tokens) = TokenState::default();
    }

    pub fn has_access_token(&self) -> bool {
        read(&self.inner.tokens).access_token.is_some()
    }

    pub fn has_refresh_token(&self) -> bool {
        read(&self.inner.tokens).refresh_token.is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        read(&self.inner.tokens).access_token.clone()
    }

    pub(crate) fn refresh_token(&self) -> Option<String> {
        read(&self.inner.tokens).refresh_token.clone()
    }

    /// Replace both tokens in one step
    pub(crate) fn store_tokens(&self, access_token: String, refresh_token: Option<String>) {
        let mut tokens = write(&self.inner.tokens);
        tokens.access_token = Some(access_token);
        tokens.refresh_token = refresh_token;
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.inner.interceptors
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.inner.options.cache.store
    }

    /// Authenticated request; fails with [`Error::NotAuthenticated`] when
    /// no access token is set.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let value = self.execute(endpoint, options, true).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Unauthenticated request; never sends an `Authorization` header
    pub async fn public_request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let value = self.execute(endpoint, options, false).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Authenticated when a token is held, public otherwise
    pub(crate) async fn request_with_optional_auth<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        if self.has_access_token() {
            self.request(endpoint, options).await
        } else {
            self.public_request(endpoint, options).await
        }
    }

    /// Authenticated when a token is held; otherwise public and cached with
    /// the default TTL
    pub(crate) async fn request_cached_when_public<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        if self.has_access_token() {
            self.request(endpoint, options).await
        } else {
            self.public_request(endpoint, options.cached()).await
        }
    }

    async fn execute(
        &self,
        endpoint: &str,
        options: RequestOptions,
        authenticated: bool,
    ) -> Result<Value> {
        let token = if authenticated {
            Some(self.access_token().ok_or(Error::NotAuthenticated)?)
        } else {
            None
        };

        let url = resolve_url(&self.inner.base_url, endpoint, &options.params)?;
        let cache_ttl = self.cache_ttl(&options);
        let cache_key = url.to_string();

        if cache_ttl.is_some() {
            if let Some(hit) = self.cache().get(&cache_key).await {
                debug!(url = %cache_key, "Cache hit");
                return Ok(hit);
            }
            debug!(url = %cache_key, "Cache miss");
        }

        let headers = self.build_headers(options.headers, token.as_deref())?;
        let config = RequestConfig {
            method: options.method,
            url,
            headers,
            body: options.body,
            authenticated,
            retried: false,
        };

        let request_chain = self.inner.interceptors.request.snapshot();
        let response_chain = self.inner.interceptors.response.snapshot();

        let outcome = match run_chain(&request_chain, Ok(config)).await {
            Ok(config) => self.dispatch(config).await,
            Err(err) => Err(err),
        };
        let value = run_chain(&response_chain, outcome).await?;

        // First writer wins until its entry expires
        if let Some(ttl) = cache_ttl {
            if !self.cache().set_if_absent(&cache_key, value.clone(), ttl).await {
                debug!(url = %cache_key, "Cache already filled by a concurrent request");
            }
        }

        Ok(value)
    }

    /// TTL to use for this call, or `None` when it must not touch the cache
    fn cache_ttl(&self, options: &RequestOptions) -> Option<Duration> {
        let cache = &self.inner.options.cache;
        if !cache.enabled || options.method != Method::GET {
            return None;
        }
        match options.cache {
            CachePolicy::Bypass => None,
            CachePolicy::Default => Some(cache.default_ttl),
            CachePolicy::Ttl(ttl) => Some(ttl),
        }
    }

    fn build_headers(&self, extra: HeaderMap, token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, header_value(&self.language())?);
        if let Some(token) = token {
            headers.insert(AUTHORIZATION, bearer(token)?);
        }

        // Caller headers win
        for (name, value) in extra.iter() {
            headers.insert(name.clone(), value.clone());
        }
        Ok(headers)
    }

    /// The core transport call: send, then classify the response
    pub(crate) async fn dispatch(&self, config: RequestConfig) -> Result<Value> {
        let http = config.to_http()?;
        debug!(
            method = %http.method,
            url = %http.url,
            retried = config.retried,
            "Sending request"
        );

        let response = self.inner.transport.send(http).await?;

        if !response.is_success() {
            debug!(status = response.status.as_u16(), url = %config.url, "Request failed");
            let failure = HttpFailure {
                status: response.status,
                url: config.url.to_string(),
                body: ErrorBody::from_bytes(&response.body),
                headers: response.headers,
                request: Some(config),
            };
            return Err(Error::from_response(failure));
        }

        decode_success(&response)
    }

    /// Re-send a request with the current access token, marked as retried
    pub(crate) async fn replay(&self, mut config: RequestConfig) -> Result<Value> {
        config.retried = true;
        if let Some(token) = self.access_token() {
            config.headers.insert(AUTHORIZATION, bearer(&token)?);
        }
        self.dispatch(config).await
    }

    pub fn badges(&self) -> Badges<'_> {
        Badges::new(self)
    }

    pub fn challenges(&self) -> Challenges<'_> {
        Challenges::new(self)
    }

    pub fn countries(&self) -> Countries<'_> {
        Countries::new(self)
    }

    pub fn exports(&self) -> Exports<'_> {
        Exports::new(self)
    }

    pub fn groups(&self) -> Groups<'_> {
        Groups::new(self)
    }

    pub fn languages(&self) -> Languages<'_> {
        Languages::new(self)
    }

    pub fn locations(&self) -> Locations<'_> {
        Locations::new(self)
    }

    pub fn lookups(&self) -> Lookups<'_> {
        Lookups::new(self)
    }

    pub fn media(&self) -> Media<'_> {
        Media::new(self)
    }

    pub fn nia(&self) -> Nia<'_> {
        Nia::new(self)
    }

    pub fn observations(&self) -> Observations<'_> {
        Observations::new(self)
    }

    pub fn regions(&self) -> Regions<'_> {
        Regions::new(self)
    }

    pub fn region_species_lists(&self) -> RegionSpeciesLists<'_> {
        RegionSpeciesLists::new(self)
    }

    pub fn sessions(&self) -> Sessions<'_> {
        Sessions::new(self)
    }

    pub fn species(&self) -> Species<'_> {
        Species::new(self)
    }

    pub fn transects(&self) -> Transects<'_> {
        Transects::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }
}

impl std::fmt::Debug for ObservationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationClient")
            .field("base_url", &self.base_url())
            .field("has_access_token", &self.has_access_token())
            .finish_non_exhaustive()
    }
}

/// Decode a 2xx body: empty becomes `{}`, JSON is parsed, and anything
/// else that isn't valid JSON is returned as a string.
fn decode_success(response: &HttpResponse) -> Result<Value> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    if response.is_json() {
        return Ok(serde_json::from_slice(&response.body)?);
    }

    Ok(serde_json::from_slice(&response.body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&response.body).into_owned())))
}

pub(crate) fn bearer(token: &str) -> Result<HeaderValue> {
    let mut value = header_value(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Token carried by an `Authorization: Bearer` header
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Configuration(format!("invalid header value: {e}")))
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
