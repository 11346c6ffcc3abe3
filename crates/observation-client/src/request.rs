//! Per-call request options and the resolved request passed through the chain

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::error::{Error, Result};
use crate::transport::{HttpBody, HttpRequest, MultipartForm};

/// Path segment prepended to relative endpoints
pub const API_V1_PATH: &str = "api/v1/";

/// Body of an API request before encoding
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart(MultipartForm),
}

/// Whether a GET call reads from and writes to the response cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    #[default]
    Bypass,
    /// Cache with the client's default TTL
    Default,
    Ttl(Duration),
}

/// Options for a single call to `request` / `public_request`
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    /// Query parameters, kept in insertion order
    pub params: Vec<(String, String)>,
    pub cache: CachePolicy,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
            params: Vec::new(),
            cache: CachePolicy::Bypass,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Add a header; fails on a name or value that cannot be sent
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Configuration(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::Configuration(format!("invalid value for header {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Serialize `body` as the JSON request body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// URL-encoded form body
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_string()))
            .collect();
        self.body = Some(RequestBody::Form(fields));
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        self
    }

    /// Opt in to caching with the client's default TTL
    pub fn cached(mut self) -> Self {
        self.cache = CachePolicy::Default;
        self
    }

    pub fn cached_for(mut self, ttl: Duration) -> Self {
        self.cache = CachePolicy::Ttl(ttl);
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.cache = CachePolicy::Bypass;
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// A fully resolved request, as seen by request interceptors
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    /// Whether the request carries the client's bearer token
    pub authenticated: bool,
    /// Set once the request has been replayed after a token refresh
    pub retried: bool,
}

impl RequestConfig {
    /// Encode the body and build the transport request
    pub(crate) fn to_http(&self) -> Result<HttpRequest> {
        let mut headers = self.headers.clone();
        let body = match &self.body {
            Some(RequestBody::Multipart(form)) => {
                // The transport writes the multipart boundary itself
                headers.remove(CONTENT_TYPE);
                HttpBody::Multipart(form.clone())
            }
            Some(RequestBody::Json(value)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                HttpBody::Bytes(serde_json::to_vec(value)?)
            }
            Some(RequestBody::Form(fields)) => {
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields)
                    .finish();
                HttpBody::Bytes(encoded.into_bytes())
            }
            None => {
                if self.method == Method::POST || self.method == Method::PUT {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                HttpBody::Empty
            }
        };

        Ok(HttpRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers,
            body,
        })
    }
}

/// Resolve an endpoint against the client's base URL.
///
/// Absolute URLs are used as-is, endpoints starting with `/` are rooted at
/// the base host, anything else lives under `{base}/api/v1/`.
pub fn resolve_url(base_url: &Url, endpoint: &str, params: &[(String, String)]) -> Result<Url> {
    let mut url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else if endpoint.starts_with('/') {
        base_url.join(endpoint)?
    } else {
        base_url.join(API_V1_PATH)?.join(endpoint)?
    };

    if !params.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Parse a configured base URL so that joins keep any path prefix
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Configuration("base URL is empty".to_string()));
    }
    Ok(Url::parse(&format!("{trimmed}/"))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Url {
        parse_base_url("https://x.test").unwrap()
    }

    #[test]
    fn test_relative_endpoint_goes_under_api_v1() {
        let url = resolve_url(&base(), "species/2", &[]).unwrap();
        assert_eq!(url.as_str(), "https://x.test/api/v1/species/2");
    }

    #[test]
    fn test_rooted_endpoint_keeps_its_path() {
        let url = resolve_url(&base(), "/api/v2/user/sessions/", &[]).unwrap();
        assert_eq!(url.as_str(), "https://x.test/api/v2/user/sessions/");
    }

    #[test]
    fn test_absolute_endpoint_is_used_as_is() {
        let url = resolve_url(&base(), "https://other.test/api/v1/countries/?page=2", &[]).unwrap();
        assert_eq!(url.as_str(), "https://other.test/api/v1/countries/?page=2");
    }

    #[test]
    fn test_params_are_encoded_in_order() {
        let params = vec![
            ("q".to_string(), "a b".to_string()),
            ("limit".to_string(), 10.to_string()),
            ("q".to_string(), "c&d".to_string()),
        ];
        let url = resolve_url(&base(), "species/search/", &params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://x.test/api/v1/species/search/?q=a+b&limit=10&q=c%26d"
        );
    }

    #[test]
    fn test_base_url_with_trailing_slash_and_path() {
        let base = parse_base_url("https://x.test/proxy/").unwrap();
        let url = resolve_url(&base, "species/2", &[]).unwrap();
        assert_eq!(url.as_str(), "https://x.test/proxy/api/v1/species/2");
        assert!(parse_base_url("").is_err());
    }

    #[test]
    fn test_options_builder() {
        let options = RequestOptions::post()
            .header("X-Trace", "abc")
            .unwrap()
            .param("page", 2)
            .json(&json!({"name": "x"}))
            .unwrap()
            .cached_for(Duration::from_secs(5));

        assert_eq!(options.method, Method::POST);
        assert_eq!(options.headers["x-trace"], "abc");
        assert_eq!(options.params, vec![("page".to_string(), "2".to_string())]);
        assert!(matches!(options.body, Some(RequestBody::Json(_))));
        assert_eq!(options.cache, CachePolicy::Ttl(Duration::from_secs(5)));
    }

    #[test]
    fn test_invalid_header_is_an_error() {
        let err = RequestOptions::get().header("bad header", "x").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = RequestOptions::get().header("X-Trace", "line\nbreak").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_form_body_is_url_encoded() {
        let options = RequestOptions::post().form([("is_subscribed", true)]);
        let http = config(Method::POST, options.body).to_http().unwrap();
        assert_eq!(http.headers[CONTENT_TYPE], "application/x-www-form-urlencoded");
        assert!(matches!(http.body, HttpBody::Bytes(ref b) if b == b"is_subscribed=true"));
    }

    fn config(method: Method, body: Option<RequestBody>) -> RequestConfig {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        RequestConfig {
            method,
            url: base(),
            headers,
            body,
            authenticated: false,
            retried: false,
        }
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let http = config(Method::POST, Some(RequestBody::Json(json!({"a": 1}))))
            .to_http()
            .unwrap();
        assert_eq!(http.headers[CONTENT_TYPE], "application/json");
        assert!(matches!(http.body, HttpBody::Bytes(ref b) if b == br#"{"a":1}"#));
    }

    #[test]
    fn test_multipart_body_strips_content_type() {
        let form = MultipartForm::new().text("location_coordinates", "52.1,5.2");
        let http = config(Method::POST, Some(RequestBody::Multipart(form)))
            .to_http()
            .unwrap();
        assert!(http.headers.get(CONTENT_TYPE).is_none());
        assert!(matches!(http.body, HttpBody::Multipart(_)));
    }

    #[test]
    fn test_empty_post_gets_json_content_type() {
        let http = config(Method::POST, None).to_http().unwrap();
        assert_eq!(http.headers[CONTENT_TYPE], "application/json");
        assert!(matches!(http.body, HttpBody::Empty));

        let http = config(Method::GET, None).to_http().unwrap();
        assert_eq!(http.headers[CONTENT_TYPE], "text/plain");
    }
}
