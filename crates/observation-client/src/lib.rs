//! Rust client for the Observation.org / Waarneming.nl REST API
//!
//! All calls go through a single gateway, [`ObservationClient`], which
//! resolves URLs for the selected platform, injects auth and language
//! headers, manages the OAuth2 token pair (including a one-shot refresh and
//! replay on 401), runs request/response interceptors and optionally caches
//! GET responses.
//!
//! # Example
//!
//! ```no_run
//! use observation_client::{ClientOptions, ObservationClient, Platform};
//!
//! # async fn example() -> Result<(), observation_client::Error> {
//! let client = ObservationClient::new(
//!     ClientOptions::new().with_platform(Platform::Be).with_test(false),
//! )?;
//! client.set_language("nl");
//!
//! let countries = client.countries().list().await?;
//! for country in countries.results {
//!     println!("{} {}", country.code, country.name);
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod cache;
mod client;
mod config;
mod error;
mod interceptors;
mod refresh;
mod request;
pub mod resources;
mod transport;
mod types;

pub use auth::{PasswordGrant, TokenResponse};
pub use cache::{CacheOptions, CacheStore, InMemoryCache, DEFAULT_CACHE_TTL, MAX_CACHE_TTL};
pub use client::ObservationClient;
pub use config::{ClientCredentials, ClientOptions, Platform};
pub use error::{Error, ErrorBody, HttpFailure, Result};
pub use interceptors::{Interceptor, InterceptorId, InterceptorManager, Interceptors};
pub use request::{resolve_url, CachePolicy, RequestBody, RequestConfig, RequestOptions};
pub use transport::{
    FormPart, HttpBody, HttpRequest, HttpResponse, MultipartForm, ReqwestTransport, Transport,
};
pub use types::{Country, Language, NiaPrediction, NiaResponse, NiaTaxon, Paginated};
