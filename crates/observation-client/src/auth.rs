//! OAuth2 grant flows against the platform's token endpoint

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::form_urlencoded;

use crate::client::ObservationClient;
use crate::config::ClientCredentials;
use crate::error::{Error, ErrorBody, HttpFailure, Result};
use crate::transport::{HttpBody, HttpRequest};

const TOKEN_PATH: &str = "accounts/oauth2/token/";
const AUTHORIZE_PATH: &str = "accounts/oauth2/authorize/";

/// Successful response from the token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Resource-owner password credentials
#[derive(Clone)]
pub struct PasswordGrant {
    pub client_id: String,
    /// Only for confidential clients
    pub client_secret: Option<String>,
    pub email: String,
    pub password: String,
}

impl PasswordGrant {
    pub fn new(
        client_id: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn with_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }
}

impl std::fmt::Debug for PasswordGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGrant")
            .field("client_id", &self.client_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl ObservationClient {
    fn credentials(&self) -> Result<&ClientCredentials> {
        self.options()
            .credentials
            .as_ref()
            .ok_or_else(|| Error::Configuration("client credentials are not set".to_string()))
    }

    /// URL to send the user to for the authorization-code flow
    pub fn get_authorization_url(&self, state: &str, scopes: &[&str]) -> Result<String> {
        let credentials = self.credentials()?;
        let mut url = self.inner().base_url.join(AUTHORIZE_PATH)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &credentials.client_id)
            .append_pair("redirect_uri", &credentials.redirect_uri)
            .append_pair("scope", &scopes.join(" "))
            .append_pair("state", state);
        Ok(url.to_string())
    }

    /// Exchange an authorization code for a token pair
    pub async fn get_access_token(&self, code: &str) -> Result<TokenResponse> {
        let credentials = self.credentials()?;
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", credentials.redirect_uri.as_str()),
            ("client_id", credentials.client_id.as_str()),
        ];
        if let Some(secret) = &credentials.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        self.token_grant("authorization_code", &form).await
    }

    /// Exchange end-user credentials for a token pair. Works without
    /// client credentials in the client options.
    pub async fn get_access_token_with_password(
        &self,
        grant: &PasswordGrant,
    ) -> Result<TokenResponse> {
        let mut form = vec![
            ("grant_type", "password"),
            ("client_id", grant.client_id.as_str()),
            ("username", grant.email.as_str()),
            ("password", grant.password.as_str()),
        ];
        if let Some(secret) = &grant.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        self.token_grant("password", &form).await
    }

    /// Exchange the held refresh token for a new token pair
    pub async fn refresh_access_token(&self) -> Result<TokenResponse> {
        let refresh_token = self
            .refresh_token()
            .ok_or_else(|| Error::Configuration("no refresh token available".to_string()))?;
        let credentials = self.credentials()?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", credentials.client_id.as_str()),
        ];
        if let Some(secret) = &credentials.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        self.token_grant("refresh_token", &form).await
    }

    async fn token_grant(&self, grant_type: &str, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let url = self.inner().base_url.join(TOKEN_PATH)?;
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        debug!(grant_type, url = %url, "Requesting token");

        let response = self
            .inner()
            .transport
            .send(HttpRequest {
                method: Method::POST,
                url: url.clone(),
                headers,
                body: HttpBody::Bytes(body.into_bytes()),
            })
            .await?;

        if !response.is_success() {
            return Err(Error::Authentication(Box::new(HttpFailure {
                status: response.status,
                url: url.to_string(),
                body: ErrorBody::from_bytes(&response.body),
                headers: response.headers,
                request: None,
            })));
        }

        let tokens: TokenResponse = serde_json::from_slice(&response.body)?;
        self.store_tokens(tokens.access_token.clone(), tokens.refresh_token.clone());

        info!(grant_type, expires_in = tokens.expires_in, "Obtained access token");
        Ok(tokens)
    }
}
