use std::env;
use std::fmt;
use std::str::FromStr;

use crate::cache::CacheOptions;
use crate::error::Error;

/// Regional deployments of the observation platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Platform {
    /// waarneming.nl
    #[default]
    Nl,
    /// waarnemingen.be
    Be,
    /// observation.org
    Org,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Nl, Platform::Be, Platform::Org];

    pub fn production_url(self) -> &'static str {
        match self {
            Platform::Nl => "https://waarneming.nl",
            Platform::Be => "https://waarnemingen.be",
            Platform::Org => "https://observation.org",
        }
    }

    pub fn test_url(self) -> &'static str {
        match self {
            Platform::Nl => "https://waarneming-test.nl",
            Platform::Be => "https://waarnemingen-test.be",
            Platform::Org => "https://observation-test.org",
        }
    }

    pub fn base_url(self, test: bool) -> &'static str {
        if test {
            self.test_url()
        } else {
            self.production_url()
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Nl => "nl",
            Platform::Be => "be",
            Platform::Org => "org",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nl" => Ok(Platform::Nl),
            "be" => Ok(Platform::Be),
            "org" => Ok(Platform::Org),
            other => Err(Error::Configuration(format!(
                "unknown platform '{other}', expected one of nl, be, org"
            ))),
        }
    }
}

/// OAuth2 application credentials
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    /// Absent for public clients
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn with_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Client configuration, fixed at construction
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub credentials: Option<ClientCredentials>,
    /// Explicit base URL; overrides `platform` and `test`
    pub base_url: Option<String>,
    pub platform: Platform,
    /// Use the platform's test deployment
    pub test: bool,
    pub cache: CacheOptions,
    /// Refresh the token pair and replay once when a request gets a 401
    pub auto_refresh: bool,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(mut self, credentials: ClientCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    pub fn with_cache(mut self, cache: CacheOptions) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_auto_refresh(mut self, auto_refresh: bool) -> Self {
        self.auto_refresh = auto_refresh;
        self
    }

    /// The single base URL this configuration selects
    pub fn resolved_base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url,
            None => self.platform.base_url(self.test),
        }
    }

    /// Parse configuration from environment variables
    ///
    /// Credentials are only set when `OBSERVATION_CLIENT_ID` is present.
    pub fn from_env() -> Result<Self, Error> {
        let mut options = Self::default();

        if let Ok(client_id) = env::var("OBSERVATION_CLIENT_ID") {
            let redirect_uri = env::var("OBSERVATION_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:3000/callback".to_string());
            let mut credentials = ClientCredentials::new(client_id, redirect_uri);
            credentials.client_secret = env::var("OBSERVATION_CLIENT_SECRET")
                .ok()
                .filter(|s| !s.is_empty());
            options.credentials = Some(credentials);
        }

        options.base_url = env::var("OBSERVATION_BASE_URL").ok().filter(|s| !s.is_empty());

        if let Ok(platform) = env::var("OBSERVATION_PLATFORM") {
            options.platform = platform.parse()?;
        }

        if let Ok(test) = env::var("OBSERVATION_TEST") {
            options.test = !matches!(test.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no");
        }

        Ok(options)
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            credentials: None,
            base_url: None,
            platform: Platform::default(),
            test: true,
            cache: CacheOptions::default(),
            auto_refresh: true,
        }
    }
}
