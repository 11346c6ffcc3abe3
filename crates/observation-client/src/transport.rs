//! HTTP transport boundary
//!
//! The gateway never talks to reqwest directly; it hands a fully built
//! [`HttpRequest`] to a [`Transport`] and gets the status, headers and raw
//! body back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::error::{Error, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!("observation-client-rs/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub enum HttpBody {
    Empty,
    Bytes(Vec<u8>),
    Multipart(MultipartForm),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: HttpBody,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_json(&self) -> bool {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

/// Anything that can execute an HTTP exchange
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// One part of a multipart form
#[derive(Debug, Clone)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        bytes: Vec<u8>,
        file_name: Option<String>,
        mime: Option<String>,
    },
}

/// A multipart form that, unlike `reqwest::multipart::Form`, can be cloned
/// and therefore re-sent after a token refresh.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
        file_name: Option<String>,
        mime: Option<String>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            bytes,
            file_name,
            mime,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    fn into_reqwest(self) -> Result<Form> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    bytes,
                    file_name,
                    mime,
                } => {
                    let mut part = Part::bytes(bytes);
                    if let Some(file_name) = file_name {
                        part = part.file_name(file_name);
                    }
                    if let Some(mime) = mime {
                        part = part.mime_str(&mime).map_err(|e| {
                            Error::Configuration(format!("invalid MIME type {mime}: {e}"))
                        })?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Default transport backed by a shared `reqwest::Client`
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with default settings (30 second timeout)
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with custom TLS or proxy settings
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        builder = match request.body {
            HttpBody::Empty => builder,
            HttpBody::Bytes(bytes) => builder.body(bytes),
            HttpBody::Multipart(form) => builder.multipart(form.into_reqwest()?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    #[test]
    fn test_is_json_checks_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        let response = HttpResponse {
            status: StatusCode::OK,
            headers,
            body: Vec::new(),
        };
        assert!(response.is_json());
        assert!(response.is_success());
    }

    #[test]
    fn test_multipart_form_keeps_part_order() {
        let form = MultipartForm::new()
            .file("image", vec![1, 2, 3], Some("a.jpg".into()), Some("image/jpeg".into()))
            .file("image", vec![4], None, None)
            .text("location_coordinates", "52.1,5.2");

        let names: Vec<_> = form
            .parts()
            .iter()
            .map(|p| match p {
                FormPart::Text { name, .. } | FormPart::File { name, .. } => name.as_str(),
            })
            .collect();
        assert_eq!(names, vec!["image", "image", "location_coordinates"]);
    }

    #[test]
    fn test_multipart_form_rejects_bad_mime() {
        let form = MultipartForm::new().file("image", vec![1], None, Some("not a mime".into()));
        assert!(form.into_reqwest().is_err());
    }
}
