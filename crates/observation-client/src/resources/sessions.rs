use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::types::Paginated;

/// Observation sessions. These live under `/api/v2/`.
pub struct Sessions<'a> {
    client: &'a ObservationClient,
}

impl<'a> Sessions<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Paginated<Value>> {
        self.client
            .request("/api/v2/user/sessions/", RequestOptions::get())
            .await
    }

    pub async fn create(&self, session: &Value) -> Result<Value> {
        self.client
            .request("/api/v2/sessions/", RequestOptions::post().json(session)?)
            .await
    }

    pub async fn observations(&self, uuid: &str) -> Result<Paginated<Value>> {
        let endpoint = format!(
            "/api/v2/user/sessions/{}/observations/",
            urlencoding::encode(uuid)
        );
        self.client.request(&endpoint, RequestOptions::get()).await
    }
}
