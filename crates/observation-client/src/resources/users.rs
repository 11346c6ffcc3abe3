use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;

pub struct Users<'a> {
    client: &'a ObservationClient,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    /// Details of the authenticated user
    pub async fn info(&self) -> Result<Value> {
        self.client.request("user/info/", RequestOptions::get()).await
    }

    pub async fn terms(&self) -> Result<Value> {
        self.client
            .public_request("user/terms/", RequestOptions::get().cached())
            .await
    }

    pub async fn reset_password(&self, email: &str) -> Result<Value> {
        let body = serde_json::json!({ "email": email });
        self.client
            .public_request("user/password-reset/", RequestOptions::post().json(&body)?)
            .await
    }
}
