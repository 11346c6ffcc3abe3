use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;

pub struct Regions<'a> {
    client: &'a ObservationClient,
}

impl<'a> Regions<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Value>> {
        self.client
            .public_request("regions/", RequestOptions::get().cached())
            .await
    }

    pub async fn types(&self) -> Result<Vec<Value>> {
        self.client
            .public_request("region-types/", RequestOptions::get().cached())
            .await
    }
}
