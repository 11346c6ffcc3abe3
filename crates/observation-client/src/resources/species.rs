use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::types::Paginated;

pub struct Species<'a> {
    client: &'a ObservationClient,
}

impl<'a> Species<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: u64) -> Result<Value> {
        self.client
            .request_with_optional_auth(&format!("species/{id}"), RequestOptions::get())
            .await
    }

    /// Search species; `params` are passed through as query parameters
    pub async fn search(&self, params: &[(&str, &str)]) -> Result<Paginated<Value>> {
        self.client
            .request_with_optional_auth(
                "species/search/",
                RequestOptions::get().params(params.iter().copied()),
            )
            .await
    }

    pub async fn observations(
        &self,
        id: u64,
        params: &[(&str, &str)],
    ) -> Result<Paginated<Value>> {
        self.client
            .request_with_optional_auth(
                &format!("species/{id}/observations/"),
                RequestOptions::get().params(params.iter().copied()),
            )
            .await
    }

    pub async fn groups(&self) -> Result<Value> {
        self.client
            .public_request("species-groups/", RequestOptions::get().cached())
            .await
    }

    pub async fn group_attributes(&self, group_id: u64) -> Result<Value> {
        self.client
            .public_request(
                &format!("species-groups/{group_id}/attributes/"),
                RequestOptions::get().cached(),
            )
            .await
    }
}
