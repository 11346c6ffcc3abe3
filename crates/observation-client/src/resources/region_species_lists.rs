use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;

pub struct RegionSpeciesLists<'a> {
    client: &'a ObservationClient,
}

impl<'a> RegionSpeciesLists<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Value>> {
        self.client
            .public_request("region-lists/", RequestOptions::get())
            .await
    }

    pub async fn species(&self, list_id: u64) -> Result<Vec<Value>> {
        self.client
            .public_request(
                &format!("region-lists/{list_id}/species/"),
                RequestOptions::get(),
            )
            .await
    }
}
