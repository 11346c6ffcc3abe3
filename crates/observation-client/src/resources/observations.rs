use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::types::Paginated;

pub struct Observations<'a> {
    client: &'a ObservationClient,
}

impl<'a> Observations<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: u64) -> Result<Value> {
        self.client
            .request(&format!("observations/{id}"), RequestOptions::get())
            .await
    }

    pub async fn create(&self, observation: &Value) -> Result<Value> {
        self.client
            .request("observations/create-single/", RequestOptions::post().json(observation)?)
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<Value> {
        self.client
            .request(&format!("observations/{id}/delete/"), RequestOptions::post())
            .await
    }

    pub async fn by_species(
        &self,
        species_id: u64,
        params: &[(&str, &str)],
    ) -> Result<Paginated<Value>> {
        self.client
            .public_request(
                &format!("species/{species_id}/observations/"),
                RequestOptions::get().params(params.iter().copied()),
            )
            .await
    }
}
