use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::types::Paginated;

pub struct Exports<'a> {
    client: &'a ObservationClient,
}

impl<'a> Exports<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Paginated<Value>> {
        self.client.request("exports/", RequestOptions::get()).await
    }

    pub async fn get(&self, export_id: u64) -> Result<Value> {
        self.client
            .request(&format!("exports/{export_id}"), RequestOptions::get())
            .await
    }

    /// Start an export job; poll [`Exports::get`] for its status
    pub async fn start(&self, options: &Value) -> Result<Value> {
        self.client
            .request("exports/", RequestOptions::post().json(options)?)
            .await
    }
}
