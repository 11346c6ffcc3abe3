use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;

pub struct Lookups<'a> {
    client: &'a ObservationClient,
}

impl<'a> Lookups<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    /// Static lookup tables (rarity, activity, life stage, ...)
    pub async fn get(&self) -> Result<Value> {
        self.client
            .public_request("lookups/", RequestOptions::get().cached())
            .await
    }
}
