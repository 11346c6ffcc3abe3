use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;

const CREATE_OR_UPDATE: &str = "transects/create-or-update/";

pub struct Transects<'a> {
    client: &'a ObservationClient,
}

impl<'a> Transects<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, transect: &Value) -> Result<Value> {
        self.client
            .request(CREATE_OR_UPDATE, RequestOptions::post().json(transect)?)
            .await
    }

    /// `transect` must carry the id of the transect being updated
    pub async fn update(&self, transect: &Value) -> Result<Value> {
        self.client
            .request(CREATE_OR_UPDATE, RequestOptions::put().json(transect)?)
            .await
    }
}
