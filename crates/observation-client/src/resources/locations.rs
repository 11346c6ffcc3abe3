use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::types::Paginated;

pub struct Locations<'a> {
    client: &'a ObservationClient,
}

impl<'a> Locations<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    /// Search by `name`, or by `lat` and `lng`
    pub async fn search(&self, params: &[(&str, &str)]) -> Result<Paginated<Value>> {
        self.client
            .request(
                "locations/",
                RequestOptions::get().params(params.iter().copied()),
            )
            .await
    }

    pub async fn get(&self, id: u64) -> Result<Value> {
        self.client
            .request(&format!("locations/{id}"), RequestOptions::get())
            .await
    }

    pub async fn species_seen(&self, id: u64, params: &[(&str, &str)]) -> Result<Value> {
        self.client
            .request(
                &format!("locations/{id}/species-seen/"),
                RequestOptions::get().params(params.iter().copied()),
            )
            .await
    }

    /// Species seen within `radius` of a point; `lat` and `lng` are required
    pub async fn species_seen_around(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client
            .request(
                "locations/species-seen/",
                RequestOptions::get().params(params.iter().copied()),
            )
            .await
    }

    /// GeoJSON feature collection for a `point` or a location `id`
    pub async fn geojson(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client
            .public_request(
                "locations/geojson/",
                RequestOptions::get().params(params.iter().copied()),
            )
            .await
    }
}
