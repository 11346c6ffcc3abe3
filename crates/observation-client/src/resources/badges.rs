use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::types::Paginated;

pub struct Badges<'a> {
    client: &'a ObservationClient,
}

impl<'a> Badges<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Paginated<Value>> {
        self.client
            .request_cached_when_public("badges/", RequestOptions::get())
            .await
    }

    pub async fn get(&self, id: u64) -> Result<Value> {
        self.client
            .request_cached_when_public(&format!("badges/{id}"), RequestOptions::get())
            .await
    }

    /// Badges earned with a given observation
    pub async fn for_observation(&self, observation_id: u64) -> Result<Paginated<Value>> {
        self.client
            .request(
                &format!("badges/observation/{observation_id}/"),
                RequestOptions::get(),
            )
            .await
    }

    pub async fn mark_all_as_seen(&self) -> Result<Value> {
        self.client
            .request("badges/user-badge/seen/", RequestOptions::post())
            .await
    }

    pub async fn last_seen(&self, user_badge_id: u64) -> Result<Value> {
        self.client
            .request(
                &format!("badges/user-badge/{user_badge_id}/seen/"),
                RequestOptions::get(),
            )
            .await
    }

    pub async fn mark_as_seen(&self, user_badge_id: u64) -> Result<Value> {
        self.client
            .request(
                &format!("badges/user-badge/{user_badge_id}/seen/"),
                RequestOptions::post(),
            )
            .await
    }

    pub async fn season_last_seen(&self, user_season_badge_id: u64) -> Result<Value> {
        self.client
            .request(
                &format!("badges/user-season-badge/{user_season_badge_id}/seen/"),
                RequestOptions::get(),
            )
            .await
    }

    pub async fn mark_season_as_seen(&self, user_season_badge_id: u64) -> Result<Value> {
        self.client
            .request(
                &format!("badges/user-season-badge/{user_season_badge_id}/seen/"),
                RequestOptions::post(),
            )
            .await
    }
}
