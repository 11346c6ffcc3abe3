use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::types::Paginated;

/// What a challenge ranking is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingBy {
    Species,
    Observations,
}

impl RankingBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Species => "species",
            Self::Observations => "observations",
        }
    }
}

pub struct Challenges<'a> {
    client: &'a ObservationClient,
}

impl<'a> Challenges<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &[(&str, &str)]) -> Result<Paginated<Value>> {
        self.client
            .request_cached_when_public(
                "challenges/",
                RequestOptions::get().params(params.iter().copied()),
            )
            .await
    }

    pub async fn get(&self, id: u64) -> Result<Value> {
        self.client
            .request_cached_when_public(&format!("challenges/{id}"), RequestOptions::get())
            .await
    }

    pub async fn ranking(&self, id: u64, by: RankingBy) -> Result<Value> {
        self.client
            .request_cached_when_public(
                &format!("challenges/{id}/ranking/{}", by.as_str()),
                RequestOptions::get(),
            )
            .await
    }

    pub async fn for_observation(&self, observation_id: u64) -> Result<Paginated<Value>> {
        self.client
            .request(
                &format!("challenges/observation/{observation_id}"),
                RequestOptions::get(),
            )
            .await
    }

    /// Subscribe to or unsubscribe from a challenge
    pub async fn subscribe(&self, id: u64, subscribed: bool) -> Result<Value> {
        self.client
            .request(
                &format!("challenges/{id}/subscribe"),
                RequestOptions::post().form([("is_subscribed", subscribed)]),
            )
            .await
    }

    pub async fn mark_content_as_seen(&self, content_id: u64) -> Result<Value> {
        self.client
            .request(
                &format!("challenges/content/{content_id}/seen"),
                RequestOptions::post(),
            )
            .await
    }
}
