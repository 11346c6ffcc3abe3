//! Observer groups: membership, invite codes and group challenges

use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::transport::MultipartForm;
use crate::types::Paginated;

const PHOTO_FILE_NAME: &str = "photo";

pub struct Groups<'a> {
    client: &'a ObservationClient,
}

impl<'a> Groups<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    /// Groups the authenticated user belongs to
    pub async fn list(&self) -> Result<Paginated<Value>> {
        self.client.request("user/groups/", RequestOptions::get()).await
    }

    pub async fn get(&self, group_id: u64) -> Result<Value> {
        self.client
            .request(&format!("groups/{group_id}"), RequestOptions::get())
            .await
    }

    /// Public summary reachable with an invite code
    pub async fn summary(&self, group_id: u64, invite_code: &str) -> Result<Value> {
        self.client
            .public_request(
                &format!(
                    "groups/{group_id}/summary/{}/",
                    urlencoding::encode(invite_code)
                ),
                RequestOptions::get(),
            )
            .await
    }

    pub async fn create(&self, name: &str, photo: Vec<u8>) -> Result<Value> {
        let form = MultipartForm::new()
            .text("name", name)
            .file("photo", photo, Some(PHOTO_FILE_NAME.to_string()), None);
        self.client
            .request("groups/create/", RequestOptions::post().multipart(form))
            .await
    }

    /// Change the name and/or photo; fields left `None` are not sent
    pub async fn update(
        &self,
        group_id: u64,
        name: Option<&str>,
        photo: Option<Vec<u8>>,
    ) -> Result<Value> {
        let mut form = MultipartForm::new();
        if let Some(name) = name {
            form = form.text("name", name);
        }
        if let Some(photo) = photo {
            form = form.file("photo", photo, Some(PHOTO_FILE_NAME.to_string()), None);
        }
        self.client
            .request(
                &format!("groups/{group_id}"),
                RequestOptions::patch().multipart(form),
            )
            .await
    }

    pub async fn delete(&self, group_id: u64) -> Result<Value> {
        self.client
            .request(&format!("groups/{group_id}"), RequestOptions::delete())
            .await
    }

    pub async fn renew_invite_code(&self, group_id: u64) -> Result<Value> {
        self.client
            .request(
                &format!("groups/{group_id}/renew-invite-code/"),
                RequestOptions::post(),
            )
            .await
    }

    pub async fn join(&self, group_id: u64, invite_code: &str) -> Result<Value> {
        self.client
            .request(
                &format!(
                    "groups/{group_id}/join/{}/",
                    urlencoding::encode(invite_code)
                ),
                RequestOptions::post(),
            )
            .await
    }

    pub async fn leave(&self, group_id: u64) -> Result<Value> {
        self.client
            .request(&format!("groups/{group_id}/leave/"), RequestOptions::post())
            .await
    }

    pub async fn remove_member(&self, group_id: u64, member_id: u64) -> Result<Value> {
        self.client
            .request(
                &format!("groups/{group_id}/members/{member_id}/"),
                RequestOptions::delete(),
            )
            .await
    }

    pub async fn challenge_templates(&self) -> Result<Paginated<Value>> {
        self.client
            .request("groups/challenge-templates/", RequestOptions::get())
            .await
    }

    pub async fn challenges(&self, group_id: u64) -> Result<Paginated<Value>> {
        self.client
            .request(&format!("groups/{group_id}/challenges/"), RequestOptions::get())
            .await
    }

    /// `challenge` holds `template`, `start_date_time` and `end_date_time`
    pub async fn create_challenge(&self, group_id: u64, challenge: &Value) -> Result<Value> {
        self.client
            .request(
                &format!("groups/{group_id}/challenges/"),
                RequestOptions::post().json(challenge)?,
            )
            .await
    }

    pub async fn update_challenge(
        &self,
        group_id: u64,
        challenge_id: u64,
        changes: &Value,
    ) -> Result<Value> {
        self.client
            .request(
                &format!("groups/{group_id}/challenges/{challenge_id}/"),
                RequestOptions::patch().json(changes)?,
            )
            .await
    }

    pub async fn delete_challenge(&self, group_id: u64, challenge_id: u64) -> Result<Value> {
        self.client
            .request(
                &format!("groups/{group_id}/challenges/{challenge_id}/"),
                RequestOptions::delete(),
            )
            .await
    }

    pub async fn observations(&self, group_id: u64) -> Result<Paginated<Value>> {
        self.client
            .request(
                &format!("groups/{group_id}/observations/"),
                RequestOptions::get(),
            )
            .await
    }
}
