use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::types::{Language, Paginated};

pub struct Languages<'a> {
    client: &'a ObservationClient,
}

impl<'a> Languages<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    /// Languages supported by the API
    pub async fn list(&self) -> Result<Paginated<Language>> {
        self.client
            .public_request("languages/", RequestOptions::get().cached())
            .await
    }
}
