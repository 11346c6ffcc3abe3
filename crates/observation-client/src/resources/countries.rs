use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::types::{Country, Paginated};

pub struct Countries<'a> {
    client: &'a ObservationClient,
}

impl<'a> Countries<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    /// All countries, named in the client's current language. Public and cached.
    pub async fn list(&self) -> Result<Paginated<Country>> {
        self.client
            .public_request("countries/", RequestOptions::get().cached())
            .await
    }
}
