use serde_json::Value;

use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::transport::MultipartForm;

pub struct Media<'a> {
    client: &'a ObservationClient,
}

impl<'a> Media<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    /// Upload a photo or sound for a later observation. With
    /// `identify = Some(true)` the server also runs image identification.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime: Option<&str>,
        identify: Option<bool>,
    ) -> Result<Value> {
        let form = MultipartForm::new().file(
            "media",
            bytes,
            Some(file_name.to_string()),
            mime.map(str::to_string),
        );

        let mut options = RequestOptions::post().multipart(form);
        if let Some(identify) = identify {
            options = options.param("identify", identify);
        }
        self.client.request("media-upload/", options).await
    }
}
