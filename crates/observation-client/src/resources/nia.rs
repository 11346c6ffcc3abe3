use crate::client::ObservationClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::transport::MultipartForm;
use crate::types::NiaResponse;

/// Image identification endpoint, outside the v1 API root
const IDENTIFY_ENDPOINT: &str = "/api/identify-proxy/v1/";

/// An image to identify
#[derive(Debug, Clone)]
pub struct IdentifyImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

impl IdentifyImage {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: "image.jpg".to_string(),
            mime: "image/jpeg".to_string(),
        }
    }
}

pub struct Nia<'a> {
    client: &'a ObservationClient,
}

impl<'a> Nia<'a> {
    pub(crate) fn new(client: &'a ObservationClient) -> Self {
        Self { client }
    }

    /// Identify species in one or more images, optionally near a location
    pub async fn identify(
        &self,
        images: Vec<IdentifyImage>,
        location: Option<(f64, f64)>,
    ) -> Result<NiaResponse> {
        let mut form = MultipartForm::new();
        for image in images {
            form = form.file("image", image.bytes, Some(image.file_name), Some(image.mime));
        }
        if let Some((lat, lng)) = location {
            form = form.text("location_coordinates", format!("{lat},{lng}"));
        }

        self.client
            .request_with_optional_auth(IDENTIFY_ENDPOINT, RequestOptions::post().multipart(form))
            .await
    }
}
