//! Response types shared by the resource modules
//!
//! Only the small, stable payloads are typed here. Larger resources
//! (species, observations, sessions) are returned as `serde_json::Value`.

use serde::{Deserialize, Serialize};

/// A page of results from a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name_en: Option<String>,
    pub name_native: Option<String>,
}

/// Image identification result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NiaResponse {
    pub model_version: String,
    #[serde(default)]
    pub predictions: Vec<NiaPrediction>,
    #[serde(default)]
    pub location_detail: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NiaPrediction {
    pub probability: f64,
    pub taxon: NiaTaxon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NiaTaxon {
    pub id: u64,
    pub name: String,
    pub vernacular_name: Option<String>,
    #[serde(default)]
    pub group: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}
