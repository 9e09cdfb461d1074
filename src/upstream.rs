// Data structures for the upstream flight-offers API JSON documents

use serde::{Deserialize, Serialize};

// Token endpoint response. Fields are optional so a body missing the token
// is reported as such rather than as a decode failure.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

// Form body of the client-credentials grant
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    pub grant_type: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

// Top-level search response. Offers are kept as raw values so the error
// node and an empty page can be recognised before any offer is decoded.
#[derive(Debug, Deserialize)]
pub struct OfferPage {
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub errors: Option<Vec<UpstreamIssue>>,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamIssue {
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawOffer {
    pub itineraries: Vec<RawItinerary>,
    pub price: RawPrice,
}

#[derive(Debug, Deserialize)]
pub struct RawItinerary {
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSegment {
    pub carrier_code: String,
    pub departure: RawEndpoint,
    pub arrival: RawEndpoint,
}

#[derive(Debug, Deserialize)]
pub struct RawEndpoint {
    pub at: String,
}

#[derive(Debug, Deserialize)]
pub struct RawPrice {
    pub total: RawAmount,
}

// Prices arrive as decimal strings, occasionally as bare numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(f64),
}

impl RawAmount {
    pub fn value(&self) -> Option<f64> {
        match self {
            RawAmount::Text(text) => text.trim().parse().ok(),
            RawAmount::Number(number) => Some(*number),
        }
    }
}
