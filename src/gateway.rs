// Offer gateway: builds the upstream search, issues it with the bearer
// credential and maps the response onto typed offers or a typed failure.
// A malformed offer anywhere in the page rejects the whole page.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{GatewayConfig, OfferSourceKind};
use crate::credential::{AuthError, Credential, CredentialCache};
use crate::model::{FlightOffer, SearchCriteria};
use crate::upstream::{OfferPage, RawOffer};

const UPSTREAM_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

#[derive(Error, Debug)]
pub enum SearchError {
    // Caller-correctable: bad codes, past date, upstream "no route"
    #[error("{0}")]
    Validation(String),

    #[error("upstream authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("no offers for this route/date")]
    NotFound,
}

impl SearchError {
    // Message safe to show the end user
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Validation(message) => message.clone(),
            SearchError::Auth(_) => {
                "The flight search service is currently unavailable.".to_string()
            }
            SearchError::Upstream(_) => {
                "Could not fetch flight data. Please try again later.".to_string()
            }
            SearchError::NotFound => {
                "No flights were found between the selected cities on that date.".to_string()
            }
        }
    }
}

// A source of flight offers for validated criteria
#[async_trait]
pub trait OfferGateway: Send + Sync + 'static {
    async fn fetch(
        &self,
        criteria: &SearchCriteria,
        credential: &Credential,
    ) -> Result<Vec<FlightOffer>, SearchError>;
}

pub struct LiveGateway {
    http: reqwest::Client,
    api_url: String,
    max_results: u32,
}

impl LiveGateway {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>, max_results: u32) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            max_results,
        }
    }

    // Upstream query. Always a single-adult fare: the passenger multiplier
    // is applied to the booking price, never to the search.
    fn query(&self, criteria: &SearchCriteria) -> Vec<(&'static str, String)> {
        vec![
            ("originLocationCode", criteria.origin().to_string()),
            ("destinationLocationCode", criteria.destination().to_string()),
            ("departureDate", criteria.date().format("%Y-%m-%d").to_string()),
            ("adults", "1".to_string()),
            ("max", self.max_results.to_string()),
        ]
    }

    async fn read_body(
        &self,
        criteria: &SearchCriteria,
        credential: &Credential,
    ) -> Result<Bytes, SearchError> {
        let response = self
            .http
            .get(&self.api_url)
            .query(&self.query(criteria))
            .bearer_auth(credential.token())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Upstream(format!("transport failure: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "offer search rejected upstream");
            return Err(SearchError::Upstream(format!(
                "upstream returned status {}",
                status.as_u16()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| SearchError::Upstream(format!("failed to read response body: {}", e)))
    }
}

#[async_trait]
impl OfferGateway for LiveGateway {
    async fn fetch(
        &self,
        criteria: &SearchCriteria,
        credential: &Credential,
    ) -> Result<Vec<FlightOffer>, SearchError> {
        criteria.check_codes()?;

        info!(
            origin = criteria.origin(),
            destination = criteria.destination(),
            date = %criteria.date(),
            "searching upstream offers"
        );
        let body = self.read_body(criteria, credential).await?;
        let offers = parse_offers(&body, criteria)?;

        debug!(offers = offers.len(), "upstream offers parsed");
        Ok(offers)
    }
}

// Map an upstream search body onto offers for the given criteria
pub fn parse_offers(body: &[u8], criteria: &SearchCriteria) -> Result<Vec<FlightOffer>, SearchError> {
    let page: OfferPage = serde_json::from_slice(body)
        .map_err(|e| SearchError::Upstream(format!("malformed response: {}", e)))?;

    if let Some(errors) = page.errors {
        // An error node with no entries carries nothing to show the caller
        let Some(issue) = errors.into_iter().next() else {
            return Err(SearchError::Upstream(
                "malformed response: empty errors node".to_string(),
            ));
        };
        let message = issue
            .detail
            .unwrap_or_else(|| "Invalid request to the flight offers API.".to_string());
        return Err(SearchError::Validation(message));
    }

    let data = match page.data {
        Some(data) if !data.is_empty() => data,
        _ => return Err(SearchError::NotFound),
    };

    data.into_iter()
        .enumerate()
        .map(|(index, value)| {
            let raw: RawOffer = serde_json::from_value(value).map_err(|e| {
                SearchError::Upstream(format!("malformed response: offer {}: {}", index, e))
            })?;
            to_offer(raw, criteria)
                .map_err(|reason| SearchError::Upstream(format!("malformed response: offer {}: {}", index, reason)))
        })
        .collect()
}

fn to_offer(raw: RawOffer, criteria: &SearchCriteria) -> Result<FlightOffer, String> {
    let price = raw
        .price
        .total
        .value()
        .filter(|price| price.is_finite() && *price >= 0.0)
        .ok_or("price.total is not a non-negative amount")?;

    let segment = raw
        .itineraries
        .into_iter()
        .next()
        .ok_or("no itineraries")?
        .segments
        .into_iter()
        .next()
        .ok_or("no segments")?;

    if segment.carrier_code.trim().is_empty() {
        return Err("empty carrierCode".to_string());
    }

    Ok(FlightOffer {
        airline: segment.carrier_code,
        origin: criteria.origin().to_string(),
        destination: criteria.destination().to_string(),
        departure_time: parse_timestamp(&segment.departure.at)?,
        arrival_time: parse_timestamp(&segment.arrival.at)?,
        price,
    })
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    UPSTREAM_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| format!("unparseable timestamp {:?}", value))
}

// Deterministic local result used when the live upstream is not configured
#[derive(Debug, Default)]
pub struct FallbackGateway;

impl FallbackGateway {
    pub const AIRLINE: &'static str = "Fallback Airlines";
    pub const PRICE: f64 = 299.99;

    pub fn offers(&self, criteria: &SearchCriteria) -> Vec<FlightOffer> {
        let date = criteria.date();
        match (date.and_hms_opt(10, 0, 0), date.and_hms_opt(13, 0, 0)) {
            (Some(departure_time), Some(arrival_time)) => vec![FlightOffer {
                airline: Self::AIRLINE.to_string(),
                origin: criteria.origin().to_string(),
                destination: criteria.destination().to_string(),
                departure_time,
                arrival_time,
                price: Self::PRICE,
            }],
            _ => Vec::new(),
        }
    }
}

// Search strategy selected by configuration
pub enum OfferSource {
    Live {
        credentials: CredentialCache,
        gateway: LiveGateway,
    },
    Fallback(FallbackGateway),
}

impl OfferSource {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        match config.source {
            OfferSourceKind::Fallback => Ok(OfferSource::Fallback(FallbackGateway)),
            OfferSourceKind::Live => {
                let http = config.build_http_client()?;
                Ok(OfferSource::Live {
                    credentials: CredentialCache::new(http.clone(), config.credentials.clone()),
                    gateway: LiveGateway::new(http, config.api_url.clone(), config.max_results),
                })
            }
        }
    }

    pub fn kind(&self) -> OfferSourceKind {
        match self {
            OfferSource::Live { .. } => OfferSourceKind::Live,
            OfferSource::Fallback(_) => OfferSourceKind::Fallback,
        }
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<FlightOffer>, SearchError> {
        // Reject bad codes before the credential exchange touches the network
        criteria.check_codes()?;

        match self {
            OfferSource::Live {
                credentials,
                gateway,
            } => {
                let credential = credentials.token().await?;
                gateway.fetch(criteria, &credential).await
            }
            OfferSource::Fallback(fallback) => Ok(fallback.offers(criteria)),
        }
    }
}
