// Domain types shared by the search and booking paths

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::airline;
use crate::gateway::SearchError;

// Display format for offer times copied into booking forms
pub const OFFER_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Raw inbound search form
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub passengers: u32,
}

// Validated search criteria; immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    origin: String,
    destination: String,
    date: NaiveDate,
    passengers: u32,
}

impl SearchCriteria {
    // Codes are trimmed and uppercased here; their IATA shape is checked by the gateway.
    pub fn from_request(request: &SearchRequest, today: NaiveDate) -> Result<Self, SearchError> {
        if request.date < today {
            return Err(SearchError::Validation(
                "Travel date cannot be in the past.".to_string(),
            ));
        }
        if request.passengers < 1 {
            return Err(SearchError::Validation(
                "Passengers must be at least 1.".to_string(),
            ));
        }

        Ok(Self {
            origin: normalize_code(&request.origin),
            destination: normalize_code(&request.destination),
            date: request.date,
            passengers: request.passengers,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn passengers(&self) -> u32 {
        self.passengers
    }

    // Both codes must be exactly three uppercase ASCII letters
    pub fn check_codes(&self) -> Result<(), SearchError> {
        if is_iata_code(&self.origin) && is_iata_code(&self.destination) {
            Ok(())
        } else {
            Err(SearchError::Validation(
                "Please enter valid 3-letter airport codes (e.g., JFK, LAX).".to_string(),
            ))
        }
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn is_iata_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightOffer {
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub price: f64,
}

impl FlightOffer {
    pub fn airline_name(&self) -> &str {
        airline::display_name(&self.airline)
    }
}

// Inbound booking form. `passengers` is optional so that forms posted before
// the passenger field existed still bind.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingForm {
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub price: f64,
    #[serde(default)]
    pub passengers: Option<u32>,
}

impl BookingForm {
    pub fn from_offer(offer: &FlightOffer, passengers: u32) -> Self {
        Self {
            airline: offer.airline.clone(),
            origin: offer.origin.clone(),
            destination: offer.destination.clone(),
            departure_time: offer.departure_time.format(OFFER_TIME_FORMAT).to_string(),
            arrival_time: offer.arrival_time.format(OFFER_TIME_FORMAT).to_string(),
            price: offer.price,
            passengers: Some(passengers),
        }
    }
}

// Snapshot of a booking attempt made before login
#[derive(Debug, Clone, PartialEq)]
pub struct BookingIntent {
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub unit_price: f64,
    pub passengers: Option<u32>,
}

impl From<BookingForm> for BookingIntent {
    fn from(form: BookingForm) -> Self {
        Self {
            airline: form.airline,
            origin: form.origin,
            destination: form.destination,
            departure_time: form.departure_time,
            arrival_time: form.arrival_time,
            unit_price: form.price,
            passengers: form.passengers,
        }
    }
}

// Finalized booking record. `id` is assigned by the store on save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub id: Option<u64>,
    pub owner: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub passengers: u32,
    pub total_price: f64,
    pub created_on: NaiveDate,
}
