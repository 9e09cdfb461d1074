// Booking finalizer: turns a drained intent or an authenticated booking form
// into exactly one persisted Booking record.

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{normalize_code, Booking, BookingIntent};
use crate::store::BookingStore;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("failed to persist booking: {0}")]
    Persistence(#[source] anyhow::Error),
}

impl BookingError {
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(message) => message.clone(),
            BookingError::Persistence(_) => {
                "Your booking could not be completed. Please try again.".to_string()
            }
        }
    }
}

pub struct BookingFinalizer {
    store: Arc<dyn BookingStore>,
}

impl BookingFinalizer {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub async fn finalize(&self, intent: BookingIntent, owner: &str) -> Result<Booking, BookingError> {
        self.finalize_on(intent, owner, Local::now().date_naive()).await
    }

    pub async fn finalize_on(
        &self,
        intent: BookingIntent,
        owner: &str,
        today: NaiveDate,
    ) -> Result<Booking, BookingError> {
        let booking = build_booking(intent, owner, today)?;

        let saved = self.store.save(booking).await.map_err(|e| {
            warn!(owner, error = %e, "booking store rejected booking");
            BookingError::Persistence(e)
        })?;

        info!(
            owner,
            id = ?saved.id,
            airline = %saved.airline,
            total = saved.total_price,
            "booking recorded"
        );
        Ok(saved)
    }

    pub async fn bookings_for(&self, owner: &str) -> Result<Vec<Booking>, BookingError> {
        self.store
            .find_by_owner(owner)
            .await
            .map_err(BookingError::Persistence)
    }
}

// Price and seat checks shared by immediate and deferred bookings.
// Returns the seat count to book.
pub fn check_terms(unit_price: f64, passengers: Option<u32>) -> Result<u32, BookingError> {
    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(BookingError::Validation(
            "Price must be a non-negative amount.".to_string(),
        ));
    }

    // Intents captured before passenger counts existed book a single seat
    let passengers = passengers.unwrap_or(1);
    if passengers < 1 {
        return Err(BookingError::Validation(
            "Passengers must be at least 1.".to_string(),
        ));
    }

    Ok(passengers)
}

fn build_booking(intent: BookingIntent, owner: &str, today: NaiveDate) -> Result<Booking, BookingError> {
    let passengers = check_terms(intent.unit_price, intent.passengers)?;

    Ok(Booking {
        id: None,
        owner: owner.to_string(),
        airline: intent.airline,
        origin: normalize_code(&intent.origin),
        destination: normalize_code(&intent.destination),
        departure_time: intent.departure_time,
        arrival_time: intent.arrival_time,
        passengers,
        total_price: total_price(intent.unit_price, passengers),
        created_on: today,
    })
}

// Unit price times seats, rounded to cents
pub fn total_price(unit_price: f64, passengers: u32) -> f64 {
    (unit_price * f64::from(passengers) * 100.0).round() / 100.0
}
