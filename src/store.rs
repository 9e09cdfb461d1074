// Persistence collaborator for finalized bookings

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::model::Booking;

#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    // Persist a booking and return the stored record with its id assigned.
    // Either the whole record is stored or nothing is.
    async fn save(&self, booking: Booking) -> anyhow::Result<Booking>;

    // Bookings owned by the given identity, oldest first
    async fn find_by_owner(&self, owner: &str) -> anyhow::Result<Vec<Booking>>;
}

#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: Mutex<Vec<Booking>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bookings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.lock().is_empty()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn save(&self, mut booking: Booking) -> anyhow::Result<Booking> {
        let mut bookings = self.bookings.lock();
        booking.id = Some(bookings.len() as u64 + 1);
        bookings.push(booking.clone());
        Ok(booking)
    }

    async fn find_by_owner(&self, owner: &str) -> anyhow::Result<Vec<Booking>> {
        Ok(self
            .bookings
            .lock()
            .iter()
            .filter(|booking| booking.owner == owner)
            .cloned()
            .collect())
    }
}
