// Search orchestrator
// Request-facing entry point. Searches go through the configured offer
// source; bookings from anonymous sessions are parked in the intent ledger
// and finalized on the session's next successful login.
//
// Booking path per session:
//   Anonymous --book--> IntentCaptured --login--> Resumed --finalize--> Recorded
//   Authenticated --book--> Recorded

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{GatewayConfig, LedgerConfig};
use crate::directory::Authenticator;
use crate::finalizer::{check_terms, BookingError, BookingFinalizer};
use crate::gateway::{OfferSource, SearchError};
use crate::ledger::IntentLedger;
use crate::model::{Booking, BookingForm, BookingIntent, FlightOffer, SearchCriteria, SearchRequest, SessionId};
use crate::store::BookingStore;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Offers(Vec<FlightOffer>),
    // Upstream had nothing for the route/date; not a fault
    NoOffers { message: String },
}

impl SearchOutcome {
    pub fn offers(&self) -> &[FlightOffer] {
        match self {
            SearchOutcome::Offers(offers) => offers,
            SearchOutcome::NoOffers { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    // Intent captured; the session must log in to continue
    AuthenticationRequired,
    Recorded { booking: Booking, resumed: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    InvalidCredentials,
    Authenticated,
    // Login completed a booking started before authentication
    Resumed(Booking),
}

pub struct SearchOrchestrator {
    source: OfferSource,
    ledger: IntentLedger,
    finalizer: BookingFinalizer,
    authenticator: Arc<dyn Authenticator>,
}

impl SearchOrchestrator {
    pub fn new(
        source: OfferSource,
        ledger: IntentLedger,
        store: Arc<dyn BookingStore>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            source,
            ledger,
            finalizer: BookingFinalizer::new(store),
            authenticator,
        }
    }

    pub fn from_config(
        gateway: &GatewayConfig,
        ledger: &LedgerConfig,
        store: Arc<dyn BookingStore>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            OfferSource::from_config(gateway)?,
            IntentLedger::new(ledger),
            store,
            authenticator,
        ))
    }

    pub fn ledger(&self) -> &IntentLedger {
        &self.ledger
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        self.search_on(request, Local::now().date_naive()).await
    }

    pub async fn search_on(
        &self,
        request: &SearchRequest,
        today: NaiveDate,
    ) -> Result<SearchOutcome, SearchError> {
        let criteria = SearchCriteria::from_request(request, today)?;

        match self.source.search(&criteria).await {
            Ok(offers) => Ok(SearchOutcome::Offers(offers)),
            Err(SearchError::NotFound) => {
                info!(
                    origin = criteria.origin(),
                    destination = criteria.destination(),
                    "no offers for route"
                );
                Ok(SearchOutcome::NoOffers {
                    message: SearchError::NotFound.user_message(),
                })
            }
            Err(e) => {
                warn!(error = %e, "flight search failed");
                Err(e)
            }
        }
    }

    // `identity` is the authenticated owner of the session, if any
    pub async fn book(
        &self,
        form: BookingForm,
        session: &SessionId,
        identity: Option<&str>,
    ) -> Result<BookingOutcome, BookingError> {
        let owner = match identity {
            Some(owner) => owner,
            None => {
                // A form that could never be finalized is not worth parking
                check_terms(form.price, form.passengers)?;
                self.ledger.capture(session, &form);
                return Ok(BookingOutcome::AuthenticationRequired);
            }
        };

        // A pending intent from before login takes precedence over the form
        let (intent, resumed) = match self.ledger.drain(session) {
            Some(intent) => (intent, true),
            None => (BookingIntent::from(form), false),
        };

        let booking = self.finalizer.finalize(intent, owner).await?;
        Ok(BookingOutcome::Recorded { booking, resumed })
    }

    // Verify credentials; on success resume any booking the session started
    // while anonymous.
    pub async fn login(
        &self,
        session: &SessionId,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, BookingError> {
        if !self.authenticator.verify(username, password).await {
            info!(session = %session, "login rejected");
            return Ok(LoginOutcome::InvalidCredentials);
        }

        match self.resume(session, username).await? {
            Some(booking) => Ok(LoginOutcome::Resumed(booking)),
            None => Ok(LoginOutcome::Authenticated),
        }
    }

    // Finalize the session's pending intent for the owner who just authenticated
    pub async fn resume(&self, session: &SessionId, owner: &str) -> Result<Option<Booking>, BookingError> {
        let Some(intent) = self.ledger.drain(session) else {
            return Ok(None);
        };

        info!(session = %session, owner, "resuming booking after authentication");
        self.finalizer.finalize(intent, owner).await.map(Some)
    }

    // Session is being invalidated; nothing it captured may reach the next identity
    pub fn logout(&self, session: &SessionId) {
        self.ledger.discard(session);
        info!(session = %session, "session logged out");
    }

    pub async fn bookings_for(&self, owner: &str) -> Result<Vec<Booking>, BookingError> {
        self.finalizer.bookings_for(owner).await
    }
}
