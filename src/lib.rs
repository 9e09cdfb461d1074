// Flight search gateway with booking-intent continuity across login

pub mod airline;
pub mod config;
pub mod credential;
pub mod directory;
pub mod finalizer;
pub mod gateway;
pub mod ledger;
pub mod model;
pub mod orchestrator;
pub mod store;
pub mod upstream;

// Re-export key types for convenience
pub use config::{CredentialConfig, GatewayConfig, LedgerConfig, OfferSourceKind};
pub use credential::{AuthError, Credential, CredentialCache};
pub use directory::{Authenticator, DirectoryError, XmlUserDirectory};
pub use finalizer::{BookingError, BookingFinalizer};
pub use gateway::{FallbackGateway, LiveGateway, OfferGateway, OfferSource, SearchError};
pub use ledger::IntentLedger;
pub use model::{
    Booking, BookingForm, BookingIntent, FlightOffer, SearchCriteria, SearchRequest, SessionId,
};
pub use orchestrator::{BookingOutcome, LoginOutcome, SearchOrchestrator, SearchOutcome};
pub use store::{BookingStore, InMemoryBookingStore};
