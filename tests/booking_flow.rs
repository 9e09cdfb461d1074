// End-to-end search and booking flows against a mocked upstream

use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flight_gateway::{
    BookingForm, BookingOutcome, CredentialConfig, GatewayConfig, InMemoryBookingStore,
    LedgerConfig, LoginOutcome, OfferSourceKind, SearchError, SearchOrchestrator, SearchOutcome,
    SearchRequest, SessionId, XmlUserDirectory,
};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const OFFERS_PATH: &str = "/v2/shopping/flight-offers";
const USERS_XML: &str = r#"
<users>
  <user><username>alice</username><password>wonderland</password></user>
  <user><username>bob</username><password>builder</password></user>
</users>
"#;

// ── Helpers ─────────────────────────────────────────────────────────

fn travel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
}

fn live_config(server: &MockServer) -> GatewayConfig {
    GatewayConfig {
        api_url: format!("{}{}", server.uri(), OFFERS_PATH),
        max_results: 10,
        timeout_ms: Some(5_000),
        source: OfferSourceKind::Live,
        credentials: CredentialConfig {
            token_url: format!("{}{}", server.uri(), TOKEN_PATH),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            ..CredentialConfig::default()
        },
    }
}

async fn setup() -> (MockServer, SearchOrchestrator, Arc<InMemoryBookingStore>) {
    let server = MockServer::start().await;
    let store = Arc::new(InMemoryBookingStore::new());
    let orchestrator = SearchOrchestrator::from_config(
        &live_config(&server),
        &LedgerConfig::default(),
        store.clone(),
        Arc::new(XmlUserDirectory::from_xml(USERS_XML).unwrap()),
    )
    .unwrap();
    (server, orchestrator, store)
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "tok", "expires_in": 1799 })),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_offers(server: &MockServer, body: serde_json::Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(OFFERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn request(origin: &str, destination: &str) -> SearchRequest {
    SearchRequest {
        origin: origin.to_string(),
        destination: destination.to_string(),
        date: travel_date(),
        passengers: 2,
    }
}

fn ua_offer() -> serde_json::Value {
    json!({
        "itineraries": [{ "segments": [{
            "carrierCode": "UA",
            "departure": { "at": "2025-05-05T08:00" },
            "arrival": { "at": "2025-05-05T11:00" }
        }]}],
        "price": { "total": "350.00" }
    })
}

fn booking_form() -> BookingForm {
    BookingForm {
        airline: "UA".to_string(),
        origin: "JFK".to_string(),
        destination: "LAX".to_string(),
        departure_time: "08:00".to_string(),
        arrival_time: "11:00".to_string(),
        price: 299.99,
        passengers: Some(2),
    }
}

// ── Search ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_search_returns_parsed_offer() {
    let (server, orchestrator, _) = setup().await;
    mount_token(&server, 1).await;
    mount_offers(&server, json!({ "data": [ua_offer()] }), 1).await;

    let outcome = orchestrator.search_on(&request("JFK", "LAX"), today()).await.unwrap();

    let offers = outcome.offers();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].airline, "UA");
    assert_eq!(offers[0].airline_name(), "United Airlines");
    assert_eq!(offers[0].price, 350.00);
}

#[tokio::test]
async fn test_repeated_searches_exchange_credential_once() {
    let (server, orchestrator, _) = setup().await;
    mount_token(&server, 1).await;
    mount_offers(&server, json!({ "data": [ua_offer()] }), 3).await;

    for _ in 0..3 {
        orchestrator.search_on(&request("JFK", "LAX"), today()).await.unwrap();
    }
}

#[tokio::test]
async fn test_invalid_codes_make_no_network_call() {
    let (server, orchestrator, _) = setup().await;
    mount_token(&server, 0).await;
    mount_offers(&server, json!({ "data": [ua_offer()] }), 0).await;

    let result = orchestrator.search_on(&request("newyork", "LAX"), today()).await;

    assert!(matches!(result, Err(SearchError::Validation(_))));
}

#[tokio::test]
async fn test_empty_upstream_page_is_empty_result() {
    let (server, orchestrator, _) = setup().await;
    mount_token(&server, 1).await;
    mount_offers(&server, json!({ "data": [] }), 1).await;

    let outcome = orchestrator.search_on(&request("JFK", "LAX"), today()).await.unwrap();

    match outcome {
        SearchOutcome::NoOffers { message } => assert!(message.contains("No flights")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_offer_without_segments_fails_whole_search() {
    let (server, orchestrator, _) = setup().await;
    mount_token(&server, 1).await;
    let broken = json!({ "itineraries": [{}], "price": { "total": "10.00" } });
    mount_offers(&server, json!({ "data": [ua_offer(), broken] }), 1).await;

    let result = orchestrator.search_on(&request("JFK", "LAX"), today()).await;

    assert!(matches!(result, Err(SearchError::Upstream(_))));
}

#[tokio::test]
async fn test_upstream_error_node_is_validation_error() {
    let (server, orchestrator, _) = setup().await;
    mount_token(&server, 1).await;
    mount_offers(
        &server,
        json!({ "errors": [{ "code": 477, "detail": "Invalid departure date" }] }),
        1,
    )
    .await;

    let result = orchestrator.search_on(&request("JFK", "LAX"), today()).await;

    match result {
        Err(error @ SearchError::Validation(_)) => {
            assert_eq!(error.user_message(), "Invalid departure date")
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_credential_exchange_is_auth_error() {
    let (server, orchestrator, _) = setup().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_offers(&server, json!({ "data": [ua_offer()] }), 0).await;

    let result = orchestrator.search_on(&request("JFK", "LAX"), today()).await;

    match result {
        Err(error @ SearchError::Auth(_)) => {
            assert!(error.user_message().contains("unavailable"))
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

// ── Booking continuity ──────────────────────────────────────────────

#[tokio::test]
async fn test_anonymous_booking_resumes_after_login() {
    let (_server, orchestrator, store) = setup().await;
    let session = SessionId::new("session-42");

    let outcome = orchestrator.book(booking_form(), &session, None).await.unwrap();
    assert_eq!(outcome, BookingOutcome::AuthenticationRequired);
    assert!(store.is_empty());

    let login = orchestrator.login(&session, "alice", "wonderland").await.unwrap();
    let booking = match login {
        LoginOutcome::Resumed(booking) => booking,
        other => panic!("unexpected login outcome: {:?}", other),
    };

    assert_eq!(booking.owner, "alice");
    assert_eq!(booking.airline, "UA");
    assert_eq!(booking.origin, "JFK");
    assert_eq!(booking.destination, "LAX");
    assert_eq!(booking.passengers, 2);
    assert_eq!(booking.total_price, 599.98);
    assert_eq!(store.len(), 1);

    // The intent is gone; logging in again records nothing new
    let again = orchestrator.login(&session, "alice", "wonderland").await.unwrap();
    assert_eq!(again, LoginOutcome::Authenticated);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_intent_does_not_follow_logout_to_another_identity() {
    let (_server, orchestrator, store) = setup().await;
    let session = SessionId::new("shared-browser");

    orchestrator.book(booking_form(), &session, None).await.unwrap();
    orchestrator.logout(&session);

    let login = orchestrator.login(&session, "bob", "builder").await.unwrap();

    assert_eq!(login, LoginOutcome::Authenticated);
    assert!(orchestrator.bookings_for("bob").await.unwrap().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_booking_history_per_owner() {
    let (_server, orchestrator, _) = setup().await;

    orchestrator
        .book(booking_form(), &SessionId::new("a"), Some("alice"))
        .await
        .unwrap();
    let mut second = booking_form();
    second.airline = "DL".to_string();
    second.passengers = None;
    orchestrator
        .book(second, &SessionId::new("a"), Some("alice"))
        .await
        .unwrap();

    let history = orchestrator.bookings_for("alice").await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[1].airline, "DL");
    assert_eq!(history[1].total_price, 299.99);
}
