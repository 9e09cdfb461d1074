// Carrier code -> airline display name

const AIRLINES: &[(&str, &str)] = &[
    ("AA", "American Airlines"),
    ("DL", "Delta Air Lines"),
    ("UA", "United Airlines"),
    ("WN", "Southwest Airlines"),
    ("AS", "Alaska Airlines"),
    ("B6", "JetBlue Airways"),
    ("HA", "Hawaiian Airlines"),
    ("NK", "Spirit Airlines"),
    ("F9", "Frontier Airlines"),
    ("G4", "Allegiant Air"),
    ("OO", "SkyWest Airlines"),
    ("MQ", "Envoy Air"),
    ("9E", "Endeavor Air"),
    ("YX", "Republic Airways"),
    ("YV", "Mesa Airlines"),
    ("PT", "Piedmont Airlines"),
    ("OH", "PSA Airlines"),
    ("QX", "Horizon Air"),
    ("G7", "GoJet Airlines"),
    ("9K", "Cape Air"),
    ("3M", "Silver Airways"),
    ("AC", "Air Canada"),
    ("BA", "British Airways"),
    ("LH", "Lufthansa"),
    ("AF", "Air France"),
    ("QR", "Qatar Airways"),
    ("EK", "Emirates"),
    ("TK", "Turkish Airlines"),
    ("NH", "All Nippon Airways"),
    ("JL", "Japan Airlines"),
    ("KE", "Korean Air"),
    ("QF", "Qantas"),
    ("LA", "LATAM Airlines"),
    ("AV", "Avianca"),
    ("AM", "Aeroméxico"),
    ("IB", "Iberia"),
    ("ET", "Ethiopian Airlines"),
    ("VS", "Virgin Atlantic"),
    ("SQ", "Singapore Airlines"),
    ("LX", "Swiss International Air Lines"),
    ("SK", "Scandinavian Airlines"),
    ("TP", "TAP Air Portugal"),
];

// Unknown codes are returned unchanged
pub fn display_name(code: &str) -> &str {
    AIRLINES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map_or(code, |(_, name)| *name)
}
