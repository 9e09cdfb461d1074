// Intent ledger
// Keeps at most one pending booking intent per session until the session
// authenticates. Capture is last-write-wins; drain removes and returns the
// intent atomically, so an intent is handed out at most once.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::model::{BookingForm, BookingIntent, SessionId};

struct PendingIntent {
    intent: BookingIntent,
    captured_at: Instant,
}

impl PendingIntent {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.captured_at.elapsed() >= ttl
    }
}

pub struct IntentLedger {
    intents: DashMap<SessionId, PendingIntent>,
    ttl: Duration,
}

impl IntentLedger {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            intents: DashMap::new(),
            ttl: config.intent_ttl(),
        }
    }

    // Record the session's booking attempt, replacing any earlier one.
    // Returns true when a previous intent was overwritten.
    pub fn capture(&self, session: &SessionId, form: &BookingForm) -> bool {
        let pending = PendingIntent {
            intent: BookingIntent::from(form.clone()),
            captured_at: Instant::now(),
        };
        let replaced = self.intents.insert(session.clone(), pending).is_some();

        info!(session = %session, replaced, "booking intent captured");
        replaced
    }

    // Remove and return the session's intent. Intents from expired sessions
    // are dropped instead of returned.
    pub fn drain(&self, session: &SessionId) -> Option<BookingIntent> {
        let (_, pending) = self.intents.remove(session)?;

        if pending.is_expired(self.ttl) {
            info!(session = %session, "discarding expired booking intent");
            return None;
        }

        debug!(session = %session, "booking intent drained");
        Some(pending.intent)
    }

    // Forget the session's intent (logout or session invalidation)
    pub fn discard(&self, session: &SessionId) -> bool {
        let removed = self.intents.remove(session).is_some();
        if removed {
            debug!(session = %session, "booking intent discarded");
        }
        removed
    }

    pub fn contains(&self, session: &SessionId) -> bool {
        self.intents
            .get(session)
            .map_or(false, |pending| !pending.is_expired(self.ttl))
    }

    // Drop every intent whose session has outlived the TTL
    pub fn purge_expired(&self) -> usize {
        let before = self.intents.len();
        let ttl = self.ttl;
        self.intents.retain(|_, pending| !pending.is_expired(ttl));
        let purged = before.saturating_sub(self.intents.len());

        if purged > 0 {
            info!(purged, "expired booking intents purged");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

impl Default for IntentLedger {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}
