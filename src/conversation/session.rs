use super::state::ConversationState;
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct Session {
    state: ConversationState,
    last_active: Instant,
}

/// Per-user conversation state, kept in memory only.
///
/// A session idle for longer than `ttl` counts as absent and is dropped the
/// next time it is looked up or the store is purged.
pub struct SessionStore {
    sessions: HashMap<u64, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Creates or resets the user's session at `waiting_age`.
    pub fn start(&mut self, user_id: u64, now: Instant) -> &mut ConversationState {
        let session = self.sessions.entry(user_id).or_insert_with(|| Session {
            state: ConversationState::WaitingAge,
            last_active: now,
        });
        session.state = ConversationState::WaitingAge;
        session.last_active = now;
        &mut session.state
    }

    pub fn get_mut(&mut self, user_id: u64, now: Instant) -> Option<&mut ConversationState> {
        let expired = self
            .sessions
            .get(&user_id)
            .is_some_and(|s| now.saturating_duration_since(s.last_active) > self.ttl);
        if expired {
            self.sessions.remove(&user_id);
            return None;
        }

        let session = self.sessions.get_mut(&user_id)?;
        session.last_active = now;
        Some(&mut session.state)
    }

    /// Drops every idle session and returns how many were removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions
            .retain(|_, s| now.saturating_duration_since(s.last_active) <= ttl);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn start_resets_existing_session() {
        let mut store = SessionStore::new(TTL);
        let now = Instant::now();

        *store.start(7, now) = ConversationState::WaitingGender { age: 30 };
        assert_eq!(*store.start(7, now), ConversationState::WaitingAge);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_user_has_no_session() {
        let mut store = SessionStore::new(TTL);
        assert!(store.get_mut(1, Instant::now()).is_none());
    }

    #[test]
    fn idle_session_expires_on_lookup() {
        let mut store = SessionStore::new(TTL);
        let start = Instant::now();
        store.start(7, start);

        assert!(store.get_mut(7, start + Duration::from_secs(30)).is_some());
        // activity at +30s pushed the deadline out
        assert!(store.get_mut(7, start + Duration::from_secs(80)).is_some());
        assert!(store.get_mut(7, start + Duration::from_secs(200)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn purge_drops_only_idle_sessions() {
        let mut store = SessionStore::new(TTL);
        let start = Instant::now();
        store.start(1, start);
        store.start(2, start + Duration::from_secs(50));

        assert_eq!(store.purge_expired(start + Duration::from_secs(90)), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get_mut(2, start + Duration::from_secs(90)).is_some());
    }
}
