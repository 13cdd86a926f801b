use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Proof that a request was issued; compare it against the sequencer later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    key: String,
    sequence: u64,
}

impl RequestTicket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub const fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Tracks the newest request per logical query so callers can discard stale
/// completions. Nothing is cancelled; superseded work simply finishes unused.
///
/// Keys stay tracked until [`forget`](Self::forget) drops them, so callers
/// that mint keys per symbol or per query should forget them once the result
/// has been delivered.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    state: Mutex<SequencerState>,
}

/// Sequences come from one counter so a forgotten key never reissues a
/// number an outstanding ticket still holds.
#[derive(Debug, Default)]
struct SequencerState {
    issued: u64,
    latest: HashMap<String, u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next ticket for `key`, superseding earlier ones.
    pub fn issue(&self, key: impl Into<String>) -> RequestTicket {
        let key = key.into();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.issued = state.issued.saturating_add(1);
        let sequence = state.issued;
        state.latest.insert(key.clone(), sequence);
        RequestTicket { key, sequence }
    }

    /// True while no newer ticket has been issued for the same key and the
    /// key has not been forgotten.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .get(&ticket.key)
            .is_some_and(|latest| *latest == ticket.sequence)
    }

    /// Stops tracking `key`. Outstanding tickets for it are no longer current.
    pub fn forget(&self, key: &str) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .remove(key);
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older_one() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue("historical:AAPL");
        assert!(sequencer.is_current(&first));

        let second = sequencer.issue("historical:AAPL");
        assert!(!sequencer.is_current(&first));
        assert!(sequencer.is_current(&second));
        assert!(second.sequence() > first.sequence());
    }

    #[test]
    fn keys_are_tracked_independently() {
        let sequencer = RequestSequencer::new();
        let search = sequencer.issue("search");
        let _ = sequencer.issue("historical:TSLA");
        assert!(sequencer.is_current(&search));
        assert_eq!(search.key(), "search");
    }

    #[test]
    fn forgotten_keys_release_their_entry() {
        let sequencer = RequestSequencer::new();
        for symbol in ["AAPL", "MSFT", "TSLA"] {
            let ticket = sequencer.issue(format!("historical:{symbol}"));
            assert!(sequencer.is_current(&ticket));
            sequencer.forget(ticket.key());
            assert!(!sequencer.is_current(&ticket));
        }
        assert_eq!(sequencer.tracked_keys(), 0);
    }

    #[test]
    fn reissuing_a_forgotten_key_does_not_revive_old_tickets() {
        let sequencer = RequestSequencer::new();
        let stale = sequencer.issue("search");
        sequencer.forget("search");

        let fresh = sequencer.issue("search");
        assert!(!sequencer.is_current(&stale));
        assert!(sequencer.is_current(&fresh));
        assert_ne!(stale.sequence(), fresh.sequence());
    }
}
