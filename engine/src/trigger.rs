//! Proximity trigger.
//!
//! Turns a "near the end of the list" signal into a page request. Suppression
//! is state-based: while the cursor has a fetch in flight, or once it is
//! exhausted, signals are dropped rather than queued or debounced.
//!
//! The trigger also remembers which record it is attached to. When the list
//! grows, the observer has to move to the new last record, detaching from the
//! previous one first.

use crate::{cursor::PageCursor, PageToken, RecordId};

/// A change of the observed boundary element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reattach {
    /// Element the observer must stop watching
    pub detached: Option<RecordId>,
    /// Element the observer must start watching
    pub attached: Option<RecordId>,
}

#[derive(Debug, Clone, Default)]
pub struct ProximityTrigger {
    observed: Option<RecordId>,
    suppressed: u64,
}

impl ProximityTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a boundary-visibility signal.
    ///
    /// Returns the token to fetch when the signal should start a page request.
    pub fn signal(&mut self, near_end: bool, cursor: &mut PageCursor) -> Option<PageToken> {
        if !near_end {
            return None;
        }
        let token = cursor.begin();
        if token.is_none() {
            self.suppressed += 1;
        }
        token
    }

    /// Point the observer at the current last record.
    ///
    /// Returns `None` when already attached to that record.
    pub fn observe(&mut self, last: Option<RecordId>) -> Option<Reattach> {
        if self.observed == last {
            return None;
        }
        let detached = self.observed.take();
        self.observed = last;
        Some(Reattach {
            detached,
            attached: last,
        })
    }

    /// Record currently observed.
    pub fn observed(&self) -> Option<RecordId> {
        self.observed
    }

    /// Signals dropped because a fetch was in flight or the cursor was exhausted.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn far_from_end_does_nothing() {
        let mut trigger = ProximityTrigger::new();
        let mut cursor = PageCursor::new();
        assert_eq!(trigger.signal(false, &mut cursor), None);
        assert!(!cursor.is_in_flight());
        assert_eq!(trigger.suppressed(), 0);
    }

    #[test]
    fn repeated_signals_issue_one_request() {
        let mut trigger = ProximityTrigger::new();
        let mut cursor = PageCursor::new();

        assert_eq!(trigger.signal(true, &mut cursor), Some(1));
        assert_eq!(trigger.signal(true, &mut cursor), None);
        assert_eq!(trigger.signal(true, &mut cursor), None);
        assert_eq!(trigger.suppressed(), 2);

        cursor.complete(1, 4).unwrap();
        assert_eq!(trigger.signal(true, &mut cursor), Some(2));
    }

    #[test]
    fn exhausted_cursor_suppresses() {
        let mut trigger = ProximityTrigger::new();
        let mut cursor = PageCursor::new();
        let token = trigger.signal(true, &mut cursor).unwrap();
        cursor.complete(token, 0).unwrap();

        assert_eq!(trigger.signal(true, &mut cursor), None);
        assert_eq!(trigger.suppressed(), 1);
    }

    #[test]
    fn observe_detaches_previous_element_first() {
        let mut trigger = ProximityTrigger::new();

        assert_eq!(
            trigger.observe(Some(2)),
            Some(Reattach {
                detached: None,
                attached: Some(2)
            })
        );
        assert_eq!(trigger.observe(Some(2)), None);
        assert_eq!(
            trigger.observe(Some(5)),
            Some(Reattach {
                detached: Some(2),
                attached: Some(5)
            })
        );
        assert_eq!(trigger.observed(), Some(5));
    }

    #[test]
    fn observe_empty_list_detaches() {
        let mut trigger = ProximityTrigger::new();
        trigger.observe(Some(1));
        assert_eq!(
            trigger.observe(None),
            Some(Reattach {
                detached: Some(1),
                attached: None
            })
        );
        assert_eq!(trigger.observed(), None);
    }
}
