//! Page fetch cursor.
//!
//! Tracks which page to request next, whether a request is outstanding and
//! whether the remote collection has been exhausted. The token only advances
//! after a successful non-empty page, so a failed fetch is retried with the
//! same token.

use crate::{error::Result, Error, PageToken};
use serde::{Deserialize, Serialize};

/// First page token handed to the remote.
pub const FIRST_PAGE: PageToken = 1;

/// Pagination progress for one remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    /// Token of the next page to fetch
    next_token: PageToken,
    /// Set permanently once a page comes back empty
    exhausted: bool,
    /// Set while a fetch for `next_token` is outstanding
    in_flight: bool,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCursor {
    pub fn new() -> Self {
        Self {
            next_token: FIRST_PAGE,
            exhausted: false,
            in_flight: false,
        }
    }

    /// Start a fetch.
    ///
    /// Returns the token to request, or `None` if the cursor is exhausted or a
    /// fetch is already in flight.
    pub fn begin(&mut self) -> Option<PageToken> {
        if self.exhausted || self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(self.next_token)
    }

    /// Record a successful fetch of `token` that returned `count` records.
    pub fn complete(&mut self, token: PageToken, count: usize) -> Result<()> {
        self.check_in_flight(token)?;
        self.in_flight = false;
        if count == 0 {
            self.exhausted = true;
        } else {
            self.next_token += 1;
        }
        Ok(())
    }

    /// Record a failed fetch of `token`. The token is not advanced.
    pub fn fail(&mut self, token: PageToken) -> Result<()> {
        self.check_in_flight(token)?;
        self.in_flight = false;
        Ok(())
    }

    pub fn next_token(&self) -> PageToken {
        self.next_token
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    fn check_in_flight(&self, token: PageToken) -> Result<()> {
        if !self.in_flight {
            return Err(Error::NoFetchInFlight);
        }
        if token != self.next_token {
            return Err(Error::PageTokenMismatch {
                expected: self.next_token,
                got: token,
            });
        }
        Ok(())
    }
}
