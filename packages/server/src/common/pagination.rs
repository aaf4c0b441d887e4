//! Keyset cursor pagination.
//!
//! Lists are ordered by a timestamp with a UUID tie-breaker, so a cursor is the
//! `(timestamp, uuid)` of the last row a caller saw. It is encoded as
//! URL-safe base64 and treated as opaque by callers.
//!
//! ```rust,ignore
//! let page = PageRequest::new(cursor, Some(20)).validate()?;
//! let rows = store.list_edges(user, direction, page.cursor.as_ref(), page.fetch_limit()).await?;
//! let page = Page::from_rows(rows, &page, |row| Cursor::new(row.followed_at, row.account_id.into_uuid()));
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::error::SocialError;

/// Default page size when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: i32 = 25;

/// Largest page a caller can request.
pub const MAX_PAGE_SIZE: i32 = 100;

const CURSOR_LEN: usize = 8 + 16;

// ============================================================================
// Cursor
// ============================================================================

/// Position in a `(timestamp, uuid)` ordered list.
///
/// Timestamps are kept at microsecond precision, matching PostgreSQL
/// `timestamptz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor {
    pub at: DateTime<Utc>,
    pub id: Uuid,
}

impl Cursor {
    pub fn new(at: DateTime<Utc>, id: Uuid) -> Self {
        Cursor { at, id }
    }

    pub fn encode(&self) -> String {
        let mut bytes = Vec::with_capacity(CURSOR_LEN);
        bytes.extend_from_slice(&self.at.timestamp_micros().to_be_bytes());
        bytes.extend_from_slice(self.id.as_bytes());
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn decode(s: &str) -> Result<Self, SocialError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|_| SocialError::invalid("Invalid cursor: not valid base64"))?;
        if bytes.len() != CURSOR_LEN {
            return Err(SocialError::invalid("Invalid cursor: wrong length"));
        }

        let mut micros = [0u8; 8];
        micros.copy_from_slice(&bytes[..8]);
        let at = Utc
            .timestamp_micros(i64::from_be_bytes(micros))
            .single()
            .ok_or_else(|| SocialError::invalid("Invalid cursor: timestamp out of range"))?;
        let id = Uuid::from_slice(&bytes[8..])
            .map_err(|_| SocialError::invalid("Invalid cursor: not a valid UUID"))?;

        Ok(Cursor { at, id })
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Raw pagination input as it arrives from a caller.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub limit: Option<i32>,
}

impl PageRequest {
    pub fn new(cursor: Option<String>, limit: Option<i32>) -> Self {
        PageRequest { cursor, limit }
    }

    pub fn first(limit: i32) -> Self {
        PageRequest {
            cursor: None,
            limit: Some(limit),
        }
    }

    /// Applies the default and bounds (1-100) and decodes the cursor.
    pub fn validate(&self) -> Result<ValidatedPage, SocialError> {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let cursor = self.cursor.as_deref().map(Cursor::decode).transpose()?;

        Ok(ValidatedPage { limit, cursor })
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedPage {
    pub limit: i32,
    pub cursor: Option<Cursor>,
}

impl ValidatedPage {
    /// Rows to fetch: one extra to detect whether another page exists.
    pub fn fetch_limit(&self) -> i64 {
        (self.limit + 1) as i64
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A page of results plus the cursor to resume from, if there is more.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Builds a page from `limit + 1` fetched rows.
    pub fn from_rows(rows: Vec<T>, page: &ValidatedPage, cursor_of: impl Fn(&T) -> Cursor) -> Self {
        let (items, has_more) = trim_results(rows, page.limit);
        let next_cursor = if has_more {
            items.last().map(|last| cursor_of(last).encode())
        } else {
            None
        };
        Page { items, next_cursor }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

/// Trim results to the requested limit and determine if there are more.
///
/// Queries should fetch `limit + 1` rows.
pub fn trim_results<T>(results: Vec<T>, limit: i32) -> (Vec<T>, bool) {
    let has_more = results.len() > limit as usize;
    let results = if has_more {
        results.into_iter().take(limit as usize).collect()
    } else {
        results
    };
    (results, has_more)
}
