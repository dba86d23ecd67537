//! Cursor encoding helpers and the pagination planner.

use crate::{
    ast::{PageDirection, Pagination},
    error::TranslationError,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct CursorPayload {
    offset: u64,
}

pub fn decode_cursor(cursor: &str) -> Result<u64, TranslationError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(cursor.trim())
        .map_err(|_| TranslationError::InvalidCursor("cursor is not valid base64".into()))?;
    let payload: CursorPayload = serde_json::from_slice(&bytes)
        .map_err(|_| TranslationError::InvalidCursor("invalid cursor payload".into()))?;
    Ok(payload.offset)
}

pub fn encode_cursor(offset: u64) -> String {
    let payload = CursorPayload { offset };
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PaginationOutcome {
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
    pub limit: Option<u64>,
}

/// Row offset a cursor points at. A cursor only makes sense alongside a limit.
pub fn offset_for(
    pagination: Option<&Pagination>,
    limit: Option<u64>,
) -> Result<u64, TranslationError> {
    let Some(pagination) = pagination else {
        return Ok(0);
    };
    if limit.is_none() {
        return Err(TranslationError::InvalidCursor(
            "a cursor requires a limit".into(),
        ));
    }
    decode_cursor(&pagination.cursor)
}

/// Decides continuation cursors once the executor knows how many rows came back.
///
/// `next_cursor` is set only when a non-zero limit was applied and the page was
/// full. `prev_cursor` is the caller's own cursor echoed back when it paged
/// backwards; nothing else is ever invented.
pub fn plan(
    pagination: Option<&Pagination>,
    limit: Option<u64>,
    result_count: usize,
) -> Result<PaginationOutcome, TranslationError> {
    let offset = offset_for(pagination, limit)?;

    let next_cursor = match limit {
        Some(limit) if limit > 0 && result_count as u64 >= limit => {
            Some(encode_cursor(offset.saturating_add(limit)))
        }
        _ => None,
    };

    Ok(PaginationOutcome {
        next_cursor,
        prev_cursor: prev_cursor(pagination),
        limit,
    })
}

/// Outcome attached at translation time, before any rows exist.
pub(crate) fn pending(pagination: Option<&Pagination>, limit: Option<u64>) -> PaginationOutcome {
    PaginationOutcome {
        next_cursor: None,
        prev_cursor: prev_cursor(pagination),
        limit,
    }
}

fn prev_cursor(pagination: Option<&Pagination>) -> Option<String> {
    pagination
        .filter(|p| p.direction == PageDirection::Prev)
        .map(|p| p.cursor.clone())
}
