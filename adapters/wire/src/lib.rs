#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! JSON codec for the engine's request/response protocol.
//!
//! The engine sends one snapshot object per tick and expects one batch object
//! back. Batches are encoded as two maps keyed by unit id: `spawn` carries the
//! spawn requests and `actions` carries every other action.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tidebot_core::{Action, ActionBatch, Snapshot, UnitId};

/// Encoded form of a batch with no actions.
pub const EMPTY_BATCH: &str = r#"{"spawn":{},"actions":{}}"#;

/// Failures raised while decoding snapshots or encoding batches.
#[derive(Debug, Error)]
pub enum WireError {
    /// The input line held nothing but whitespace.
    #[error("snapshot input was empty")]
    Empty,
    /// The input was not a valid snapshot object.
    #[error("snapshot input is not a valid snapshot object")]
    InvalidJson(#[source] serde_json::Error),
    /// The batch could not be serialised.
    #[error("failed to encode action batch")]
    Encode(#[source] serde_json::Error),
}

#[derive(Serialize)]
struct WireBatch<'a> {
    spawn: BTreeMap<UnitId, &'a Action>,
    actions: BTreeMap<UnitId, &'a Action>,
}

/// Decodes one snapshot object.
pub fn decode_snapshot(input: &str) -> Result<Snapshot, WireError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(WireError::Empty);
    }

    serde_json::from_str(trimmed).map_err(WireError::InvalidJson)
}

/// Encodes a batch as a single-line JSON object ordered by unit id.
pub fn encode_batch(batch: &ActionBatch) -> Result<String, WireError> {
    let wire = WireBatch {
        spawn: batch.spawns().collect(),
        actions: batch.unit_actions().collect(),
    };

    serde_json::to_string(&wire).map_err(WireError::Encode)
}
