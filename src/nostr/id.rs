//! Event id derivation (NIP-01).
//!
//! The id is the lowercase hex SHA-256 of the compact JSON array
//! `[0, <pubkey>, <created_at>, <kind>, <tags>, <content>]`. `serde_json`
//! escapes exactly the characters NIP-01 requires and leaves everything else
//! (including non-ASCII) verbatim, so its compact output is the canonical form.

use serde_json::json;
use sha2::{Digest, Sha256};

use super::event::WireEvent;

#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("pubkey is missing")]
    MissingPubkey,
    #[error("pubkey is not 32 bytes of hex: {0}")]
    InvalidPubkey(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Canonical serialization fed to the hash.
pub fn serialize_for_id(event: &WireEvent) -> Result<String, IdError> {
    if event.pubkey.is_empty() {
        return Err(IdError::MissingPubkey);
    }
    // ids are only defined over lowercase hex keys
    let lowercase = !event.pubkey.bytes().any(|b| b.is_ascii_uppercase());
    match hex::decode(&event.pubkey) {
        Ok(bytes) if lowercase && bytes.len() == 32 => {}
        _ => return Err(IdError::InvalidPubkey(event.pubkey.clone())),
    }

    let array = json!([
        0,
        event.pubkey,
        event.created_at,
        event.kind,
        event.tags,
        event.content
    ]);
    Ok(serde_json::to_string(&array)?)
}

/// Raw 32-byte digest, as signed by BIP-340 signers.
pub fn event_hash(event: &WireEvent) -> Result<[u8; 32], IdError> {
    let serialized = serialize_for_id(event)?;
    Ok(Sha256::digest(serialized.as_bytes()).into())
}

/// Hex-encoded event id.
pub fn compute_event_id(event: &WireEvent) -> Result<String, IdError> {
    Ok(hex::encode(event_hash(event)?))
}
