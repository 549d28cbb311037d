//! Event kind numbers and the ranges that change how relays store them.

pub const METADATA: u32 = 0;
pub const TEXT_NOTE: u32 = 1;
pub const CONTACTS: u32 = 3;
pub const REPOST: u32 = 6;
pub const REACTION: u32 = 7;
pub const ZAP_REQUEST: u32 = 9734;
pub const ZAP_RECEIPT: u32 = 9735;
/// NIP-23 long-form article.
pub const ARTICLE: u32 = 30023;

/// Only the latest event per (author, kind) is kept.
pub fn is_replaceable(kind: u32) -> bool {
    kind == METADATA || kind == CONTACTS || (10_000..20_000).contains(&kind)
}

/// Relays forward these without storing them.
pub fn is_ephemeral(kind: u32) -> bool {
    (20_000..30_000).contains(&kind)
}

/// Only the latest event per (author, kind, `d` tag) is kept.
pub fn is_parameterized_replaceable(kind: u32) -> bool {
    (30_000..40_000).contains(&kind)
}
