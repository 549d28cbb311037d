//! Zap initiation: asks a payment broker for a request tied to one event.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Signer;
use crate::error::EventError;
use crate::nostr::event::{EventDraft, Tag};

/// What a zap is for, captured from the event at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZapTarget {
    pub event_id: String,
    pub author: String,
    pub kind: u32,
    /// `e` or `a` tag pointing at the event.
    pub reference: Tag,
}

impl ZapTarget {
    pub fn from_event(event: &EventDraft) -> Self {
        Self {
            event_id: event.id.clone(),
            author: event.pubkey.clone(),
            kind: event.kind.unwrap_or(0),
            reference: event.tag_reference(),
        }
    }
}

/// One negotiation. Consumed by its single request.
#[async_trait]
pub trait ZapSession: Send {
    /// `Ok(None)` when the recipient cannot be zapped.
    async fn create_request(
        self: Box<Self>,
        amount_msat: u64,
        comment: Option<&str>,
    ) -> anyhow::Result<Option<String>>;
}

pub trait ZapBroker: Send + Sync {
    fn session(&self, target: ZapTarget, signer: Arc<dyn Signer>) -> Box<dyn ZapSession>;
}

/// Request a payment for `event`. Fails before touching the broker when the
/// event has no context or the context cannot sign.
pub async fn request_zap(
    event: &EventDraft,
    amount_msat: u64,
    comment: Option<&str>,
) -> Result<Option<String>, EventError> {
    let context = event.context().ok_or(EventError::NoContext)?;
    let signer = Arc::clone(context.assert_signer()?);
    let broker = context.zap_broker()?;

    let target = ZapTarget::from_event(event);
    tracing::debug!(event_id = %target.event_id, amount_msat, "requesting zap");
    let session = broker.session(target, signer);
    Ok(session.create_request(amount_msat, comment).await?)
}
