//! Collaborators an event needs to be signed, published or zapped.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::nostr::event::{SignedEvent, WireEvent};
use crate::random::{RandomSource, ThreadRandom};
use crate::zap::ZapBroker;

/// The identity a signer acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Hex-encoded x-only public key.
    pub pubkey: String,
}

#[async_trait]
pub trait Signer: Send + Sync {
    async fn user(&self) -> anyhow::Result<User>;

    /// Hex-encoded Schnorr signature over the event id.
    async fn sign(&self, event: &WireEvent) -> anyhow::Result<String>;
}

/// A relay's answer to an `EVENT` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayAck {
    pub relay: String,
    pub accepted: bool,
    pub message: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn publish(&self, event: &SignedEvent) -> anyhow::Result<Vec<RelayAck>>;
}

/// Shared by every event created against it.
pub struct EventContext {
    signer: Option<Arc<dyn Signer>>,
    transport: Option<Arc<dyn Transport>>,
    zap_broker: Option<Arc<dyn ZapBroker>>,
    random: Arc<dyn RandomSource>,
}

impl EventContext {
    pub fn builder() -> EventContextBuilder {
        EventContextBuilder::default()
    }

    pub fn signer(&self) -> Option<&Arc<dyn Signer>> {
        self.signer.as_ref()
    }

    /// Fails with [`EventError::NoSigner`] when no signer is attached.
    pub fn assert_signer(&self) -> Result<&Arc<dyn Signer>, EventError> {
        self.signer.as_ref().ok_or(EventError::NoSigner)
    }

    pub fn transport(&self) -> Result<&Arc<dyn Transport>, EventError> {
        self.transport.as_ref().ok_or(EventError::NoTransport)
    }

    pub fn zap_broker(&self) -> Result<&Arc<dyn ZapBroker>, EventError> {
        self.zap_broker.as_ref().ok_or(EventError::NoZapBroker)
    }

    pub fn random(&self) -> Arc<dyn RandomSource> {
        Arc::clone(&self.random)
    }
}

#[derive(Default)]
pub struct EventContextBuilder {
    signer: Option<Arc<dyn Signer>>,
    transport: Option<Arc<dyn Transport>>,
    zap_broker: Option<Arc<dyn ZapBroker>>,
    random: Option<Arc<dyn RandomSource>>,
}

impl EventContextBuilder {
    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn zap_broker(mut self, broker: impl ZapBroker + 'static) -> Self {
        self.zap_broker = Some(Arc::new(broker));
        self
    }

    pub fn random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Some(Arc::new(random));
        self
    }

    pub fn build(self) -> Arc<EventContext> {
        Arc::new(EventContext {
            signer: self.signer,
            transport: self.transport,
            zap_broker: self.zap_broker,
            random: self.random.unwrap_or_else(|| Arc::new(ThreadRandom)),
        })
    }
}
