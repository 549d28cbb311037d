use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::config::Settings;
use crate::context::{RelayAck, Transport};
use crate::nostr::event::SignedEvent;
use crate::nostr::message::{parse_relay_msg, ClientMsg, RelayMsg};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("no relays configured")]
    NoRelays,
}

/// Sends events to a fixed list of relays, one short-lived websocket each.
#[derive(Debug, Clone)]
pub struct RelayTransport {
    relays: Vec<String>,
    ack_timeout: Duration,
}

impl RelayTransport {
    pub fn new(relays: Vec<String>, ack_timeout: Duration) -> Self {
        Self {
            relays,
            ack_timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.relays.clone(), settings.ack_timeout)
    }

    /// Send one `EVENT` and wait for the matching `OK`.
    async fn publish_to(&self, url: &str, event: &SignedEvent) -> anyhow::Result<RelayAck> {
        let (mut ws, _resp) = connect_async(url)
            .await
            .with_context(|| format!("connect {url}"))?;

        let msg = ClientMsg::Event {
            event: event.as_wire().clone(),
        };
        ws.send(Message::Text(msg.to_json())).await?;

        let wait_ok = async {
            while let Some(msg) = ws.next().await {
                match msg? {
                    Message::Text(text) => match parse_relay_msg(&text) {
                        Ok(RelayMsg::Ok {
                            event_id,
                            accepted,
                            message,
                        }) if event_id == event.id() => return Ok(Some((accepted, message))),
                        Ok(RelayMsg::Notice(notice)) => {
                            tracing::debug!(relay = %url, %notice, "relay notice");
                        }
                        // unrelated traffic on the socket
                        _ => {}
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            anyhow::Ok(None)
        };

        let outcome = tokio::time::timeout(self.ack_timeout, wait_ok).await;
        let _ = ws.close(None).await;

        let (accepted, message) = match outcome {
            Ok(Ok(Some(answer))) => answer,
            Ok(Ok(None)) => (false, "connection closed before OK".to_string()),
            Ok(Err(e)) => return Err(e),
            Err(_) => (false, "timed out waiting for OK".to_string()),
        };
        Ok(RelayAck {
            relay: url.to_string(),
            accepted,
            message,
        })
    }
}

#[async_trait]
impl Transport for RelayTransport {
    async fn publish(&self, event: &SignedEvent) -> anyhow::Result<Vec<RelayAck>> {
        if self.relays.is_empty() {
            return Err(RelayError::NoRelays.into());
        }

        let mut acks = Vec::with_capacity(self.relays.len());
        for url in &self.relays {
            let ack = match self.publish_to(url, event).await {
                Ok(ack) => ack,
                Err(e) => {
                    tracing::warn!(relay = %url, error = %e, "publish failed");
                    RelayAck {
                        relay: url.clone(),
                        accepted: false,
                        message: format!("error: {e:#}"),
                    }
                }
            };
            tracing::info!(
                relay = %ack.relay,
                event_id = %event.id(),
                accepted = ack.accepted,
                message = %ack.message,
                "relay answered"
            );
            acks.push(ack);
        }
        Ok(acks)
    }
}
