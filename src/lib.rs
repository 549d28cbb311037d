//! Build, sign, publish and zap Nostr events.
//!
//! An [`EventDraft`] holds the editable fields of an event. Signing derives
//! missing tags (a `d` tag for parameterized replaceable kinds, `p`/`e`/`t`
//! tags from content), computes the NIP-01 id and asks the attached
//! [`Signer`] for a signature, yielding an immutable [`SignedEvent`].
//! Signers, transports and zap brokers are supplied through an
//! [`EventContext`].
//!
//! ```rust,ignore
//! use nostr_event_kit::{EventContext, EventDraft, LocalSigner, RelayTransport};
//!
//! let ctx = EventContext::builder()
//!     .signer(LocalSigner::parse(&secret)?)
//!     .transport(RelayTransport::new(relays, Duration::from_secs(10)))
//!     .build();
//!
//! let mut note = EventDraft::new(Some(ctx));
//! note.kind = Some(kind::TEXT_NOTE);
//! note.content = "hello nostr:npub1…".into();
//! let acks = note.publish().await?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod nostr;
pub mod random;
pub mod relay;
pub mod zap;

pub use context::{EventContext, RelayAck, Signer, Transport, User};
pub use error::EventError;
pub use nostr::event::{Canonical, EventDraft, EventSeed, IdStatus, SignedEvent, Tag, WireEvent};
pub use nostr::keys::LocalSigner;
pub use nostr::kind;
pub use relay::RelayTransport;
pub use zap::{request_zap, ZapBroker, ZapSession, ZapTarget};
