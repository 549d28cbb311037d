use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::content_tags::{generate_content_tags, ContentTags};
use super::id::{compute_event_id, IdError};
use super::kind;
use crate::context::{EventContext, RelayAck};
use crate::error::EventError;
use crate::random::{RandomSource, ThreadRandom};

/// Length of synthesized `d` tag identifiers.
pub const D_TAG_LEN: usize = 16;

/// `["name", "value", ...]`
pub type Tag = Vec<String>;

/// NIP-01 event as it travels on the wire.
///
/// Optional fields are omitted from JSON when absent, never written as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pubkey: String,
    pub created_at: i64,
    pub kind: u32,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl WireEvent {
    pub fn matching_tags<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |t| is_named(t, name))
    }
}

fn is_named(tag: &Tag, name: &str) -> bool {
    tag.first().map(|s| s.as_str()) == Some(name)
}

/// Caller-supplied starting values for a draft. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSeed {
    pub created_at: Option<i64>,
    pub content: Option<String>,
    pub subject: Option<String>,
    pub tags: Option<Vec<Tag>>,
    pub kind: Option<u32>,
    pub pubkey: Option<String>,
    pub id: Option<String>,
    pub sig: Option<String>,
}

impl From<&WireEvent> for EventSeed {
    fn from(event: &WireEvent) -> Self {
        Self {
            created_at: Some(event.created_at),
            content: Some(event.content.clone()),
            subject: event.subject.clone(),
            tags: Some(event.tags.clone()),
            kind: Some(event.kind),
            pubkey: Some(event.pubkey.clone()),
            id: Some(event.id.clone()),
            sig: event.sig.clone(),
        }
    }
}

/// Whether the id in a [`Canonical`] was derived from its fields.
#[derive(Debug)]
pub enum IdStatus {
    Computed,
    /// Returned verbatim from the event the draft was built from.
    Frozen,
    /// Hashing failed; the id is whatever the draft held before (possibly empty).
    Stale(IdError),
}

#[derive(Debug)]
pub struct Canonical {
    pub event: WireEvent,
    pub id_status: IdStatus,
}

impl Canonical {
    pub fn has_fresh_id(&self) -> bool {
        !matches!(self.id_status, IdStatus::Stale(_))
    }
}

/// Mutable working copy of an event.
///
/// Fields can be edited freely until [`EventDraft::sign`] produces a
/// [`SignedEvent`]. A draft built from an existing [`WireEvent`] keeps that
/// event and canonicalizes to it unchanged.
pub struct EventDraft {
    pub created_at: Option<i64>,
    pub content: String,
    pub subject: Option<String>,
    pub tags: Vec<Tag>,
    pub kind: Option<u32>,
    pub id: String,
    pub sig: Option<String>,
    pub pubkey: String,
    context: Option<Arc<EventContext>>,
    frozen: Option<WireEvent>,
    random: Arc<dyn RandomSource>,
}

impl std::fmt::Debug for EventDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDraft")
            .field("created_at", &self.created_at)
            .field("content", &self.content)
            .field("subject", &self.subject)
            .field("tags", &self.tags)
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("sig", &self.sig)
            .field("pubkey", &self.pubkey)
            .field("has_context", &self.context.is_some())
            .field("frozen", &self.frozen.is_some())
            .finish_non_exhaustive()
    }
}

impl EventDraft {
    pub fn new(context: Option<Arc<EventContext>>) -> Self {
        Self::from_seed(context, EventSeed::default())
    }

    pub fn from_seed(context: Option<Arc<EventContext>>, seed: EventSeed) -> Self {
        let random: Arc<dyn RandomSource> = match &context {
            Some(ctx) => ctx.random(),
            None => Arc::new(ThreadRandom),
        };
        Self {
            created_at: seed.created_at,
            content: seed.content.unwrap_or_default(),
            subject: seed.subject,
            tags: seed.tags.unwrap_or_default(),
            kind: seed.kind,
            id: seed.id.unwrap_or_default(),
            sig: seed.sig,
            pubkey: seed.pubkey.unwrap_or_default(),
            context,
            frozen: None,
            random,
        }
    }

    /// Wrap an already finalized event. Its wire form is returned as is by
    /// [`EventDraft::canonicalize`].
    pub fn from_wire(context: Option<Arc<EventContext>>, event: WireEvent) -> Self {
        let mut draft = Self::from_seed(context, EventSeed::from(&event));
        draft.frozen = Some(event);
        draft
    }

    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Arc::new(random);
        self
    }

    pub fn context(&self) -> Option<&Arc<EventContext>> {
        self.context.as_ref()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Whether a non-empty signature is present.
    pub fn has_sig(&self) -> bool {
        self.sig.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Tags whose name is `name`, in their original order.
    pub fn matching_tags(&self, name: &str) -> Vec<&Tag> {
        self.tags.iter().filter(|t| is_named(t, name)).collect()
    }

    /// Reference to this event for use in other events' tags: an `a` tag for
    /// parameterized replaceable events with a `d` tag, an `e` tag otherwise.
    pub fn tag_reference(&self) -> Tag {
        let d = self
            .tags
            .iter()
            .find(|t| is_named(t, "d"))
            .and_then(|t| t.get(1));
        match (self.kind, d) {
            (Some(k), Some(d)) if kind::is_parameterized_replaceable(k) => {
                vec!["a".to_string(), format!("{k}:{}:{d}", self.pubkey)]
            }
            _ => vec!["e".to_string(), self.id.clone()],
        }
    }

    /// Fill in tags that can be derived from the event itself.
    ///
    /// Parameterized replaceable kinds get a random `d` tag when they have none.
    /// If the draft then still has no tags, content references are extracted
    /// into tags and the content is rewritten with positional markers.
    /// Caller-supplied tags are never replaced; repeated calls are no-ops.
    pub fn generate_tags(&mut self) {
        if self.kind.is_some_and(kind::is_parameterized_replaceable)
            && !self.tags.iter().any(|t| is_named(t, "d"))
        {
            let identifier = self.random.identifier(D_TAG_LEN);
            debug!(d = %identifier, kind = ?self.kind, "synthesized d tag");
            self.tags.push(vec!["d".to_string(), identifier]);
        }

        if !self.tags.is_empty() {
            return;
        }

        let ContentTags { content, tags } = generate_content_tags(&self.content, &self.tags);
        if !tags.is_empty() {
            debug!(count = tags.len(), "extracted tags from content");
        }
        self.content = content;
        self.tags = tags;
    }

    /// Build the wire form of the draft.
    ///
    /// The pubkey is taken from `explicit_pubkey`, then the draft's own
    /// `pubkey`, then the context signer's user. Tag generation runs first and
    /// may rewrite `content` and `tags` on the draft. A hashing failure does not
    /// fail the call: the previous id is kept and reported as
    /// [`IdStatus::Stale`].
    pub async fn canonicalize(
        &mut self,
        explicit_pubkey: Option<&str>,
    ) -> Result<Canonical, EventError> {
        if let Some(frozen) = &self.frozen {
            return Ok(Canonical {
                event: frozen.clone(),
                id_status: IdStatus::Frozen,
            });
        }

        let pubkey = self.resolve_pubkey(explicit_pubkey).await?;
        self.generate_tags();

        let mut event = WireEvent {
            id: self.id.clone(),
            pubkey,
            created_at: self.created_at.unwrap_or_else(unix_now),
            kind: self.kind.unwrap_or(0),
            tags: self.tags.clone(),
            content: self.content.clone(),
            sig: None,
            subject: self.subject.clone().filter(|s| !s.is_empty()),
        };

        let id_status = match compute_event_id(&event) {
            Ok(id) => {
                event.id = id;
                IdStatus::Computed
            }
            Err(err) => {
                warn!(error = %err, stale_id = %event.id, "could not compute event id, keeping previous");
                IdStatus::Stale(err)
            }
        };

        event.sig = self.sig.clone().filter(|s| !s.is_empty());
        Ok(Canonical { event, id_status })
    }

    /// [`EventDraft::canonicalize`] without the id status.
    pub async fn to_wire_event(&mut self, pubkey: Option<&str>) -> Result<WireEvent, EventError> {
        Ok(self.canonicalize(pubkey).await?.event)
    }

    async fn resolve_pubkey(&self, explicit: Option<&str>) -> Result<String, EventError> {
        if let Some(pubkey) = explicit.filter(|p| !p.is_empty()) {
            return Ok(pubkey.to_string());
        }
        if !self.pubkey.is_empty() {
            return Ok(self.pubkey.clone());
        }
        match self.context.as_ref().and_then(|ctx| ctx.signer()) {
            Some(signer) => Ok(signer.user().await?.pubkey),
            None => Ok(String::new()),
        }
    }

    /// Sign the draft with the context's signer.
    ///
    /// The signed timestamp, kind, pubkey and id are written back to the draft
    /// so a later canonicalization reproduces exactly what was signed.
    pub async fn sign(&mut self) -> Result<SignedEvent, EventError> {
        let context = self.context.clone().ok_or(EventError::NoContext)?;
        let signer = Arc::clone(context.assert_signer()?);

        self.generate_tags();
        let mut event = self.canonicalize(None).await?.event;
        let sig = signer.sign(&event).await?;

        self.created_at = Some(event.created_at);
        self.kind = Some(event.kind);
        self.pubkey = event.pubkey.clone();
        self.id = event.id.clone();
        self.sig = Some(sig.clone());

        event.sig = Some(sig);
        debug!(event_id = %event.id, "signed event");
        Ok(SignedEvent(event))
    }

    /// Sign if not yet signed, then hand the event to the context's transport.
    pub async fn publish(&mut self) -> Result<Vec<RelayAck>, EventError> {
        let signed = if !self.has_sig() {
            self.sign().await?
        } else {
            let mut event = self.canonicalize(None).await?.event;
            if event.sig.is_none() {
                event.sig = self.sig.clone();
            }
            SignedEvent(event)
        };

        let context = self.context.as_ref().ok_or(EventError::NoContext)?;
        let acks = context.transport()?.publish(&signed).await?;
        Ok(acks)
    }

    /// Ask the context's zap broker for a payment request targeting this event.
    pub async fn zap(
        &self,
        amount_msat: u64,
        comment: Option<&str>,
    ) -> Result<Option<String>, EventError> {
        crate::zap::request_zap(self, amount_msat, comment).await
    }
}

/// A finalized event. Only produced by signing; its fields cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SignedEvent(WireEvent);

impl SignedEvent {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn pubkey(&self) -> &str {
        &self.0.pubkey
    }

    pub fn sig(&self) -> &str {
        self.0.sig.as_deref().unwrap_or_default()
    }

    pub fn kind(&self) -> u32 {
        self.0.kind
    }

    pub fn as_wire(&self) -> &WireEvent {
        &self.0
    }

    pub fn into_wire(self) -> WireEvent {
        self.0
    }

    /// Whether `id` matches the hash of the other fields.
    pub fn verify_id(&self) -> Result<bool, IdError> {
        Ok(compute_event_id(&self.0)? == self.0.id)
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::context::{Signer, Transport, User};
    use crate::nostr::keys::{verify_signature, LocalSigner};
    use crate::nostr::nip19::tests::{NPUB, PUBKEY};
    use crate::random::SeededRandom;

    /// Wraps a real signer and counts how often it is consulted.
    struct CountingSigner {
        inner: LocalSigner,
        user_calls: Arc<AtomicUsize>,
        sign_calls: Arc<AtomicUsize>,
    }

    impl CountingSigner {
        fn new() -> Self {
            Self {
                inner: LocalSigner::generate(),
                user_calls: Arc::new(AtomicUsize::new(0)),
                sign_calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Signer for CountingSigner {
        async fn user(&self) -> anyhow::Result<User> {
            self.user_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.user().await
        }

        async fn sign(&self, event: &WireEvent) -> anyhow::Result<String> {
            self.sign_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.sign(event).await
        }
    }

    #[derive(Clone, Default)]
    struct RecordingTransport {
        published: Arc<Mutex<Vec<SignedEvent>>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn publish(&self, event: &SignedEvent) -> anyhow::Result<Vec<RelayAck>> {
            self.published.lock().unwrap().push(event.clone());
            Ok(vec![RelayAck {
                relay: "wss://mock".to_string(),
                accepted: true,
                message: String::new(),
            }])
        }
    }

    fn tag(parts: &[&str]) -> Tag {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn signing_context() -> (Arc<EventContext>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let signer = CountingSigner::new();
        let user_calls = Arc::clone(&signer.user_calls);
        let sign_calls = Arc::clone(&signer.sign_calls);
        let ctx = EventContext::builder()
            .signer(signer)
            .random(SeededRandom::new(1))
            .build();
        (ctx, user_calls, sign_calls)
    }

    fn wire_sample() -> WireEvent {
        WireEvent {
            id: "ee".repeat(32),
            pubkey: PUBKEY.to_string(),
            created_at: 1_700_000_000,
            kind: 1,
            tags: vec![tag(&["t", "frozen"])],
            content: "already out there".to_string(),
            sig: Some("ff".repeat(64)),
            subject: None,
        }
    }

    #[test]
    fn test_new_draft_defaults() {
        let draft = EventDraft::new(None);
        assert!(draft.created_at.is_none());
        assert_eq!(draft.content, "");
        assert!(draft.tags.is_empty());
        assert_eq!(draft.id, "");
        assert_eq!(draft.pubkey, "");
        assert!(draft.kind.is_none());
        assert!(draft.sig.is_none());
        assert!(draft.subject.is_none());
        assert!(!draft.is_frozen());
    }

    #[test]
    fn test_from_wire_copies_fields() {
        let wire = wire_sample();
        let draft = EventDraft::from_wire(None, wire.clone());
        assert!(draft.is_frozen());
        assert_eq!(draft.created_at, Some(wire.created_at));
        assert_eq!(draft.content, wire.content);
        assert_eq!(draft.tags, wire.tags);
        assert_eq!(draft.id, wire.id);
        assert_eq!(draft.sig, wire.sig);
        assert_eq!(draft.kind, Some(1));
    }

    #[tokio::test]
    async fn test_frozen_round_trip_ignores_mutation() {
        let wire = wire_sample();
        let mut draft = EventDraft::from_wire(None, wire.clone());
        draft.content = "edited".to_string();
        draft.tags.clear();

        let canonical = draft.canonicalize(Some("11".repeat(32).as_str())).await.unwrap();
        assert!(matches!(canonical.id_status, IdStatus::Frozen));
        assert_eq!(canonical.event, wire);
    }

    #[test]
    fn test_matching_tags_keeps_order() {
        let mut draft = EventDraft::new(None);
        draft.tags = vec![
            tag(&["p", "a"]),
            tag(&["e", "x"]),
            tag(&["p", "b"]),
            vec![],
        ];
        assert_eq!(draft.matching_tags("p"), vec![&tag(&["p", "a"]), &tag(&["p", "b"])]);
        assert!(draft.matching_tags("d").is_empty());
    }

    #[test]
    fn test_replaceable_gets_one_d_tag() {
        let mut draft = EventDraft::new(None).with_random(SeededRandom::new(3));
        draft.kind = Some(kind::ARTICLE);
        draft.content = "long form".to_string();

        draft.generate_tags();
        let first = draft.tags.clone();
        assert_eq!(draft.matching_tags("d").len(), 1);
        assert_eq!(draft.matching_tags("d")[0][1].len(), D_TAG_LEN);

        draft.generate_tags();
        assert_eq!(draft.tags, first);
    }

    #[test]
    fn test_every_parameterized_kind_ends_with_one_d_tag() {
        let random: Arc<dyn RandomSource> = Arc::new(SeededRandom::new(9));
        for k in 30_000..40_000u32 {
            let mut draft = EventDraft::new(None);
            draft.random = Arc::clone(&random);
            draft.kind = Some(k);
            draft.generate_tags();
            draft.generate_tags();
            assert_eq!(draft.matching_tags("d").len(), 1, "kind {k}");
        }
    }

    #[test]
    fn test_existing_d_tag_is_kept() {
        let mut draft = EventDraft::new(None);
        draft.kind = Some(kind::ARTICLE);
        draft.tags = vec![tag(&["d", "my-slug"])];
        draft.generate_tags();
        assert_eq!(draft.tags, vec![tag(&["d", "my-slug"])]);
    }

    #[test]
    fn test_d_tag_blocks_content_extraction() {
        let mut draft = EventDraft::new(None);
        draft.kind = Some(kind::ARTICLE);
        draft.content = format!("thanks @{NPUB}");
        draft.generate_tags();
        assert_eq!(draft.tags.len(), 1);
        assert_eq!(draft.content, format!("thanks @{NPUB}"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let mut draft = EventDraft::new(None);
        draft.kind = Some(kind::TEXT_NOTE);
        draft.content = format!("gm @{NPUB}");

        draft.generate_tags();
        assert_eq!(draft.content, "gm #[0]");
        assert_eq!(draft.tags, vec![tag(&["p", PUBKEY])]);

        let (content, tags) = (draft.content.clone(), draft.tags.clone());
        draft.generate_tags();
        assert_eq!(draft.content, content);
        assert_eq!(draft.tags, tags);
    }

    #[test]
    fn test_caller_tags_are_not_overwritten() {
        let mut draft = EventDraft::new(None);
        draft.kind = Some(kind::TEXT_NOTE);
        draft.content = format!("gm @{NPUB} #coffee");
        draft.tags = vec![tag(&["client", "cli"])];
        draft.generate_tags();
        assert_eq!(draft.tags, vec![tag(&["client", "cli"])]);
        assert_eq!(draft.content, format!("gm @{NPUB} #coffee"));
    }

    fn fixed_draft() -> EventDraft {
        let mut draft = EventDraft::new(None);
        draft.kind = Some(kind::TEXT_NOTE);
        draft.content = "same content".to_string();
        draft.pubkey = PUBKEY.to_string();
        draft
    }

    #[tokio::test]
    async fn test_canonical_form_is_deterministic() {
        let mut a = fixed_draft();
        let mut b = fixed_draft();
        a.created_at = Some(1_700_000_000);
        b.created_at = Some(1_700_000_000);
        b.id = "whatever".to_string();

        let wa = a.to_wire_event(None).await.unwrap();
        let wb = b.to_wire_event(None).await.unwrap();
        assert_eq!(
            serde_json::to_string(&wa).unwrap(),
            serde_json::to_string(&wb).unwrap()
        );
        assert_eq!(wa.id.len(), 64);
    }

    #[tokio::test]
    async fn test_unset_timestamp_is_the_only_difference() {
        let mut a = fixed_draft();
        let mut b = fixed_draft();
        let mut wa = a.to_wire_event(None).await.unwrap();
        let mut wb = b.to_wire_event(None).await.unwrap();
        assert!(wa.created_at > 1_600_000_000);

        wb.created_at = wa.created_at;
        wa.id.clear();
        wb.id.clear();
        assert_eq!(wa, wb);
    }

    #[tokio::test]
    async fn test_absent_subject_is_omitted() {
        let mut draft = fixed_draft();
        let value = serde_json::to_value(draft.to_wire_event(None).await.unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("subject"));
        assert!(!obj.contains_key("sig"));

        draft.subject = Some(String::new());
        let value = serde_json::to_value(draft.to_wire_event(None).await.unwrap()).unwrap();
        assert!(!value.as_object().unwrap().contains_key("subject"));

        draft.subject = Some("topic".to_string());
        let value = serde_json::to_value(draft.to_wire_event(None).await.unwrap()).unwrap();
        assert_eq!(value["subject"], "topic");
    }

    #[tokio::test]
    async fn test_pubkey_resolution_order() {
        let (ctx, user_calls, _) = signing_context();
        let explicit = "aa".repeat(32);

        let mut draft = EventDraft::new(Some(ctx.clone()));
        draft.pubkey = PUBKEY.to_string();
        let wire = draft.to_wire_event(Some(explicit.as_str())).await.unwrap();
        assert_eq!(wire.pubkey, explicit);

        let wire = draft.to_wire_event(None).await.unwrap();
        assert_eq!(wire.pubkey, PUBKEY);
        assert_eq!(user_calls.load(Ordering::SeqCst), 0);

        let mut draft = EventDraft::new(Some(ctx.clone()));
        let wire = draft.to_wire_event(None).await.unwrap();
        assert_eq!(user_calls.load(Ordering::SeqCst), 1);
        assert_eq!(wire.pubkey, ctx.signer().unwrap().user().await.unwrap().pubkey);
    }

    #[tokio::test]
    async fn test_hash_failure_keeps_previous_id() {
        let mut draft = EventDraft::new(None);
        draft.kind = Some(kind::TEXT_NOTE);
        draft.id = "previous".to_string();

        let canonical = draft.canonicalize(None).await.unwrap();
        assert!(!canonical.has_fresh_id());
        assert!(matches!(canonical.id_status, IdStatus::Stale(IdError::MissingPubkey)));
        assert_eq!(canonical.event.id, "previous");
        assert_eq!(canonical.event.pubkey, "");
    }

    #[tokio::test]
    async fn test_sign_text_note() {
        let (ctx, _, _) = signing_context();
        let mut draft = EventDraft::new(Some(ctx));
        draft.kind = Some(kind::TEXT_NOTE);
        draft.content = "hello world".to_string();

        let signed = draft.sign().await.unwrap();
        assert!(draft.tags.is_empty());
        assert_eq!(draft.content, "hello world");
        assert_eq!(draft.id.len(), 64);
        assert!(draft.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(draft.sig.as_deref(), Some(signed.sig()));
        assert_eq!(signed.id(), draft.id);
        assert!(signed.verify_id().unwrap());
        verify_signature(signed.as_wire()).unwrap();
    }

    #[tokio::test]
    async fn test_sign_without_context() {
        let mut draft = EventDraft::new(None);
        assert!(matches!(draft.sign().await, Err(EventError::NoContext)));
    }

    #[tokio::test]
    async fn test_sign_without_signer() {
        let ctx = EventContext::builder().build();
        let mut draft = EventDraft::new(Some(ctx));
        assert!(matches!(draft.sign().await, Err(EventError::NoSigner)));
    }

    #[tokio::test]
    async fn test_publish_signs_once() {
        let signer = CountingSigner::new();
        let sign_calls = Arc::clone(&signer.sign_calls);
        let transport = RecordingTransport::default();
        let published = Arc::clone(&transport.published);
        let ctx = EventContext::builder()
            .signer(signer)
            .transport(transport)
            .build();

        let mut draft = EventDraft::new(Some(ctx));
        draft.kind = Some(kind::TEXT_NOTE);
        draft.content = "publish me".to_string();

        let acks = draft.publish().await.unwrap();
        assert!(acks[0].accepted);
        draft.publish().await.unwrap();

        assert_eq!(sign_calls.load(Ordering::SeqCst), 1);
        let published = published.lock().unwrap();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0], published[1]);
        verify_signature(published[0].as_wire()).unwrap();
    }

    #[tokio::test]
    async fn test_publish_signs_when_seeded_sig_is_empty() {
        let signer = CountingSigner::new();
        let sign_calls = Arc::clone(&signer.sign_calls);
        let transport = RecordingTransport::default();
        let published = Arc::clone(&transport.published);
        let ctx = EventContext::builder()
            .signer(signer)
            .transport(transport)
            .build();

        let seed = EventSeed {
            kind: Some(kind::TEXT_NOTE),
            content: Some("x".to_string()),
            sig: Some(String::new()),
            ..Default::default()
        };
        let mut draft = EventDraft::from_seed(Some(ctx), seed);
        assert!(!draft.has_sig());
        draft.publish().await.unwrap();

        assert_eq!(sign_calls.load(Ordering::SeqCst), 1);
        assert!(draft.has_sig());
        let published = published.lock().unwrap();
        assert!(!published[0].sig().is_empty());
        verify_signature(published[0].as_wire()).unwrap();
    }

    #[tokio::test]
    async fn test_publish_without_transport() {
        let (ctx, _, _) = signing_context();
        let mut draft = EventDraft::new(Some(ctx));
        draft.content = "nowhere to go".to_string();
        assert!(matches!(draft.publish().await, Err(EventError::NoTransport)));
    }

    #[tokio::test]
    async fn test_publish_frozen_event_as_is() {
        let transport = RecordingTransport::default();
        let published = Arc::clone(&transport.published);
        let ctx = EventContext::builder().transport(transport).build();

        let wire = wire_sample();
        let mut draft = EventDraft::from_wire(Some(ctx), wire.clone());
        draft.publish().await.unwrap();
        assert_eq!(published.lock().unwrap()[0].as_wire(), &wire);
    }

    #[test]
    fn test_tag_reference() {
        let mut draft = EventDraft::new(None);
        draft.kind = Some(kind::TEXT_NOTE);
        draft.id = "abc".to_string();
        assert_eq!(draft.tag_reference(), tag(&["e", "abc"]));

        draft.kind = Some(kind::ARTICLE);
        draft.pubkey = PUBKEY.to_string();
        draft.tags = vec![tag(&["d", "slug"])];
        assert_eq!(
            draft.tag_reference(),
            vec!["a".to_string(), format!("30023:{PUBKEY}:slug")]
        );
    }

    #[test]
    fn test_wire_json_shape() {
        let json = r#"{"id":"x","pubkey":"y","created_at":1,"kind":7,"tags":[["e","z"]],"content":"+"}"#;
        let event: WireEvent = serde_json::from_str(json).unwrap();
        assert!(event.sig.is_none());
        assert_eq!(event.matching_tags("e").count(), 1);
        assert_eq!(serde_json::to_string(&event).unwrap(), json);
    }
}
