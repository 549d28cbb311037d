#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The event has no [`EventContext`](crate::context::EventContext) attached.
    #[error("no context attached to the event")]
    NoContext,
    #[error("no signer attached to the context")]
    NoSigner,
    #[error("no transport attached to the context")]
    NoTransport,
    #[error("no zap broker attached to the context")]
    NoZapBroker,
    /// Failure reported by a signer, transport or zap session, passed through as is.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}
