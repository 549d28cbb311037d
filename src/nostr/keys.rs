//! In-process signer backed by a secp256k1 secret key.

use anyhow::bail;
use async_trait::async_trait;
use secp256k1::{schnorr, Keypair, Message, SecretKey, XOnlyPublicKey, SECP256K1};

use super::event::WireEvent;
use super::id::event_hash;
use super::nip19::{self, Nip19Error};
use crate::context::{Signer, User};

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error(transparent)]
    Secp256k1(#[from] secp256k1::Error),
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Nip19(#[from] Nip19Error),
    #[error("event has no signature")]
    MissingSignature,
    #[error(transparent)]
    Id(#[from] super::id::IdError),
}

pub struct LocalSigner {
    keypair: Keypair,
    pubkey: String,
}

impl LocalSigner {
    /// Accepts a 64-char hex secret or an `nsec1…` string.
    pub fn parse(secret: &str) -> Result<Self, KeyError> {
        let secret = secret.trim();
        let bytes = if secret.starts_with("nsec1") {
            nip19::decode_secret_key(secret)?.to_vec()
        } else {
            hex::decode(secret)?
        };
        let secret_key = SecretKey::from_slice(&bytes)?;
        Ok(Self::from_keypair(Keypair::from_secret_key(SECP256K1, &secret_key)))
    }

    pub fn generate() -> Self {
        Self::from_keypair(Keypair::new(SECP256K1, &mut rand::thread_rng()))
    }

    fn from_keypair(keypair: Keypair) -> Self {
        let (xonly, _parity) = keypair.x_only_public_key();
        Self {
            pubkey: hex::encode(xonly.serialize()),
            keypair,
        }
    }

    pub fn pubkey(&self) -> &str {
        &self.pubkey
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("pubkey", &self.pubkey)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for LocalSigner {
    async fn user(&self) -> anyhow::Result<User> {
        Ok(User {
            pubkey: self.pubkey.clone(),
        })
    }

    async fn sign(&self, event: &WireEvent) -> anyhow::Result<String> {
        if event.pubkey != self.pubkey {
            bail!(
                "event pubkey {} does not belong to this signer ({})",
                event.pubkey,
                self.pubkey
            );
        }
        let message = Message::from_digest(event_hash(event)?);
        let sig = SECP256K1.sign_schnorr_no_aux_rand(&message, &self.keypair);
        Ok(hex::encode(sig.serialize()))
    }
}

/// Check `sig` against the recomputed hash and `pubkey` of a locally built event.
pub fn verify_signature(event: &WireEvent) -> Result<(), KeyError> {
    let sig_hex = event.sig.as_deref().ok_or(KeyError::MissingSignature)?;
    let sig = schnorr::Signature::from_slice(&hex::decode(sig_hex)?)?;
    let pubkey = XOnlyPublicKey::from_slice(&hex::decode(&event.pubkey)?)?;
    let message = Message::from_digest(event_hash(event)?);
    SECP256K1.verify_schnorr(&sig, &message, &pubkey)?;
    Ok(())
}
