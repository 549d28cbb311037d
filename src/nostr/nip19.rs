//! NIP-19 bech32 entities (`npub`, `nsec`, `note`, `nprofile`, `nevent`).

use bech32::{Bech32, Hrp};

#[derive(Debug, thiserror::Error)]
pub enum Nip19Error {
    #[error(transparent)]
    Decode(#[from] bech32::DecodeError),
    #[error(transparent)]
    Encode(#[from] bech32::EncodeError),
    #[error(transparent)]
    Hrp(#[from] bech32::primitives::hrp::Error),
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
    #[error("unsupported prefix: {0}")]
    UnsupportedPrefix(String),
    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
    #[error("malformed TLV data")]
    InvalidTlv,
    #[error("{0} is missing its primary value")]
    MissingSpecial(&'static str),
}

/// A reference to a profile or an event, as it can appear in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Pubkey(String),
    Profile { pubkey: String, relays: Vec<String> },
    Note(String),
    Event { id: String, relays: Vec<String> },
}

/// Decode an `npub`, `nprofile`, `note` or `nevent` string.
pub fn decode_reference(s: &str) -> Result<Reference, Nip19Error> {
    let (hrp, data) = bech32::decode(s)?;
    match hrp.to_lowercase().as_str() {
        "npub" => Ok(Reference::Pubkey(hex32(&data)?)),
        "note" => Ok(Reference::Note(hex32(&data)?)),
        "nprofile" => {
            let tlv = parse_tlv(&data)?;
            let pubkey = tlv.special.ok_or(Nip19Error::MissingSpecial("nprofile"))?;
            Ok(Reference::Profile {
                pubkey: hex32(&pubkey)?,
                relays: tlv.relays,
            })
        }
        "nevent" => {
            let tlv = parse_tlv(&data)?;
            let id = tlv.special.ok_or(Nip19Error::MissingSpecial("nevent"))?;
            Ok(Reference::Event {
                id: hex32(&id)?,
                relays: tlv.relays,
            })
        }
        other => Err(Nip19Error::UnsupportedPrefix(other.to_string())),
    }
}

/// Decode an `nsec` into raw secret key bytes.
pub fn decode_secret_key(s: &str) -> Result<[u8; 32], Nip19Error> {
    let (hrp, data) = bech32::decode(s)?;
    let prefix = hrp.to_lowercase();
    if prefix != "nsec" {
        return Err(Nip19Error::UnsupportedPrefix(prefix));
    }
    bytes32(&data)
}

pub fn encode_npub(pubkey_hex: &str) -> Result<String, Nip19Error> {
    encode_hex("npub", pubkey_hex)
}

pub fn encode_note(event_id_hex: &str) -> Result<String, Nip19Error> {
    encode_hex("note", event_id_hex)
}

fn encode_hex(prefix: &str, value_hex: &str) -> Result<String, Nip19Error> {
    let bytes = hex::decode(value_hex)?;
    let bytes = bytes32(&bytes)?;
    let hrp = Hrp::parse(prefix)?;
    Ok(bech32::encode::<Bech32>(hrp, &bytes)?)
}

fn bytes32(data: &[u8]) -> Result<[u8; 32], Nip19Error> {
    data.try_into()
        .map_err(|_| Nip19Error::InvalidLength(data.len()))
}

fn hex32(data: &[u8]) -> Result<String, Nip19Error> {
    Ok(hex::encode(bytes32(data)?))
}

#[derive(Default)]
struct Tlv {
    special: Option<Vec<u8>>,
    relays: Vec<String>,
}

fn parse_tlv(mut data: &[u8]) -> Result<Tlv, Nip19Error> {
    let mut tlv = Tlv::default();
    while !data.is_empty() {
        let [t, l, rest @ ..] = data else {
            return Err(Nip19Error::InvalidTlv);
        };
        let len = *l as usize;
        if rest.len() < len {
            return Err(Nip19Error::InvalidTlv);
        }
        let (value, tail) = rest.split_at(len);
        match t {
            0 if tlv.special.is_none() => tlv.special = Some(value.to_vec()),
            1 => {
                if let Ok(relay) = std::str::from_utf8(value) {
                    tlv.relays.push(relay.to_string());
                }
            }
            // author (2), kind (3) and unknown types are not needed for tagging
            _ => {}
        }
        data = tail;
    }
    Ok(tlv)
}
