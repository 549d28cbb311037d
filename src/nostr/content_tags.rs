//! Derives reference tags from free-text content.
//!
//! Mentions written as `@npub1…` / `nostr:note1…` (also `nprofile`, `nevent`)
//! become `p` / `e` tags and are rewritten in place to NIP-08 positional
//! markers (`#[<index>]`). Hashtags add `t` tags and stay in the text.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::event::Tag;
use super::nip19::{decode_reference, Reference};

/// Output of [`generate_content_tags`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTags {
    pub content: String,
    pub tags: Vec<Tag>,
}

fn mention_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:@|nostr:)((?:npub|nprofile|note|nevent)1[02-9ac-hj-np-z]+)")
            .expect("mention pattern is valid")
    })
}

fn hashtag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\s)#([\p{L}\p{N}_]+)").expect("hashtag pattern is valid"))
}

/// Scan `content` for references, appending one tag per distinct reference to
/// `existing` and rewriting each mention to the index of its tag.
///
/// Pure and deterministic. Mentions are processed left to right, so the Nth
/// appended tag belongs to the Nth newly-marked mention. A mention whose tag is
/// already present reuses that tag's index. Mentions that fail to decode are
/// left untouched.
pub fn generate_content_tags(content: &str, existing: &[Tag]) -> ContentTags {
    let mut tags = existing.to_vec();

    let rewritten = mention_regex().replace_all(content, |caps: &Captures| {
        let Some(tag) = caps.get(1).and_then(|m| reference_tag(m.as_str())) else {
            return caps[0].to_string();
        };
        let index = match position_of(&tags, &tag) {
            Some(index) => index,
            None => {
                tags.push(tag);
                tags.len() - 1
            }
        };
        format!("#[{index}]")
    });

    for caps in hashtag_regex().captures_iter(&rewritten) {
        let tag = vec!["t".to_string(), caps[1].to_lowercase()];
        if position_of(&tags, &tag).is_none() {
            tags.push(tag);
        }
    }

    ContentTags {
        content: rewritten.into_owned(),
        tags,
    }
}

fn reference_tag(entity: &str) -> Option<Tag> {
    let tag = match decode_reference(entity).ok()? {
        Reference::Pubkey(pubkey) => vec!["p".to_string(), pubkey],
        Reference::Profile { pubkey, relays } => with_relay_hint("p", pubkey, relays),
        Reference::Note(id) => vec!["e".to_string(), id],
        Reference::Event { id, relays } => with_relay_hint("e", id, relays),
    };
    Some(tag)
}

fn with_relay_hint(name: &str, value: String, relays: Vec<String>) -> Tag {
    let mut tag = vec![name.to_string(), value];
    if let Some(relay) = relays.into_iter().next() {
        tag.push(relay);
    }
    tag
}

/// Tags are considered the same reference when name and value match.
fn position_of(tags: &[Tag], tag: &Tag) -> Option<usize> {
    tags.iter()
        .position(|t| t.first() == tag.first() && t.get(1) == tag.get(1))
}
