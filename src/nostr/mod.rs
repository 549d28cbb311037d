pub mod content_tags;
pub mod event;
pub mod id;
pub mod keys;
pub mod kind;
pub mod message;
pub mod nip19;
