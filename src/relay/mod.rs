pub mod publisher;

pub use publisher::{RelayError, RelayTransport};
