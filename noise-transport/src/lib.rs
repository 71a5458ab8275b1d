//! Framed transport channel: binds an underlying ordered byte stream to a
//! `noise-core` handshake, then to the two transport ciphers it produces.

mod address;
mod channel;
mod config;
mod error;
mod verifier;

pub use address::{connect, listen, Incoming};
pub use channel::{Channel, MAX_CIPHERTEXT, MAX_PLAINTEXT};
pub use config::{ChannelConfig, HandshakeConfig, PatternIdConfig};
pub use error::TransportError;
pub use verifier::{AllowAny, PublicKeyVerifier};
