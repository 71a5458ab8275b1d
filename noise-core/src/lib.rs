#![forbid(unsafe_code)]

//! Core of a Noise Protocol Framework implementation: pattern registry,
//! symmetric/cipher state, and the token-driven handshake state machine.
//! No I/O lives in this crate; see `noise-transport` for the framed
//! channel built on top of the two [`CipherState`]s a handshake yields.

extern crate chacha20poly1305;
extern crate hkdf;
extern crate sha2;
extern crate x25519_dalek;
extern crate zeroize;

mod cipher_state;
mod error;
mod handshake;
mod pattern;
mod primitives;
mod symmetric_state;

pub use cipher_state::CipherState;
pub use error::NoiseError;
pub use handshake::{HandshakeProgress, HandshakeState, InitArgs};
pub use pattern::{HandshakePattern, PatternId, Token};
pub use primitives::KeyPair;
pub use symmetric_state::SymmetricState;
pub use x25519_dalek::PublicKey;

pub type Result<T> = std::result::Result<T, NoiseError>;
