use thiserror::Error;

/// Error kinds surfaced by the handshake and cipher state machinery.
///
/// Configuration faults (`UnknownPattern`, `UnsupportedFallback`,
/// `MissingRequiredKey`) are detected at `initialize` time, before any bytes
/// are exchanged. Crypto failures (`DecryptFailure`, `NonceExhausted`) are
/// never recovered locally; they terminate the session.
#[derive(Debug, Error)]
pub enum NoiseError {
    #[error("unknown handshake pattern: {0}")]
    UnknownPattern(String),

    #[error("pre-supplied ephemeral key is not supported (no fallback handshakes)")]
    UnsupportedFallback,

    #[error("pattern requires a key that was not supplied: {0}")]
    MissingRequiredKey(&'static str),

    #[error("pattern transmits a static key but no verifier was configured")]
    MissingVerifier,

    #[error("handshake record shorter than the pattern requires")]
    BufferTooShort,

    #[error("AEAD authentication failed")]
    DecryptFailure,

    #[error("cipher nonce exhausted (reached 2^64 - 1 without rekeying)")]
    NonceExhausted,

    #[error("remote static key rejected by verifier")]
    UntrustedStaticKey,

    #[error("called write_message/read_message out of turn")]
    OutOfTurn,

    #[error("handshake already complete; no further operations are permitted")]
    AlreadyEstablished,
}
