use noise_core::NoiseError;
use thiserror::Error;

/// Transport-level errors, extending [`NoiseError`] with the two kinds
/// that only make sense once a handshake is bound to a real byte stream.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Handshake(#[from] NoiseError),

    #[error("underlying stream closed mid-record")]
    UnexpectedEof,

    #[error("remote static key rejected by verifier")]
    UntrustedStaticKey,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
