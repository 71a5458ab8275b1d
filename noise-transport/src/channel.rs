use std::sync::Arc;

use noise_core::{CipherState, HandshakeProgress, HandshakeState};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::TransportError;
use crate::verifier::PublicKeyVerifier;

/// `len` is part of the 65535-byte envelope, so max ciphertext per record
/// is `65535 - 2`, and max plaintext is that minus the 16-byte AEAD tag.
pub const MAX_CIPHERTEXT: usize = 65535 - 2;
pub const MAX_PLAINTEXT: usize = MAX_CIPHERTEXT - 16;

enum State {
    Handshake(HandshakeState),
    Established {
        read_cs: CipherState,
        write_cs: CipherState,
    },
}

/// Binds an underlying ordered byte stream to a handshake, then to the two
/// transport ciphers it produces. The first read or write drives the
/// handshake to completion; all records, handshake or transport, share the
/// same `u16_be length || bytes` framing.
pub struct Channel<S> {
    stream: S,
    state: State,
    verifier: Option<Arc<dyn PublicKeyVerifier>>,
    static_public_key_proof: Vec<u8>,
    half_duplex: bool,
    verified_remote_static: bool,
}

impl<S> Channel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        handshake: HandshakeState,
        verifier: Option<Arc<dyn PublicKeyVerifier>>,
        static_public_key_proof: Vec<u8>,
        half_duplex: bool,
    ) -> Self {
        Channel {
            stream,
            state: State::Handshake(handshake),
            verifier,
            static_public_key_proof,
            half_duplex,
            verified_remote_static: false,
        }
    }

    /// Drives the handshake to completion if it hasn't run yet. Idempotent:
    /// a no-op once the channel is `Established`. `initial_payload` rides
    /// on whichever of our own `write_message` steps is still pending.
    pub async fn ensure_handshake(&mut self, initial_payload: &[u8]) -> Result<(), TransportError> {
        loop {
            let should_write = match &self.state {
                State::Established { .. } => return Ok(()),
                State::Handshake(hs) => hs.should_write(),
            };

            if should_write {
                let hs = match &mut self.state {
                    State::Handshake(hs) => hs,
                    State::Established { .. } => unreachable!(),
                };
                let progress = hs.write_message(initial_payload)?;
                let bytes: &[u8] = match &progress {
                    HandshakeProgress::Continue(m) => m,
                    HandshakeProgress::Complete { message, .. } => message,
                };
                write_frame(&mut self.stream, bytes).await?;
                if let HandshakeProgress::Complete { send, recv, .. } = progress {
                    self.state = State::Established {
                        read_cs: recv,
                        write_cs: send,
                    };
                    return Ok(());
                }
            } else {
                let frame = read_frame(&mut self.stream).await?;
                let hs = match &mut self.state {
                    State::Handshake(hs) => hs,
                    State::Established { .. } => unreachable!(),
                };
                let progress = hs.read_message(&frame)?;
                if !self.verified_remote_static {
                    if let Some(rs) = hs.remote_static() {
                        self.check_verifier(&rs)?;
                        self.verified_remote_static = true;
                    }
                }
                if let HandshakeProgress::Complete { send, recv, .. } = progress {
                    self.state = State::Established {
                        read_cs: recv,
                        write_cs: send,
                    };
                    return Ok(());
                }
            }
        }
    }

    fn check_verifier(&self, remote_static: &[u8; 32]) -> Result<(), TransportError> {
        match &self.verifier {
            Some(v) if !v.verify(remote_static, &self.static_public_key_proof) => {
                Err(TransportError::UntrustedStaticKey)
            }
            _ => Ok(()),
        }
    }

    /// Fragments `plaintext` into `<= MAX_PLAINTEXT` chunks, encrypting and
    /// framing each independently; nonces increment automatically inside
    /// `write_cs`.
    pub async fn write(&mut self, plaintext: &[u8]) -> Result<(), TransportError> {
        self.ensure_handshake(&[]).await?;
        for chunk in plaintext.chunks(MAX_PLAINTEXT) {
            let ct = match &mut self.state {
                State::Established { write_cs, .. } => write_cs.encrypt_with_ad(&[], chunk)?,
                State::Handshake(_) => unreachable!("ensure_handshake leaves Established"),
            };
            write_frame(&mut self.stream, &ct).await?;
        }
        Ok(())
    }

    /// Reads exactly one transport record and returns its decrypted
    /// plaintext. Callers reassemble multi-record messages themselves.
    pub async fn read(&mut self) -> Result<Vec<u8>, TransportError> {
        self.ensure_handshake(&[]).await?;
        let frame = read_frame(&mut self.stream).await?;
        match &mut self.state {
            State::Established { read_cs, .. } => Ok(read_cs.decrypt_with_ad(&[], &frame)?),
            State::Handshake(_) => unreachable!("ensure_handshake leaves Established"),
        }
    }

    pub fn is_half_duplex(&self) -> bool {
        self.half_duplex
    }

    pub fn is_established(&self) -> bool {
        matches!(self.state, State::Established { .. })
    }

    /// Shuts down the underlying stream; any in-flight decryption of a
    /// truncated record on either side surfaces as `UnexpectedEof`.
    pub async fn close(mut self) -> Result<(), TransportError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

async fn write_frame<S: AsyncWrite + Unpin>(stream: &mut S, bytes: &[u8]) -> Result<(), TransportError> {
    let len = bytes.len() as u16;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(bytes).await?;
    Ok(())
}

async fn read_frame<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Vec<u8>, TransportError> {
    let mut len_bytes = [0u8; 2];
    stream
        .read_exact(&mut len_bytes)
        .await
        .map_err(|_| TransportError::UnexpectedEof)?;
    let len = u16::from_be_bytes(len_bytes) as usize;
    let mut body = vec![0u8; len];
    stream
        .read_exact(&mut body)
        .await
        .map_err(|_| TransportError::UnexpectedEof)?;
    Ok(body)
}
