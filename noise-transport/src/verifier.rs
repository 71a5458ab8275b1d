/// Capability the channel invokes when a static key is learned from the
/// remote party during the handshake (e.g. patterns `XX`, `NX`). Kept
/// abstract per the core spec — key-proof signing/verification is an
/// external collaborator, not part of this crate's concern.
pub trait PublicKeyVerifier: Send + Sync {
    fn verify(&self, public_key: &[u8; 32], proof: &[u8]) -> bool;
}

/// Accepts any remote static key unconditionally. Useful for tests and for
/// patterns where the remote key is already known out of band (`KK`, `NK`,
/// `K`) and therefore never reaches this capability.
pub struct AllowAny;

impl PublicKeyVerifier for AllowAny {
    fn verify(&self, _public_key: &[u8; 32], _proof: &[u8]) -> bool {
        true
    }
}
