use zeroize::Zeroize;

use crate::cipher_state::CipherState;
use crate::error::NoiseError;
use crate::primitives::{self, HASHLEN};

/// Chaining key `ck`, transcript hash `h`, and an embedded [`CipherState`].
/// Incrementally mixes DH outputs and protocol data into a running secret
/// across the lifetime of a handshake.
pub struct SymmetricState {
    ck: [u8; 32],
    h: [u8; HASHLEN],
    cipher: CipherState,
}

impl SymmetricState {
    /// `h = protocol_name` padded/hashed to 32 bytes; `ck = h`; cipher empty.
    pub fn initialize(protocol_name: &str) -> Self {
        let name = protocol_name.as_bytes();
        let h = if name.len() <= HASHLEN {
            let mut padded = [0u8; HASHLEN];
            padded[..name.len()].copy_from_slice(name);
            padded
        } else {
            primitives::hash(name)
        };
        SymmetricState {
            ck: h,
            h,
            cipher: CipherState::empty(),
        }
    }

    pub fn handshake_hash(&self) -> [u8; HASHLEN] {
        self.h
    }

    pub fn has_key(&self) -> bool {
        self.cipher.has_key()
    }

    /// `out = hkdf(ck, ikm, 2); ck = out[0]; cipher = CipherState(out[1])`.
    pub fn mix_key(&mut self, ikm: &[u8]) {
        let (ck, temp_key) = primitives::hkdf2(&self.ck, ikm);
        self.ck = ck;
        self.cipher = CipherState::new(temp_key);
    }

    /// `h = SHA256(h || data)`.
    pub fn mix_hash(&mut self, data: &[u8]) {
        let mut concatenated = Vec::with_capacity(HASHLEN + data.len());
        concatenated.extend_from_slice(&self.h);
        concatenated.extend_from_slice(data);
        self.h = primitives::hash(&concatenated);
    }

    /// `out = hkdf(ck, ikm, 3); ck = out[0]; mix_hash(out[1]); cipher = CipherState(out[2])`.
    pub fn mix_key_and_hash(&mut self, ikm: &[u8]) {
        let (ck, h_material, temp_key) = primitives::hkdf3(&self.ck, ikm);
        self.ck = ck;
        self.mix_hash(&h_material);
        self.cipher = CipherState::new(temp_key);
    }

    /// `ct = cipher.encrypt_with_ad(h, pt); mix_hash(ct)`.
    pub fn encrypt_and_hash(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let h = self.h;
        let ct = self.cipher.encrypt_with_ad(&h, plaintext)?;
        self.mix_hash(&ct);
        Ok(ct)
    }

    /// `pt = cipher.decrypt_with_ad(h, ct); mix_hash(ct)` — the ciphertext,
    /// not the plaintext, is mixed into the transcript.
    pub fn decrypt_and_hash(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let h = self.h;
        let pt = self.cipher.decrypt_with_ad(&h, ciphertext)?;
        self.mix_hash(ciphertext);
        Ok(pt)
    }

    /// `out = hkdf(ck, "", 2)`; both resulting cipher states start at nonce 0.
    /// The initiator uses `c1` to send and `c2` to receive; the responder,
    /// the reverse. Consumes `self`.
    pub fn split(mut self) -> (CipherState, CipherState) {
        let (k1, k2) = primitives::hkdf2(&self.ck, &[]);
        self.ck.zeroize();
        (CipherState::new(k1), CipherState::new(k2))
    }
}

impl Drop for SymmetricState {
    fn drop(&mut self) {
        self.ck.zeroize();
    }
}
