use zeroize::Zeroize;

use crate::error::NoiseError;
use crate::primitives;

/// A 32-byte key plus a 64-bit nonce counter. Stateless across instances;
/// `encrypt_with_ad`/`decrypt_with_ad` are the only operations that advance
/// the nonce, and only on success.
///
/// If no key has been set yet (`key = None`), both operations pass the
/// payload through unchanged — this is the "key not yet established" case
/// used before the first DH mixes material into the symmetric state.
#[derive(Clone)]
pub struct CipherState {
    key: Option<[u8; 32]>,
    n: u64,
}

impl CipherState {
    pub fn empty() -> Self {
        CipherState { key: None, n: 0 }
    }

    pub fn new(key: [u8; 32]) -> Self {
        CipherState { key: Some(key), n: 0 }
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Fails with [`NoiseError::NonceExhausted`] if `n == u64::MAX`. If no
    /// key is set, returns `plaintext` unchanged.
    pub fn encrypt_with_ad(&mut self, ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let key = match &self.key {
            None => return Ok(plaintext.to_vec()),
            Some(k) => k,
        };
        if self.n == u64::MAX {
            return Err(NoiseError::NonceExhausted);
        }
        let ct = primitives::encrypt(key, self.n, ad, plaintext);
        self.n += 1;
        Ok(ct)
    }

    /// Fails with [`NoiseError::NonceExhausted`] if `n == u64::MAX`. If no
    /// key is set, returns `ciphertext` unchanged. The nonce only advances
    /// on a successful decryption.
    pub fn decrypt_with_ad(&mut self, ad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let key = match &self.key {
            None => return Ok(ciphertext.to_vec()),
            Some(k) => k,
        };
        if self.n == u64::MAX {
            return Err(NoiseError::NonceExhausted);
        }
        let pt = primitives::decrypt(key, self.n, ad, ciphertext)?;
        self.n += 1;
        Ok(pt)
    }

    /// Replaces `k` with `rekey(k)`; `n` is untouched.
    pub fn rekey(&mut self) {
        if let Some(k) = &self.key {
            self.key = Some(primitives::rekey(k));
        }
    }

    pub fn nonce(&self) -> u64 {
        self.n
    }
}

impl Drop for CipherState {
    fn drop(&mut self) {
        if let Some(k) = &mut self.key {
            k.zeroize();
        }
    }
}
