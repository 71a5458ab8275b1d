//! Fixed-size cryptographic primitives: X25519 DH, ChaCha20-Poly1305 AEAD,
//! SHA-256, and the two/three-output HKDF used throughout the handshake.
//!
//! These are pure functions; nonce bookkeeping lives in [`crate::CipherState`].

use chacha20poly1305::aead::{AeadInPlace, NewAead};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce, Tag};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

use crate::error::NoiseError;

pub const DHLEN: usize = 32;
pub const HASHLEN: usize = 32;
pub const TAG_SIZE: usize = 16;

/// A DH key pair: a private scalar and its derived public point.
///
/// Zeroed on drop; the public half is not secret but travels with the
/// private half for convenience (mirrors the teacher's `KeyPair`-shaped
/// bundling of a secret key with its derived public key).
pub struct KeyPair {
    private: StaticSecret,
    public: PublicKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        let private = StaticSecret::random_from_rng(rand_core::OsRng);
        let public = PublicKey::from(&private);
        KeyPair { private, public }
    }

    pub fn from_private(private_bytes: [u8; DHLEN]) -> Self {
        let private = StaticSecret::from(private_bytes);
        let public = PublicKey::from(&private);
        KeyPair { private, public }
    }

    pub fn public(&self) -> [u8; DHLEN] {
        self.public.to_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// X25519 scalar multiplication of `self.private` by `peer_public`.
    pub fn dh(&self, peer_public: &PublicKey) -> [u8; DHLEN] {
        self.private.diffie_hellman(peer_public).to_bytes()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        // StaticSecret already zeroizes its own bytes on drop; the public
        // half is not secret, so there is nothing else to scrub here.
    }
}

/// 12-byte nonce = 4 zero bytes || 8-byte little-endian counter.
///
/// Pinned little-endian per Noise revision 34 and confirmed against the
/// reference NoiseGo implementation's `binary.LittleEndian` counter.
fn build_nonce(n: u64) -> Nonce {
    let mut bytes = [0u8; 12];
    bytes[4..].copy_from_slice(&n.to_le_bytes());
    Nonce::clone_from_slice(&bytes)
}

/// ChaCha20-Poly1305 encryption with a 12-byte nonce derived from `n`.
/// Appends the 16-byte tag to the returned ciphertext.
pub fn encrypt(key: &[u8; 32], n: u64, ad: &[u8], plaintext: &[u8]) -> Vec<u8> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = build_nonce(n);
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, ad, &mut buffer)
        .expect("chacha20poly1305 encryption is infallible for valid key/nonce sizes");
    buffer.extend_from_slice(&tag);
    buffer
}

/// ChaCha20-Poly1305 decryption; fails with [`NoiseError::DecryptFailure`]
/// if the AEAD tag does not verify or the input is shorter than a tag.
pub fn decrypt(key: &[u8; 32], n: u64, ad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(NoiseError::BufferTooShort);
    }
    let (body, tag_bytes) = ciphertext.split_at(ciphertext.len() - TAG_SIZE);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = build_nonce(n);
    let mut buffer = body.to_vec();
    cipher
        .decrypt_in_place_detached(&nonce, ad, &mut buffer, Tag::from_slice(tag_bytes))
        .map_err(|_| NoiseError::DecryptFailure)?;
    Ok(buffer)
}

/// `k' = first 32 bytes of encrypt(k, 2^64-1, "", 32 zero bytes)`.
pub fn rekey(key: &[u8; 32]) -> [u8; 32] {
    let zeros = [0u8; 32];
    let mut out = encrypt(key, u64::MAX, &[], &zeros);
    out.truncate(32);
    let mut rekeyed = [0u8; 32];
    rekeyed.copy_from_slice(&out);
    out.zeroize();
    rekeyed
}

/// SHA-256.
pub fn hash(data: &[u8]) -> [u8; HASHLEN] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// RFC 5869 HKDF-SHA256, fixed to two 32-byte outputs.
pub fn hkdf2(chaining_key: &[u8; 32], ikm: &[u8]) -> ([u8; 32], [u8; 32]) {
    let (_, hk) = Hkdf::<Sha256>::extract(Some(chaining_key), ikm);
    let mut okm = [0u8; 64];
    hk.expand(&[], &mut okm)
        .expect("64 bytes is a valid HKDF-SHA256 expand length");
    let mut o1 = [0u8; 32];
    let mut o2 = [0u8; 32];
    o1.copy_from_slice(&okm[..32]);
    o2.copy_from_slice(&okm[32..]);
    okm.zeroize();
    (o1, o2)
}

/// RFC 5869 HKDF-SHA256, fixed to three 32-byte outputs.
pub fn hkdf3(chaining_key: &[u8; 32], ikm: &[u8]) -> ([u8; 32], [u8; 32], [u8; 32]) {
    let (_, hk) = Hkdf::<Sha256>::extract(Some(chaining_key), ikm);
    let mut okm = [0u8; 96];
    hk.expand(&[], &mut okm)
        .expect("96 bytes is a valid HKDF-SHA256 expand length");
    let mut o1 = [0u8; 32];
    let mut o2 = [0u8; 32];
    let mut o3 = [0u8; 32];
    o1.copy_from_slice(&okm[..32]);
    o2.copy_from_slice(&okm[32..64]);
    o3.copy_from_slice(&okm[64..]);
    okm.zeroize();
    (o1, o2, o3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = [7u8; 32];
        let pt = b"salut";
        let ct = encrypt(&key, 0, b"ad", pt);
        let got = decrypt(&key, 0, b"ad", &ct).unwrap();
        assert_eq!(got, pt);
    }

    #[test]
    fn tampered_tag_fails() {
        let key = [7u8; 32];
        let mut ct = encrypt(&key, 0, b"", b"hello!");
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert!(matches!(decrypt(&key, 0, b"", &ct), Err(NoiseError::DecryptFailure)));
    }

    #[test]
    fn dh_agrees() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        assert_eq!(a.dh(&b.public_key()), b.dh(&a.public_key()));
    }

    proptest::proptest! {
        #[test]
        fn encrypt_decrypt_roundtrip_for_any_input(
            key: [u8; 32],
            n in 0u64..(u64::MAX - 1),
            ad: Vec<u8>,
            pt: Vec<u8>,
        ) {
            let ct = encrypt(&key, n, &ad, &pt);
            let got = decrypt(&key, n, &ad, &ct).unwrap();
            assert_eq!(got, pt);
        }

        #[test]
        fn decrypt_rejects_any_wrong_ad(
            key: [u8; 32],
            n in 0u64..(u64::MAX - 1),
            ad: Vec<u8>,
            wrong_ad: Vec<u8>,
            pt: Vec<u8>,
        ) {
            proptest::prop_assume!(ad != wrong_ad);
            let ct = encrypt(&key, n, &ad, &pt);
            assert!(decrypt(&key, n, &wrong_ad, &ct).is_err());
        }
    }
}
