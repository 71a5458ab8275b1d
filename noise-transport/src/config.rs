use std::sync::Arc;

use noise_core::PatternId;
use serde::Deserialize;

use crate::verifier::PublicKeyVerifier;

/// Everything [`noise_core::HandshakeState::initialize`] needs, bundled so
/// a channel can drive the handshake without the caller touching
/// `noise-core` types directly.
#[derive(Clone, Deserialize)]
pub struct HandshakeConfig {
    pub pattern: PatternIdConfig,
    pub is_initiator: bool,
    #[serde(with = "hex_bytes", default)]
    pub prologue: Vec<u8>,
}

/// Serde-friendly mirror of [`PatternId`] — `noise-core`'s enum has no
/// serde support of its own since it never needs to cross a wire.
#[derive(Clone, Copy, Deserialize)]
pub enum PatternIdConfig {
    N,
    K,
    X,
    Kk,
    Nx,
    Nk,
    Xx,
}

impl From<PatternIdConfig> for PatternId {
    fn from(p: PatternIdConfig) -> Self {
        match p {
            PatternIdConfig::N => PatternId::N,
            PatternIdConfig::K => PatternId::K,
            PatternIdConfig::X => PatternId::X,
            PatternIdConfig::Kk => PatternId::Kk,
            PatternIdConfig::Nx => PatternId::Nx,
            PatternIdConfig::Nk => PatternId::Nk,
            PatternIdConfig::Xx => PatternId::Xx,
        }
    }
}

/// Channel-level configuration: the handshake parameters plus the
/// transport-facing knobs from spec §6 (`public_key_verifier`,
/// `static_public_key_proof`, `half_duplex`).
#[derive(Clone)]
pub struct ChannelConfig {
    pub handshake: HandshakeConfig,
    pub verifier: Option<Arc<dyn PublicKeyVerifier>>,
    pub static_public_key_proof: Vec<u8>,
    pub half_duplex: bool,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        hex_decode(&s).map_err(serde::de::Error::custom)
    }

    fn hex_decode(s: &str) -> Result<Vec<u8>, String> {
        if s.len() % 2 != 0 {
            return Err("odd-length hex string".into());
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string()))
            .collect()
    }
}
