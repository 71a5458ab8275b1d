use std::collections::VecDeque;

use x25519_dalek::PublicKey;

use crate::cipher_state::CipherState;
use crate::error::NoiseError;
use crate::pattern::{self, HandshakePattern, PatternId, Token};
use crate::primitives::KeyPair;
use crate::symmetric_state::SymmetricState;

/// Outcome of a single `write_message`/`read_message` step. Surfaces
/// whether the handshake has more messages left or has just produced the
/// split transport ciphers, rather than hiding that fact behind a mutable
/// `should_write` flag probed separately.
pub enum HandshakeProgress {
    Continue(Vec<u8>),
    Complete {
        message: Vec<u8>,
        send: CipherState,
        recv: CipherState,
    },
}

#[derive(PartialEq, Eq)]
enum Turn {
    AwaitingLocalWrite,
    AwaitingRemoteRead,
    Done,
}

/// Owns the four key-pair slots (`s`, `e`, `rs`, `re`), a symmetric state,
/// a role flag, and the remaining message patterns. Drives `write_message`
/// and `read_message` over a declarative token pattern until `remaining`
/// is empty, at which point it yields two transport [`CipherState`]s.
pub struct HandshakeState {
    sym: SymmetricState,
    initiator: bool,
    turn: Turn,
    s: Option<KeyPair>,
    e: Option<KeyPair>,
    rs: Option<PublicKey>,
    re: Option<PublicKey>,
    psk: Option<[u8; 32]>,
    remaining: VecDeque<&'static [Token]>,
    /// Injected ephemeral key used only by test vectors; never reachable
    /// from normal handshake driving.
    debug_ephemeral: Option<[u8; 32]>,
}

pub struct InitArgs {
    pub pattern_id: PatternId,
    pub initiator: bool,
    pub prologue: Vec<u8>,
    pub s: Option<KeyPair>,
    pub rs: Option<PublicKey>,
    /// Pre-supplied ephemeral keys are never accepted (no fallback handshakes).
    pub e: Option<KeyPair>,
    pub re: Option<PublicKey>,
    pub psk: Option<[u8; 32]>,
}

impl HandshakeState {
    pub fn initialize(args: InitArgs) -> Result<Self, NoiseError> {
        if args.e.is_some() || args.re.is_some() {
            return Err(NoiseError::UnsupportedFallback);
        }

        let pattern = pattern::lookup(args.pattern_id);
        let protocol_name = format!("Noise_{}_25519_ChaChaPoly_SHA256", pattern.name);
        let mut sym = SymmetricState::initialize(&protocol_name);
        sym.mix_hash(&args.prologue);

        mix_pre_message(&mut sym, &pattern, true, args.initiator, args.s.as_ref(), args.rs.as_ref())?;
        mix_pre_message(&mut sym, &pattern, false, args.initiator, args.s.as_ref(), args.rs.as_ref())?;

        let remaining = pattern.messages.iter().copied().collect();

        Ok(HandshakeState {
            sym,
            initiator: args.initiator,
            turn: if args.initiator {
                Turn::AwaitingLocalWrite
            } else {
                Turn::AwaitingRemoteRead
            },
            s: args.s,
            e: None,
            rs: args.rs,
            re: None,
            psk: args.psk,
            remaining,
            debug_ephemeral: None,
        })
    }

    #[cfg(test)]
    pub fn set_debug_ephemeral(&mut self, private: [u8; 32]) {
        self.debug_ephemeral = Some(private);
    }

    pub fn remote_static(&self) -> Option<[u8; 32]> {
        self.rs.map(|pk| pk.to_bytes())
    }

    pub fn handshake_hash(&self) -> [u8; 32] {
        self.sym.handshake_hash()
    }

    /// `true` if the next call should be `write_message`, `false` if it
    /// should be `read_message`. Exposes the `{AwaitingLocalWrite,
    /// AwaitingRemoteRead}` split so a transport driving the handshake
    /// doesn't need to guess or hold its own mirrored flag.
    pub fn should_write(&self) -> bool {
        self.turn == Turn::AwaitingLocalWrite
    }

    /// `true` once `remaining` is empty and the handshake has produced its
    /// split cipher states.
    pub fn is_complete(&self) -> bool {
        self.turn == Turn::Done
    }

    pub fn write_message(&mut self, payload: &[u8]) -> Result<HandshakeProgress, NoiseError> {
        if self.turn != Turn::AwaitingLocalWrite {
            return Err(NoiseError::OutOfTurn);
        }
        let tokens = self
            .remaining
            .pop_front()
            .ok_or(NoiseError::AlreadyEstablished)?;

        let mut out = Vec::new();
        for token in tokens {
            self.write_token(*token, &mut out)?;
        }
        let ct = self.sym.encrypt_and_hash(payload)?;
        out.extend_from_slice(&ct);

        self.finish_step(out)
    }

    pub fn read_message(&mut self, message: &[u8]) -> Result<HandshakeProgress, NoiseError> {
        if self.turn != Turn::AwaitingRemoteRead {
            return Err(NoiseError::OutOfTurn);
        }
        let tokens = self
            .remaining
            .pop_front()
            .ok_or(NoiseError::AlreadyEstablished)?;

        let mut cursor = message;
        for token in tokens {
            self.read_token(*token, &mut cursor)?;
        }
        let payload = self.sym.decrypt_and_hash(cursor)?;

        self.finish_step(payload)
    }

    fn finish_step(&mut self, produced: Vec<u8>) -> Result<HandshakeProgress, NoiseError> {
        if self.remaining.is_empty() {
            self.turn = Turn::Done;
            // Splitting requires owning `self.sym`; swap in a cheap dummy
            // so `self` can still be dropped normally afterward.
            let sym = std::mem::replace(&mut self.sym, SymmetricState::initialize(""));
            let (c1, c2) = sym.split();
            let (send, recv) = if self.initiator { (c1, c2) } else { (c2, c1) };
            Ok(HandshakeProgress::Complete {
                message: produced,
                send,
                recv,
            })
        } else {
            self.turn = match self.turn {
                Turn::AwaitingLocalWrite => Turn::AwaitingRemoteRead,
                Turn::AwaitingRemoteRead => Turn::AwaitingLocalWrite,
                Turn::Done => unreachable!("remaining is non-empty"),
            };
            Ok(HandshakeProgress::Continue(produced))
        }
    }

    fn write_token(&mut self, token: Token, out: &mut Vec<u8>) -> Result<(), NoiseError> {
        match token {
            Token::E => {
                let e = match self.debug_ephemeral.take() {
                    Some(private) => KeyPair::from_private(private),
                    None => KeyPair::generate(),
                };
                let public = e.public();
                out.extend_from_slice(&public);
                self.sym.mix_hash(&public);
                if self.psk.is_some() {
                    self.sym.mix_key(&public);
                }
                self.e = Some(e);
            }
            Token::S => {
                let s = self.s.as_ref().ok_or(NoiseError::MissingRequiredKey("s"))?;
                let ct = self.sym.encrypt_and_hash(&s.public())?;
                out.extend_from_slice(&ct);
            }
            Token::Ee => {
                let e = self.e.as_ref().ok_or(NoiseError::MissingRequiredKey("e"))?;
                let re = self.re.ok_or(NoiseError::MissingRequiredKey("re"))?;
                self.sym.mix_key(&e.dh(&re));
            }
            Token::Es => {
                let dh = if self.initiator {
                    let e = self.e.as_ref().ok_or(NoiseError::MissingRequiredKey("e"))?;
                    let rs = self.rs.ok_or(NoiseError::MissingRequiredKey("rs"))?;
                    e.dh(&rs)
                } else {
                    let s = self.s.as_ref().ok_or(NoiseError::MissingRequiredKey("s"))?;
                    let re = self.re.ok_or(NoiseError::MissingRequiredKey("re"))?;
                    s.dh(&re)
                };
                self.sym.mix_key(&dh);
            }
            Token::Se => {
                let dh = if self.initiator {
                    let s = self.s.as_ref().ok_or(NoiseError::MissingRequiredKey("s"))?;
                    let re = self.re.ok_or(NoiseError::MissingRequiredKey("re"))?;
                    s.dh(&re)
                } else {
                    let e = self.e.as_ref().ok_or(NoiseError::MissingRequiredKey("e"))?;
                    let rs = self.rs.ok_or(NoiseError::MissingRequiredKey("rs"))?;
                    e.dh(&rs)
                };
                self.sym.mix_key(&dh);
            }
            Token::Ss => {
                let s = self.s.as_ref().ok_or(NoiseError::MissingRequiredKey("s"))?;
                let rs = self.rs.ok_or(NoiseError::MissingRequiredKey("rs"))?;
                self.sym.mix_key(&s.dh(&rs));
            }
            Token::Psk => {
                let psk = self.psk.ok_or(NoiseError::MissingRequiredKey("psk"))?;
                self.sym.mix_key_and_hash(&psk);
            }
        }
        Ok(())
    }

    fn read_token(&mut self, token: Token, cursor: &mut &[u8]) -> Result<(), NoiseError> {
        match token {
            Token::E => {
                let bytes = take(cursor, 32)?;
                let mut arr = [0u8; 32];
                arr.copy_from_slice(bytes);
                let re = PublicKey::from(arr);
                self.sym.mix_hash(&arr);
                if self.psk.is_some() {
                    self.sym.mix_key(&arr);
                }
                self.re = Some(re);
            }
            Token::S => {
                let len = if self.sym.has_key() { 32 + 16 } else { 32 };
                let bytes = take(cursor, len)?;
                let rs_bytes = self.sym.decrypt_and_hash(bytes)?;
                if rs_bytes.len() != 32 {
                    return Err(NoiseError::BufferTooShort);
                }
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&rs_bytes);
                self.rs = Some(PublicKey::from(arr));
            }
            Token::Ee => {
                let e = self.e.as_ref().ok_or(NoiseError::MissingRequiredKey("e"))?;
                let re = self.re.ok_or(NoiseError::MissingRequiredKey("re"))?;
                self.sym.mix_key(&e.dh(&re));
            }
            Token::Es => {
                let dh = if self.initiator {
                    let e = self.e.as_ref().ok_or(NoiseError::MissingRequiredKey("e"))?;
                    let rs = self.rs.ok_or(NoiseError::MissingRequiredKey("rs"))?;
                    e.dh(&rs)
                } else {
                    let s = self.s.as_ref().ok_or(NoiseError::MissingRequiredKey("s"))?;
                    let re = self.re.ok_or(NoiseError::MissingRequiredKey("re"))?;
                    s.dh(&re)
                };
                self.sym.mix_key(&dh);
            }
            Token::Se => {
                let dh = if self.initiator {
                    let s = self.s.as_ref().ok_or(NoiseError::MissingRequiredKey("s"))?;
                    let re = self.re.ok_or(NoiseError::MissingRequiredKey("re"))?;
                    s.dh(&re)
                } else {
                    let e = self.e.as_ref().ok_or(NoiseError::MissingRequiredKey("e"))?;
                    let rs = self.rs.ok_or(NoiseError::MissingRequiredKey("rs"))?;
                    e.dh(&rs)
                };
                self.sym.mix_key(&dh);
            }
            Token::Ss => {
                let s = self.s.as_ref().ok_or(NoiseError::MissingRequiredKey("s"))?;
                let rs = self.rs.ok_or(NoiseError::MissingRequiredKey("rs"))?;
                self.sym.mix_key(&s.dh(&rs));
            }
            Token::Psk => {
                let psk = self.psk.ok_or(NoiseError::MissingRequiredKey("psk"))?;
                self.sym.mix_key_and_hash(&psk);
            }
        }
        Ok(())
    }
}

fn take<'a>(cursor: &mut &'a [u8], len: usize) -> Result<&'a [u8], NoiseError> {
    if cursor.len() < len {
        return Err(NoiseError::BufferTooShort);
    }
    let (head, tail) = cursor.split_at(len);
    *cursor = tail;
    Ok(head)
}

/// Processes one side's pre-message token list (`initiator_side == true`
/// for `pattern.pre_initiator`, `false` for `pattern.pre_responder`),
/// mixing in the appropriate static public key: our own if we play that
/// role, the remote's otherwise. The compiled-in pattern table never
/// contains a pre-message token other than `s`.
fn mix_pre_message(
    sym: &mut SymmetricState,
    pattern: &HandshakePattern,
    initiator_side: bool,
    we_are_initiator: bool,
    s: Option<&KeyPair>,
    rs: Option<&PublicKey>,
) -> Result<(), NoiseError> {
    let tokens = if initiator_side {
        pattern.pre_initiator
    } else {
        pattern.pre_responder
    };
    for token in tokens {
        match token {
            Token::S => {
                let we_own_this_side = initiator_side == we_are_initiator;
                let public = if we_own_this_side {
                    s.ok_or(NoiseError::MissingRequiredKey("s"))?.public()
                } else {
                    rs.ok_or(NoiseError::MissingRequiredKey("rs"))?.to_bytes()
                };
                sym.mix_hash(&public);
            }
            _ => unreachable!("pattern registry never emits non-s pre-message tokens"),
        }
    }
    Ok(())
}
