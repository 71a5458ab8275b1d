//! Compile-time pattern registry: `N, K, X, KK, NX, NK, XX`.
//!
//! Token lists and pre-message lists are grounded in the reference NoiseGo
//! pattern table (`patterns.go`), which tabulates `N, KK, NX, NK, XX`
//! directly; `K` and `X` are supplemented here per the canonical Noise
//! specification §7.2-7.3 vectors, since that source omits the one-way
//! `K`/`X` patterns.

/// An atomic operation within a message pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    E,
    S,
    Ee,
    Es,
    Se,
    Ss,
    Psk,
}

/// Selects one of the compiled-in handshake patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternId {
    N,
    K,
    X,
    Kk,
    Nx,
    Nk,
    Xx,
}

impl PatternId {
    pub fn name(self) -> &'static str {
        match self {
            PatternId::N => "N",
            PatternId::K => "K",
            PatternId::X => "X",
            PatternId::Kk => "KK",
            PatternId::Nx => "NX",
            PatternId::Nk => "NK",
            PatternId::Xx => "XX",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "N" => Some(PatternId::N),
            "K" => Some(PatternId::K),
            "X" => Some(PatternId::X),
            "KK" => Some(PatternId::Kk),
            "NX" => Some(PatternId::Nx),
            "NK" => Some(PatternId::Nk),
            "XX" => Some(PatternId::Xx),
            _ => None,
        }
    }
}

/// `name`, pre-message token lists (initiator, responder), and the ordered
/// message-pattern token lists. Immutable; constructed fresh from a
/// `match` on [`PatternId`] rather than stored in a global table.
pub struct HandshakePattern {
    pub name: &'static str,
    pub pre_initiator: &'static [Token],
    pub pre_responder: &'static [Token],
    pub messages: &'static [&'static [Token]],
}

use Token::*;

const N_MESSAGES: &[&[Token]] = &[&[E, Es]];
const K_MESSAGES: &[&[Token]] = &[&[E, Es, Ss]];
const X_MESSAGES: &[&[Token]] = &[&[E, Es, S, Ss]];
const KK_MESSAGES: &[&[Token]] = &[&[E, Es, Ss], &[E, Ee, Se]];
const NX_MESSAGES: &[&[Token]] = &[&[E], &[E, Ee, S, Es]];
const NK_MESSAGES: &[&[Token]] = &[&[E, Es], &[E, Ee]];
const XX_MESSAGES: &[&[Token]] = &[&[E], &[E, Ee, S, Es], &[S, Se]];

/// Looks up the token table for a pattern. This function, not a mutable
/// global registry, is the single source of truth for pattern shape.
pub fn lookup(id: PatternId) -> HandshakePattern {
    match id {
        PatternId::N => HandshakePattern {
            name: "N",
            pre_initiator: &[],
            pre_responder: &[S],
            messages: N_MESSAGES,
        },
        PatternId::K => HandshakePattern {
            name: "K",
            pre_initiator: &[S],
            pre_responder: &[S],
            messages: K_MESSAGES,
        },
        PatternId::X => HandshakePattern {
            name: "X",
            pre_initiator: &[],
            pre_responder: &[S],
            messages: X_MESSAGES,
        },
        PatternId::Kk => HandshakePattern {
            name: "KK",
            pre_initiator: &[S],
            pre_responder: &[S],
            messages: KK_MESSAGES,
        },
        PatternId::Nx => HandshakePattern {
            name: "NX",
            pre_initiator: &[],
            pre_responder: &[],
            messages: NX_MESSAGES,
        },
        PatternId::Nk => HandshakePattern {
            name: "NK",
            pre_initiator: &[],
            pre_responder: &[S],
            messages: NK_MESSAGES,
        },
        PatternId::Xx => HandshakePattern {
            name: "XX",
            pre_initiator: &[],
            pre_responder: &[],
            messages: XX_MESSAGES,
        },
    }
}
