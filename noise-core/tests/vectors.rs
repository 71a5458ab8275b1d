use noise_core::{HandshakeProgress, HandshakeState, InitArgs, KeyPair, NoiseError, PatternId};

struct Driven {
    send: noise_core::CipherState,
    recv: noise_core::CipherState,
}

fn drive(id: PatternId, init_has_static: bool, resp_has_static: bool) -> (Driven, Driven) {
    let init_s = init_has_static.then(KeyPair::generate);
    let resp_s = resp_has_static.then(KeyPair::generate);
    let init_rs = resp_s.as_ref().map(KeyPair::public_key);
    let resp_rs = init_s.as_ref().map(KeyPair::public_key);

    let (init_needs_rs, resp_needs_rs) = pre_knowledge(id);

    let mut initiator = HandshakeState::initialize(InitArgs {
        pattern_id: id,
        initiator: true,
        prologue: b"vectors".to_vec(),
        s: init_s,
        rs: if init_needs_rs { init_rs } else { None },
        e: None,
        re: None,
        psk: None,
    })
    .expect("initiator initialize");
    let mut responder = HandshakeState::initialize(InitArgs {
        pattern_id: id,
        initiator: false,
        prologue: b"vectors".to_vec(),
        s: resp_s,
        rs: if resp_needs_rs { resp_rs } else { None },
        e: None,
        re: None,
        psk: None,
    })
    .expect("responder initialize");

    let mut writer_is_initiator = true;
    loop {
        let (writer, reader): (&mut HandshakeState, &mut HandshakeState) = if writer_is_initiator {
            (&mut initiator, &mut responder)
        } else {
            (&mut responder, &mut initiator)
        };
        let progress = writer.write_message(b"").expect("write_message");
        let message = match &progress {
            HandshakeProgress::Continue(m) => m.clone(),
            HandshakeProgress::Complete { message, .. } => message.clone(),
        };
        let read_progress = reader.read_message(&message).expect("read_message");

        if let (
            HandshakeProgress::Complete { send: w_send, recv: w_recv, .. },
            HandshakeProgress::Complete { send: r_send, recv: r_recv, .. },
        ) = (progress, read_progress)
        {
            let (initiator_pair, responder_pair) = if writer_is_initiator {
                (Driven { send: w_send, recv: w_recv }, Driven { send: r_send, recv: r_recv })
            } else {
                (Driven { send: r_send, recv: r_recv }, Driven { send: w_send, recv: w_recv })
            };
            return (initiator_pair, responder_pair);
        }
        writer_is_initiator = !writer_is_initiator;
    }
}

/// Returns whether the initiator/responder must be handed the peer's
/// static public key ahead of time for pattern `id`, i.e. whether the
/// pattern's pre-message list names the other side's `s` token.
fn pre_knowledge(id: PatternId) -> (bool, bool) {
    match id {
        PatternId::N => (true, false),
        PatternId::K => (true, true),
        PatternId::X => (true, false),
        PatternId::Kk => (true, true),
        PatternId::Nx => (false, false),
        PatternId::Nk => (true, false),
        PatternId::Xx => (false, false),
    }
}

fn static_needs(id: PatternId) -> (bool, bool) {
    match id {
        PatternId::N => (false, true),
        PatternId::K => (true, true),
        PatternId::X => (true, true),
        PatternId::Kk => (true, true),
        PatternId::Nx => (false, true),
        PatternId::Nk => (false, true),
        PatternId::Xx => (true, true),
    }
}

#[test]
fn every_minimum_pattern_completes_with_matching_split_keys() {
    for id in [
        PatternId::N,
        PatternId::K,
        PatternId::X,
        PatternId::Kk,
        PatternId::Nx,
        PatternId::Nk,
        PatternId::Xx,
    ] {
        let (init_has_static, resp_has_static) = static_needs(id);
        let (initiator, responder) = drive(id, init_has_static, resp_has_static);
        assert_eq!(initiator.send.nonce(), 0);
        assert_eq!(responder.recv.nonce(), 0);
        // Both sides must be able to use their split ciphers to exchange
        // an authenticated record in each direction.
        let mut init_send = initiator.send;
        let mut resp_recv = responder.recv;
        let ct = init_send.encrypt_with_ad(b"", b"ping").unwrap();
        assert_eq!(resp_recv.decrypt_with_ad(b"", &ct).unwrap(), b"ping");

        let mut resp_send = responder.send;
        let mut init_recv = initiator.recv;
        let ct = resp_send.encrypt_with_ad(b"", b"pong").unwrap();
        assert_eq!(init_recv.decrypt_with_ad(b"", &ct).unwrap(), b"pong");
    }
}

#[test]
fn xx_handshake_with_payloads_then_transport_records() {
    let init_s = KeyPair::generate();
    let resp_s = KeyPair::generate();

    let mut initiator = HandshakeState::initialize(InitArgs {
        pattern_id: PatternId::Xx,
        initiator: true,
        prologue: vec![],
        s: Some(init_s),
        rs: None,
        e: None,
        re: None,
        psk: None,
    })
    .unwrap();
    let mut responder = HandshakeState::initialize(InitArgs {
        pattern_id: PatternId::Xx,
        initiator: false,
        prologue: vec![],
        s: Some(resp_s),
        rs: None,
        e: None,
        re: None,
        psk: None,
    })
    .unwrap();

    // -> e
    let HandshakeProgress::Continue(m1) = initiator.write_message(b"salut").unwrap() else {
        panic!("first XX message should not complete the handshake")
    };
    let HandshakeProgress::Continue(_) = responder.read_message(&m1).unwrap() else {
        panic!("responder should not complete on first message")
    };

    // <- e, ee, s, es
    let HandshakeProgress::Continue(m2) = responder.write_message(b"ca va ?").unwrap() else {
        panic!("second XX message should not complete the handshake")
    };
    let HandshakeProgress::Continue(_) = initiator.read_message(&m2).unwrap() else {
        panic!("initiator should not complete on second message")
    };

    // -> s, se
    let HandshakeProgress::Complete { message: m3, send: i_send, recv: i_recv } =
        initiator.write_message(b"oui et toi ?").unwrap()
    else {
        panic!("third XX message should complete the handshake")
    };
    let HandshakeProgress::Complete { send: r_send, recv: r_recv, .. } =
        responder.read_message(&m3).unwrap()
    else {
        panic!("responder should complete alongside the initiator")
    };

    let mut i_send = i_send;
    let mut i_recv = i_recv;
    let mut r_send = r_send;
    let mut r_recv = r_recv;

    let ct = i_send.encrypt_with_ad(b"", b"hello!").unwrap();
    assert_eq!(r_recv.decrypt_with_ad(b"", &ct).unwrap(), b"hello!");

    let ct = r_send.encrypt_with_ad(b"", b"this is a longer message").unwrap();
    assert_eq!(i_recv.decrypt_with_ad(b"", &ct).unwrap(), b"this is a longer message");
}

#[test]
fn truncated_static_key_record_fails() {
    let init_s = KeyPair::generate();
    let resp_s = KeyPair::generate();

    let mut initiator = HandshakeState::initialize(InitArgs {
        pattern_id: PatternId::Xx,
        initiator: true,
        prologue: vec![],
        s: Some(init_s),
        rs: None,
        e: None,
        re: None,
        psk: None,
    })
    .unwrap();
    let mut responder = HandshakeState::initialize(InitArgs {
        pattern_id: PatternId::Xx,
        initiator: false,
        prologue: vec![],
        s: Some(resp_s),
        rs: None,
        e: None,
        re: None,
        psk: None,
    })
    .unwrap();

    let HandshakeProgress::Continue(m1) = initiator.write_message(b"").unwrap() else {
        unreachable!()
    };
    responder.read_message(&m1).unwrap();
    let HandshakeProgress::Continue(m2) = responder.write_message(b"").unwrap() else {
        unreachable!()
    };
    initiator.read_message(&m2).unwrap();

    let HandshakeProgress::Complete { message: m3, .. } = initiator.write_message(b"").unwrap() else {
        unreachable!()
    };
    let truncated = &m3[..31];
    let result = responder.read_message(truncated);
    assert!(matches!(result, Err(NoiseError::BufferTooShort)));
}
