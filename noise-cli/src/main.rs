use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use noise_core::{HandshakeState, InitArgs, KeyPair, PatternId};
use noise_transport::{AllowAny, Channel};
use tracing::info;

#[derive(Parser)]
#[command(name = "noise-cli", about = "Drive a Noise XX handshake and transport channel over TCP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Listen for a single inbound XX handshake, then echo transport records.
    Listen {
        #[arg(long, default_value = "127.0.0.1:4433")]
        addr: SocketAddr,
    },
    /// Dial a listener, run the XX handshake, then send one message.
    Dial {
        #[arg(long, default_value = "127.0.0.1:4433")]
        addr: SocketAddr,
        #[arg(long, default_value = "hello over noise")]
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Listen { addr } => run_listener(addr).await,
        Command::Dial { addr, message } => run_dialer(addr, &message).await,
    }
}

async fn run_listener(addr: SocketAddr) -> anyhow::Result<()> {
    let mut incoming = noise_transport::listen(addr).await?;
    info!(%addr, "listening");
    let (stream, peer) = incoming.accept().await?;
    info!(%peer, "accepted connection");

    let local = KeyPair::generate();
    let hs = HandshakeState::initialize(InitArgs {
        pattern_id: PatternId::Xx,
        initiator: false,
        prologue: vec![],
        s: Some(local),
        rs: None,
        e: None,
        re: None,
        psk: None,
    })?;

    let mut channel = Channel::new(stream, hs, Some(Arc::new(AllowAny)), vec![], false);
    channel.ensure_handshake(&[]).await?;
    info!("handshake established");

    let message = channel.read().await?;
    info!(message = %String::from_utf8_lossy(&message), "received");
    channel.write(b"ack").await?;
    channel.close().await?;
    Ok(())
}

async fn run_dialer(addr: SocketAddr, message: &str) -> anyhow::Result<()> {
    let stream = noise_transport::connect(addr).await?;
    info!(%addr, "connected");

    let local = KeyPair::generate();
    let hs = HandshakeState::initialize(InitArgs {
        pattern_id: PatternId::Xx,
        initiator: true,
        prologue: vec![],
        s: Some(local),
        rs: None,
        e: None,
        re: None,
        psk: None,
    })?;

    let mut channel = Channel::new(stream, hs, Some(Arc::new(AllowAny)), vec![], false);
    channel.write(message.as_bytes()).await?;
    let reply = channel.read().await?;
    info!(reply = %String::from_utf8_lossy(&reply), "received reply");
    channel.close().await?;
    Ok(())
}
