use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};

/// Dials a TCP peer. The caller drives the Noise handshake over the
/// resulting stream via [`crate::Channel::new`] — this function only
/// establishes the ordered byte stream the channel binds to.
pub async fn connect(addr: SocketAddr) -> io::Result<TcpStream> {
    TcpStream::connect(addr).await
}

/// Binds a listening socket. Call [`Incoming::accept`] in a loop to drive
/// each inbound connection through its own responder-side handshake.
pub async fn listen(addr: SocketAddr) -> io::Result<Incoming> {
    Ok(Incoming {
        listener: TcpListener::bind(addr).await?,
    })
}

pub struct Incoming {
    listener: TcpListener,
}

impl Incoming {
    pub async fn accept(&mut self) -> io::Result<(TcpStream, SocketAddr)> {
        self.listener.accept().await
    }
}
