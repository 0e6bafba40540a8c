//! TCP listener adapter on the `async-io-mini` reactor.
//!
//! Accepting suspends on socket readiness, so a server waiting for its
//! next client never blocks the other duties.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};

use async_io_mini::Async;
use log::info;

use crate::app::ports::Listener;

pub struct TcpAcceptor {
    listener: Async<TcpListener>,
}

impl TcpAcceptor {
    pub fn bind(addr: SocketAddr) -> io::Result<Self> {
        let listener = Async::<TcpListener>::bind(addr)?;
        info!("Server: listening on {}", listener.get_ref().local_addr()?);
        Ok(Self { listener })
    }
}

impl Listener for TcpAcceptor {
    type Conn = Async<TcpStream>;

    async fn accept(&self) -> io::Result<Self::Conn> {
        let (stream, peer) = self.listener.accept().await?;
        info!("Server: client {} connected", peer);
        Ok(stream)
    }
}
