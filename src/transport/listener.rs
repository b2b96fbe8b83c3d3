use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::{
    RaknetError, ServerConfig,
    protocol::{constants::UDP_HEADER_SIZE, types::Sequence24},
    session::Session,
};

use super::{Application, Dispatcher, Message};

/// Server-side RakNet listener bound to one UDP socket.
///
/// Datagrams are received and dispatched one at a time; every reply is sent
/// with a non-blocking `try_send_to` before the next datagram is read.
#[derive(Debug)]
pub struct RaknetListener {
    socket: UdpSocket,
    dispatcher: Dispatcher,
    local_addr: SocketAddr,
    buf: Vec<u8>,
}

impl RaknetListener {
    /// Binds a new listener to the specified address.
    pub async fn bind(addr: SocketAddr, config: ServerConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        let local_addr = socket.local_addr()?;
        let buf = vec![0u8; config.clamp_mtu(usize::MAX) as usize + UDP_HEADER_SIZE + 64];

        tracing::info!(addr = %local_addr, guid = config.server_guid, "listener bound");

        Ok(Self {
            socket,
            dispatcher: Dispatcher::new(config),
            local_addr,
            buf,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Waits for one datagram and runs it through the dispatcher.
    ///
    /// Only socket errors are returned; a dropped datagram is not an error
    /// here. Windows reports ICMP port unreachable as `ConnectionReset` on
    /// the next receive, which is ignored.
    pub async fn process_next<A>(&mut self, app: &mut A) -> io::Result<()>
    where
        A: Application + ?Sized,
    {
        let (len, peer) = match self.socket.recv_from(&mut self.buf).await {
            Ok(received) => received,
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => return Ok(()),
            Err(e) => return Err(e),
        };

        let _ = self
            .dispatcher
            .handle_datagram(&self.buf[..len], peer, &mut self.socket, app);
        Ok(())
    }

    /// Sends `message` to a connected peer, see [`Dispatcher::send`].
    pub fn send(
        &mut self,
        peer: SocketAddr,
        message: impl Into<Message>,
    ) -> Result<Sequence24, RaknetError> {
        self.dispatcher.send(peer, message, &mut self.socket)
    }

    pub fn disconnect<A>(&mut self, peer: SocketAddr, app: &mut A) -> bool
    where
        A: Application + ?Sized,
    {
        self.dispatcher.disconnect(peer, &mut self.socket, app)
    }

    /// Closes every session `predicate` selects, see [`Dispatcher::sweep`].
    pub fn sweep<A, F>(&mut self, predicate: F, app: &mut A) -> usize
    where
        A: Application + ?Sized,
        F: FnMut(&Session) -> bool,
    {
        self.dispatcher.sweep(predicate, &mut self.socket, app)
    }

    /// Serves forever, handing application frames to `app`.
    pub async fn run<A>(mut self, mut app: A)
    where
        A: Application,
    {
        loop {
            if let Err(e) = self.process_next(&mut app).await {
                // Don't break on transient errors
                tracing::error!("UDP socket error: {}", e);
            }
        }
    }
}
