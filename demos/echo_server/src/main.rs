use std::error::Error;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bytes::Bytes;
use raknet_core::{
    ServerConfig,
    protocol::frame::Frame,
    transport::{Application, Message, RaknetListener},
};

/// Sessions silent for this long are closed.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Collects frames during dispatch; they are echoed once the listener is
/// free to send again.
#[derive(Default)]
struct Inbox {
    pending: Vec<(SocketAddr, Frame)>,
}

impl Application for Inbox {
    fn on_connected_frame(&mut self, frame: &Frame, peer: SocketAddr) {
        self.pending.push((peer, frame.clone()));
    }

    fn on_connected(&mut self, peer: SocketAddr) {
        println!("[{}] connected", peer);
    }

    fn on_disconnected(&mut self, peer: SocketAddr) {
        println!("[{}] disconnected", peer);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let bind_addr: SocketAddr = "0.0.0.0:19132".parse()?;
    let config = ServerConfig::default()
        .max_mtu(1400)
        .advertisement(Bytes::from_static(
            b"MCPE;raknet-core echo;527;1.19.1;0;10;0;echo;Survival;1;19132",
        ));

    let mut listener = RaknetListener::bind(bind_addr, config).await?;
    println!("Echo server listening on: {}", listener.local_addr());

    let mut inbox = Inbox::default();
    loop {
        listener.process_next(&mut inbox).await?;

        for (peer, frame) in inbox.pending.drain(..) {
            let message = Message::new(frame.body).reliability(frame.reliability);
            if let Err(e) = listener.send(peer, message) {
                tracing::warn!(peer = %peer, error = %e, "echo failed");
            }
        }

        let now = Instant::now();
        listener.sweep(
            |session| now.duration_since(session.last_activity()) > IDLE_TIMEOUT,
            &mut inbox,
        );
    }
}
