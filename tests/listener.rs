//! Loopback tests for the Tokio listener.
//!
//! The client datagram is sent first and the listener processes exactly one
//! datagram, so each step is deterministic.

use std::net::SocketAddr;
use std::time::Duration;

use raknet_core::{
    ServerConfig,
    protocol::{
        constants::DEFAULT_UNCONNECTED_MAGIC,
        datagram::FrameSet,
        frame::Frame,
        packet::{
            ConnectionRequest, NewIncomingConnection, OpenConnectionRequest2, RaknetPacket,
            UnconnectedPing,
        },
        reliability::Reliability,
        state::SessionState,
        types::{RaknetTime, Sequence24},
    },
    transport::RaknetListener,
};
use tokio::net::UdpSocket;

async fn bind_pair() -> (RaknetListener, UdpSocket) {
    let any: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let listener = RaknetListener::bind(any, ServerConfig::default().server_guid(9))
        .await
        .expect("bind listener");
    let client = UdpSocket::bind(any).await.expect("bind client socket");
    client
        .connect(listener.local_addr())
        .await
        .expect("connect client socket");
    (listener, client)
}

async fn recv(client: &UdpSocket) -> Vec<u8> {
    let mut buf = vec![0u8; 2048];
    let len = tokio::time::timeout(Duration::from_secs(5), client.recv(&mut buf))
        .await
        .expect("reply timed out")
        .expect("recv failed");
    buf.truncate(len);
    buf
}

fn frame_set(seq: u32, packet: impl Into<RaknetPacket>) -> Vec<u8> {
    FrameSet {
        sequence: Sequence24::new(seq),
        frame: Frame::new(Reliability::ReliableOrdered, packet.into().to_bytes()),
    }
    .to_bytes()
    .to_vec()
}

#[tokio::test]
async fn unconnected_ping_over_loopback() {
    let (mut listener, client) = bind_pair().await;
    let mut app = |_: &Frame, _: SocketAddr| {};

    let ping = RaknetPacket::from(UnconnectedPing {
        ping_time: RaknetTime(42),
        magic: DEFAULT_UNCONNECTED_MAGIC,
        client_guid: 3,
    })
    .to_bytes();
    client.send(&ping).await.unwrap();
    listener.process_next(&mut app).await.unwrap();

    let reply = recv(&client).await;
    match RaknetPacket::decode(&mut &reply[..]).unwrap() {
        RaknetPacket::UnconnectedPong(pong) => {
            assert_eq!(pong.ping_time, RaknetTime(42));
            assert_eq!(pong.server_guid, 9);
        }
        other => panic!("expected pong, got {other:?}"),
    }
    assert!(listener.dispatcher().sessions().is_empty());
}

#[tokio::test]
async fn handshake_and_echo_over_loopback() {
    let (mut listener, client) = bind_pair().await;
    let client_addr = client.local_addr().unwrap();
    let mut received = Vec::new();
    let mut app = |frame: &Frame, peer: SocketAddr| received.push((peer, frame.body.clone()));

    let request = RaknetPacket::from(OpenConnectionRequest2 {
        magic: DEFAULT_UNCONNECTED_MAGIC,
        server_addr: listener.local_addr(),
        mtu: 1200,
        client_guid: 77,
    })
    .to_bytes();
    client.send(&request).await.unwrap();
    listener.process_next(&mut app).await.unwrap();
    assert!(matches!(
        RaknetPacket::decode(&mut &recv(&client).await[..]).unwrap(),
        RaknetPacket::OpenConnectionReply2(_)
    ));

    let connect = frame_set(
        0,
        ConnectionRequest {
            client_guid: 77,
            timestamp: RaknetTime(1),
            secure: false,
        },
    );
    client.send(&connect).await.unwrap();
    listener.process_next(&mut app).await.unwrap();
    assert_eq!(recv(&client).await[0], 0xc0);
    assert_eq!(recv(&client).await[0], 0x84);

    let incoming = frame_set(
        1,
        NewIncomingConnection {
            server_addr: listener.local_addr(),
            system_addresses: vec![client_addr; 10],
            request_timestamp: RaknetTime(1),
            accepted_timestamp: RaknetTime(2),
        },
    );
    client.send(&incoming).await.unwrap();
    listener.process_next(&mut app).await.unwrap();
    recv(&client).await;
    assert_eq!(
        listener
            .dispatcher()
            .session(&client_addr)
            .map(|s| s.state()),
        Some(SessionState::Connected)
    );

    let user = FrameSet {
        sequence: Sequence24::new(2),
        frame: Frame::new(Reliability::ReliableOrdered, vec![0xfeu8, 7, 7]),
    }
    .to_bytes();
    client.send(&user).await.unwrap();
    listener.process_next(&mut app).await.unwrap();
    recv(&client).await;

    listener.send(client_addr, vec![0xfeu8, 8]).unwrap();
    let echoed = recv(&client).await;
    let set = FrameSet::decode(&mut &echoed[..]).unwrap();
    assert_eq!(&set.frame.body[..], &[0xfe, 8]);

    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, client_addr);
    assert_eq!(&received[0].1[..], &[0xfe, 7, 7]);
}
