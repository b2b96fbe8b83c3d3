use std::net::SocketAddr;

use bytes::Bytes;
use raknet_core::{
    RaknetError, ServerConfig,
    protocol::{
        ack::{AckKind, AckNackPayload},
        constants::DEFAULT_UNCONNECTED_MAGIC,
        datagram::FrameSet,
        frame::Frame,
        packet::{
            ConnectedPing, ConnectionRequest, DisconnectNotification, NewIncomingConnection,
            OpenConnectionRequest1, OpenConnectionRequest2, RaknetPacket, UnconnectedPing,
        },
        reliability::Reliability,
        state::SessionState,
        types::{EoBPadding, RaknetTime, Sequence24},
    },
    transport::{Application, Dispatcher},
};

type Outbox = Vec<(SocketAddr, Bytes)>;

const GUID: u64 = 0x1122_3344_5566_7788;

#[derive(Default)]
struct Recorder {
    frames: Vec<(SocketAddr, Bytes)>,
    connected: Vec<SocketAddr>,
    disconnected: Vec<SocketAddr>,
}

impl Application for Recorder {
    fn on_connected_frame(&mut self, frame: &Frame, peer: SocketAddr) {
        self.frames.push((peer, frame.body.clone()));
    }

    fn on_connected(&mut self, peer: SocketAddr) {
        self.connected.push(peer);
    }

    fn on_disconnected(&mut self, peer: SocketAddr) {
        self.disconnected.push(peer);
    }
}

fn server() -> SocketAddr {
    "127.0.0.1:19132".parse().unwrap()
}

fn client() -> SocketAddr {
    "127.0.0.1:50000".parse().unwrap()
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(ServerConfig::default().server_guid(GUID))
}

fn offline(packet: impl Into<RaknetPacket>) -> Bytes {
    packet.into().to_bytes()
}

fn frame_set(seq: u32, packet: impl Into<RaknetPacket>) -> Bytes {
    FrameSet {
        sequence: Sequence24::new(seq),
        frame: Frame::new(Reliability::ReliableOrdered, packet.into().to_bytes()),
    }
    .to_bytes()
}

fn decode_packet(bytes: &Bytes) -> RaknetPacket {
    RaknetPacket::decode(&mut bytes.clone()).unwrap()
}

fn decode_frame_set(bytes: &Bytes) -> FrameSet {
    FrameSet::decode(&mut bytes.clone()).unwrap()
}

fn open_connection_request_2(mtu: u16) -> OpenConnectionRequest2 {
    OpenConnectionRequest2 {
        magic: DEFAULT_UNCONNECTED_MAGIC,
        server_addr: server(),
        mtu,
        client_guid: 42,
    }
}

fn connection_request() -> ConnectionRequest {
    ConnectionRequest {
        client_guid: 42,
        timestamp: RaknetTime(1234),
        secure: false,
    }
}

fn new_incoming_connection() -> NewIncomingConnection {
    NewIncomingConnection {
        server_addr: server(),
        system_addresses: vec![client(); 10],
        request_timestamp: RaknetTime(1234),
        accepted_timestamp: RaknetTime(1300),
    }
}

/// Runs the whole handshake for `client()` and returns everything sent.
fn connect(d: &mut Dispatcher, app: &mut Recorder) -> Outbox {
    connect_with_mtu(d, app, 1200)
}

fn connect_with_mtu(d: &mut Dispatcher, app: &mut Recorder, mtu: u16) -> Outbox {
    let mut out = Outbox::new();
    let peer = client();
    d.handle_datagram(&offline(open_connection_request_2(mtu)), peer, &mut out, app)
        .unwrap();
    d.handle_datagram(&frame_set(0, connection_request()), peer, &mut out, app)
        .unwrap();
    d.handle_datagram(&frame_set(1, new_incoming_connection()), peer, &mut out, app)
        .unwrap();
    assert_eq!(d.session(&peer).unwrap().state(), SessionState::Connected);
    out
}

#[test]
fn full_handshake_then_user_frame() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    let mut out = Outbox::new();
    let peer = client();

    // Request 1: the reply MTU is the request datagram plus IP/UDP headers.
    let request_1 = offline(OpenConnectionRequest1 {
        magic: DEFAULT_UNCONNECTED_MAGIC,
        protocol_version: 11,
        padding: EoBPadding(1000),
    });
    d.handle_datagram(&request_1, peer, &mut out, &mut app).unwrap();
    assert!(d.session(&peer).is_none());
    match decode_packet(&out[0].1) {
        RaknetPacket::OpenConnectionReply1(reply) => {
            assert_eq!(reply.server_guid, GUID);
            assert_eq!(reply.mtu as usize, request_1.len() + 28);
        }
        other => panic!("expected reply 1, got {other:?}"),
    }

    // Request 2 creates the session.
    d.handle_datagram(&offline(open_connection_request_2(1046)), peer, &mut out, &mut app)
        .unwrap();
    let session = d.session(&peer).unwrap();
    assert_eq!(session.state(), SessionState::Handshaking);
    assert_eq!(session.mtu_size(), 1046);
    assert_eq!(session.client_guid(), 42);
    match decode_packet(&out[1].1) {
        RaknetPacket::OpenConnectionReply2(reply) => {
            assert_eq!(reply.client_addr, peer);
            assert_eq!(reply.mtu, 1046);
        }
        other => panic!("expected reply 2, got {other:?}"),
    }

    // Connection request: ack, then the acceptance in a reliable frame set.
    d.handle_datagram(&frame_set(0, connection_request()), peer, &mut out, &mut app)
        .unwrap();
    assert_eq!(out.len(), 4);
    let ack = AckNackPayload::decode(&mut out[2].1.clone()).unwrap();
    assert_eq!(ack.kind, AckKind::Ack);
    assert_eq!(ack.sequences, vec![Sequence24::new(0)]);

    let accepted = decode_frame_set(&out[3].1);
    assert_eq!(accepted.sequence, Sequence24::new(0));
    assert!(accepted.frame.reliability.is_reliable());
    match RaknetPacket::decode(&mut accepted.frame.body.clone()).unwrap() {
        RaknetPacket::ConnectionRequestAccepted(cra) => {
            assert_eq!(cra.client_addr, peer);
            assert_eq!(cra.request_timestamp, RaknetTime(1234));
            assert_eq!(cra.system_addresses.len(), 10);
        }
        other => panic!("expected acceptance, got {other:?}"),
    }
    assert_eq!(d.session(&peer).unwrap().state(), SessionState::Handshaking);

    // New incoming connection completes the handshake.
    d.handle_datagram(&frame_set(1, new_incoming_connection()), peer, &mut out, &mut app)
        .unwrap();
    assert_eq!(d.session(&peer).unwrap().state(), SessionState::Connected);
    assert_eq!(app.connected, vec![peer]);

    // Application data now reaches the callback.
    let user = FrameSet {
        sequence: Sequence24::new(2),
        frame: Frame::new(Reliability::ReliableOrdered, vec![0xfeu8, 1, 2, 3]),
    }
    .to_bytes();
    d.handle_datagram(&user, peer, &mut out, &mut app).unwrap();
    assert_eq!(app.frames, vec![(peer, Bytes::from_static(&[0xfe, 1, 2, 3]))]);
}

#[test]
fn unconnected_ping_gets_pong_without_session() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    let mut out = Outbox::new();

    let ping = offline(UnconnectedPing {
        ping_time: RaknetTime(99),
        magic: DEFAULT_UNCONNECTED_MAGIC,
        client_guid: 7,
    });
    d.handle_datagram(&ping, client(), &mut out, &mut app).unwrap();

    assert!(d.sessions().is_empty());
    assert_eq!(out.len(), 1);
    match decode_packet(&out[0].1) {
        RaknetPacket::UnconnectedPong(pong) => {
            assert_eq!(pong.ping_time, RaknetTime(99));
            assert_eq!(pong.server_guid, GUID);
        }
        other => panic!("expected pong, got {other:?}"),
    }
}

#[test]
fn wrong_magic_is_dropped() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    let mut out = Outbox::new();

    let ping = offline(UnconnectedPing {
        ping_time: RaknetTime(1),
        magic: [0u8; 16],
        client_guid: 7,
    });
    let result = d.handle_datagram(&ping, client(), &mut out, &mut app);
    assert!(matches!(result, Err(RaknetError::MalformedPacket(_))));
    assert!(out.is_empty());
}

#[test]
fn frame_set_from_stranger_is_dropped() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    let mut out = Outbox::new();

    let result = d.handle_datagram(&frame_set(0, connection_request()), client(), &mut out, &mut app);
    assert!(matches!(result, Err(RaknetError::UnknownMessageTag(0x84))));
    assert!(out.is_empty());
    assert!(d.sessions().is_empty());
}

#[test]
fn user_frame_before_handshake_completes_is_not_delivered() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    let mut out = Outbox::new();
    let peer = client();

    d.handle_datagram(&offline(open_connection_request_2(1200)), peer, &mut out, &mut app)
        .unwrap();
    let user = FrameSet {
        sequence: Sequence24::new(0),
        frame: Frame::new(Reliability::Reliable, vec![0xfeu8, 9]),
    }
    .to_bytes();
    let result = d.handle_datagram(&user, peer, &mut out, &mut app);

    assert!(matches!(result, Err(RaknetError::UnknownMessageTag(0xfe))));
    assert!(app.frames.is_empty());
    assert_eq!(d.session(&peer).unwrap().state(), SessionState::Handshaking);
}

#[test]
fn repeated_request_2_does_not_duplicate_session() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    let mut out = Outbox::new();
    let peer = client();

    let request = offline(open_connection_request_2(1200));
    d.handle_datagram(&request, peer, &mut out, &mut app).unwrap();
    d.handle_datagram(&request, peer, &mut out, &mut app).unwrap();
    assert_eq!(d.sessions().len(), 1);
    assert!(matches!(
        decode_packet(&out[1].1),
        RaknetPacket::OpenConnectionReply2(_)
    ));

    let mut d = dispatcher();
    connect(&mut d, &mut app);
    let mut out = Outbox::new();
    d.handle_datagram(&request, peer, &mut out, &mut app).unwrap();
    assert!(matches!(
        decode_packet(&out[0].1),
        RaknetPacket::AlreadyConnected(_)
    ));
    assert_eq!(d.session(&peer).unwrap().state(), SessionState::Connected);
}

#[test]
fn full_server_refuses_new_sessions() {
    let mut d = Dispatcher::new(ServerConfig::default().max_sessions(1));
    let mut app = Recorder::default();
    let mut out = Outbox::new();
    let other: SocketAddr = "127.0.0.1:50001".parse().unwrap();

    d.handle_datagram(&offline(open_connection_request_2(1200)), client(), &mut out, &mut app)
        .unwrap();
    d.handle_datagram(&offline(open_connection_request_2(1200)), other, &mut out, &mut app)
        .unwrap();

    assert_eq!(d.sessions().len(), 1);
    assert!(d.session(&other).is_none());
    assert!(matches!(
        decode_packet(&out[1].1),
        RaknetPacket::NoFreeIncomingConnections(_)
    ));
}

#[test]
fn connected_ping_is_answered_with_pong() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    connect(&mut d, &mut app);
    let mut out = Outbox::new();

    let ping = frame_set(
        2,
        ConnectedPing {
            ping_time: RaknetTime(555),
        },
    );
    d.handle_datagram(&ping, client(), &mut out, &mut app).unwrap();

    assert_eq!(out.len(), 2);
    let pong = decode_frame_set(&out[1].1);
    match RaknetPacket::decode(&mut pong.frame.body.clone()).unwrap() {
        RaknetPacket::ConnectedPong(pong) => assert_eq!(pong.ping_time, RaknetTime(555)),
        other => panic!("expected pong, got {other:?}"),
    }
    assert!(app.frames.is_empty());
}

#[test]
fn nack_resends_retained_frame_set() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    let handshake = connect(&mut d, &mut app);
    let peer = client();

    // The acceptance went out as sequence 0.
    let accepted = handshake
        .iter()
        .find(|(_, bytes)| bytes[0] == 0x84)
        .map(|(_, bytes)| bytes.clone())
        .unwrap();

    let mut out = Outbox::new();
    let nack = AckNackPayload::nack(vec![Sequence24::new(0)]).to_bytes();
    d.handle_datagram(&nack, peer, &mut out, &mut app).unwrap();
    assert_eq!(out, vec![(peer, accepted)]);

    let ack = AckNackPayload::ack(vec![Sequence24::new(0)]).to_bytes();
    d.handle_datagram(&ack, peer, &mut out, &mut app).unwrap();
    d.handle_datagram(&nack, peer, &mut out, &mut app).unwrap();
    assert_eq!(out.len(), 1);
}

#[test]
fn nack_naming_one_frame_set_many_times_resends_it_once() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    connect(&mut d, &mut app);
    let peer = client();

    // 1000 single records, all for sequence 0.
    let mut nack = vec![0xa0u8];
    nack.extend_from_slice(&1000u16.to_be_bytes());
    for _ in 0..1000 {
        nack.extend_from_slice(&[1, 0, 0, 0]);
    }

    let mut out = Outbox::new();
    d.handle_datagram(&nack, peer, &mut out, &mut app).unwrap();
    assert_eq!(out.len(), 1);
}

#[test]
fn peer_disconnect_removes_session() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    connect(&mut d, &mut app);
    let mut out = Outbox::new();

    d.handle_datagram(&frame_set(2, DisconnectNotification), client(), &mut out, &mut app)
        .unwrap();

    assert!(d.session(&client()).is_none());
    assert_eq!(app.disconnected, vec![client()]);
}

#[test]
fn server_disconnect_notifies_peer() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    connect(&mut d, &mut app);
    let mut out = Outbox::new();

    assert!(d.disconnect(client(), &mut out, &mut app));
    assert!(!d.disconnect(client(), &mut out, &mut app));

    assert_eq!(out.len(), 1);
    let notice = decode_frame_set(&out[0].1);
    assert_eq!(notice.frame.tag(), Some(0x15));
    assert_eq!(app.disconnected, vec![client()]);
}

#[test]
fn send_requires_connected_session() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    let mut out = Outbox::new();
    let peer = client();

    assert!(matches!(
        d.send(peer, vec![0xfeu8, 1], &mut out),
        Err(RaknetError::UnknownSession(_))
    ));

    d.handle_datagram(&offline(open_connection_request_2(1200)), peer, &mut out, &mut app)
        .unwrap();
    assert!(matches!(
        d.send(peer, vec![0xfeu8, 1], &mut out),
        Err(RaknetError::NotConnected(_))
    ));
}

#[test]
fn send_refuses_payload_over_mtu() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    connect(&mut d, &mut app);
    let mut out = Outbox::new();

    let result = d.send(client(), vec![0xfeu8; 1200], &mut out);
    assert!(matches!(
        result,
        Err(RaknetError::PayloadTooLarge { mtu: 1200, .. })
    ));
    assert!(out.is_empty());

    let seq = d.send(client(), vec![0xfeu8; 100], &mut out).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(decode_frame_set(&out[0].1).sequence, seq);
}

#[test]
fn sweep_closes_selected_sessions() {
    let mut d = dispatcher();
    let mut app = Recorder::default();
    connect(&mut d, &mut app);
    let mut out = Outbox::new();

    assert_eq!(d.sweep(|_| false, &mut out, &mut app), 0);
    assert_eq!(d.sweep(|s| s.is_connected(), &mut out, &mut app), 1);
    assert!(d.sessions().is_empty());
    assert_eq!(app.disconnected, vec![client()]);
}

#[test]
fn jumbo_mtu_request_cannot_carry_oversized_frames() {
    let mut d = Dispatcher::new(ServerConfig::default().max_mtu(9000));
    let mut app = Recorder::default();
    connect_with_mtu(&mut d, &mut app, 9000);
    assert_eq!(d.session(&client()).unwrap().mtu_size(), 1400);
    let mut out = Outbox::new();

    assert!(matches!(
        d.send(client(), vec![0x80u8; 8200], &mut out),
        Err(RaknetError::PayloadTooLarge { mtu: 1400, .. })
    ));
    assert!(out.is_empty());
}
