//! Tests for link establishment: SABM/UA exchange, contention resolution and
//! repeated or colliding SABMs.

use crate::{
    core::{
        entity::state::LinkState,
        test_utils::{TestLink, establish, init_tracing, pump, pump_until_idle},
    },
    link::{ChannelKind, Role},
    packet::{control::Control, frame::Frame},
    rll::RllPrimitive,
};
use bytes::Bytes;

const MAIN: ChannelKind = ChannelKind::Main;

fn cm_service_request() -> Bytes {
    Bytes::from_static(&[
        0x05, 0x24, 0x31, 0x03, 0x50, 0x18, 0x93, 0x08, 0x29, 0x47, 0x80, 0x00, 0x00, 0x00,
        0x00, 0x80,
    ])
}

#[tokio::test]
async fn test_sabm_ua_exchange_establishes_link() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);

    ms.request(MAIN, RllPrimitive::EstablishRequest(cm_service_request()))
        .unwrap();
    assert_eq!(ms.state(MAIN), LinkState::EstablishPending);

    // 1. The MS sends exactly one SABM command carrying the layer-3 message.
    let frames = ms.take_frames(MAIN);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].control, Control::Sabm { pf: true });
    assert!(!frames[0].address.cr, "MS commands use C/R = 0");
    assert_eq!(frames[0].payload, cm_service_request());

    // 2. The BTS accepts it and reports the piggybacked message upward.
    bts.receive_frame(MAIN, &frames[0]).unwrap();
    assert_eq!(bts.state(MAIN), LinkState::Established);
    assert_eq!(
        bts.take_messages(),
        vec![RllPrimitive::EstablishIndication(cm_service_request())]
    );

    // 3. The UA echoes the payload as a response with the F bit set.
    let frames = bts.take_frames(MAIN);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].control, Control::Ua { pf: true });
    assert!(!frames[0].address.cr, "BTS responses use C/R = 0");
    assert_eq!(frames[0].payload, cm_service_request());

    // 4. One UA completes establishment at the MS.
    ms.receive_frame(MAIN, &frames[0]).unwrap();
    assert_eq!(ms.state(MAIN), LinkState::Established);
    assert_eq!(
        ms.take_messages(),
        vec![RllPrimitive::EstablishConfirm(cm_service_request())]
    );
    assert!(ms.channel.next_deadline().is_none());
}

#[tokio::test]
async fn test_repeated_sabm_only_resends_ua() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);
    establish(&mut ms, &mut bts, MAIN);

    // The UA got lost and the MS repeats its SABM.
    let sabm = Frame::new_sabm(0, false, true, Bytes::from_static(b"\x05\x24\x31"));
    bts.receive_frame(MAIN, &sabm).unwrap();

    assert_eq!(bts.state(MAIN), LinkState::Established);
    assert!(bts.take_messages().is_empty(), "no second indication");
    let frames = bts.take_frames(MAIN);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].control, Control::Ua { pf: true });
}

#[tokio::test]
async fn test_new_sabm_on_established_link_reestablishes() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);
    establish(&mut ms, &mut bts, MAIN);

    let sabm = Frame::new_sabm(0, false, true, Bytes::from_static(b"\x06\x35"));
    bts.receive_frame(MAIN, &sabm).unwrap();

    assert_eq!(
        bts.take_messages(),
        vec![RllPrimitive::EstablishIndication(Bytes::from_static(b"\x06\x35"))]
    );
    assert_eq!(bts.take_frames(MAIN).len(), 1);
}

#[tokio::test]
async fn test_ua_with_foreign_payload_loses_contention() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    ms.request(MAIN, RllPrimitive::EstablishRequest(cm_service_request()))
        .unwrap();
    ms.take_frames(MAIN);

    let ua = Frame::new_ua(0, false, true, Bytes::from_static(b"\x05\x24\x00"));
    ms.receive_frame(MAIN, &ua).unwrap();

    assert_eq!(ms.state(MAIN), LinkState::Idle);
    assert_eq!(ms.take_messages(), vec![RllPrimitive::ReleaseIndication]);
    assert!(ms.channel.next_deadline().is_none());
}

#[tokio::test]
async fn test_dm_refuses_establishment() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    ms.request(MAIN, RllPrimitive::EstablishRequest(Bytes::new()))
        .unwrap();
    ms.take_frames(MAIN);

    ms.receive_frame(MAIN, &Frame::new_dm(0, false, true)).unwrap();
    assert_eq!(ms.state(MAIN), LinkState::Idle);
    assert_eq!(ms.take_messages(), vec![RllPrimitive::ReleaseIndication]);
}

#[tokio::test]
async fn test_simultaneous_sabm_establishes_both_sides() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);

    ms.request(MAIN, RllPrimitive::EstablishRequest(Bytes::from_static(b"ms")))
        .unwrap();
    bts.request(MAIN, RllPrimitive::EstablishRequest(Bytes::from_static(b"bts")))
        .unwrap();

    // Both SABMs are in the air at the same time.
    let from_ms = ms.take_frames(MAIN);
    let from_bts = bts.take_frames(MAIN);
    for frame in &from_bts {
        ms.receive_frame(MAIN, frame).unwrap();
    }
    for frame in &from_ms {
        bts.receive_frame(MAIN, frame).unwrap();
    }
    pump_until_idle(&mut ms, &mut bts, MAIN);

    assert_eq!(ms.state(MAIN), LinkState::Established);
    assert_eq!(bts.state(MAIN), LinkState::Established);
    assert_eq!(
        ms.take_messages(),
        vec![RllPrimitive::EstablishConfirm(Bytes::from_static(b"ms"))]
    );
    assert_eq!(
        bts.take_messages(),
        vec![RllPrimitive::EstablishConfirm(Bytes::from_static(b"bts"))]
    );
}

#[tokio::test]
async fn test_data_queued_during_establishment_follows_ua() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);

    ms.request(MAIN, RllPrimitive::EstablishRequest(Bytes::new()))
        .unwrap();
    ms.request(MAIN, RllPrimitive::DataRequest(Bytes::from_static(b"early")))
        .unwrap();
    assert_eq!(pump(&mut ms, &mut bts, MAIN), 1, "only the SABM goes out");

    pump_until_idle(&mut ms, &mut bts, MAIN);
    assert_eq!(
        bts.take_messages(),
        vec![
            RllPrimitive::EstablishIndication(Bytes::new()),
            RllPrimitive::DataIndication(Bytes::from_static(b"early")),
        ]
    );
}

#[tokio::test]
async fn test_frames_with_wrong_polarity_are_ignored() {
    init_tracing();
    let mut bts = TestLink::new(Role::Bts);

    // A SABM with C/R = 1 would be a BTS command; a BTS never receives one.
    let sabm = Frame::new_sabm(0, true, true, Bytes::new());
    bts.receive_frame(MAIN, &sabm).unwrap();

    assert_eq!(bts.state(MAIN), LinkState::Idle);
    assert!(bts.take_frames(MAIN).is_empty());
    assert!(bts.take_messages().is_empty());
}

#[tokio::test]
async fn test_idle_link_answers_with_dm() {
    init_tracing();
    let mut bts = TestLink::new(Role::Bts);

    let i_frame = Frame::new_i(0, false, 0, 0, true, false, Bytes::from_static(b"x"));
    bts.receive_frame(MAIN, &i_frame).unwrap();
    let disc = Frame::new_disc(0, false, false);
    bts.receive_frame(MAIN, &disc).unwrap();

    let frames = bts.take_frames(MAIN);
    assert_eq!(
        frames.iter().map(|f| f.control).collect::<Vec<_>>(),
        vec![Control::Dm { pf: true }, Control::Dm { pf: false }]
    );
    assert!(bts.take_messages().is_empty());
}

#[tokio::test]
async fn test_secondary_link_is_independent() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);

    ms.request(
        ChannelKind::Secondary,
        RllPrimitive::EstablishRequest(Bytes::new()),
    )
    .unwrap();
    let outbound = ms.take_outbound(ChannelKind::Secondary);
    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].data.len(), 21);
    assert_eq!(outbound[0].link_id.sapi(), 3);
    assert_eq!(outbound[0].link_id.kind(), ChannelKind::Secondary);
    assert!(ms.take_outbound(MAIN).is_empty());

    for primitive in outbound {
        bts.channel
            .deliver_physical_layer_primitive(primitive.into_indication())
            .unwrap();
    }
    pump_until_idle(&mut ms, &mut bts, ChannelKind::Secondary);

    assert_eq!(ms.state(ChannelKind::Secondary), LinkState::Established);
    assert_eq!(ms.state(MAIN), LinkState::Idle);
    assert_eq!(bts.state(MAIN), LinkState::Idle);
}
