//! Tests for link release: DISC/UA, local release and unsolicited DM.

use crate::{
    core::{
        entity::state::LinkState,
        test_utils::{TestLink, establish, init_tracing, pump_until_idle},
    },
    error::Error,
    link::{ChannelKind, Role},
    packet::{control::Control, frame::Frame},
    rll::{ReleaseMode, RllPrimitive, RlmCause},
};
use bytes::Bytes;

const MAIN: ChannelKind = ChannelKind::Main;

#[tokio::test]
async fn test_disc_ua_releases_both_sides() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);
    establish(&mut ms, &mut bts, MAIN);

    ms.request(MAIN, RllPrimitive::ReleaseRequest(ReleaseMode::Normal))
        .unwrap();
    assert_eq!(ms.state(MAIN), LinkState::DisconnectPending);

    let frames = ms.take_frames(MAIN);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].control, Control::Disc { pf: true });

    bts.receive_frame(MAIN, &frames[0]).unwrap();
    assert_eq!(bts.state(MAIN), LinkState::Idle);
    assert_eq!(bts.take_messages(), vec![RllPrimitive::ReleaseIndication]);

    pump_until_idle(&mut bts, &mut ms, MAIN);
    assert_eq!(ms.state(MAIN), LinkState::Idle);
    assert_eq!(ms.take_messages(), vec![RllPrimitive::ReleaseConfirm]);
    assert!(ms.channel.next_deadline().is_none());
}

#[tokio::test]
async fn test_release_discards_queued_data() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);
    establish(&mut ms, &mut bts, MAIN);

    ms.request(MAIN, RllPrimitive::DataRequest(Bytes::from(vec![9u8; 60])))
        .unwrap();
    ms.take_frames(MAIN);
    ms.request(MAIN, RllPrimitive::ReleaseRequest(ReleaseMode::Normal))
        .unwrap();

    assert_eq!(ms.channel.entity(MAIN).outstanding_frames(), 0);
    let frames = ms.take_frames(MAIN);
    assert_eq!(
        frames.iter().map(|f| f.control).collect::<Vec<_>>(),
        vec![Control::Disc { pf: true }]
    );
}

#[tokio::test]
async fn test_release_when_idle_confirms_locally() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);

    ms.request(MAIN, RllPrimitive::ReleaseRequest(ReleaseMode::Normal))
        .unwrap();
    assert!(ms.take_frames(MAIN).is_empty());
    assert_eq!(ms.take_messages(), vec![RllPrimitive::ReleaseConfirm]);
}

#[tokio::test]
async fn test_local_release_sends_nothing() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);
    establish(&mut ms, &mut bts, MAIN);

    ms.request(MAIN, RllPrimitive::ReleaseRequest(ReleaseMode::Local))
        .unwrap();
    assert_eq!(ms.state(MAIN), LinkState::Idle);
    assert!(ms.take_frames(MAIN).is_empty());
    assert_eq!(ms.take_messages(), vec![RllPrimitive::ReleaseConfirm]);
}

#[tokio::test]
async fn test_establish_while_releasing_is_refused() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);
    establish(&mut ms, &mut bts, MAIN);

    ms.request(MAIN, RllPrimitive::ReleaseRequest(ReleaseMode::Normal))
        .unwrap();
    let err = ms
        .request(MAIN, RllPrimitive::EstablishRequest(Bytes::new()))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState("disconnect-pending")));

    let err = ms
        .request(MAIN, RllPrimitive::DataRequest(Bytes::from_static(b"late")))
        .unwrap_err();
    assert!(matches!(err, Error::NotEstablished));
}

#[tokio::test]
async fn test_unsolicited_dm_reports_error() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);
    establish(&mut ms, &mut bts, MAIN);

    bts.receive_frame(MAIN, &Frame::new_dm(0, true, false))
        .unwrap();
    assert_eq!(bts.state(MAIN), LinkState::Idle);
    assert_eq!(
        bts.take_messages(),
        vec![RllPrimitive::ErrorIndication(
            RlmCause::UnsolicitedDmEstablished
        )]
    );
}

#[tokio::test]
async fn test_crossing_disc_is_answered_with_ua() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);
    establish(&mut ms, &mut bts, MAIN);

    ms.request(MAIN, RllPrimitive::ReleaseRequest(ReleaseMode::Normal))
        .unwrap();
    ms.take_frames(MAIN);

    ms.receive_frame(MAIN, &Frame::new_disc(0, true, true))
        .unwrap();
    let frames = ms.take_frames(MAIN);
    assert_eq!(frames[0].control, Control::Ua { pf: true });
    assert_eq!(ms.state(MAIN), LinkState::DisconnectPending);

    ms.receive_frame(MAIN, &Frame::new_ua(0, false, true, Bytes::new()))
        .unwrap();
    assert_eq!(ms.state(MAIN), LinkState::Idle);
    assert_eq!(ms.take_messages(), vec![RllPrimitive::ReleaseConfirm]);
}

#[tokio::test]
async fn test_link_can_be_reestablished_after_release() {
    init_tracing();
    let mut ms = TestLink::new(Role::Ms);
    let mut bts = TestLink::new(Role::Bts);
    establish(&mut ms, &mut bts, MAIN);

    ms.request(MAIN, RllPrimitive::ReleaseRequest(ReleaseMode::Normal))
        .unwrap();
    pump_until_idle(&mut ms, &mut bts, MAIN);
    assert_eq!(ms.state(MAIN), LinkState::Idle);

    establish(&mut ms, &mut bts, MAIN);
    ms.request(MAIN, RllPrimitive::DataRequest(Bytes::from_static(b"again")))
        .unwrap();
    pump_until_idle(&mut ms, &mut bts, MAIN);
    assert_eq!(
        bts.take_messages(),
        vec![RllPrimitive::DataIndication(Bytes::from_static(b"again"))]
    );
}
