#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::cell::RefCell;
use std::rc::Rc;

use locate_core::protocol::{
    ByteCursor, Capabilities, PresenceExtras, ProfileAnnouncement, Text, TlvList, UserClass,
    UserInfoRecord,
};
use locate_core::protocol::profile::TLV_CAPABILITIES as TLV_SET_INFO_CAPABILITIES;
use locate_core::protocol::userinfo::{TLV_SESSION_LENGTH_AOL, TLV_PRESENCE_EXTRAS};
use locate_session::config;
use locate_session::{InfoOutcome, LocateConfig, LocateSession, NoopObserver, RequestOutcome};

fn session() -> LocateSession {
    LocateSession::new(LocateConfig::default(), Box::new(NoopObserver))
}

fn recording_session() -> (LocateSession, Rc<RefCell<Vec<UserInfoRecord>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let s = LocateSession::new(
        LocateConfig::default(),
        Box::new(move |r: &UserInfoRecord| sink.borrow_mut().push(r.clone())),
    );
    (s, seen)
}

fn wire(rec: &UserInfoRecord) -> Vec<u8> {
    let mut w = ByteCursor::writer();
    rec.encode(&mut w, rec.is_aol());
    w.as_slice().to_vec()
}

/// Record whose only TLV is a raw presence extras block.
fn extras_wire(handle: &str, extras: &[u8]) -> Vec<u8> {
    let mut w = ByteCursor::writer();
    w.write_length_prefixed_string(handle.as_bytes());
    w.write_u16(0);
    w.write_u16(1);
    w.write_u16(TLV_PRESENCE_EXTRAS);
    w.write_u16(extras.len() as u16);
    w.write_bytes(extras);
    w.as_slice().to_vec()
}

fn away_text(s: &LocateSession, handle: &str) -> Option<String> {
    s.find(handle)
        .and_then(|r| r.away_text())
        .map(Text::to_string_lossy)
}

#[test]
fn brb_then_zero_length_away_becomes_empty() {
    let (mut s, seen) = recording_session();

    let mut brb = UserInfoRecord::new("pat");
    brb.extras = Some(PresenceExtras {
        away: Some(Text::new(&b"brb"[..])),
        ..PresenceExtras::default()
    });
    s.handle_user_info(&wire(&brb)).unwrap();
    assert_eq!(away_text(&s, "pat").as_deref(), Some("brb"));

    s.handle_user_info(&extras_wire("pat", &[0x00, 0x02, 0x04, 0x00])).unwrap();
    assert_eq!(away_text(&s, "pat").as_deref(), Some(""));

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].away_text(), Some(&Text::default()));
}

#[test]
fn away_text_untouched_by_update_without_extras() {
    let mut s = session();
    s.handle_user_info(&extras_wire("quinn", &[0x00, 0x02, 0x04, 0x07, 0x00, 0x03, b'o', b'u', b't', 0x00, 0x00]))
        .unwrap();
    assert_eq!(away_text(&s, "quinn").as_deref(), Some("out"));

    let mut caps_only = UserInfoRecord::new("quinn");
    caps_only.idle_minutes = Some(3);
    s.handle_user_info(&wire(&caps_only)).unwrap();
    assert_eq!(away_text(&s, "quinn").as_deref(), Some("out"));
    assert_eq!(s.find("quinn").unwrap().idle_minutes, Some(3));
}

#[test]
fn away_text_cleared_by_extras_without_away() {
    let mut s = session();
    s.handle_user_info(&extras_wire("rae", &[0x00, 0x02, 0x04, 0x07, 0x00, 0x03, b'z', b'z', b'z', 0x00, 0x00]))
        .unwrap();
    assert!(away_text(&s, "rae").is_some());

    // icon checksum only
    s.handle_user_info(&extras_wire("rae", &[0x00, 0x01, 0x00, 0x02, 0xab, 0xcd])).unwrap();
    let rec = s.find("rae").unwrap();
    assert!(rec.away_text().is_none());
    assert!(rec.extras.as_ref().unwrap().icon_checksum.is_some());
}

#[test]
fn explicit_and_implicit_outcomes() {
    let mut s = session();
    assert_eq!(s.request_info("Sam"), RequestOutcome::Queued);
    assert_eq!(s.request_info("sam"), RequestOutcome::Duplicate);
    assert_eq!(s.prefetch_away("tess"), RequestOutcome::Queued);
    assert_eq!(s.next_request().unwrap().handle, "Sam");

    assert_eq!(
        s.handle_user_info(&wire(&UserInfoRecord::new("SAM"))).unwrap(),
        InfoOutcome::Explicit
    );
    assert_eq!(
        s.handle_user_info(&wire(&UserInfoRecord::new("tess"))).unwrap(),
        InfoOutcome::Implicit
    );
    assert_eq!(
        s.handle_user_info(&wire(&UserInfoRecord::new("tess"))).unwrap(),
        InfoOutcome::Unsolicited
    );
    assert!(s.pending().is_empty());

    let m = s.metrics();
    assert_eq!(m.requests.get(&[("kind", "explicit"), ("outcome", "duplicate")]), 1);
    assert_eq!(m.resolutions.get(&[("outcome", "unsolicited")]), 1);
    assert_eq!(m.cache_merges.get(&[("result", "created")]), 2);
    assert_eq!(m.cache_merges.get(&[("result", "updated")]), 1);
}

#[test]
fn user_request_after_prefetch_is_not_lost() {
    let mut s = session();
    assert_eq!(s.prefetch_away("wes"), RequestOutcome::Queued);
    assert_eq!(s.request_info("Wes"), RequestOutcome::Upgraded);
    assert!(s.handle_info_error("wes"));

    s.prefetch_away("xia");
    s.request_info("xia");
    assert_eq!(
        s.handle_user_info(&wire(&UserInfoRecord::new("xia"))).unwrap(),
        InfoOutcome::Explicit
    );
    assert_eq!(
        s.metrics().requests.get(&[("kind", "explicit"), ("outcome", "upgraded")]),
        2
    );
}

#[test]
fn truncated_record_changes_nothing() {
    let mut s = session();
    s.request_info("eve");
    let err = s.handle_user_info(&[0x03, b'e', b'v', b'e', 0x00]).unwrap_err();
    assert_eq!(err.code().as_str(), "TRUNCATED");
    assert!(s.find("eve").is_none());
    assert!(s.pending().is_pending("eve"));
    assert_eq!(s.metrics().decode_failures.get(&[("code", "TRUNCATED")]), 1);
}

#[test]
fn failed_fetch_reports_only_explicit_requests() {
    let mut s = session();
    s.request_info("uma");
    s.prefetch_away("vic");
    assert!(s.handle_info_error("UMA"));
    assert!(!s.handle_info_error("vic"));
    assert!(!s.handle_info_error("nobody"));
    assert!(s.pending().is_empty());
}

#[test]
fn queue_bound_comes_from_config() {
    let cfg = config::load_from_str("version: 1\npending:\n  max_entries: 1\n").unwrap();
    let mut s = LocateSession::new(cfg, Box::new(NoopObserver));
    assert_eq!(s.request_info("a"), RequestOutcome::Queued);
    assert_eq!(s.prefetch_away("b"), RequestOutcome::Dropped);
    assert_eq!(
        s.metrics().requests.get(&[("kind", "implicit"), ("outcome", "dropped")]),
        1
    );
}

#[test]
fn announcement_decodes_as_trailer() {
    let s = session();
    let mut ann = ProfileAnnouncement::new("me");
    ann.profile = Some(Text::with_encoding(&b"hi there"[..], "us-ascii"));
    ann.capabilities = Capabilities::CHAT | Capabilities::SEND_FILE;

    let bytes = s.announce(&ann);
    let mut c = ByteCursor::new(&bytes);
    let len = c.remaining();
    let tlvs = TlvList::decode(&mut c, len);
    assert_eq!(tlvs.get(TLV_SET_INFO_CAPABILITIES, 1).unwrap().value.len(), 32);
    assert_eq!(&tlvs.get(0x0002, 1).unwrap().value[..], b"hi there");
}

#[test]
fn cached_aol_record_encodes_aol_session_length() {
    let mut s = session();
    let mut rec = UserInfoRecord::new("aolguy");
    rec.user_class = Some(UserClass::AOL);
    rec.session_length = Some(77);
    s.handle_user_info(&wire(&rec)).unwrap();

    let out = s.encode_cached("AOLGuy").unwrap();
    let mut c = ByteCursor::new(&out);
    c.read_length_prefixed_string().unwrap();
    c.read_u16().unwrap();
    let count = c.read_u16().unwrap();
    let limit = c.remaining();
    let tlvs = TlvList::decode_counted(&mut c, count, limit);
    assert_eq!(tlvs.get_u32(TLV_SESSION_LENGTH_AOL, 1), Some(77));
}

#[test]
fn forget_and_teardown() {
    let mut s = session();
    for h in ["a", "b", "c"] {
        s.handle_user_info(&wire(&UserInfoRecord::new(h))).unwrap();
    }
    assert!(s.forget("B").is_some());
    assert_eq!(s.metrics().cache_entries.get(&[]), 2);

    let metrics = std::sync::Arc::clone(s.metrics());
    assert_eq!(s.teardown(), 2);
    assert_eq!(metrics.cache_entries.get(&[]), 0);
    assert!(metrics.render().contains("locate_records_decoded_total 3"));
}
