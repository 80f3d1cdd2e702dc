//! Encode/decode agreement: hand-picked records plus generated field subsets.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::Ipv4Addr;

use bytes::Bytes;

use proptest::prelude::*;

use locate_core::protocol::icons::CUSTOM_ICONS;
use locate_core::protocol::{
    ByteCursor, Capabilities, CapabilitySet, CapabilityTable, ChecksumVariant, CustomIcon,
    IconChecksum, IcqStatus, Presence, PresenceExtras, Text, UserClass, UserInfoRecord,
};

fn round_trip(rec: &UserInfoRecord, aol: bool) -> UserInfoRecord {
    let mut w = ByteCursor::writer();
    rec.encode(&mut w, aol);
    let mut r = ByteCursor::new(w.as_slice());
    let (back, stats) = UserInfoRecord::decode_with(&mut r, &CapabilityTable::builtin()).unwrap();
    assert_eq!(r.remaining(), 0);
    assert_eq!(stats.unknown_fields, 0);
    assert_eq!(stats.unmatched_capabilities, 0);
    back
}

fn icon(index: u8) -> CustomIcon {
    CapabilityTable::builtin().custom_icon(index).unwrap()
}

#[test]
fn bare_handle() {
    let rec = UserInfoRecord::new("solo");
    let back = round_trip(&rec, false);
    assert_eq!(back, rec);
    assert_eq!(back.presence(), Presence::empty());
}

#[test]
fn aol_user_with_timestamps() {
    let rec = UserInfoRecord {
        handle: "AOL User".into(),
        warning_level: 120,
        user_class: Some(UserClass::AOL | UserClass::FREE),
        created_at: Some(900_000_000),
        online_since: Some(1_100_000_000),
        member_since: Some(950_000_000),
        idle_minutes: Some(17),
        session_length: Some(3_600),
        ..UserInfoRecord::default()
    };
    assert_eq!(round_trip(&rec, rec.is_aol()), rec);
}

#[test]
fn icq_user_with_status_and_extras() {
    let rec = UserInfoRecord {
        handle: "7654321".into(),
        user_class: Some(UserClass::ICQ | UserClass::AWAY),
        icq_status: Some(IcqStatus {
            flags: 0x1000,
            status: 0x0001,
        }),
        external_ip: Some(Ipv4Addr::new(198, 51, 100, 4)),
        session_length: Some(42),
        extras: Some(PresenceExtras {
            icon_checksum: IconChecksum::new(
                ChecksumVariant::Secondary,
                Bytes::from_static(&[0x10; 16]),
            ),
            away: Some(Text::with_encoding(&b"lunch"[..], "utf-8")),
            external_link: Some(Text::new(&b"http://example.net/"[..])),
            mood: Some(icon(11)),
        }),
        ..UserInfoRecord::default()
    };
    let back = round_trip(&rec, false);
    assert_eq!(back, rec);
    assert_eq!(back.custom_icon().map(CustomIcon::index), Some(11));
}

#[test]
fn capabilities_with_custom_icon() {
    let rec = UserInfoRecord {
        handle: "capper".into(),
        capabilities: Some(CapabilitySet {
            flags: Capabilities::CHAT
                | Capabilities::BUDDY_ICON
                | Capabilities::GAMES
                | Capabilities::TYPING,
            custom_icon: Some(icon(2)),
        }),
        ..UserInfoRecord::default()
    };
    let back = round_trip(&rec, false);
    assert_eq!(back, rec);
    assert!(back.presence().contains(Presence::CAPABILITIES | Presence::CUSTOM_ICON));
}

#[test]
fn empty_capability_block_is_still_present() {
    let rec = UserInfoRecord {
        handle: "nocaps".into(),
        capabilities: Some(CapabilitySet::default()),
        ..UserInfoRecord::default()
    };
    let back = round_trip(&rec, false);
    assert_eq!(back.capabilities, Some(CapabilitySet::default()));
}

#[test]
fn explicitly_empty_away_survives() {
    let rec = UserInfoRecord {
        handle: "back".into(),
        extras: Some(PresenceExtras {
            away: Some(Text::default()),
            ..PresenceExtras::default()
        }),
        ..UserInfoRecord::default()
    };
    let back = round_trip(&rec, false);
    assert_eq!(back.away_text(), Some(&Text::default()));
}

#[test]
fn extras_block_without_away() {
    let rec = UserInfoRecord {
        handle: "quiet".into(),
        extras: Some(PresenceExtras::default()),
        ..UserInfoRecord::default()
    };
    let back = round_trip(&rec, false);
    assert_eq!(back.extras, Some(PresenceExtras::default()));
    assert!(back.away_text().is_none());
}

#[test]
fn profile_and_away_message_trailer() {
    let rec = UserInfoRecord {
        handle: "writer".into(),
        online_since: Some(5),
        profile: Some(Text::with_encoding(
            &b"<html>about me</html>"[..],
            "text/aolrtf; charset=\"us-ascii\"",
        )),
        away_message: Some(Text::new(&b"gone fishing"[..])),
        ..UserInfoRecord::default()
    };
    let back = round_trip(&rec, false);
    assert_eq!(back, rec);
    assert!(back.presence().contains(Presence::PROFILE | Presence::AWAY_MESSAGE));
}

fn text(max_len: usize) -> impl Strategy<Value = Text> {
    (
        proptest::collection::vec(any::<u8>(), 0..=max_len),
        proptest::option::of("[a-z0-9/;=-]{0,16}"),
    )
        .prop_map(|(bytes, encoding)| Text {
            bytes: Bytes::from(bytes),
            encoding,
        })
}

fn table_icon() -> impl Strategy<Value = CustomIcon> {
    (1..CUSTOM_ICONS.len() as u8).prop_map(icon)
}

fn checksum() -> impl Strategy<Value = IconChecksum> {
    (any::<bool>(), proptest::collection::vec(any::<u8>(), 1..=32)).prop_map(|(secondary, digest)| {
        let variant = if secondary {
            ChecksumVariant::Secondary
        } else {
            ChecksumVariant::Primary
        };
        IconChecksum::new(variant, digest).unwrap()
    })
}

fn extras() -> impl Strategy<Value = PresenceExtras> {
    (
        proptest::option::of(checksum()),
        proptest::option::of(text(100)),
        proptest::option::of(text(100)),
        proptest::option::of(table_icon()),
    )
        .prop_map(|(icon_checksum, away, external_link, mood)| PresenceExtras {
            icon_checksum,
            away,
            external_link,
            mood,
        })
}

fn capability_set() -> impl Strategy<Value = CapabilitySet> {
    (any::<u32>(), proptest::option::of(table_icon())).prop_map(|(bits, custom_icon)| {
        CapabilitySet {
            flags: Capabilities::from_bits_truncate(bits),
            custom_icon,
        }
    })
}

fn record() -> impl Strategy<Value = UserInfoRecord> {
    let scalars = (
        "[a-zA-Z0-9]{0,16}",
        any::<u16>(),
        proptest::option::of(any::<u16>()),
        proptest::option::of(any::<u32>()),
        proptest::option::of(any::<u32>()),
        proptest::option::of(any::<u32>()),
        proptest::option::of(any::<u16>()),
        proptest::option::of(any::<u32>()),
        proptest::option::of(any::<(u16, u16)>()),
        proptest::option::of(any::<u32>()),
    );
    let blocks = (
        proptest::option::of(capability_set()),
        proptest::option::of(extras()),
        proptest::option::of(text(300)),
        proptest::option::of(text(300)),
    );
    (scalars, blocks).prop_map(
        |(
            (handle, warning_level, class, created, online, member, idle, session, icq, ip),
            (capabilities, extras, profile, away_message),
        )| UserInfoRecord {
            handle,
            warning_level,
            user_class: class.map(UserClass::from_bits_retain),
            created_at: created,
            online_since: online,
            member_since: member,
            idle_minutes: idle,
            session_length: session,
            icq_status: icq.map(|(flags, status)| IcqStatus { flags, status }),
            external_ip: ip.map(Ipv4Addr::from),
            capabilities,
            extras,
            profile,
            away_message,
        },
    )
}

proptest! {
    #[test]
    fn any_field_subset_survives_encode_decode(rec in record(), aol in any::<bool>()) {
        let mut w = ByteCursor::writer();
        rec.encode(&mut w, aol);
        let mut r = ByteCursor::new(w.as_slice());
        let (back, stats) = UserInfoRecord::decode_with(&mut r, &CapabilityTable::builtin()).unwrap();
        prop_assert_eq!(r.remaining(), 0);
        prop_assert_eq!(stats.unknown_fields, 0);
        prop_assert_eq!(stats.unmatched_capabilities, 0);
        prop_assert_eq!(back.presence(), rec.presence());
        prop_assert_eq!(back, rec);
    }
}
