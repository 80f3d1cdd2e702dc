//! User-info record codec.
//!
//! Wire shape:
//!
//! ```text
//! handle_len: u8, handle: handle_len bytes
//! warning_level: u16
//! tlv_count: u16, tlv_count x {type: u16, length: u16, value}
//! [locate reply trailer: TLV chain to the end of the record]
//! ```
//!
//! Every optional field is an `Option`, so a partial update carries exactly
//! the fields it saw. The presence extras block (TLV 0x001d) is itself an
//! `Option<PresenceExtras>`: "block absent", "block present without an away
//! sub-entry" and "away sub-entry present but empty" are three distinct
//! states and consumers rely on telling them apart.

use std::net::Ipv4Addr;

use bitflags::bitflags;
use bytes::Bytes;
use serde::Serialize;

use super::caps::{Capabilities, CapabilityTable};
use super::cursor::ByteCursor;
use super::icons::CustomIcon;
use super::profile;
use super::tlv::{Tlv, TlvList};
use crate::error::Result;

pub const TLV_USER_CLASS: u16 = 0x0001;
pub const TLV_CREATED_AT: u16 = 0x0002;
pub const TLV_ONLINE_SINCE: u16 = 0x0003;
pub const TLV_IDLE_MINUTES: u16 = 0x0004;
pub const TLV_MEMBER_SINCE: u16 = 0x0005;
pub const TLV_ICQ_STATUS: u16 = 0x0006;
pub const TLV_EXTERNAL_IP: u16 = 0x000a;
pub const TLV_CAPABILITIES: u16 = 0x000d;
/// Session length for regular users.
pub const TLV_SESSION_LENGTH: u16 = 0x000f;
/// Session length for AOL-flagged users.
pub const TLV_SESSION_LENGTH_AOL: u16 = 0x0010;
pub const TLV_SHORT_CAPABILITIES: u16 = 0x0019;
pub const TLV_PRESENCE_EXTRAS: u16 = 0x001d;

pub const EXTRA_ICON_CHECKSUM: u16 = 0x0001;
pub const EXTRA_STATUS_TEXT: u16 = 0x0002;
pub const EXTRA_EXTERNAL_LINK: u16 = 0x0009;
pub const EXTRA_MOOD: u16 = 0x000e;

/// Marker that an encoding name follows the text of a status/link sub-entry.
const EXTRA_TEXT_HAS_ENCODING: u16 = 0x0001;
const EXTRA_TEXT_NUMBER: u8 = 0x04;
/// Presence extras sub-entries carry a one-byte length.
const EXTRA_MAX_LEN: usize = u8::MAX as usize;
const EXTRA_MAX_ENCODING_LEN: usize = 64;

bitflags! {
    /// User class flags (TLV 0x0001).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct UserClass: u16 {
        const UNCONFIRMED   = 0x0001;
        const ADMINISTRATOR = 0x0002;
        const AOL           = 0x0004;
        const COMMERCIAL    = 0x0008;
        const FREE          = 0x0010;
        const AWAY          = 0x0020;
        const ICQ           = 0x0040;
        const WIRELESS      = 0x0080;
        const BOT           = 0x0400;
    }
}

bitflags! {
    /// Which fields a record actually carried.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Presence: u32 {
        const USER_CLASS     = 1 << 0;
        const CREATED_AT     = 1 << 1;
        const ONLINE_SINCE   = 1 << 2;
        const MEMBER_SINCE   = 1 << 3;
        const IDLE           = 1 << 4;
        const SESSION_LENGTH = 1 << 5;
        const ICQ_STATUS     = 1 << 6;
        const EXTERNAL_IP    = 1 << 7;
        const CAPABILITIES   = 1 << 8;
        const CUSTOM_ICON    = 1 << 9;
        const EXTRAS         = 1 << 10;
        const ICON_CHECKSUM  = 1 << 11;
        const AWAY_TEXT      = 1 << 12;
        const EXTERNAL_LINK  = 1 << 13;
        const PROFILE        = 1 << 14;
        const AWAY_MESSAGE   = 1 << 15;
    }
}

/// Text payload with its declared encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Text {
    pub bytes: Bytes,
    /// Declared character set or MIME type, as sent.
    pub encoding: Option<String>,
}

impl Text {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            encoding: None,
        }
    }

    pub fn with_encoding(bytes: impl Into<Bytes>, encoding: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            encoding: Some(encoding.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Checksum flavour, carried as the sub-entry number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChecksumVariant {
    /// Sub-entry number 0.
    Primary,
    /// Sub-entry number 1.
    Secondary,
}

impl ChecksumVariant {
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            0 => Some(ChecksumVariant::Primary),
            1 => Some(ChecksumVariant::Secondary),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            ChecksumVariant::Primary => 0,
            ChecksumVariant::Secondary => 1,
        }
    }
}

/// Buddy icon checksum. The digest is never empty and fits one sub-entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconChecksum {
    variant: ChecksumVariant,
    digest: Bytes,
}

impl IconChecksum {
    /// `None` when `digest` is empty or longer than 255 bytes.
    pub fn new(variant: ChecksumVariant, digest: impl Into<Bytes>) -> Option<Self> {
        let digest = digest.into();
        if digest.is_empty() || digest.len() > EXTRA_MAX_LEN {
            return None;
        }
        Some(Self { variant, digest })
    }

    pub fn variant(&self) -> ChecksumVariant {
        self.variant
    }

    /// Raw digest bytes, usually an MD5 of the icon.
    pub fn digest(&self) -> &Bytes {
        &self.digest
    }
}

/// Contents of the presence extras block (TLV 0x001d).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresenceExtras {
    pub icon_checksum: Option<IconChecksum>,
    /// Status/away text. `Some(empty)` means "clear", not "absent".
    pub away: Option<Text>,
    pub external_link: Option<Text>,
    /// Icon picked through a mood token.
    pub mood: Option<CustomIcon>,
}

/// Capability flags plus any custom icon found in the same block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySet {
    pub flags: Capabilities,
    /// Icon whose identifier was found among the capabilities.
    pub custom_icon: Option<CustomIcon>,
}

/// ICQ extended status (TLV 0x0006).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IcqStatus {
    /// High half: status flags (web aware, show IP, ...).
    pub flags: u16,
    /// Low half: online, away, do-not-disturb, ...
    pub status: u16,
}

impl IcqStatus {
    fn from_u32(v: u32) -> Self {
        Self {
            flags: (v >> 16) as u16,
            status: v as u16,
        }
    }

    fn to_u32(self) -> u32 {
        (u32::from(self.flags) << 16) | u32::from(self.status)
    }
}

/// Decoded presence block for one handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserInfoRecord {
    /// Handle as the server spelled it; not normalized.
    pub handle: String,
    /// Warning level in tenths of a percent. Always on the wire.
    pub warning_level: u16,
    pub user_class: Option<UserClass>,
    /// Seconds since the epoch.
    pub created_at: Option<u32>,
    pub online_since: Option<u32>,
    pub member_since: Option<u32>,
    pub idle_minutes: Option<u16>,
    /// Seconds.
    pub session_length: Option<u32>,
    pub icq_status: Option<IcqStatus>,
    /// Address the server sees the client connecting from.
    pub external_ip: Option<Ipv4Addr>,
    /// Union of the full and short capability blocks.
    pub capabilities: Option<CapabilitySet>,
    /// `None` when the block was absent; see the module docs.
    pub extras: Option<PresenceExtras>,
    /// Profile from the locate reply trailer.
    pub profile: Option<Text>,
    /// Long away message from the locate reply trailer.
    pub away_message: Option<Text>,
}

/// Non-fatal observations made while decoding one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Capability chunks found in neither table.
    pub unmatched_capabilities: usize,
    /// Skipped TLVs and presence extras sub-entries.
    pub unknown_fields: usize,
}

impl UserInfoRecord {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Self::default()
        }
    }

    pub fn presence(&self) -> Presence {
        let mut p = Presence::empty();
        p.set(Presence::USER_CLASS, self.user_class.is_some());
        p.set(Presence::CREATED_AT, self.created_at.is_some());
        p.set(Presence::ONLINE_SINCE, self.online_since.is_some());
        p.set(Presence::MEMBER_SINCE, self.member_since.is_some());
        p.set(Presence::IDLE, self.idle_minutes.is_some());
        p.set(Presence::SESSION_LENGTH, self.session_length.is_some());
        p.set(Presence::ICQ_STATUS, self.icq_status.is_some());
        p.set(Presence::EXTERNAL_IP, self.external_ip.is_some());
        p.set(Presence::CAPABILITIES, self.capabilities.is_some());
        p.set(Presence::CUSTOM_ICON, self.custom_icon().is_some());
        p.set(Presence::PROFILE, self.profile.is_some());
        p.set(Presence::AWAY_MESSAGE, self.away_message.is_some());
        if let Some(x) = &self.extras {
            p |= Presence::EXTRAS;
            p.set(Presence::ICON_CHECKSUM, x.icon_checksum.is_some());
            p.set(Presence::AWAY_TEXT, x.away.is_some());
            p.set(Presence::EXTERNAL_LINK, x.external_link.is_some());
        }
        p
    }

    /// Custom icon from the mood sub-entry, else from the capability block.
    pub fn custom_icon(&self) -> Option<CustomIcon> {
        self.extras
            .as_ref()
            .and_then(|x| x.mood)
            .or_else(|| self.capabilities.and_then(|c| c.custom_icon))
    }

    pub fn away_text(&self) -> Option<&Text> {
        self.extras.as_ref().and_then(|x| x.away.as_ref())
    }

    pub fn capability_flags(&self) -> Capabilities {
        self.capabilities.map(|c| c.flags).unwrap_or_default()
    }

    pub fn is_aol(&self) -> bool {
        self.user_class.is_some_and(|c| c.contains(UserClass::AOL))
    }

    /// Decode one record including any locate reply trailer, using the
    /// built-in capability table.
    pub fn decode(cursor: &mut ByteCursor) -> Result<Self> {
        Self::decode_with(cursor, &CapabilityTable::builtin()).map(|(rec, _)| rec)
    }

    /// Decode one record including any locate reply trailer.
    pub fn decode_with(
        cursor: &mut ByteCursor,
        table: &CapabilityTable<'_>,
    ) -> Result<(Self, DecodeStats)> {
        let (mut rec, mut stats) = Self::decode_block(cursor, table)?;
        if cursor.remaining() > 0 {
            profile::decode_trailer(cursor, &mut rec, table, &mut stats);
        }
        Ok((rec, stats))
    }

    /// Decode only the TLV-counted user-info block, leaving anything after it
    /// in the cursor.
    pub fn decode_block(
        cursor: &mut ByteCursor,
        table: &CapabilityTable<'_>,
    ) -> Result<(Self, DecodeStats)> {
        let handle = cursor.read_length_prefixed_string()?;
        let warning_level = cursor.read_u16()?;
        let tlv_count = cursor.read_u16()?;
        let limit = cursor.remaining();
        let tlvs = TlvList::decode_counted(cursor, tlv_count, limit);

        let mut rec = Self {
            handle: String::from_utf8_lossy(&handle).into_owned(),
            warning_level,
            ..Self::default()
        };
        let mut stats = DecodeStats::default();

        for tlv in tlvs.iter() {
            rec.apply_tlv(tlv, table, &mut stats);
        }

        tracing::trace!(
            handle = %rec.handle,
            tlvs = tlvs.count(),
            unknown = stats.unknown_fields,
            "user info block decoded"
        );
        Ok((rec, stats))
    }

    fn apply_tlv(&mut self, tlv: &Tlv, table: &CapabilityTable<'_>, stats: &mut DecodeStats) {
        match tlv.tlv_type {
            TLV_USER_CLASS => {
                if let Some(v) = tlv.as_u16() {
                    self.user_class = Some(UserClass::from_bits_retain(v));
                }
            }
            TLV_CREATED_AT => self.created_at = tlv.as_u32().or(self.created_at),
            TLV_ONLINE_SINCE => self.online_since = tlv.as_u32().or(self.online_since),
            TLV_MEMBER_SINCE => self.member_since = tlv.as_u32().or(self.member_since),
            TLV_IDLE_MINUTES => self.idle_minutes = tlv.as_u16().or(self.idle_minutes),
            TLV_SESSION_LENGTH | TLV_SESSION_LENGTH_AOL => {
                self.session_length = tlv.as_u32().or(self.session_length);
            }
            TLV_ICQ_STATUS => {
                if let Some(v) = tlv.as_u32() {
                    self.icq_status = Some(IcqStatus::from_u32(v));
                }
            }
            TLV_EXTERNAL_IP => {
                if let Some(v) = tlv.as_u32() {
                    self.external_ip = Some(Ipv4Addr::from(v));
                }
            }
            TLV_CAPABILITIES => {
                let scan = table.decode_capability_block(&mut tlv.cursor(), tlv.value.len());
                let set = self.capabilities.get_or_insert_with(CapabilitySet::default);
                set.flags |= scan.flags;
                set.custom_icon = set.custom_icon.or(scan.custom_icon);
                stats.unmatched_capabilities += scan.unmatched;
            }
            TLV_SHORT_CAPABILITIES => {
                let (flags, unmatched) =
                    table.decode_short_capability_block(&mut tlv.cursor(), tlv.value.len());
                self.capabilities
                    .get_or_insert_with(CapabilitySet::default)
                    .flags |= flags;
                stats.unmatched_capabilities += unmatched;
            }
            TLV_PRESENCE_EXTRAS => {
                let extras = self.extras.get_or_insert_with(PresenceExtras::default);
                decode_extras(tlv, extras, table, stats);
            }
            other => {
                stats.unknown_fields += 1;
                tracing::trace!(tlv_type = other, len = tlv.value.len(), "skipping unknown user info tlv");
            }
        }
    }

    /// Encode with the built-in capability table.
    pub fn encode(&self, cursor: &mut ByteCursor, aol: bool) {
        self.encode_with(cursor, aol, &CapabilityTable::builtin());
    }

    /// Encode the record. `aol` selects the session length TLV type.
    pub fn encode_with(&self, cursor: &mut ByteCursor, aol: bool, table: &CapabilityTable<'_>) {
        cursor.write_length_prefixed_string(self.handle.as_bytes());
        cursor.write_u16(self.warning_level);

        let tlvs = self.block_tlvs(aol, table);
        cursor.write_u16(tlvs.count() as u16);
        tlvs.encode(cursor);

        if self.profile.is_some() || self.away_message.is_some() {
            profile::encode_trailer(self, cursor);
        }
    }

    fn block_tlvs(&self, aol: bool, table: &CapabilityTable<'_>) -> TlvList {
        let mut tlvs = TlvList::new();
        if let Some(c) = self.user_class {
            tlvs.push_u16(TLV_USER_CLASS, c.bits());
        }
        if let Some(v) = self.created_at {
            tlvs.push_u32(TLV_CREATED_AT, v);
        }
        if let Some(v) = self.online_since {
            tlvs.push_u32(TLV_ONLINE_SINCE, v);
        }
        if let Some(v) = self.idle_minutes {
            tlvs.push_u16(TLV_IDLE_MINUTES, v);
        }
        if let Some(v) = self.member_since {
            tlvs.push_u32(TLV_MEMBER_SINCE, v);
        }
        if let Some(s) = self.icq_status {
            tlvs.push_u32(TLV_ICQ_STATUS, s.to_u32());
        }
        if let Some(ip) = self.external_ip {
            tlvs.push_u32(TLV_EXTERNAL_IP, u32::from(ip));
        }
        if let Some(set) = self.capabilities {
            let mut w = ByteCursor::writer();
            table.encode_capability_block(&mut w, set.flags, set.custom_icon);
            tlvs.push(TLV_CAPABILITIES, w.into_bytes());
        }
        if let Some(v) = self.session_length {
            let ty = if aol { TLV_SESSION_LENGTH_AOL } else { TLV_SESSION_LENGTH };
            tlvs.push_u32(ty, v);
        }
        if let Some(extras) = &self.extras {
            tlvs.push(TLV_PRESENCE_EXTRAS, encode_extras(extras, table));
        }
        tlvs
    }
}

fn decode_extras(
    tlv: &Tlv,
    extras: &mut PresenceExtras,
    table: &CapabilityTable<'_>,
    stats: &mut DecodeStats,
) {
    let mut c = tlv.cursor();
    while c.remaining() >= 4 {
        let (Ok(sub_type), Ok(number), Ok(len)) = (c.read_u16(), c.read_u8(), c.read_u8()) else {
            break;
        };
        let body = c.read_bytes(usize::from(len));

        match sub_type {
            EXTRA_ICON_CHECKSUM => {
                if let Some(sum) =
                    ChecksumVariant::from_number(number).and_then(|v| IconChecksum::new(v, body))
                {
                    extras.icon_checksum = Some(sum);
                }
            }
            EXTRA_STATUS_TEXT => extras.away = Some(decode_extras_text(&body)),
            EXTRA_EXTERNAL_LINK => extras.external_link = Some(decode_extras_text(&body)),
            EXTRA_MOOD => {
                let token = String::from_utf8_lossy(&body);
                // Empty token: client reset to the default mood.
                if token.is_empty() {
                    continue;
                }
                match table.match_mood(&token) {
                    Some(icon) => extras.mood = Some(icon),
                    None => tracing::debug!(%token, "unknown mood token"),
                }
            }
            other => {
                stats.unknown_fields += 1;
                tracing::trace!(sub_type = other, number, len, "skipping unknown presence extra");
            }
        }
    }
}

fn decode_extras_text(body: &[u8]) -> Text {
    if body.len() < 4 {
        return Text::default();
    }
    let mut c = ByteCursor::new(body);
    let Ok(text_len) = c.read_u16() else {
        return Text::default();
    };
    let bytes = c.read_bytes(usize::from(text_len));
    let encoding = match c.read_u16() {
        Ok(EXTRA_TEXT_HAS_ENCODING) => match (c.read_u16(), c.read_u16()) {
            (Ok(_), Ok(enc_len)) => {
                Some(String::from_utf8_lossy(&c.read_bytes(usize::from(enc_len))).into_owned())
            }
            _ => None,
        },
        _ => None,
    };
    Text { bytes, encoding }
}

/// Inverse of `decode_extras_text`. The body is cut so the sub-entry fits
/// its one-byte length.
fn encode_extras_text(text: &Text) -> Bytes {
    let encoding = text
        .encoding
        .as_deref()
        .map(|e| &e.as_bytes()[..e.len().min(EXTRA_MAX_ENCODING_LEN)]);
    let overhead = 2 + encoding.map_or(2, |e| 6 + e.len());
    let body = &text.bytes[..text.bytes.len().min(EXTRA_MAX_LEN - overhead)];

    let mut w = ByteCursor::with_capacity(overhead + body.len());
    w.write_u16(body.len() as u16);
    w.write_bytes(body);
    match encoding {
        Some(e) => {
            w.write_u16(EXTRA_TEXT_HAS_ENCODING);
            w.write_u16(0);
            w.write_u16(e.len() as u16);
            w.write_bytes(e);
        }
        None => w.write_u16(0),
    }
    w.into_bytes()
}

fn encode_extras(extras: &PresenceExtras, table: &CapabilityTable<'_>) -> Bytes {
    let mut w = ByteCursor::writer();
    let sub = |w: &mut ByteCursor, sub_type: u16, number: u8, body: &[u8]| {
        let body = &body[..body.len().min(EXTRA_MAX_LEN)];
        w.write_u16(sub_type);
        w.write_u8(number);
        w.write_u8(body.len() as u8);
        w.write_bytes(body);
    };

    if let Some(sum) = &extras.icon_checksum {
        sub(&mut w, EXTRA_ICON_CHECKSUM, sum.variant.number(), &sum.digest);
    }
    if let Some(text) = &extras.away {
        sub(&mut w, EXTRA_STATUS_TEXT, EXTRA_TEXT_NUMBER, &encode_extras_text(text));
    }
    if let Some(text) = &extras.external_link {
        sub(&mut w, EXTRA_EXTERNAL_LINK, EXTRA_TEXT_NUMBER, &encode_extras_text(text));
    }
    if let Some(entry) = extras.mood.and_then(|m| table.icon_entry(m)) {
        sub(&mut w, EXTRA_MOOD, 0, entry.mood.as_bytes());
    }
    w.into_bytes()
}
