//! Profile-bearing TLV chains.
//!
//! The same type codes serve two directions: the trailer of a locate reply
//! (after the TLV-counted user-info block) and the outgoing set-info block
//! that announces the local user's profile and capabilities.

use bytes::Bytes;

use super::caps::{Capabilities, CapabilityTable};
use super::cursor::ByteCursor;
use super::icons::CustomIcon;
use super::tlv::TlvList;
use super::userinfo::{CapabilitySet, DecodeStats, Text, UserInfoRecord};

pub const TLV_PROFILE_ENCODING: u16 = 0x0001;
pub const TLV_PROFILE: u16 = 0x0002;
pub const TLV_AWAY_ENCODING: u16 = 0x0003;
pub const TLV_AWAY_MESSAGE: u16 = 0x0004;
pub const TLV_CAPABILITIES: u16 = 0x0005;

/// Read the locate reply trailer into `rec`, consuming the rest of the cursor.
pub(crate) fn decode_trailer(
    cursor: &mut ByteCursor,
    rec: &mut UserInfoRecord,
    table: &CapabilityTable<'_>,
    stats: &mut DecodeStats,
) {
    let len = cursor.remaining();
    let tlvs = TlvList::decode(cursor, len);

    rec.profile = text_pair(&tlvs, TLV_PROFILE, TLV_PROFILE_ENCODING).or(rec.profile.take());
    rec.away_message =
        text_pair(&tlvs, TLV_AWAY_MESSAGE, TLV_AWAY_ENCODING).or(rec.away_message.take());

    let mut occurrence = 1;
    while let Some(tlv) = tlvs.get(TLV_CAPABILITIES, occurrence) {
        let scan = table.decode_capability_block(&mut tlv.cursor(), tlv.value.len());
        let set = rec.capabilities.get_or_insert_with(CapabilitySet::default);
        set.flags |= scan.flags;
        set.custom_icon = set.custom_icon.or(scan.custom_icon);
        stats.unmatched_capabilities += scan.unmatched;
        occurrence += 1;
    }

    stats.unknown_fields += tlvs
        .iter()
        .filter(|t| !(TLV_PROFILE_ENCODING..=TLV_CAPABILITIES).contains(&t.tlv_type))
        .count();
}

/// Write the profile and away message of `rec` as a trailer chain.
pub(crate) fn encode_trailer(rec: &UserInfoRecord, cursor: &mut ByteCursor) {
    let mut tlvs = TlvList::new();
    push_text(&mut tlvs, rec.profile.as_ref(), TLV_PROFILE, TLV_PROFILE_ENCODING);
    push_text(&mut tlvs, rec.away_message.as_ref(), TLV_AWAY_MESSAGE, TLV_AWAY_ENCODING);
    tlvs.encode(cursor);
}

/// Last occurrence of `text_type`, paired with the last encoding declared.
fn text_pair(tlvs: &TlvList, text_type: u16, encoding_type: u16) -> Option<Text> {
    let text = tlvs.iter().filter(|t| t.tlv_type == text_type).last()?;
    let encoding = tlvs
        .iter()
        .filter(|t| t.tlv_type == encoding_type)
        .last()
        .map(|t| String::from_utf8_lossy(&t.value).into_owned());
    Some(Text {
        bytes: text.value.clone(),
        encoding,
    })
}

fn push_text(tlvs: &mut TlvList, text: Option<&Text>, text_type: u16, encoding_type: u16) {
    let Some(text) = text else { return };
    if let Some(enc) = &text.encoding {
        tlvs.push(encoding_type, Bytes::copy_from_slice(enc.as_bytes()));
    }
    tlvs.push(text_type, text.bytes.clone());
}

/// What the local user announces about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileAnnouncement {
    /// Local handle, supplied by the connection layer.
    pub handle: String,
    pub profile: Option<Text>,
    /// `Some(empty)` clears a previously announced away message.
    pub away_message: Option<Text>,
    pub capabilities: Capabilities,
    pub custom_icon: Option<CustomIcon>,
}

impl ProfileAnnouncement {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Self::default()
        }
    }

    /// Build the set-info chain.
    pub fn to_tlvs(&self, table: &CapabilityTable<'_>) -> TlvList {
        let mut tlvs = TlvList::new();
        push_text(&mut tlvs, self.profile.as_ref(), TLV_PROFILE, TLV_PROFILE_ENCODING);
        push_text(&mut tlvs, self.away_message.as_ref(), TLV_AWAY_MESSAGE, TLV_AWAY_ENCODING);

        let mut caps = ByteCursor::writer();
        table.encode_capability_block(&mut caps, self.capabilities, self.custom_icon);
        tlvs.push(TLV_CAPABILITIES, caps.into_bytes());
        tlvs
    }

    pub fn encode(&self, cursor: &mut ByteCursor, table: &CapabilityTable<'_>) {
        self.to_tlvs(table).encode(cursor);
    }

    /// The record other clients should end up seeing for us.
    pub fn to_record(&self) -> UserInfoRecord {
        UserInfoRecord {
            handle: self.handle.clone(),
            capabilities: Some(CapabilitySet {
                flags: self.capabilities,
                custom_icon: self.custom_icon,
            }),
            profile: self.profile.clone(),
            away_message: self.away_message.clone(),
            ..UserInfoRecord::default()
        }
    }
}
