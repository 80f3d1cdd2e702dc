//! Capability identifiers and the built-in capability table.
//!
//! A client advertises optional features as a run of 16-byte identifiers
//! (TLV 0x000d) or as 2-byte "short" identifiers (TLV 0x0019). Most AIM
//! identifiers share one template, `09 46 XX YY 4c 7f 11 d1 82 22 44 45 53 54
//! 00 00`, and the short form is the `XX YY` pair at bytes `[2..4)`.
//!
//! Matching is first-match-wins in table order. A flag may appear more than
//! once with different bytes; those rows are known encoding variants.

use bitflags::bitflags;
use serde::Serialize;

use super::cursor::ByteCursor;
use super::icons::{CustomIcon, CustomIconEntry, CUSTOM_ICONS};

/// Width of a full capability identifier.
pub const CAP_LEN: usize = 16;
/// Width of a short capability identifier.
pub const SHORT_CAP_LEN: usize = 2;

bitflags! {
    /// Known client capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct Capabilities: u32 {
        const BUDDY_ICON       = 1 << 0;
        const VOICE            = 1 << 1;
        const DIRECT_IM        = 1 << 2;
        const CHAT             = 1 << 3;
        const GET_FILE         = 1 << 4;
        const SEND_FILE        = 1 << 5;
        const GAMES            = 1 << 6;
        const ADD_INS          = 1 << 7;
        const SEND_BUDDY_LIST  = 1 << 8;
        const ICQ_DIRECT       = 1 << 9;
        const AP_INFO          = 1 << 10;
        const ICQ_RTF          = 1 << 11;
        /// Client understands short capabilities.
        const SHORT_CAPS       = 1 << 12;
        const ICQ_SERVER_RELAY = 1 << 13;
        const UNICODE_OLD      = 1 << 14;
        const TRILLIAN_CRYPT   = 1 << 15;
        const UNICODE          = 1 << 16;
        const INTEROPERATE     = 1 << 17;
        const HIPTOP           = 1 << 18;
        const SECURE_IM        = 1 << 19;
        const VIDEO            = 1 << 20;
        const LIVE_VIDEO       = 1 << 21;
        const CAMERA           = 1 << 22;
        const SCREEN_SHARE     = 1 << 23;
        const ICHAT_AV         = 1 << 24;
        const TYPING           = 1 << 25;
        const XTRAZ            = 1 << 26;
        const SMS              = 1 << 27;
    }
}

/// One row of the capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityEntry {
    /// Flag set when `id` is seen.
    pub flag: Capabilities,
    /// Lower-case name used in diagnostics.
    pub name: &'static str,
    /// Identifier as it appears on the wire.
    pub id: [u8; CAP_LEN],
}

impl CapabilityEntry {
    /// The `[2..4)` discriminator used by short capabilities.
    pub fn short_id(&self) -> [u8; SHORT_CAP_LEN] {
        [self.id[2], self.id[3]]
    }
}

const fn aim(hi: u8, lo: u8) -> [u8; CAP_LEN] {
    [
        0x09, 0x46, hi, lo, 0x4c, 0x7f, 0x11, 0xd1, 0x82, 0x22, 0x44, 0x45, 0x53, 0x54, 0x00, 0x00,
    ]
}

const fn entry(flag: Capabilities, name: &'static str, id: [u8; CAP_LEN]) -> CapabilityEntry {
    CapabilityEntry { flag, name, id }
}

/// Built-in capability table, in match order.
pub static CAPABILITIES: &[CapabilityEntry] = &[
    entry(Capabilities::CHAT, "chat", [
        0x74, 0x8f, 0x24, 0x20, 0x62, 0x87, 0x11, 0xd1, 0x82, 0x22, 0x44, 0x45, 0x53, 0x54, 0x00, 0x00,
    ]),
    entry(Capabilities::BUDDY_ICON, "buddy-icon", aim(0x13, 0x46)),
    entry(Capabilities::VOICE, "voice", aim(0x13, 0x41)),
    entry(Capabilities::DIRECT_IM, "direct-im", aim(0x13, 0x45)),
    entry(Capabilities::GET_FILE, "get-file", aim(0x13, 0x48)),
    entry(Capabilities::SEND_FILE, "send-file", aim(0x13, 0x43)),
    entry(Capabilities::GAMES, "games", aim(0x13, 0x47)),
    // Older clients swap bytes 8 and 9 of the games identifier.
    entry(Capabilities::GAMES, "games", [
        0x09, 0x46, 0x13, 0x4a, 0x4c, 0x7f, 0x11, 0xd1, 0x22, 0x82, 0x44, 0x45, 0x53, 0x54, 0x00, 0x00,
    ]),
    entry(Capabilities::ADD_INS, "add-ins", aim(0x13, 0x4c)),
    entry(Capabilities::SEND_BUDDY_LIST, "send-buddy-list", aim(0x13, 0x4b)),
    entry(Capabilities::ICQ_DIRECT, "icq-direct", aim(0x13, 0x44)),
    entry(Capabilities::AP_INFO, "ap-info", [
        0xaa, 0x4a, 0x32, 0xb5, 0xf8, 0x84, 0x48, 0xc6, 0xa3, 0xd7, 0x8c, 0x50, 0x97, 0x19, 0xfd, 0x5b,
    ]),
    entry(Capabilities::ICQ_RTF, "icq-rtf", [
        0x97, 0xb1, 0x27, 0x51, 0x24, 0x3c, 0x43, 0x34, 0xad, 0x22, 0xd6, 0xab, 0xf7, 0x3f, 0x14, 0x92,
    ]),
    entry(Capabilities::SHORT_CAPS, "short-caps", aim(0x00, 0x00)),
    entry(Capabilities::ICQ_SERVER_RELAY, "icq-server-relay", aim(0x13, 0x49)),
    entry(Capabilities::UNICODE_OLD, "unicode-old", [
        0x2e, 0x7a, 0x64, 0x75, 0xfa, 0xdf, 0x4d, 0xc8, 0x88, 0x6f, 0xea, 0x35, 0x95, 0xfd, 0xb6, 0xdf,
    ]),
    entry(Capabilities::TRILLIAN_CRYPT, "trillian-crypt", [
        0xf2, 0xe7, 0xc7, 0xf4, 0xfe, 0xad, 0x4d, 0xfb, 0xb2, 0x35, 0x36, 0x79, 0x8b, 0xdf, 0x00, 0x00,
    ]),
    entry(Capabilities::UNICODE, "unicode", aim(0x13, 0x4e)),
    entry(Capabilities::INTEROPERATE, "interoperate", aim(0x13, 0x4d)),
    entry(Capabilities::HIPTOP, "hiptop", aim(0x13, 0x23)),
    entry(Capabilities::SECURE_IM, "secure-im", aim(0x00, 0x01)),
    entry(Capabilities::VIDEO, "video", aim(0x01, 0x00)),
    entry(Capabilities::LIVE_VIDEO, "live-video", aim(0x01, 0x01)),
    entry(Capabilities::CAMERA, "camera", aim(0x01, 0x02)),
    entry(Capabilities::ICHAT_AV, "ichat-av", aim(0x01, 0x03)),
    entry(Capabilities::SCREEN_SHARE, "screen-share", aim(0x01, 0x05)),
    entry(Capabilities::SMS, "sms", aim(0x01, 0xff)),
    entry(Capabilities::TYPING, "typing", [
        0x56, 0x3f, 0xc8, 0x09, 0x0b, 0x6f, 0x41, 0xbd, 0x9f, 0x79, 0x42, 0x26, 0x09, 0xdf, 0xa2, 0xf3,
    ]),
    entry(Capabilities::XTRAZ, "xtraz", [
        0x1a, 0x09, 0x3c, 0x6c, 0xd7, 0xfd, 0x4e, 0xc5, 0x9d, 0x51, 0xa6, 0x47, 0x4e, 0x34, 0xf5, 0xa0,
    ]),
];

/// Result of scanning a full capability block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityScan {
    pub flags: Capabilities,
    pub custom_icon: Option<CustomIcon>,
    /// Chunks that matched neither table.
    pub unmatched: usize,
}

/// Read-only view over a capability table and a custom icon table.
///
/// Built once (usually via [`CapabilityTable::builtin`]) and passed by
/// reference; nothing mutates it at runtime.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityTable<'a> {
    caps: &'a [CapabilityEntry],
    icons: &'a [CustomIconEntry],
}

impl CapabilityTable<'static> {
    pub fn builtin() -> Self {
        Self::new(CAPABILITIES, CUSTOM_ICONS)
    }
}

impl<'a> CapabilityTable<'a> {
    /// `icons[0]` is the "no custom icon" placeholder and is never matched.
    pub fn new(caps: &'a [CapabilityEntry], icons: &'a [CustomIconEntry]) -> Self {
        Self { caps, icons }
    }

    pub fn entries(&self) -> &'a [CapabilityEntry] {
        self.caps
    }

    pub fn icons(&self) -> &'a [CustomIconEntry] {
        self.icons
    }

    pub fn match_full(&self, id: &[u8; CAP_LEN]) -> Option<Capabilities> {
        self.caps.iter().find(|e| &e.id == id).map(|e| e.flag)
    }

    pub fn match_short(&self, id: &[u8; SHORT_CAP_LEN]) -> Option<Capabilities> {
        self.caps.iter().find(|e| &e.short_id() == id).map(|e| e.flag)
    }

    pub fn match_custom_icon(&self, id: &[u8; CAP_LEN]) -> Option<CustomIcon> {
        self.icons
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, e)| &e.id == id)
            .and_then(|(idx, _)| u8::try_from(idx).ok())
            .map(CustomIcon)
    }

    /// Icon at row `index` of this table. Row 0 and rows past the end have
    /// no icon.
    pub fn custom_icon(&self, index: u8) -> Option<CustomIcon> {
        match usize::from(index) {
            0 => None,
            n if n < self.icons.len() => Some(CustomIcon(index)),
            _ => None,
        }
    }

    /// Icon table row for `icon`, if the code is in range.
    pub fn icon_entry(&self, icon: CustomIcon) -> Option<&'a CustomIconEntry> {
        match icon.0 {
            0 => None,
            n => self.icons.get(usize::from(n)),
        }
    }

    /// Icon whose mood token equals `token`.
    pub fn match_mood(&self, token: &str) -> Option<CustomIcon> {
        self.icons
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, e)| e.mood == token)
            .and_then(|(idx, _)| u8::try_from(idx).ok())
            .map(CustomIcon)
    }

    /// Scan `length` bytes of 16-byte chunks. A trailing partial chunk is
    /// skipped. The block is read twice: once against the capability table,
    /// then, after rewinding, against the custom icon table.
    pub fn decode_capability_block(&self, cursor: &mut ByteCursor, length: usize) -> CapabilityScan {
        let start = cursor.position();
        let end = start + length.min(cursor.remaining());
        let chunks = (end - start) / CAP_LEN;

        let mut scan = CapabilityScan::default();
        let mut misses = Vec::new();
        for idx in 0..chunks {
            let Ok(id) = cursor.read_array::<CAP_LEN>() else { break };
            match self.match_full(&id) {
                Some(flag) => scan.flags |= flag,
                None => misses.push(idx),
            }
        }

        cursor.set_position(start);
        for idx in 0..chunks {
            let Ok(id) = cursor.read_array::<CAP_LEN>() else { break };
            match self.match_custom_icon(&id) {
                Some(icon) => {
                    if scan.custom_icon.is_none() {
                        scan.custom_icon = Some(icon);
                    }
                    misses.retain(|&m| m != idx);
                }
                None if misses.contains(&idx) => {
                    tracing::debug!(id = %hex::encode(id), "unmatched capability");
                }
                None => {}
            }
        }

        scan.unmatched = misses.len();
        cursor.set_position(end);
        scan
    }

    /// Same as [`Self::decode_capability_block`] for 2-byte chunks; returns
    /// the flags and the number of unmatched chunks.
    pub fn decode_short_capability_block(
        &self,
        cursor: &mut ByteCursor,
        length: usize,
    ) -> (Capabilities, usize) {
        let start = cursor.position();
        let end = start + length.min(cursor.remaining());
        let mut flags = Capabilities::empty();
        let mut unmatched = 0;

        for _ in 0..(end - start) / SHORT_CAP_LEN {
            let Ok(id) = cursor.read_array::<SHORT_CAP_LEN>() else { break };
            match self.match_short(&id) {
                Some(flag) => flags |= flag,
                None => {
                    unmatched += 1;
                    tracing::debug!(id = %hex::encode(id), "unmatched short capability");
                }
            }
        }

        cursor.set_position(end);
        (flags, unmatched)
    }

    /// Write the first identifier of every table flag set in `flags`, then the
    /// identifier of `icon` if any. Bits with no table row are dropped.
    pub fn encode_capability_block(
        &self,
        cursor: &mut ByteCursor,
        flags: Capabilities,
        icon: Option<CustomIcon>,
    ) {
        let mut written = Capabilities::empty();
        for e in self.caps {
            if flags.contains(e.flag) && !written.contains(e.flag) {
                cursor.write_bytes(&e.id);
                written |= e.flag;
            }
        }
        if let Some(entry) = icon.and_then(|i| self.icon_entry(i)) {
            cursor.write_bytes(&entry.id);
        }
    }

    /// Table names of every known flag in `flags`.
    pub fn names(&self, flags: Capabilities) -> Vec<&'a str> {
        let mut seen = Capabilities::empty();
        let mut out = Vec::new();
        for e in self.caps {
            if flags.contains(e.flag) && !seen.contains(e.flag) {
                seen |= e.flag;
                out.push(e.name);
            }
        }
        out
    }
}
