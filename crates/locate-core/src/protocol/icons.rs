//! Custom status icons ("moods").
//!
//! ICQ-style clients announce a custom icon either as one extra 16-byte
//! identifier inside the capability block or as a mood token in the presence
//! extras block. Both resolve to an index into [`CUSTOM_ICONS`]. Index 0 is
//! the "no custom icon" row and never matches.

use serde::Serialize;

/// Index into the custom icon table.
///
/// Only handed out by [`CapabilityTable`](super::caps::CapabilityTable)
/// lookups, so it is always non-zero and names a row of the table it came
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CustomIcon(pub(crate) u8);

impl CustomIcon {
    pub fn index(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomIconEntry {
    /// Short human-readable name.
    pub name: &'static str,
    /// Token carried in the presence extras mood sub-entry.
    pub mood: &'static str,
    /// Identifier carried in the capability block.
    pub id: [u8; 16],
}

const fn icon(name: &'static str, mood: &'static str, id: [u8; 16]) -> CustomIconEntry {
    CustomIconEntry { name, mood, id }
}

pub static CUSTOM_ICONS: &[CustomIconEntry] = &[
    icon("none", "", [0; 16]),
    icon("angry", "icqmood1", [0x01, 0xd8, 0xd7, 0xee, 0xac, 0x3b, 0x49, 0x2a, 0xa5, 0x8d, 0xd3, 0xd8, 0x77, 0xe6, 0x6b, 0x92]),
    icon("duck", "icqmood2", [0x5a, 0x58, 0x1e, 0xa1, 0xe5, 0x80, 0x43, 0x0c, 0xa0, 0x6f, 0x61, 0x22, 0x98, 0xb7, 0xe4, 0xc7]),
    icon("tired", "icqmood3", [0x83, 0xc9, 0xb7, 0x8e, 0x77, 0xe7, 0x43, 0x78, 0xb2, 0xc5, 0xfb, 0x6c, 0xfc, 0xc3, 0x5b, 0xec]),
    icon("party", "icqmood4", [0xe6, 0x01, 0xe4, 0x1c, 0x33, 0x73, 0x4b, 0xd1, 0xbc, 0x06, 0x81, 0x1d, 0x6c, 0x32, 0x3d, 0x81]),
    icon("beer", "icqmood5", [0x8c, 0x50, 0xdb, 0xae, 0x81, 0xed, 0x47, 0x86, 0xac, 0xca, 0x16, 0xcc, 0x32, 0x13, 0xc7, 0xb7]),
    icon("thinking", "icqmood6", [0x3f, 0xb0, 0xbd, 0x36, 0xaf, 0x3b, 0x4a, 0x60, 0x9e, 0xef, 0xcf, 0x19, 0x0f, 0x6a, 0x5a, 0x7f]),
    icon("eating", "icqmood7", [0xf8, 0xe8, 0xd7, 0xb2, 0x82, 0xc4, 0x41, 0x42, 0x90, 0xf8, 0x10, 0xc6, 0xce, 0x0a, 0x89, 0xa6]),
    icon("tv", "icqmood8", [0x80, 0x53, 0x7d, 0xe2, 0xa4, 0x67, 0x4a, 0x76, 0xb3, 0x54, 0x6d, 0xfd, 0x07, 0x5f, 0x5e, 0xc6]),
    icon("friends", "icqmood9", [0xf1, 0x8a, 0xb5, 0x2e, 0xdc, 0x57, 0x49, 0x1d, 0x99, 0xdc, 0x64, 0x44, 0x50, 0x24, 0x57, 0xaf]),
    icon("coffee", "icqmood10", [0x1b, 0x78, 0xae, 0x31, 0xfa, 0x0b, 0x4d, 0x38, 0x93, 0xd1, 0x99, 0x7e, 0xee, 0xaf, 0xb2, 0x18]),
    icon("music", "icqmood11", [0x61, 0xbe, 0xe0, 0xdd, 0x8b, 0xdd, 0x47, 0x5d, 0x8d, 0xee, 0x5f, 0x4b, 0xaa, 0xcf, 0x19, 0xa7]),
    icon("business", "icqmood12", [0x48, 0x8e, 0x14, 0x89, 0x8a, 0xca, 0x4a, 0x08, 0x82, 0xaa, 0x77, 0xce, 0x7a, 0x16, 0x52, 0x08]),
    icon("camera", "icqmood13", [0x10, 0x7a, 0x9a, 0x18, 0x12, 0x32, 0x4d, 0xa4, 0xb6, 0xcd, 0x08, 0x79, 0xdb, 0x78, 0x0f, 0x09]),
    icon("funny", "icqmood14", [0x6f, 0x49, 0x30, 0x98, 0x4f, 0x7c, 0x4a, 0xff, 0xa2, 0x76, 0x34, 0xa0, 0x3b, 0xce, 0xae, 0xa7]),
    icon("phone", "icqmood15", [0x12, 0x92, 0xe5, 0x50, 0x1b, 0x64, 0x4f, 0x66, 0xb2, 0x06, 0xb2, 0x9a, 0xf3, 0x78, 0xe4, 0x8d]),
    icon("games", "icqmood16", [0xd4, 0xa6, 0x11, 0xd0, 0x8f, 0x01, 0x4e, 0xc0, 0x92, 0x23, 0xc5, 0xb6, 0xbe, 0xc6, 0xcc, 0xf0]),
    icon("college", "icqmood17", [0x60, 0x9d, 0x52, 0xf8, 0xa2, 0x9a, 0x49, 0xa6, 0xb2, 0xa0, 0x25, 0x24, 0xc5, 0xe9, 0xd2, 0x60]),
    icon("shopping", "icqmood18", [0x63, 0x62, 0x73, 0x37, 0xa0, 0x3f, 0x49, 0xff, 0x80, 0xe5, 0xf7, 0x09, 0xcd, 0xe0, 0xa4, 0xee]),
    icon("sick", "icqmood19", [0x1f, 0x7a, 0x40, 0x71, 0xbf, 0x3b, 0x4e, 0x60, 0xbc, 0x32, 0x4c, 0x57, 0x87, 0xb0, 0x4c, 0xf1]),
    icon("sleeping", "icqmood20", [0x78, 0x5e, 0x8c, 0x48, 0x40, 0xd3, 0x4c, 0x65, 0x88, 0x6f, 0x04, 0xcf, 0x3f, 0x3f, 0x43, 0xdf]),
    icon("surfing", "icqmood21", [0xa6, 0xed, 0x55, 0x7e, 0x6b, 0xf7, 0x44, 0xd4, 0xa5, 0xd4, 0xd2, 0xe7, 0xd9, 0x5c, 0xe8, 0x1f]),
    icon("internet", "icqmood22", [0x12, 0xd0, 0x7e, 0x3e, 0xf8, 0x85, 0x48, 0x9e, 0x8e, 0x97, 0xa7, 0x2a, 0x65, 0x51, 0xe5, 0x8d]),
    icon("engineering", "icqmood23", [0xba, 0x74, 0xdb, 0x3e, 0x9e, 0x24, 0x43, 0x4b, 0x87, 0xb6, 0x2f, 0x6b, 0x8d, 0xfe, 0xe5, 0x0f]),
    icon("typing", "icqmood24", [0x63, 0x4f, 0x6b, 0xd8, 0xad, 0xd2, 0x4a, 0xa1, 0xaa, 0xb9, 0x11, 0x5b, 0xc2, 0x6d, 0x05, 0xa1]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::caps::CapabilityTable;

    #[test]
    fn mood_tokens_resolve() {
        let t = CapabilityTable::builtin();
        assert_eq!(t.match_mood("icqmood4"), Some(CustomIcon(4)));
        assert_eq!(t.icon_entry(CustomIcon(4)).map(|e| e.name), Some("party"));
        assert_eq!(t.match_mood("icqmood99"), None);
    }

    #[test]
    fn empty_token_is_not_a_mood() {
        assert_eq!(CapabilityTable::builtin().match_mood(""), None);
        assert!(CapabilityTable::builtin().icon_entry(CustomIcon(0)).is_none());
    }

    #[test]
    fn icons_only_exist_for_table_rows() {
        let t = CapabilityTable::builtin();
        assert_eq!(t.custom_icon(0), None);
        assert_eq!(t.custom_icon(1).map(CustomIcon::index), Some(1));
        let last = (CUSTOM_ICONS.len() - 1) as u8;
        assert!(t.custom_icon(last).is_some());
        assert_eq!(t.custom_icon(last + 1), None);
        assert_eq!(t.custom_icon(200), None);
    }

    #[test]
    fn identifiers_are_unique() {
        for (i, a) in CUSTOM_ICONS.iter().enumerate() {
            for b in &CUSTOM_ICONS[i + 1..] {
                assert_ne!(a.id, b.id, "{} / {}", a.name, b.name);
            }
        }
    }
}
