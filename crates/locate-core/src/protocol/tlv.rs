//! Type-Length-Value chains.
//!
//! Wire shape of one entry: `{type: u16, length: u16, value: length bytes}`,
//! big-endian. Decoding is permissive: a declared length that overruns the
//! enclosing block or the buffer is clamped to what remains, and a header that
//! does not fit ends the chain. Nothing here returns an error.

use bytes::Bytes;

use super::cursor::ByteCursor;

/// Bytes taken by the `{type, length}` header.
pub const TLV_HEADER_LEN: usize = 4;

/// One decoded entry. `value.len()` may be shorter than the declared length
/// when the entry was clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    pub tlv_type: u16,
    pub value: Bytes,
}

impl Tlv {
    pub fn new(tlv_type: u16, value: impl Into<Bytes>) -> Self {
        Self {
            tlv_type,
            value: value.into(),
        }
    }

    /// Cursor over this entry's value, for nested parsing.
    pub fn cursor(&self) -> ByteCursor {
        ByteCursor::new(&self.value)
    }

    /// Leading big-endian u16 of the value, if the value is long enough.
    pub fn as_u16(&self) -> Option<u16> {
        self.cursor().read_u16().ok()
    }

    /// Leading big-endian u32 of the value, if the value is long enough.
    pub fn as_u32(&self) -> Option<u32> {
        self.cursor().read_u32().ok()
    }
}

/// Ordered TLV entries; types may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlvList {
    entries: Vec<Tlv>,
}

impl TlvList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read entries until `total_length` bytes have been consumed.
    pub fn decode(cursor: &mut ByteCursor, total_length: usize) -> Self {
        Self::decode_bounded(cursor, total_length, usize::MAX)
    }

    /// Read at most `count` entries, never consuming more than `limit` bytes.
    pub fn decode_counted(cursor: &mut ByteCursor, count: u16, limit: usize) -> Self {
        Self::decode_bounded(cursor, limit, usize::from(count))
    }

    fn decode_bounded(cursor: &mut ByteCursor, total_length: usize, max_entries: usize) -> Self {
        let mut entries = Vec::new();
        let mut consumed = 0usize;

        while entries.len() < max_entries {
            let block_left = total_length.saturating_sub(consumed);
            if block_left < TLV_HEADER_LEN || cursor.remaining() < TLV_HEADER_LEN {
                break;
            }
            let (Ok(tlv_type), Ok(declared)) = (cursor.read_u16(), cursor.read_u16()) else {
                break;
            };
            let want = usize::from(declared).min(block_left - TLV_HEADER_LEN);
            let value = cursor.read_bytes(want);
            if value.len() < usize::from(declared) {
                tracing::trace!(
                    tlv_type,
                    declared,
                    got = value.len(),
                    "tlv value clamped to enclosing block"
                );
            }
            consumed += TLV_HEADER_LEN + value.len();
            entries.push(Tlv { tlv_type, value });
        }

        Self { entries }
    }

    /// Write every entry in stored order. Values longer than `u16::MAX` are cut.
    pub fn encode(&self, cursor: &mut ByteCursor) {
        for tlv in &self.entries {
            let value = &tlv.value[..tlv.value.len().min(usize::from(u16::MAX))];
            cursor.write_u16(tlv.tlv_type);
            cursor.write_u16(value.len() as u16);
            cursor.write_bytes(value);
        }
    }

    /// Encoded size of the whole chain.
    pub fn encoded_len(&self) -> usize {
        self.entries
            .iter()
            .map(|t| TLV_HEADER_LEN + t.value.len().min(usize::from(u16::MAX)))
            .sum()
    }

    /// The `occurrence`-th (1-indexed) entry of `tlv_type`.
    pub fn get(&self, tlv_type: u16, occurrence: usize) -> Option<&Tlv> {
        if occurrence == 0 {
            return None;
        }
        self.entries
            .iter()
            .filter(|t| t.tlv_type == tlv_type)
            .nth(occurrence - 1)
    }

    pub fn get_u16(&self, tlv_type: u16, occurrence: usize) -> Option<u16> {
        self.get(tlv_type, occurrence).and_then(Tlv::as_u16)
    }

    pub fn get_u32(&self, tlv_type: u16, occurrence: usize) -> Option<u32> {
        self.get(tlv_type, occurrence).and_then(Tlv::as_u32)
    }

    pub fn contains(&self, tlv_type: u16) -> bool {
        self.entries.iter().any(|t| t.tlv_type == tlv_type)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tlv> {
        self.entries.iter()
    }

    pub fn push(&mut self, tlv_type: u16, value: impl Into<Bytes>) {
        self.entries.push(Tlv::new(tlv_type, value));
    }

    pub fn push_u16(&mut self, tlv_type: u16, v: u16) {
        self.push(tlv_type, v.to_be_bytes().to_vec());
    }

    pub fn push_u32(&mut self, tlv_type: u16, v: u32) {
        self.push(tlv_type, v.to_be_bytes().to_vec());
    }

    pub fn push_empty(&mut self, tlv_type: u16) {
        self.push(tlv_type, Bytes::new());
    }
}
