//! Locate wire formats.
//!
//! Layering, leaves first:
//! - `cursor`: bounds-checked big-endian reads/writes over an owned buffer.
//! - `tlv`: `{type, length, value}` chains with permissive length clamping.
//! - `caps` / `icons`: static capability and custom icon tables.
//! - `userinfo`: the user-info record and its presence extras block.
//! - `profile`: locate reply trailer and the outgoing set-info chain.
//!
//! All parsers are panic-free. A fixed-width read past the end of a record is
//! the only error; unknown or garbled fields are skipped so newer peers keep
//! working against older code.

pub mod caps;
pub mod cursor;
pub mod icons;
pub mod profile;
pub mod tlv;
pub mod userinfo;

pub use caps::{Capabilities, CapabilityEntry, CapabilityScan, CapabilityTable};
pub use cursor::ByteCursor;
pub use icons::{CustomIcon, CustomIconEntry};
pub use profile::ProfileAnnouncement;
pub use tlv::{Tlv, TlvList};
pub use userinfo::{
    CapabilitySet, ChecksumVariant, DecodeStats, IconChecksum, IcqStatus, Presence, PresenceExtras,
    Text, UserClass, UserInfoRecord,
};
