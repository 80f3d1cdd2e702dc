//! Per-session user-info cache.
//!
//! One slot per normalized handle. Incoming records are merged field by field
//! into the slot, so a partial update only touches what it carried. Every
//! merge notifies the registered [`UserInfoObserver`] exactly once with the
//! merged record.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use locate_core::handle::normalize_handle;
use locate_core::protocol::{PresenceExtras, UserInfoRecord};

/// Subscriber for merged user-info records.
pub trait UserInfoObserver {
    fn on_user_info(&mut self, record: &UserInfoRecord);
}

impl<F> UserInfoObserver for F
where
    F: FnMut(&UserInfoRecord),
{
    fn on_user_info(&mut self, record: &UserInfoRecord) {
        self(record)
    }
}

/// Observer that ignores every update.
pub struct NoopObserver;

impl UserInfoObserver for NoopObserver {
    fn on_user_info(&mut self, _record: &UserInfoRecord) {}
}

/// Whether a merge created a new slot or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeResult {
    Created,
    Updated,
}

impl MergeResult {
    pub fn as_str(self) -> &'static str {
        match self {
            MergeResult::Created => "created",
            MergeResult::Updated => "updated",
        }
    }
}

pub struct UserInfoCache {
    entries: HashMap<String, UserInfoRecord>,
    observer: Box<dyn UserInfoObserver>,
}

impl Default for UserInfoCache {
    fn default() -> Self {
        Self::new(Box::new(NoopObserver))
    }
}

impl UserInfoCache {
    pub fn new(observer: Box<dyn UserInfoObserver>) -> Self {
        Self {
            entries: HashMap::new(),
            observer,
        }
    }

    /// Merge `record` into the slot for its handle and notify the observer.
    pub fn merge(&mut self, record: UserInfoRecord) -> MergeResult {
        let key = normalize_handle(&record.handle);
        let (result, slot) = match self.entries.entry(key) {
            Entry::Occupied(e) => {
                let slot = e.into_mut();
                merge_into(slot, record);
                (MergeResult::Updated, slot)
            }
            Entry::Vacant(e) => (MergeResult::Created, e.insert(record)),
        };
        tracing::trace!(handle = %slot.handle, result = result.as_str(), "user info merged");
        self.observer.on_user_info(slot);
        result
    }

    pub fn find(&self, handle: &str) -> Option<&UserInfoRecord> {
        self.entries.get(&normalize_handle(handle))
    }

    /// Evict one entry.
    pub fn remove(&mut self, handle: &str) -> Option<UserInfoRecord> {
        self.entries.remove(&normalize_handle(handle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserInfoRecord> {
        self.entries.values()
    }

    /// Release every record. Returns how many were held.
    pub fn teardown(self) -> usize {
        let n = self.entries.len();
        tracing::debug!(records = n, "user info cache released");
        n
    }
}

/// Overwrite every field `incoming` carries. Presence extras follow their own
/// rule: a block without an away sub-entry clears the cached away text.
fn merge_into(slot: &mut UserInfoRecord, incoming: UserInfoRecord) {
    slot.handle = incoming.handle;
    slot.warning_level = incoming.warning_level;

    fn take<T>(slot: &mut Option<T>, incoming: Option<T>) {
        if incoming.is_some() {
            *slot = incoming;
        }
    }

    take(&mut slot.user_class, incoming.user_class);
    take(&mut slot.created_at, incoming.created_at);
    take(&mut slot.online_since, incoming.online_since);
    take(&mut slot.member_since, incoming.member_since);
    take(&mut slot.idle_minutes, incoming.idle_minutes);
    take(&mut slot.session_length, incoming.session_length);
    take(&mut slot.icq_status, incoming.icq_status);
    take(&mut slot.external_ip, incoming.external_ip);
    take(&mut slot.capabilities, incoming.capabilities);
    take(&mut slot.profile, incoming.profile);
    take(&mut slot.away_message, incoming.away_message);

    if let Some(x) = incoming.extras {
        let cached = slot.extras.get_or_insert_with(PresenceExtras::default);
        take(&mut cached.icon_checksum, x.icon_checksum);
        take(&mut cached.external_link, x.external_link);
        take(&mut cached.mood, x.mood);
        cached.away = x.away;
    }
}
