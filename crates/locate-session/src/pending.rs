//! Outstanding user-info requests, in request order.

use std::collections::VecDeque;

use locate_core::handle::normalize_handle;

/// Who asked for the information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// The application asked for it.
    Explicit,
    /// Issued internally, e.g. to prefetch an away message.
    Implicit,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Explicit => "explicit",
            RequestKind::Implicit => "implicit",
        }
    }
}

/// What `request` did with a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Queued,
    /// Already queued; nothing changed.
    Duplicate,
    /// A queued prefetch now also answers an explicit request. Its place in
    /// the queue is kept.
    Upgraded,
    /// Queue full; the request was discarded.
    Dropped,
}

impl RequestOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestOutcome::Queued => "queued",
            RequestOutcome::Duplicate => "duplicate",
            RequestOutcome::Upgraded => "upgraded",
            RequestOutcome::Dropped => "dropped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Handle as first requested.
    pub handle: String,
    /// Explicit once any caller has asked for it explicitly.
    pub kind: RequestKind,
    key: String,
}

#[derive(Debug)]
pub struct PendingRequestQueue {
    queue: VecDeque<PendingRequest>,
    max_entries: usize,
}

impl PendingRequestQueue {
    pub fn new(max_entries: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            max_entries,
        }
    }

    /// Append `handle` unless it is already queued. An explicit request for
    /// a handle with only a prefetch queued marks that entry explicit.
    pub fn request(&mut self, handle: &str, kind: RequestKind) -> RequestOutcome {
        let key = normalize_handle(handle);
        if let Some(queued) = self.queue.iter_mut().find(|r| r.key == key) {
            if kind == RequestKind::Explicit && queued.kind == RequestKind::Implicit {
                queued.kind = RequestKind::Explicit;
                return RequestOutcome::Upgraded;
            }
            return RequestOutcome::Duplicate;
        }
        if self.queue.len() >= self.max_entries {
            tracing::warn!(
                handle,
                kind = kind.as_str(),
                max_entries = self.max_entries,
                "pending request queue full; dropping request"
            );
            return RequestOutcome::Dropped;
        }
        self.queue.push_back(PendingRequest {
            handle: handle.to_string(),
            kind,
            key,
        });
        RequestOutcome::Queued
    }

    /// Remove every entry for `handle`. `None` means nothing was queued, i.e.
    /// the update was unsolicited. Explicit wins over implicit.
    pub fn resolve_kind(&mut self, handle: &str) -> Option<RequestKind> {
        let key = normalize_handle(handle);
        let mut found = None;
        self.queue.retain(|r| {
            if r.key != key {
                return true;
            }
            if found != Some(RequestKind::Explicit) {
                found = Some(r.kind);
            }
            false
        });
        found
    }

    /// Remove every entry for `handle`; true if any was explicit.
    pub fn resolve(&mut self, handle: &str) -> bool {
        self.resolve_kind(handle) == Some(RequestKind::Explicit)
    }

    /// Oldest outstanding request.
    pub fn next_request(&self) -> Option<&PendingRequest> {
        self.queue.front()
    }

    pub fn is_pending(&self, handle: &str) -> bool {
        let key = normalize_handle(handle);
        self.queue.iter().any(|r| r.key == key)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingRequest> {
        self.queue.iter()
    }
}
