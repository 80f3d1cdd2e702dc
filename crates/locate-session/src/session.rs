//! One session's locate state: decode, merge, resolve.

use std::sync::Arc;

use bytes::Bytes;
use locate_core::error::Result;
use locate_core::protocol::{ByteCursor, CapabilityTable, ProfileAnnouncement, UserInfoRecord};

use crate::cache::{UserInfoCache, UserInfoObserver};
use crate::config::LocateConfig;
use crate::obs::LocateMetrics;
use crate::pending::{PendingRequest, PendingRequestQueue, RequestKind, RequestOutcome};

/// How an incoming record related to the outstanding requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoOutcome {
    /// Answers a request the application made.
    Explicit,
    /// Answers an internal prefetch only.
    Implicit,
    /// Nothing was queued for this handle.
    Unsolicited,
}

impl InfoOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            InfoOutcome::Explicit => "explicit",
            InfoOutcome::Implicit => "implicit",
            InfoOutcome::Unsolicited => "unsolicited",
        }
    }

    fn from_kind(kind: Option<RequestKind>) -> Self {
        match kind {
            Some(RequestKind::Explicit) => InfoOutcome::Explicit,
            Some(RequestKind::Implicit) => InfoOutcome::Implicit,
            None => InfoOutcome::Unsolicited,
        }
    }
}

pub struct LocateSession {
    cfg: LocateConfig,
    table: CapabilityTable<'static>,
    cache: UserInfoCache,
    pending: PendingRequestQueue,
    metrics: Arc<LocateMetrics>,
}

impl LocateSession {
    pub fn new(cfg: LocateConfig, observer: Box<dyn UserInfoObserver>) -> Self {
        Self::with_metrics(cfg, observer, Arc::new(LocateMetrics::default()))
    }

    /// Share a metrics registry across sessions.
    pub fn with_metrics(
        cfg: LocateConfig,
        observer: Box<dyn UserInfoObserver>,
        metrics: Arc<LocateMetrics>,
    ) -> Self {
        let pending = PendingRequestQueue::new(cfg.pending.max_entries);
        Self {
            cfg,
            table: CapabilityTable::builtin(),
            cache: UserInfoCache::new(observer),
            pending,
            metrics,
        }
    }

    /// Decode one user-info record, merge it into the cache and settle any
    /// requests it answers. A truncated record leaves cache and queue alone.
    pub fn handle_user_info(&mut self, data: &[u8]) -> Result<InfoOutcome> {
        let mut cursor = ByteCursor::new(data);
        let (record, stats) = match UserInfoRecord::decode_with(&mut cursor, &self.table) {
            Ok(v) => v,
            Err(e) => {
                self.metrics
                    .decode_failures
                    .inc(&[("code", e.code().as_str())]);
                tracing::warn!(error = %e, len = data.len(), "dropping undecodable user info record");
                return Err(e);
            }
        };

        self.metrics.records_decoded.inc(&[]);
        if stats.unmatched_capabilities > 0 {
            self.metrics
                .unmatched_capabilities
                .add(&[], stats.unmatched_capabilities as u64);
            if self.cfg.codec.log_unmatched_caps {
                tracing::debug!(
                    handle = %record.handle,
                    count = stats.unmatched_capabilities,
                    "unmatched capabilities"
                );
            }
        }
        if stats.unknown_fields > 0 {
            self.metrics
                .unknown_fields
                .add(&[], stats.unknown_fields as u64);
            if self.cfg.codec.log_unknown_fields {
                tracing::debug!(
                    handle = %record.handle,
                    count = stats.unknown_fields,
                    "unknown user info fields skipped"
                );
            }
        }

        let handle = record.handle.clone();
        let merged = self.cache.merge(record);
        self.metrics.cache_merges.inc(&[("result", merged.as_str())]);
        if merged == crate::cache::MergeResult::Created {
            self.metrics.cache_entries.inc(&[]);
        }

        let outcome = InfoOutcome::from_kind(self.pending.resolve_kind(&handle));
        self.metrics.resolutions.inc(&[("outcome", outcome.as_str())]);
        tracing::debug!(handle = %handle, outcome = outcome.as_str(), "user info handled");
        Ok(outcome)
    }

    /// Queue a request the application asked for. If only a prefetch for
    /// the handle is queued, that entry becomes explicit, so the reply or
    /// failure is still reported to the application.
    pub fn request_info(&mut self, handle: &str) -> RequestOutcome {
        self.enqueue(handle, RequestKind::Explicit)
    }

    /// Queue an internal away-message fetch.
    pub fn prefetch_away(&mut self, handle: &str) -> RequestOutcome {
        self.enqueue(handle, RequestKind::Implicit)
    }

    fn enqueue(&mut self, handle: &str, kind: RequestKind) -> RequestOutcome {
        let outcome = self.pending.request(handle, kind);
        self.metrics
            .requests
            .inc(&[("kind", kind.as_str()), ("outcome", outcome.as_str())]);
        outcome
    }

    /// Oldest request still waiting for a reply.
    pub fn next_request(&self) -> Option<&PendingRequest> {
        self.pending.next_request()
    }

    /// A fetch for `handle` failed. Returns true when the application asked
    /// for it and should be told the information is unavailable.
    pub fn handle_info_error(&mut self, handle: &str) -> bool {
        let kind = self.pending.resolve_kind(handle);
        let outcome = match kind {
            Some(RequestKind::Explicit) => "failed_explicit",
            Some(RequestKind::Implicit) => "failed_implicit",
            None => "failed_unsolicited",
        };
        self.metrics.resolutions.inc(&[("outcome", outcome)]);
        tracing::debug!(handle, outcome, "user info request failed");
        kind == Some(RequestKind::Explicit)
    }

    /// Encode the local user's set-info block.
    pub fn announce(&self, ann: &ProfileAnnouncement) -> Bytes {
        let mut w = ByteCursor::writer();
        ann.encode(&mut w, &self.table);
        tracing::debug!(
            handle = %ann.handle,
            capabilities = ?self.table.names(ann.capabilities),
            len = w.len(),
            "profile announcement encoded"
        );
        w.into_bytes()
    }

    /// Encode a cached record, picking the session length type from its
    /// user class.
    pub fn encode_cached(&self, handle: &str) -> Option<Bytes> {
        let rec = self.cache.find(handle)?;
        let mut w = ByteCursor::writer();
        rec.encode_with(&mut w, rec.is_aol(), &self.table);
        Some(w.into_bytes())
    }

    pub fn find(&self, handle: &str) -> Option<&UserInfoRecord> {
        self.cache.find(handle)
    }

    /// Evict one cached record.
    pub fn forget(&mut self, handle: &str) -> Option<UserInfoRecord> {
        let rec = self.cache.remove(handle)?;
        self.metrics.cache_entries.dec(&[]);
        Some(rec)
    }

    pub fn cache(&self) -> &UserInfoCache {
        &self.cache
    }

    pub fn pending(&self) -> &PendingRequestQueue {
        &self.pending
    }

    pub fn config(&self) -> &LocateConfig {
        &self.cfg
    }

    pub fn metrics(&self) -> &Arc<LocateMetrics> {
        &self.metrics
    }

    /// End of session. Outstanding requests are abandoned; returns how many
    /// cached records were released.
    pub fn teardown(self) -> usize {
        if !self.pending.is_empty() {
            tracing::debug!(pending = self.pending.len(), "abandoning pending requests");
        }
        let released = self.cache.teardown();
        self.metrics.cache_entries.add(&[], -(released as i64));
        released
    }
}
