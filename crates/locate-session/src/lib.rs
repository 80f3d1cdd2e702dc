//! Locate session library entry.
//!
//! Per-session state layered over `locate-core`: the user-info cache, the
//! pending request queue, and the `LocateSession` facade that runs
//! decode -> merge -> resolve for each incoming record. Everything here is
//! synchronous and owned by a single session; no I/O is performed.

pub mod cache;
pub mod config;
pub mod obs;
pub mod pending;
pub mod session;

pub use cache::{MergeResult, NoopObserver, UserInfoCache, UserInfoObserver};
pub use config::LocateConfig;
pub use obs::LocateMetrics;
pub use pending::{PendingRequest, PendingRequestQueue, RequestKind, RequestOutcome};
pub use session::{InfoOutcome, LocateSession};
