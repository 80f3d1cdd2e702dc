//! Top-level facade crate for the Locate user-info subsystem.
//!
//! Re-exports the codec and the session layer so users can depend on a single crate.

pub mod core {
    pub use locate_core::*;
}

pub mod session {
    pub use locate_session::*;
}
