//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (declared length, then bounded body read)
//!     → Pass to dispatch
//! ```
//!
//! # Design Decisions
//! - Reject before any endpoint is consulted
//! - The payload is opaque; size is the only check

pub mod limits;

pub use limits::RequestGuard;
