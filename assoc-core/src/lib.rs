//! # brandassoc-core
//!
//! Pure logic for BrandAssoc sync (no I/O, instant tests).
//!
//! This crate implements the derived views and the transaction status
//! machine without any network or storage I/O.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (backend reads and writes, timers) is performed by
//! `brandassoc-client`, which interprets the actions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod status;
pub mod view;

pub use status::{
    Action, FailureKind, ResetDelays, StatusEvent, StatusMachine, TxFailure, TxStatus,
    PENDING_MESSAGE, SUCCESS_MESSAGE,
};
pub use view::{filter, stats, ParseTabError, ScoreBand, Stats, Tab};
