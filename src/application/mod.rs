//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `KioskEngine`, the single owner of session and
//! cache state. Every mutation funnels through its methods, which keeps the
//! single-writer invariant enforceable without locks.

pub mod engine;
pub mod feedback;
