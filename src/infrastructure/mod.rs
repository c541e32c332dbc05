//! Adapters for the transaction authority port: the real HTTP client and an
//! in-memory simulation used by tests and offline runs.

pub mod http;
pub mod in_memory;
