//! Domain layer: account records, session state machine, transaction limits
//! and the port to the external transaction authority.

pub mod account;
pub mod limits;
pub mod logs;
pub mod ports;
pub mod session;
