//! breachcheck: privacy-preserving breach lookups
//!
//! - [`core`]: hashing, records and the lookup indexes
//! - [`server`]: the HTTP lookup service
//! - [`client`]: the HTTP client that keeps secrets local

pub use breachcheck_client as client;
pub use breachcheck_core as core;
pub use breachcheck_server as server;
