//! breachcheck-client: breach lookups without disclosing the secret
//!
//! Emails and phone numbers are hashed locally before they leave the
//! process. Passwords go further: only the 5-character digest prefix is
//! sent, and the returned suffix range is matched here.

pub mod client;
pub mod error;

pub use client::{BreachClient, HealthStatus, InitializeResult};
pub use error::ClientError;
