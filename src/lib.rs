//! Verification of signed EV charging session records
//!
//! This library rebuilds the bytes a charging meter signed, resolves the
//! matching public key and checks the ECDSA signatures of single meter values
//! as well as of complete charging sessions.

pub mod models;
pub mod binary_encoder;
pub mod hash_engine;
pub mod curves;
pub mod signature_codec;
pub mod key_resolver;
pub mod crypto_methods;
pub mod session;
pub mod obis_utils;
pub mod config;
#[cfg(feature = "api")]
pub mod api;

#[cfg(test)]
mod test_fixtures;

// Re-export common types for easier access
pub use models::{ChargeTransparencyRecord, ChargingSession, SessionVerificationResult, VerificationResult};
pub use key_resolver::Registry;
pub use session::SessionAggregator;
pub use config::ConfigHolder;
#[cfg(feature = "api")]
pub use api::ApiManager;
