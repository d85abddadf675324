//! SRTP keying core: crypto-suite registry, SDES key material, session key
//! derivation and packet authentication (RFC 3711, RFC 4568, RFC 6188).
//!
//! Everything here is a pure function of its inputs apart from reading the
//! static suite table. Rollover counters, sequence tracking and the SDP
//! offer/answer exchange belong to the caller.

pub mod auth;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod sdes;
pub mod suite;

pub use auth::{compute_rtp_tag, compute_tag, verify_rtp_tag, verify_tag, AuthTag};
pub use error::{DecodeError, Error, Result};
pub use kdf::{derivation_context, derive_key, derive_session_keys, KeyFamily, SessionKeys};
pub use keys::{decode_inline, MasterKeyMaterial};
pub use sdes::{CryptoAttribute, Mki};
pub use suite::{lookup, Cipher, CryptoSuite, MacAlgorithm};
