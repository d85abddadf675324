//! SDES keying and SRTP packet authentication.
//!
//! Turns the `<suite> inline:<key||salt>` fields of an SDES crypto attribute
//! into master key material, derives per-stream session keys from it, and
//! computes and checks truncated HMAC-SHA1 packet tags.

pub mod codec;
pub mod config;
pub mod srtp;
