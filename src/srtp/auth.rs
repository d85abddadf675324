//! Packet authentication: truncated HMAC-SHA1 tags (RFC 3711, section 4.2).
//!
//! A tag is the full HMAC digest truncated to its leftmost `tag_len` bytes.
//! Verification never short-circuits on the first differing byte; a mismatch
//! is an ordinary `false`, the caller drops the packet.

use std::fmt;

use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::kdf::SessionKeys;
use super::suite::MacAlgorithm;
use crate::codec;

type HmacSha1 = Hmac<Sha1>;

/// A truncated MAC value attached to (or expected from) one packet.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthTag(Vec<u8>);

impl AuthTag {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        codec::hex_encode(&self.0)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for AuthTag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AuthTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthTag({})", self.to_hex())
    }
}

fn keyed_mac(auth_key: &[u8], parts: &[&[u8]]) -> HmacSha1 {
    let mut mac = HmacSha1::new_from_slice(auth_key).expect("HMAC key length is valid");
    for part in parts {
        mac.update(part);
    }
    mac
}

/// Tag length actually produced: requests past the digest get the whole digest.
fn effective_len(tag_len: usize) -> usize {
    tag_len.min(MacAlgorithm::HmacSha1.digest_len())
}

fn truncate(mac: HmacSha1, tag_len: usize) -> AuthTag {
    let digest = mac.finalize().into_bytes();
    AuthTag(digest[..effective_len(tag_len)].to_vec())
}

fn verify(mac: HmacSha1, presented: &[u8], tag_len: usize) -> bool {
    if presented.len() != effective_len(tag_len) {
        return false;
    }
    // Constant-time over the compared bytes; rejects empty tags.
    mac.verify_truncated_left(presented).is_ok()
}

/// HMAC-SHA1 over `packet`, truncated to `tag_len` bytes.
pub fn compute_tag(auth_key: &[u8], packet: &[u8], tag_len: usize) -> AuthTag {
    truncate(keyed_mac(auth_key, &[packet]), tag_len)
}

/// Check `presented` against the tag for `packet`.
///
/// Returns false when `presented` is not exactly `tag_len` bytes (or the full
/// digest, for a `tag_len` past it).
pub fn verify_tag(auth_key: &[u8], packet: &[u8], presented: &[u8], tag_len: usize) -> bool {
    verify(keyed_mac(auth_key, &[packet]), presented, tag_len)
}

/// SRTP tag: the MAC covers `packet || ROC` with the rollover counter big-endian.
pub fn compute_rtp_tag(auth_key: &[u8], packet: &[u8], roc: u32, tag_len: usize) -> AuthTag {
    truncate(keyed_mac(auth_key, &[packet, &roc.to_be_bytes()]), tag_len)
}

pub fn verify_rtp_tag(
    auth_key: &[u8],
    packet: &[u8],
    roc: u32,
    presented: &[u8],
    tag_len: usize,
) -> bool {
    verify(
        keyed_mac(auth_key, &[packet, &roc.to_be_bytes()]),
        presented,
        tag_len,
    )
}

impl SessionKeys {
    /// SRTP tag for `packet` (header || encrypted payload) at rollover counter `roc`.
    pub fn rtp_tag(&self, packet: &[u8], roc: u32) -> AuthTag {
        compute_rtp_tag(self.auth_key(), packet, roc, self.suite().tag_len)
    }

    pub fn verify_rtp_tag(&self, packet: &[u8], roc: u32, presented: &[u8]) -> bool {
        verify_rtp_tag(self.auth_key(), packet, roc, presented, self.suite().tag_len)
    }

    /// SRTCP tag for `packet` (header || encrypted payload || E||index).
    pub fn rtcp_tag(&self, packet: &[u8]) -> AuthTag {
        compute_tag(self.auth_key(), packet, self.suite().srtcp_tag_len)
    }

    pub fn verify_rtcp_tag(&self, packet: &[u8], presented: &[u8]) -> bool {
        verify_tag(self.auth_key(), packet, presented, self.suite().srtcp_tag_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srtp::kdf::{derive_session_keys, KeyFamily};
    use crate::srtp::keys::MasterKeyMaterial;
    use crate::srtp::suite::{AES_CM_128_HMAC_SHA1_32, AES_CM_128_HMAC_SHA1_80};

    const JEFE_DIGEST: &str = "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79";

    #[test]
    fn test_rfc2202_jefe_vector() {
        let tag = compute_tag(b"Jefe", b"what do ya want for nothing?", 20);
        assert_eq!(tag.to_hex(), JEFE_DIGEST);
    }

    #[test]
    fn test_rfc2202_case_1() {
        let tag = compute_tag(&[0x0b; 20], b"Hi There", 20);
        assert_eq!(tag.to_hex(), "b617318655057264e28bc0b6fb378c8ef146be00");
    }

    #[test]
    fn test_truncated_tags_are_prefixes() {
        for tag_len in [4usize, 10, 20] {
            let tag = compute_tag(b"Jefe", b"what do ya want for nothing?", tag_len);
            assert_eq!(tag.len(), tag_len);
            assert_eq!(tag.to_hex(), &JEFE_DIGEST[..tag_len * 2]);
        }
    }

    #[test]
    fn test_verify_accepts_computed_tag() {
        let keys: [&[u8]; 3] = [b"", b"Jefe", &[0x42; 64]];
        let messages: [&[u8]; 3] = [b"", b"x", &[0x80; 1500]];
        for key in keys {
            for message in messages {
                for tag_len in [4usize, 10, 20] {
                    let tag = compute_tag(key, message, tag_len);
                    assert!(verify_tag(key, message, tag.as_bytes(), tag_len));
                }
            }
        }
    }

    #[test]
    fn test_verify_rejects_any_single_bit_flip() {
        let key = b"Jefe";
        let message = b"what do ya want for nothing?";
        let tag = compute_tag(key, message, 10).into_vec();
        for byte in 0..tag.len() {
            for bit in 0..8 {
                let mut forged = tag.clone();
                forged[byte] ^= 1 << bit;
                assert!(!verify_tag(key, message, &forged, 10));
            }
        }
    }

    #[test]
    fn test_verify_rejects_wrong_length() {
        let key = b"Jefe";
        let message = b"what do ya want for nothing?";
        let full = compute_tag(key, message, 20);
        // A correct prefix of the wrong length is still a mismatch.
        assert!(!verify_tag(key, message, &full.as_bytes()[..4], 10));
        assert!(!verify_tag(key, message, full.as_bytes(), 10));
        assert!(!verify_tag(key, message, &[], 10));
        assert!(!verify_tag(key, message, &[], 0));
    }

    #[test]
    fn test_oversized_tag_len_uses_full_digest() {
        let key = b"Jefe";
        let message = b"what do ya want for nothing?";
        let tag = compute_tag(key, message, 32);
        assert_eq!(tag.to_hex(), JEFE_DIGEST);
        assert!(verify_tag(key, message, tag.as_bytes(), 32));
        assert!(!verify_tag(key, message, &[0u8; 32], 32));

        let rtp = compute_rtp_tag(key, message, 7, 64);
        assert_eq!(rtp.len(), 20);
        assert!(verify_rtp_tag(key, message, 7, rtp.as_bytes(), 64));
    }

    #[test]
    fn test_verify_rejects_other_message() {
        let tag = compute_tag(b"key", b"packet one", 10);
        assert!(!verify_tag(b"key", b"packet two", tag.as_bytes(), 10));
        assert!(!verify_tag(b"other key", b"packet one", tag.as_bytes(), 10));
    }

    #[test]
    fn test_rtp_tag_covers_roc() {
        let key = [0x11u8; 20];
        let packet = [0x80u8, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0xde, 0xad, 0xbe, 0xef, 1, 2, 3];

        let mut with_roc = packet.to_vec();
        with_roc.extend_from_slice(&5u32.to_be_bytes());
        assert_eq!(
            compute_rtp_tag(&key, &packet, 5, 10),
            compute_tag(&key, &with_roc, 10)
        );

        assert_ne!(compute_rtp_tag(&key, &packet, 0, 10), compute_rtp_tag(&key, &packet, 1, 10));
        let tag = compute_rtp_tag(&key, &packet, 1, 10);
        assert!(verify_rtp_tag(&key, &packet, 1, tag.as_bytes(), 10));
        assert!(!verify_rtp_tag(&key, &packet, 2, tag.as_bytes(), 10));
    }

    #[test]
    fn test_session_keys_use_suite_tag_len() {
        let packet = [0x80u8; 172];

        let master = MasterKeyMaterial::from_parts(&AES_CM_128_HMAC_SHA1_80, &[1; 16], &[2; 14]).unwrap();
        let keys = derive_session_keys(&master, KeyFamily::Srtp, 0);
        let tag = keys.rtp_tag(&packet, 0);
        assert_eq!(tag.len(), 10);
        assert!(keys.verify_rtp_tag(&packet, 0, tag.as_bytes()));

        let master = MasterKeyMaterial::from_parts(&AES_CM_128_HMAC_SHA1_32, &[1; 16], &[2; 14]).unwrap();
        let keys = derive_session_keys(&master, KeyFamily::Srtp, 0);
        let short = keys.rtp_tag(&packet, 0);
        assert_eq!(short.len(), 4);
        assert_eq!(short.as_bytes(), &tag.as_bytes()[..4]);
        assert!(keys.verify_rtp_tag(&packet, 0, short.as_bytes()));
        assert!(!keys.verify_rtp_tag(&packet, 0, tag.as_bytes()));

        let rtcp_keys = derive_session_keys(&master, KeyFamily::Srtcp, 0);
        let rtcp_tag = rtcp_keys.rtcp_tag(&packet);
        assert_eq!(rtcp_tag.len(), 10);
        assert!(rtcp_keys.verify_rtcp_tag(&packet, rtcp_tag.as_bytes()));
    }
}
