//! SRTP master key material as carried in an SDES `inline:` key parameter.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::{DecodeError, Result};
use super::suite::CryptoSuite;
use crate::codec;

/// Master key and master salt for one crypto context. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKeyMaterial {
    #[zeroize(skip)]
    suite: &'static CryptoSuite,
    master_key: Vec<u8>,
    master_salt: Vec<u8>,
}

impl MasterKeyMaterial {
    /// Build key material from separate key and salt, checking both lengths.
    pub fn from_parts(suite: &'static CryptoSuite, key: &[u8], salt: &[u8]) -> Result<Self> {
        if key.len() != suite.cipher_key_len {
            return Err(DecodeError::Length {
                expected: suite.cipher_key_len,
                actual: key.len(),
            }
            .into());
        }
        if salt.len() != suite.cipher_salt_len {
            return Err(DecodeError::Length {
                expected: suite.cipher_salt_len,
                actual: salt.len(),
            }
            .into());
        }
        Ok(Self {
            suite,
            master_key: key.to_vec(),
            master_salt: salt.to_vec(),
        })
    }

    /// Decode base64(master key || master salt) for `suite`.
    ///
    /// The decoded length must be exactly `cipher_key_len + cipher_salt_len`
    /// (30 bytes for the 128-bit suites, 46 for the 256-bit ones).
    pub fn decode_inline(suite: &'static CryptoSuite, inline: &str) -> Result<Self> {
        let mut decoded = codec::base64_decode(inline)?;

        let expected = suite.key_material_len();
        if decoded.len() != expected {
            let actual = decoded.len();
            decoded.zeroize();
            tracing::debug!(
                "Rejected {} inline key: {} bytes (need {})",
                suite,
                actual,
                expected
            );
            return Err(DecodeError::Length { expected, actual }.into());
        }

        let salt = decoded.split_off(suite.cipher_key_len);
        tracing::trace!("Decoded {} inline key ({} bytes)", suite, expected);
        Ok(Self {
            suite,
            master_key: decoded,
            master_salt: salt,
        })
    }

    /// Fresh random key material from the OS CSPRNG.
    pub fn generate(suite: &'static CryptoSuite) -> Result<Self> {
        let mut key = vec![0u8; suite.cipher_key_len];
        let mut salt = vec![0u8; suite.cipher_salt_len];
        getrandom::getrandom(&mut key)?;
        getrandom::getrandom(&mut salt)?;
        Ok(Self {
            suite,
            master_key: key,
            master_salt: salt,
        })
    }

    /// base64(master key || master salt), the inverse of [`decode_inline`](Self::decode_inline).
    pub fn encode_inline(&self) -> String {
        let mut joined = Vec::with_capacity(self.suite.key_material_len());
        joined.extend_from_slice(&self.master_key);
        joined.extend_from_slice(&self.master_salt);
        let encoded = codec::base64_encode(&joined);
        joined.zeroize();
        encoded
    }

    pub fn suite(&self) -> &'static CryptoSuite {
        self.suite
    }

    pub fn master_key(&self) -> &[u8] {
        &self.master_key
    }

    pub fn master_salt(&self) -> &[u8] {
        &self.master_salt
    }
}

impl PartialEq for MasterKeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.suite == other.suite
            && self.master_key == other.master_key
            && self.master_salt == other.master_salt
    }
}

impl Eq for MasterKeyMaterial {}

impl fmt::Debug for MasterKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKeyMaterial")
            .field("suite", &self.suite.name)
            .field("master_key", &"[REDACTED]")
            .field("master_salt", &"[REDACTED]")
            .finish()
    }
}

/// Decode an SDES inline key blob for `suite` into master key and salt.
pub fn decode_inline(suite: &'static CryptoSuite, inline: &str) -> Result<MasterKeyMaterial> {
    MasterKeyMaterial::decode_inline(suite, inline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srtp::error::Error;
    use crate::srtp::suite::{self, AES_256_CM_HMAC_SHA1_80, AES_CM_128_HMAC_SHA1_80};

    const INLINE_128: &str = "v4yQP2QdOxtMJru5c6oNBueCmS0ynYvn9lJrgRim";
    const INLINE_256: &str = "odW5eLlz6vaWC//mA4qT1BXnlUm4qRFFwOLVgMBm7BFfyNfEwa8ocYP7fbF3TA==";

    #[test]
    fn test_decode_inline_128() {
        let material = decode_inline(&AES_CM_128_HMAC_SHA1_80, INLINE_128).unwrap();
        assert_eq!(material.master_key().len(), 16);
        assert_eq!(material.master_salt().len(), 14);
        assert_eq!(
            codec::hex_encode(material.master_key()),
            "bf8c903f641d3b1b4c26bbb973aa0d06"
        );
        assert_eq!(
            codec::hex_encode(material.master_salt()),
            "e782992d329d8be7f6526b8118a6"
        );
    }

    #[test]
    fn test_decode_inline_256() {
        let material = decode_inline(&AES_256_CM_HMAC_SHA1_80, INLINE_256).unwrap();
        assert_eq!(material.master_key().len(), 32);
        assert_eq!(material.master_salt().len(), 14);
        assert_eq!(
            codec::hex_encode(material.master_salt()),
            "5fc8d7c4c1af287183fb7db1774c"
        );
    }

    #[test]
    fn test_decode_inline_wrong_length() {
        // A 128-bit blob handed to a 256-bit suite, and vice versa.
        match decode_inline(&AES_256_CM_HMAC_SHA1_80, INLINE_128) {
            Err(Error::Decode(DecodeError::Length { expected, actual })) => {
                assert_eq!(expected, 46);
                assert_eq!(actual, 30);
            }
            other => panic!("expected length error, got {:?}", other),
        }
        match decode_inline(&AES_CM_128_HMAC_SHA1_80, INLINE_256) {
            Err(Error::Decode(DecodeError::Length { expected, actual })) => {
                assert_eq!(expected, 30);
                assert_eq!(actual, 46);
            }
            other => panic!("expected length error, got {:?}", other),
        }
        assert!(decode_inline(&AES_CM_128_HMAC_SHA1_80, "").is_err());
    }

    #[test]
    fn test_decode_inline_every_suite_splits_exactly() {
        for &suite in suite::all() {
            let blob: Vec<u8> = (0..suite.key_material_len()).map(|i| i as u8).collect();
            let material = decode_inline(suite, &codec::base64_encode(&blob)).unwrap();
            assert_eq!(material.master_key(), &blob[..suite.cipher_key_len]);
            assert_eq!(material.master_salt(), &blob[suite.cipher_key_len..]);

            let short = codec::base64_encode(&blob[1..]);
            assert!(decode_inline(suite, &short).is_err());
        }
    }

    #[test]
    fn test_decode_inline_bad_base64() {
        let err = decode_inline(&AES_CM_128_HMAC_SHA1_80, "v4yQP2Qd$xtMJru5c6oNBueCmS0ynYvn9lJrgRim")
            .unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::Base64(_))));
    }

    #[test]
    fn test_encode_inline_roundtrip() {
        let material = decode_inline(&AES_256_CM_HMAC_SHA1_80, INLINE_256).unwrap();
        assert_eq!(material.encode_inline(), INLINE_256);
    }

    #[test]
    fn test_from_parts_checks_lengths() {
        let ok = MasterKeyMaterial::from_parts(&AES_CM_128_HMAC_SHA1_80, &[1; 16], &[2; 14]);
        assert!(ok.is_ok());
        let bad_key = MasterKeyMaterial::from_parts(&AES_CM_128_HMAC_SHA1_80, &[1; 32], &[2; 14]);
        assert!(bad_key.is_err());
        let bad_salt = MasterKeyMaterial::from_parts(&AES_CM_128_HMAC_SHA1_80, &[1; 16], &[2; 12]);
        assert!(bad_salt.is_err());
    }

    #[test]
    fn test_generate() {
        let a = MasterKeyMaterial::generate(&AES_256_CM_HMAC_SHA1_80).unwrap();
        let b = MasterKeyMaterial::generate(&AES_256_CM_HMAC_SHA1_80).unwrap();
        assert_eq!(a.master_key().len(), 32);
        assert_eq!(a.master_salt().len(), 14);
        assert_ne!(a, b);

        let decoded = decode_inline(a.suite(), &a.encode_inline()).unwrap();
        assert_eq!(decoded, a);
    }

    #[test]
    fn test_debug_redacts_key() {
        let material = decode_inline(&AES_CM_128_HMAC_SHA1_80, INLINE_128).unwrap();
        let printed = format!("{:?}", material);
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("bf8c"));
        assert!(!printed.contains("191"));
    }
}
