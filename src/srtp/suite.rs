//! SRTP crypto-suite registry (RFC 4568 section 6.2, RFC 6188).
//!
//! The registry is a fixed table of `'static` entries, so lookups need no
//! locking and suites can be handed around as `&'static CryptoSuite`.

use std::fmt;

use super::error::{Error, Result};

/// Master/session salt length for every AES counter-mode suite.
const CM_SALT_LEN: usize = 14;

/// SRTCP always carries an 80-bit tag, even for the `_32` suites.
const SRTCP_TAG_LEN: usize = 10;

/// Block cipher run in counter mode for encryption and key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cipher {
    Aes128Cm,
    Aes256Cm,
}

/// Message authentication algorithm of a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacAlgorithm {
    HmacSha1,
}

impl MacAlgorithm {
    /// Length of the untruncated MAC output.
    pub const fn digest_len(self) -> usize {
        match self {
            MacAlgorithm::HmacSha1 => 20,
        }
    }

    /// Session authentication key length (RFC 3711 uses n_a = 160 for HMAC-SHA1).
    pub const fn key_len(self) -> usize {
        match self {
            MacAlgorithm::HmacSha1 => 20,
        }
    }
}

/// Structural parameters of a named SRTP crypto suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoSuite {
    pub name: &'static str,
    pub cipher: Cipher,
    pub cipher_key_len: usize,
    pub cipher_salt_len: usize,
    pub auth_key_len: usize,
    /// SRTP authentication tag length in bytes.
    pub tag_len: usize,
    pub srtcp_tag_len: usize,
    pub mac_algorithm: MacAlgorithm,
}

impl CryptoSuite {
    const fn aes_cm_hmac_sha1(name: &'static str, cipher: Cipher, tag_len: usize) -> Self {
        let cipher_key_len = match cipher {
            Cipher::Aes128Cm => 16,
            Cipher::Aes256Cm => 32,
        };
        Self {
            name,
            cipher,
            cipher_key_len,
            cipher_salt_len: CM_SALT_LEN,
            auth_key_len: MacAlgorithm::HmacSha1.key_len(),
            tag_len,
            srtcp_tag_len: SRTCP_TAG_LEN,
            mac_algorithm: MacAlgorithm::HmacSha1,
        }
    }

    /// Decoded length of the SDES inline key blob: master key || master salt.
    pub const fn key_material_len(&self) -> usize {
        self.cipher_key_len + self.cipher_salt_len
    }
}

impl fmt::Display for CryptoSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub static AES_CM_128_HMAC_SHA1_80: CryptoSuite =
    CryptoSuite::aes_cm_hmac_sha1("AES_CM_128_HMAC_SHA1_80", Cipher::Aes128Cm, 10);

pub static AES_CM_128_HMAC_SHA1_32: CryptoSuite =
    CryptoSuite::aes_cm_hmac_sha1("AES_CM_128_HMAC_SHA1_32", Cipher::Aes128Cm, 4);

pub static AES_256_CM_HMAC_SHA1_80: CryptoSuite =
    CryptoSuite::aes_cm_hmac_sha1("AES_256_CM_HMAC_SHA1_80", Cipher::Aes256Cm, 10);

pub static AES_256_CM_HMAC_SHA1_32: CryptoSuite =
    CryptoSuite::aes_cm_hmac_sha1("AES_256_CM_HMAC_SHA1_32", Cipher::Aes256Cm, 4);

static REGISTRY: [&CryptoSuite; 4] = [
    &AES_CM_128_HMAC_SHA1_80,
    &AES_CM_128_HMAC_SHA1_32,
    &AES_256_CM_HMAC_SHA1_80,
    &AES_256_CM_HMAC_SHA1_32,
];

/// Suites offered by default, most preferred first.
static SUPPORTED: [&CryptoSuite; 2] = [&AES_256_CM_HMAC_SHA1_80, &AES_CM_128_HMAC_SHA1_80];

/// Look up a suite by its SDES name (exact, case-sensitive match).
pub fn lookup(name: &str) -> Result<&'static CryptoSuite> {
    REGISTRY
        .iter()
        .copied()
        .find(|suite| suite.name == name)
        .ok_or_else(|| Error::UnknownSuite(name.to_string()))
}

/// Every registered suite.
pub fn all() -> &'static [&'static CryptoSuite] {
    &REGISTRY
}

/// Default preference order used when offering or answering.
pub fn supported() -> &'static [&'static CryptoSuite] {
    &SUPPORTED
}

/// Pick the first suite in `preferred` that the peer offered.
///
/// Offered names we don't know are ignored; they can't be selected anyway.
pub fn select<'a, I>(preferred: &[&'static CryptoSuite], offered: I) -> Option<&'static CryptoSuite>
where
    I: IntoIterator<Item = &'a str>,
{
    let offered: Vec<&str> = offered.into_iter().collect();
    let selected = preferred
        .iter()
        .copied()
        .find(|suite| offered.contains(&suite.name));

    match selected {
        Some(suite) => tracing::debug!("Selected SRTP suite {}", suite),
        None => tracing::debug!("No common SRTP suite among {:?}", offered),
    }
    selected
}
