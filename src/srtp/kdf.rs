//! Session key derivation from master key material (RFC 3711, section 4.3).
//!
//! The PRF is AES in counter mode keyed with the master key:
//!
//! ```text
//! key_id = label || r                      (r = index DIV key_derivation_rate, 48 bits)
//! x      = key_id XOR master_salt          (key_id right-aligned in 14 bytes)
//! output = AES-CM(master_key, IV = x * 2^16)[..len]
//! ```

use std::fmt;

use aes::cipher::{KeyIvInit, StreamCipher};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::keys::MasterKeyMaterial;
use super::suite::{Cipher, CryptoSuite};

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// SRTP key derivation labels (RFC 3711, section 4.3.1).
pub const LABEL_CIPHER_KEY: u8 = 0x00;
pub const LABEL_AUTH_KEY: u8 = 0x01;
pub const LABEL_SALT: u8 = 0x02;

/// SRTCP key derivation labels (RFC 3711, section 4.3.2).
pub const LABEL_SRTCP_CIPHER_KEY: u8 = 0x03;
pub const LABEL_SRTCP_AUTH_KEY: u8 = 0x04;
pub const LABEL_SRTCP_SALT: u8 = 0x05;

/// `r` occupies 48 bits of the key id.
const DERIVATION_INDEX_MASK: u64 = (1 << 48) - 1;

/// Which label triple to derive with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Srtp,
    Srtcp,
}

impl KeyFamily {
    pub const fn cipher_label(self) -> u8 {
        match self {
            KeyFamily::Srtp => LABEL_CIPHER_KEY,
            KeyFamily::Srtcp => LABEL_SRTCP_CIPHER_KEY,
        }
    }

    pub const fn auth_label(self) -> u8 {
        match self {
            KeyFamily::Srtp => LABEL_AUTH_KEY,
            KeyFamily::Srtcp => LABEL_SRTCP_AUTH_KEY,
        }
    }

    pub const fn salt_label(self) -> u8 {
        match self {
            KeyFamily::Srtp => LABEL_SALT,
            KeyFamily::Srtcp => LABEL_SRTCP_SALT,
        }
    }
}

/// Derived session keys for one direction of one stream. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    #[zeroize(skip)]
    suite: &'static CryptoSuite,
    #[zeroize(skip)]
    family: KeyFamily,
    cipher_key: Vec<u8>,
    cipher_salt: Vec<u8>,
    auth_key: Vec<u8>,
}

impl SessionKeys {
    pub fn suite(&self) -> &'static CryptoSuite {
        self.suite
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    pub fn cipher_key(&self) -> &[u8] {
        &self.cipher_key
    }

    pub fn cipher_salt(&self) -> &[u8] {
        &self.cipher_salt
    }

    pub fn auth_key(&self) -> &[u8] {
        &self.auth_key
    }
}

impl PartialEq for SessionKeys {
    fn eq(&self, other: &Self) -> bool {
        self.suite == other.suite
            && self.family == other.family
            && self.cipher_key == other.cipher_key
            && self.cipher_salt == other.cipher_salt
            && self.auth_key == other.auth_key
    }
}

impl Eq for SessionKeys {}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("suite", &self.suite.name)
            .field("family", &self.family)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

/// `index DIV key_derivation_rate`; a rate of zero means keys are derived once.
pub fn derivation_context(index: u64, key_derivation_rate: u64) -> u64 {
    if key_derivation_rate == 0 {
        0
    } else {
        index / key_derivation_rate
    }
}

/// Run the AES-CM PRF for a single `label`, producing `len` bytes.
pub fn derive_key(master: &MasterKeyMaterial, label: u8, r: u64, len: usize) -> Vec<u8> {
    let r = (r & DERIVATION_INDEX_MASK).to_be_bytes();

    // key_id sits in bytes 7..14; bytes 14..16 are the block counter.
    let mut iv = [0u8; 16];
    iv[7] = label;
    iv[8..14].copy_from_slice(&r[2..]);
    for (b, s) in iv.iter_mut().zip(master.master_salt()) {
        *b ^= s;
    }

    let mut output = vec![0u8; len];
    match master.suite().cipher {
        Cipher::Aes128Cm => {
            let mut cipher = Aes128Ctr::new_from_slices(master.master_key(), &iv)
                .expect("master key length fixed by suite");
            cipher.apply_keystream(&mut output);
        }
        Cipher::Aes256Cm => {
            let mut cipher = Aes256Ctr::new_from_slices(master.master_key(), &iv)
                .expect("master key length fixed by suite");
            cipher.apply_keystream(&mut output);
        }
    }
    iv.zeroize();
    output
}

/// Derive cipher key, cipher salt and auth key for `family` at derivation
/// context `r` (see [`derivation_context`]). Deterministic in all inputs.
pub fn derive_session_keys(master: &MasterKeyMaterial, family: KeyFamily, r: u64) -> SessionKeys {
    let suite = master.suite();
    let keys = SessionKeys {
        suite,
        family,
        cipher_key: derive_key(master, family.cipher_label(), r, suite.cipher_key_len),
        cipher_salt: derive_key(master, family.salt_label(), r, suite.cipher_salt_len),
        auth_key: derive_key(master, family.auth_label(), r, suite.auth_key_len),
    };
    tracing::debug!("Derived {:?} session keys for {} (r={})", family, suite, r);
    keys
}
